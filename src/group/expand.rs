// SPDX-License-Identifier: MIT OR Apache-2.0

//! `expand_message_xmd` with SHA-256 (RFC 9380 Section 5.3.1)

use digest::{Digest, Output};
use sha2::Sha256;

use crate::ciphersuite::HASH_LENGTH;
use crate::{Error, Result};

// s_in_bytes, the input block size of SHA-256.
const BLOCK_LENGTH: usize = 64;

fn xor(x: &Output<Sha256>, y: &Output<Sha256>) -> Output<Sha256> {
    x.iter().zip(y).map(|(x1, x2)| x1 ^ x2).collect()
}

/// Expands `msg` (supplied in parts) into `len_in_bytes` uniform bytes under
/// the domain-separation tag `dst`.
pub(crate) fn expand_message_xmd(
    msg: &[&[u8]],
    dst: &[u8],
    len_in_bytes: usize,
) -> Result<Vec<u8>> {
    // DST, a byte string of at most 255 bytes.
    let dst_len = u8::try_from(dst.len()).map_err(|_| Error::HashToCurve)?;

    // ell = ceil(len_in_bytes / b_in_bytes); ABORT if ell > 255
    if len_in_bytes == 0 || len_in_bytes > 255 * HASH_LENGTH {
        return Err(Error::HashToCurve);
    }
    let ell = (len_in_bytes + HASH_LENGTH - 1) / HASH_LENGTH;

    let mut hash = Sha256::new();

    // b_0 = H(msg_prime)
    // msg_prime = Z_pad || msg || l_i_b_str || I2OSP(0, 1) || DST_prime
    // Z_pad = I2OSP(0, s_in_bytes)
    Digest::update(&mut hash, [0; BLOCK_LENGTH]);
    for part in msg {
        Digest::update(&mut hash, part);
    }
    // l_i_b_str = I2OSP(len_in_bytes, 2)
    Digest::update(&mut hash, (len_in_bytes as u16).to_be_bytes());
    Digest::update(&mut hash, [0]);
    // DST_prime = DST || I2OSP(len(DST), 1)
    Digest::update(&mut hash, dst);
    Digest::update(&mut hash, [dst_len]);
    let b_0 = hash.finalize_reset();

    let mut uniform_bytes = vec![0; len_in_bytes];
    let mut b_i = Output::<Sha256>::default();

    // b_1 = H(b_0 || I2OSP(1, 1) || DST_prime)
    // b_i = H(strxor(b_0, b_(i - 1)) || I2OSP(i, 1) || DST_prime)
    for (i, chunk) in (1..=ell).zip(uniform_bytes.chunks_mut(HASH_LENGTH)) {
        Digest::update(&mut hash, xor(&b_0, &b_i));
        Digest::update(&mut hash, [i as u8]);
        Digest::update(&mut hash, dst);
        Digest::update(&mut hash, [dst_len]);
        b_i = hash.finalize_reset();
        // uniform_bytes = b_1 || ... || b_ell, truncated
        chunk.copy_from_slice(&b_i[..chunk.len()]);
    }

    Ok(uniform_bytes)
}
