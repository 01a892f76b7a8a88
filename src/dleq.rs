// SPDX-License-Identifier: MIT OR Apache-2.0

//! Batched DLEQ proofs (RFC 9497 Section 2.2): proving that
//! `log_A(B) = log_M(Z)` without revealing the discrete log

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::ciphersuite::{MAX_BATCH_SIZE, PROOF_LENGTH, SCALAR_LENGTH};
use crate::group::{hash_to_scalar, Element, Scalar};
use crate::util::{
    hash_to_scalar_dst, i2osp_2, length_prefixed, seed_dst, Mode, STR_CHALLENGE, STR_COMPOSITE,
};
use crate::{Error, Result};

/// A DLEQ proof: the challenge scalar `c` and response scalar `s`,
/// serialized as `c || s` (64 bytes). Produced only in verifiable modes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Proof {
    pub(crate) c: Scalar,
    pub(crate) s: Scalar,
}

impl Proof {
    /// Serialization into bytes
    pub fn serialize(&self) -> [u8; PROOF_LENGTH] {
        let mut output = [0; PROOF_LENGTH];
        output[..SCALAR_LENGTH].copy_from_slice(&self.c.to_bytes());
        output[SCALAR_LENGTH..].copy_from_slice(&self.s.to_bytes());
        output
    }

    /// Deserialization from bytes
    ///
    /// # Errors
    /// [`Error::Scalar`] if the input is not 64 bytes or either half is not
    /// a canonical scalar.
    pub fn deserialize(input: &[u8]) -> Result<Self> {
        if input.len() != PROOF_LENGTH {
            return Err(Error::Scalar);
        }
        Ok(Self {
            c: Scalar::from_bytes(&input[..SCALAR_LENGTH])?,
            s: Scalar::from_bytes(&input[SCALAR_LENGTH..])?,
        })
    }
}

/// Generates a batched proof that the discrete log of `b` to the base `a`
/// equals the discrete log of every `ds[i]` to the base `cs[i]`.
pub(crate) fn generate_proof<R: RngCore + CryptoRng>(
    mode: Mode,
    rng: &mut R,
    k: Scalar,
    a: Element,
    b: Element,
    cs: &[Element],
    ds: &[Element],
) -> Result<Proof> {
    generate_proof_with_nonce(mode, k, a, b, cs, ds, Scalar::random(rng))
}

// Deterministic variant used by the test vectors. The nonce must come from a
// cryptographically secure source and must never repeat across proofs.
pub(crate) fn generate_proof_with_nonce(
    mode: Mode,
    k: Scalar,
    a: Element,
    b: Element,
    cs: &[Element],
    ds: &[Element],
    nonce: Scalar,
) -> Result<Proof> {
    if nonce.is_zero() {
        return Err(Error::Scalar);
    }
    if cs.is_empty() || cs.len() != ds.len() || cs.len() > MAX_BATCH_SIZE {
        return Err(Error::Batch);
    }

    let (m, z) = compute_composites(mode, Some(k), b, cs, ds)?;
    let t2 = a * nonce;
    let t3 = m * nonce;

    let c = challenge(mode, b, m, z, t2, t3)?;
    let s = nonce - c * k;

    Ok(Proof { c, s })
}

/// Verifies a batched proof over the parallel lists `(cs, ds)` against the
/// public key `b = k * a`. Returns `false` for malformed batches (empty,
/// mismatched, oversized) and for any proof that fails the transcript check;
/// well-formed but invalid proofs never produce an error.
pub fn verify_proof(
    mode: Mode,
    a: Element,
    b: Element,
    cs: &[Element],
    ds: &[Element],
    proof: &Proof,
) -> bool {
    if cs.is_empty() || cs.len() != ds.len() || cs.len() > MAX_BATCH_SIZE {
        return false;
    }
    let Ok((m, z)) = compute_composites(mode, None, b, cs, ds) else {
        return false;
    };
    let t2 = a * proof.s + b * proof.c;
    let t3 = m * proof.s + z * proof.c;

    match challenge(mode, b, m, z, t2, t3) {
        Ok(expected) => expected == proof.c,
        Err(_) => false,
    }
}

// The composite pair (M, Z) that folds the whole batch into a single DLEQ
// instance. The prover passes its secret and takes the cheap path Z = k * M;
// the verifier recomputes Z from the ds.
fn compute_composites(
    mode: Mode,
    k: Option<Scalar>,
    b: Element,
    cs: &[Element],
    ds: &[Element],
) -> Result<(Element, Element)> {
    // seed = Hash(I2OSP(len(Bm), 2) || Bm || I2OSP(len(seedDST), 2) || seedDST)
    let seed = Sha256::digest(
        [
            length_prefixed(&b.to_bytes())?,
            length_prefixed(&seed_dst(mode))?,
        ]
        .concat(),
    );

    let scalar_dst = hash_to_scalar_dst(mode);
    let mut m = Element::identity();
    let mut z = Element::identity();

    for (i, (c_i, d_i)) in cs.iter().zip(ds).enumerate() {
        let composite_transcript = [
            length_prefixed(&seed)?,
            i2osp_2(i)?.to_vec(),
            length_prefixed(&c_i.to_bytes())?,
            length_prefixed(&d_i.to_bytes())?,
            STR_COMPOSITE.to_vec(),
        ]
        .concat();
        let d_i_scalar = hash_to_scalar(&[&composite_transcript], &scalar_dst)?;
        m = *c_i * d_i_scalar + m;
        if k.is_none() {
            z = *d_i * d_i_scalar + z;
        }
    }

    if let Some(k) = k {
        z = m * k;
    }

    Ok((m, z))
}

fn challenge(
    mode: Mode,
    b: Element,
    m: Element,
    z: Element,
    t2: Element,
    t3: Element,
) -> Result<Scalar> {
    let challenge_transcript = [
        length_prefixed(&b.to_bytes())?,
        length_prefixed(&m.to_bytes())?,
        length_prefixed(&z.to_bytes())?,
        length_prefixed(&t2.to_bytes())?,
        length_prefixed(&t3.to_bytes())?,
        STR_CHALLENGE.to_vec(),
    ]
    .concat();

    hash_to_scalar(&[&challenge_transcript], &hash_to_scalar_dst(mode))
}

///////////
// Tests //
// ===== //
///////////
