// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server key pairs and the DeriveKeyPair algorithm (RFC 9497 Section 3.2)

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::ciphersuite::{ELEMENT_LENGTH, SCALAR_LENGTH, SEED_LENGTH};
use crate::group::{hash_to_scalar, Element, Scalar};
use crate::util::{derive_keypair_dst, i2osp_1, i2osp_2, Mode};
use crate::{Error, Result};

/// A private scalar together with its public counterpart `pk = sk * G`.
/// The private scalar is never zero, and is wiped when the pair is dropped.
#[derive(Clone)]
pub struct KeyPair {
    sk: Scalar,
    pk: Element,
}

impl KeyPair {
    /// Generates a fresh random key pair.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let sk = Scalar::random(rng);
        Self {
            pk: Element::generator() * sk,
            sk,
        }
    }

    /// Deterministically derives a key pair from a 32-byte seed and public
    /// info, iterating a one-byte counter until a nonzero scalar falls out.
    ///
    /// Corresponds to the DeriveKeyPair() function from RFC 9497.
    ///
    /// # Errors
    /// - [`Error::Seed`] if the seed is not exactly 32 bytes.
    /// - [`Error::Info`] if `info` is longer than 65535 bytes.
    /// - [`Error::DeriveKeyPair`] if all 256 counter values produce zero
    ///   (cryptographically negligible).
    pub fn derive(mode: Mode, seed: &[u8], info: &[u8]) -> Result<Self> {
        if seed.len() != SEED_LENGTH {
            return Err(Error::Seed);
        }
        // deriveInput = seed || I2OSP(len(info), 2) || info
        let info_len = i2osp_2(info.len()).map_err(|_| Error::Info)?;
        let dst = derive_keypair_dst(mode);

        for counter in 0..=255usize {
            // skS = G.HashToScalar(deriveInput || I2OSP(counter, 1),
            //                      DST = "DeriveKeyPair" || contextString)
            let counter_bytes = i2osp_1(counter).map_err(|_| Error::DeriveKeyPair)?;
            let sk = hash_to_scalar(&[seed, &info_len, info, &counter_bytes], &dst)
                .map_err(|_| Error::DeriveKeyPair)?;
            if !sk.is_zero() {
                return Ok(Self {
                    pk: Element::generator() * sk,
                    sk,
                });
            }
        }
        Err(Error::DeriveKeyPair)
    }

    /// Restores a key pair from a 32-byte private key.
    ///
    /// # Errors
    /// [`Error::Scalar`] if the bytes are not a canonical nonzero scalar.
    pub fn from_private_key_bytes(input: &[u8]) -> Result<Self> {
        let sk = Scalar::from_bytes(input)?;
        if sk.is_zero() {
            return Err(Error::Scalar);
        }
        Ok(Self {
            pk: Element::generator() * sk,
            sk,
        })
    }

    pub(crate) fn private_key(&self) -> Scalar {
        self.sk
    }

    /// The public key `pk = sk * G`.
    pub fn public_key(&self) -> Element {
        self.pk
    }

    /// Serializes the private key to 32 bytes. The returned buffer is a
    /// fresh copy and wipes itself when dropped.
    pub fn export_private_key(&self) -> Zeroizing<[u8; SCALAR_LENGTH]> {
        Zeroizing::new(self.sk.to_bytes())
    }

    /// Serializes the public key to its 33-byte compressed encoding.
    pub fn export_public_key(&self) -> [u8; ELEMENT_LENGTH] {
        self.pk.to_bytes()
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        self.sk.zeroize();
    }
}

impl core::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("KeyPair").field("pk", &self.pk).finish()
    }
}

///////////
// Tests //
// ===== //
///////////
