// SPDX-License-Identifier: MIT OR Apache-2.0

//! The prime-order group underlying the protocol: P-256 points and scalars
//! modulo the group order, with their canonical byte encodings

mod expand;
mod map;

pub(crate) use map::{hash_to_curve, hash_to_scalar};

use core::ops::{Add, Mul, Neg, Sub};

use elliptic_curve::group::Group as _;
use elliptic_curve::sec1::ToEncodedPoint;
use elliptic_curve::{Field, PrimeField};
use generic_array::GenericArray;
use p256::{NonZeroScalar, ProjectivePoint, PublicKey};
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::ciphersuite::{ELEMENT_LENGTH, SCALAR_LENGTH};
use crate::{Error, Result};

////////////
// Scalar //
// ====== //
////////////

/// A field element modulo the P-256 group order `n`, always reduced to
/// `[0, n)`.
#[derive(Clone, Copy, Eq)]
pub struct Scalar(pub(crate) p256::Scalar);

impl Scalar {
    /// The additive identity.
    pub fn zero() -> Self {
        Self(p256::Scalar::ZERO)
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        Self(p256::Scalar::ONE)
    }

    /// Samples a uniformly random nonzero scalar in `[1, n)`.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self(*NonZeroScalar::random(rng))
    }

    /// Whether this scalar is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero().into()
    }

    /// The multiplicative inverse.
    ///
    /// # Errors
    /// [`Error::Scalar`] if the scalar is zero.
    pub fn invert(&self) -> Result<Self> {
        Option::from(self.0.invert())
            .map(Self)
            .ok_or(Error::Scalar)
    }

    /// Serializes to 32 bytes, big-endian, left-padded with zeros.
    pub fn to_bytes(&self) -> [u8; SCALAR_LENGTH] {
        let mut output = [0; SCALAR_LENGTH];
        output.copy_from_slice(&self.0.to_repr());
        output
    }

    /// Deserializes from a 32-byte big-endian encoding.
    ///
    /// # Errors
    /// [`Error::Scalar`] if the length is not 32 or the value is `>= n`.
    /// Zero is accepted here; call sites that forbid it check separately.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        if input.len() != SCALAR_LENGTH {
            return Err(Error::Scalar);
        }
        Option::from(p256::Scalar::from_repr(GenericArray::clone_from_slice(
            input,
        )))
        .map(Self)
        .ok_or(Error::Scalar)
    }
}

impl Add for Scalar {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Scalar {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Mul for Scalar {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self(self.0 * rhs.0)
    }
}

impl Neg for Scalar {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Zeroize for Scalar {
    fn zeroize(&mut self) {
        self.0 = p256::Scalar::ZERO;
    }
}

// Scalars routinely hold secrets (private keys, blinds, nonces); none of
// them may leak through diagnostics.
impl core::fmt::Debug for Scalar {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Scalar(<redacted>)")
    }
}

/////////////
// Element //
// ======= //
/////////////

/// A P-256 curve point. The identity is only ever produced as an
/// intermediate accumulator; it is rejected at every byte boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Element(pub(crate) ProjectivePoint);

impl Element {
    /// The fixed group generator `G`.
    pub fn generator() -> Self {
        Self(ProjectivePoint::GENERATOR)
    }

    /// The point at infinity.
    pub fn identity() -> Self {
        Self(ProjectivePoint::IDENTITY)
    }

    /// Whether this element is the point at infinity.
    pub fn is_identity(&self) -> bool {
        self.0.is_identity().into()
    }

    /// Serializes to the 33-byte SEC1 compressed encoding.
    pub fn to_bytes(&self) -> [u8; ELEMENT_LENGTH] {
        // The identity has no compressed SEC1 form; an all-zero buffer keeps
        // transcript field widths fixed and never decodes back.
        let mut output = [0; ELEMENT_LENGTH];
        if !self.is_identity() {
            let encoded = self.0.to_affine().to_encoded_point(true);
            output.copy_from_slice(encoded.as_bytes());
        }
        output
    }

    /// Deserializes from a 33-byte SEC1 compressed encoding.
    ///
    /// # Errors
    /// [`Error::Point`] if the length is not 33, the point is not on the
    /// curve, or the encoding names the identity.
    pub fn from_bytes(input: &[u8]) -> Result<Self> {
        if input.len() != ELEMENT_LENGTH {
            return Err(Error::Point);
        }
        PublicKey::from_sec1_bytes(input)
            .map(|public_key| Self(public_key.to_projective()))
            .map_err(|_| Error::Point)
    }
}

impl Add for Element {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for Element {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl Neg for Element {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Scalar> for Element {
    type Output = Self;

    fn mul(self, rhs: Scalar) -> Self {
        Self(self.0 * rhs.0)
    }
}

///////////
// Tests //
// ===== //
///////////
