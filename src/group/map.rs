// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hash-to-curve for the `P256_XMD:SHA-256_SSWU_RO_` suite (RFC 9380):
//! `hash_to_field`, the Simplified SWU map and `hash_to_scalar`

use elliptic_curve::hash2curve::FromOkm;
use elliptic_curve::sec1::FromEncodedPoint;
use generic_array::GenericArray;
use p256::{AffinePoint, EncodedPoint, FieldElement, ProjectivePoint};
use subtle::{ConditionallySelectable, ConstantTimeEq};

use super::expand::expand_message_xmd;
use super::{Element, Scalar};
use crate::ciphersuite::EXPAND_LENGTH;
use crate::{Error, Result};

// Simplified SWU parameters for P-256: A and B are the curve coefficients
// and Z = -10 (mod p) per the suite registration.
fn map_a() -> FieldElement {
    FieldElement::from_bytes(GenericArray::from_slice(&[
        0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xfc,
    ]))
    .unwrap()
}
fn map_b() -> FieldElement {
    FieldElement::from_bytes(GenericArray::from_slice(&[
        0x5a, 0xc6, 0x35, 0xd8, 0xaa, 0x3a, 0x93, 0xe7, 0xb3, 0xeb, 0xbd, 0x55, 0x76, 0x98, 0x86,
        0xbc, 0x65, 0x1d, 0x06, 0xb0, 0xcc, 0x53, 0xb0, 0xf6, 0x3b, 0xce, 0x3c, 0x3e, 0x27, 0xd2,
        0x60, 0x4b,
    ]))
    .unwrap()
}
fn map_z() -> FieldElement {
    FieldElement::from_bytes(GenericArray::from_slice(&[
        0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xf5,
    ]))
    .unwrap()
}

// sqrt_ratio constants for p = 3 (mod 4): c1 = (p - 3) / 4 and
// c2 = sqrt(-Z) = sqrt(10) (mod p).
const SQRT_RATIO_C1: [u64; 4] = [
    0xffff_ffff_ffff_ffff,
    0x0000_0000_3fff_ffff,
    0x4000_0000_0000_0000,
    0x3fff_ffff_c000_0000,
];
fn sqrt_ratio_c2() -> FieldElement {
    FieldElement::from_bytes(GenericArray::from_slice(&[
        0xda, 0x53, 0x8e, 0x3b, 0xe1, 0xd8, 0x9b, 0x99, 0xc9, 0x78, 0xfc, 0x67, 0x51, 0x80, 0xaa,
        0xb2, 0x7b, 0x8d, 0x1f, 0xf8, 0x4c, 0x55, 0xd5, 0xb6, 0x2c, 0xcd, 0x34, 0x27, 0xe4, 0x33,
        0xc4, 0x7f,
    ]))
    .unwrap()
}

/// Hashes `msg` to a curve point with the random-oracle construction:
/// two field elements, each mapped through Simplified SWU, then added.
/// P-256 has cofactor 1, so no clearing step follows.
pub(crate) fn hash_to_curve(msg: &[&[u8]], dst: &[u8]) -> Result<Element> {
    let uniform_bytes = expand_message_xmd(msg, dst, 2 * EXPAND_LENGTH)?;
    let u0 = FieldElement::from_okm(GenericArray::from_slice(&uniform_bytes[..EXPAND_LENGTH]));
    let u1 = FieldElement::from_okm(GenericArray::from_slice(&uniform_bytes[EXPAND_LENGTH..]));

    let q0 = map_to_curve_simple_swu(&u0)?;
    let q1 = map_to_curve_simple_swu(&u1)?;

    Ok(Element(q0 + q1))
}

/// Hashes `msg` to a scalar modulo the group order: one 48-byte chunk of
/// `expand_message_xmd` output, reduced as a big-endian integer.
pub(crate) fn hash_to_scalar(msg: &[&[u8]], dst: &[u8]) -> Result<Scalar> {
    let uniform_bytes = expand_message_xmd(msg, dst, EXPAND_LENGTH)?;
    Ok(Scalar(p256::Scalar::from_okm(GenericArray::from_slice(
        &uniform_bytes,
    ))))
}

// The Simplified SWU map, straight-line form of RFC 9380 Appendix F.2.
fn map_to_curve_simple_swu(u: &FieldElement) -> Result<ProjectivePoint> {
    let (map_a, map_b, map_z) = (map_a(), map_b(), map_z());
    let tv1 = map_z * u.square();
    let tv2 = tv1.square() + tv1;
    let tv3 = map_b * (tv2 + FieldElement::ONE);
    let tv4 = map_a * FieldElement::conditional_select(&-tv2, &map_z, tv2.is_zero());
    let tv2 = (tv3.square() + map_a * tv4.square()) * tv3;
    let tv6 = tv4.square() * tv4;
    let tv2 = tv2 + map_b * tv6;

    let (is_gx1_square, y1) = sqrt_ratio_3mod4(&tv2, &tv6);

    let x = FieldElement::conditional_select(&(tv1 * tv3), &tv3, is_gx1_square);
    let y = FieldElement::conditional_select(&(tv1 * *u * y1), &y1, is_gx1_square);
    // Fix the sign of y: sgn0(u) == sgn0(y).
    let e1 = !(u.is_odd() ^ y.is_odd());
    let y = FieldElement::conditional_select(&-y, &y, e1);

    // x / tv4; tv4 is never zero since A != 0 and both CMOV arms are nonzero.
    let tv4_inverted: FieldElement = Option::from(tv4.invert()).ok_or(Error::HashToCurve)?;
    point_from_coordinates(&(x * tv4_inverted), &y)
}

// sqrt_ratio for p = 3 (mod 4), RFC 9380 Appendix F.2.1.2. Returns
// (true, sqrt(u / v)) when u / v is square, else (false, sqrt(Z * u / v)).
fn sqrt_ratio_3mod4(u: &FieldElement, v: &FieldElement) -> (subtle::Choice, FieldElement) {
    let tv1 = v.square();
    let tv2 = *u * *v;
    let tv1 = tv1 * tv2;
    let y1 = tv1.pow_vartime(&SQRT_RATIO_C1) * tv2;
    let y2 = y1 * sqrt_ratio_c2();
    let tv3 = y1.square() * *v;
    let is_qr = tv3.ct_eq(u);
    let y = FieldElement::conditional_select(&y2, &y1, is_qr);
    (is_qr, y)
}

// Assembles an affine point from its coordinates; the sec1 decoder
// re-validates the curve equation on the way in.
fn point_from_coordinates(x: &FieldElement, y: &FieldElement) -> Result<ProjectivePoint> {
    let encoded = EncodedPoint::from_affine_coordinates(&x.to_bytes(), &y.to_bytes(), false);
    let affine: Option<AffinePoint> = Option::from(AffinePoint::from_encoded_point(&encoded));
    affine.map(ProjectivePoint::from).ok_or(Error::HashToCurve)
}
