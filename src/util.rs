// SPDX-License-Identifier: MIT OR Apache-2.0

//! Protocol modes, domain-separation tags and transcript helpers

use crate::ciphersuite::SUITE_NAME;
use crate::{Error, Result};

///////////////
// Constants //
// ========= //
///////////////

pub(crate) static STR_OPRF: &[u8] = b"OPRFV1-";
pub(crate) static STR_HASH_TO_GROUP: &[u8] = b"HashToGroup-";
pub(crate) static STR_HASH_TO_SCALAR: &[u8] = b"HashToScalar-";
pub(crate) static STR_DERIVE_KEYPAIR: &[u8] = b"DeriveKeyPair";
pub(crate) static STR_SEED: &[u8] = b"Seed-";
// These four labels are fixed by RFC 9497 and carry no context string.
pub(crate) static STR_COMPOSITE: &[u8] = b"Composite";
pub(crate) static STR_CHALLENGE: &[u8] = b"Challenge";
pub(crate) static STR_FINALIZE: &[u8] = b"Finalize";
pub(crate) static STR_INFO: &[u8] = b"Info";

/// Determines the mode of operation (base, verifiable or partially
/// oblivious), as defined in RFC 9497 Section 3.1.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Mode {
    /// Base mode (`modeOPRF`): the client learns `F(k, x)` and the server
    /// learns nothing about `x`.
    Base,
    /// Verifiable mode (`modeVOPRF`): like [`Mode::Base`], but the server
    /// proves it evaluated under the claimed key.
    Verifiable,
    /// Partially-oblivious mode (`modePOPRF`): a public info string
    /// participates in the output, `F(k, x, info)`.
    Partial,
}

impl Mode {
    /// The mode identifier byte mixed into every context string.
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Base => 0x00,
            Self::Verifiable => 0x01,
            Self::Partial => 0x02,
        }
    }

    /// Whether evaluations in this mode carry a DLEQ proof.
    pub fn is_verifiable(self) -> bool {
        matches!(self, Self::Verifiable | Self::Partial)
    }
}

/////////////////////
// Context strings //
// =============== //
/////////////////////

/// Generates the contextString parameter as defined in RFC 9497:
/// `"OPRFV1-" || I2OSP(mode, 1) || "-" || identifier`.
pub(crate) fn create_context_string(mode: Mode) -> Vec<u8> {
    [STR_OPRF, &[mode.to_u8()], b"-", SUITE_NAME.as_bytes()].concat()
}

pub(crate) fn hash_to_group_dst(mode: Mode) -> Vec<u8> {
    [STR_HASH_TO_GROUP, &create_context_string(mode)].concat()
}

pub(crate) fn hash_to_scalar_dst(mode: Mode) -> Vec<u8> {
    [STR_HASH_TO_SCALAR, &create_context_string(mode)].concat()
}

pub(crate) fn derive_keypair_dst(mode: Mode) -> Vec<u8> {
    [STR_DERIVE_KEYPAIR, &create_context_string(mode)].concat()
}

pub(crate) fn seed_dst(mode: Mode) -> Vec<u8> {
    [STR_SEED, &create_context_string(mode)].concat()
}

///////////////////
// Serialization //
// ============= //
///////////////////

// Corresponds to the I2OSP() function from RFC 8017
pub(crate) fn i2osp_1(input: usize) -> Result<[u8; 1]> {
    u8::try_from(input)
        .map(|value| [value])
        .map_err(|_| Error::Input)
}

pub(crate) fn i2osp_2(input: usize) -> Result<[u8; 2]> {
    u16::try_from(input)
        .map(u16::to_be_bytes)
        .map_err(|_| Error::Input)
}

// Computes I2OSP(len(input), 2) || input, the framing used for every field
// hashed into a transcript.
pub(crate) fn length_prefixed(input: &[u8]) -> Result<Vec<u8>> {
    Ok([&i2osp_2(input.len())?[..], input].concat())
}

///////////
// Tests //
// ===== //
///////////
