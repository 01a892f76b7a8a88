// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed parameters of the P256-SHA256 ciphersuite (RFC 9497 Section 4.3)

/// The suite identifier registered for P-256 with SHA-256.
pub const SUITE_ID: u16 = 0x0003;

/// The suite name used in context strings.
pub const SUITE_NAME: &str = "P256-SHA256";

/// Byte length of a serialized scalar (`Ns`).
pub const SCALAR_LENGTH: usize = 32;

/// Byte length of a serialized group element in SEC1 compressed form (`Noe`).
pub const ELEMENT_LENGTH: usize = 33;

/// Output length of the suite hash, SHA-256 (`Nh`).
pub const HASH_LENGTH: usize = 32;

/// Byte length of each `hash_to_field` chunk, `L = 48` for P-256.
pub const EXPAND_LENGTH: usize = 48;

/// Byte length of a serialized DLEQ proof (`c || s`).
pub const PROOF_LENGTH: usize = 2 * SCALAR_LENGTH;

/// Required byte length of a key-derivation seed.
pub const SEED_LENGTH: usize = 32;

/// Largest number of blinded elements a single proof can cover.
pub const MAX_BATCH_SIZE: usize = u16::MAX as usize;

/// Largest info string accepted in partially-oblivious mode.
pub const MAX_INFO_LENGTH: usize = u16::MAX as usize;

/// Largest client input that fits the two-byte length prefix.
pub const MAX_INPUT_LENGTH: usize = u16::MAX as usize;
