// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors which are produced during an execution of the protocol

use displaydoc::Display;

/// [`Result`](core::result::Result) shorthand that uses [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Represents an error in the manipulation of internal cryptographic data
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Error {
    /// Could not decode a group element, or it was the identity or off the curve
    Point,
    /// Could not decode a scalar, or it was out of range or zero where forbidden
    Scalar,
    /// Computing the hash-to-curve function failed
    HashToCurve,
    /// The input was longer than 65535 bytes
    Input,
    /// The info string was longer than 65535 bytes
    Info,
    /// The operation is not available in this mode
    Mode,
    /// A batch was empty, mismatched, or larger than 65535 entries
    Batch,
    /// The seed must be exactly 32 bytes
    Seed,
    /// Deriving a key pair exhausted all 256 counter values
    DeriveKeyPair,
    /// The DLEQ proof failed to verify
    ProofVerification,
    /// No key is installed under version {0}
    UnknownKeyVersion(u32),
    /// The current key version cannot be retired
    RetireCurrentKey,
}

impl std::error::Error for Error {}
