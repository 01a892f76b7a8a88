// SPDX-License-Identifier: MIT OR Apache-2.0

//! A server-side engine for the oblivious pseudorandom function protocol of
//! [RFC 9497](https://www.rfc-editor.org/rfc/rfc9497), fixed to the
//! `P256-SHA256` ciphersuite (suite identifier `0x0003`), with a versioned
//! key manager for online key rotation.
//!
//! # Overview
//!
//! An oblivious pseudorandom function (OPRF) is a protocol evaluated between
//! a client and a server. The client holds a sensitive input and obtains a
//! deterministic 32-byte output that depends only on that input and the
//! server's secret key; the server learns nothing about the input. Three
//! modes are supported, selected by [`Mode`]:
//!
//! - [`Mode::Base`]: a plain OPRF evaluation with no proof.
//! - [`Mode::Verifiable`]: the server additionally produces a DLEQ proof
//!   that it evaluated under the key matching its published public key.
//! - [`Mode::Partial`]: a public info string participates in the output,
//!   and the proof covers the correspondingly tweaked key.
//!
//! In every mode the protocol begins with a client blinding, followed by a
//! server evaluation, and finishes with a client finalization.
//!
//! # Server evaluation
//!
//! The server is constructed once and reused for online evaluations:
//!
//! ```
//! use oprf_engine::{Mode, OprfClient, OprfServer};
//! use rand::rngs::OsRng;
//!
//! let mut rng = OsRng;
//! let server = OprfServer::new(Mode::Verifiable, &mut rng);
//!
//! // The client blinds its input and sends the 33-byte message across.
//! let client = OprfClient::new(Mode::Verifiable);
//! let blind_result = client.blind(b"alice@example.org", &mut rng)?;
//! let wire = blind_result.message.serialize();
//!
//! // The server evaluates the blinded element and returns the evaluated
//! // element, a proof, and its public key.
//! let blinded = oprf_engine::BlindedElement::deserialize(&wire)?;
//! let evaluation = server.evaluate(&mut rng, &blinded)?;
//!
//! // The client verifies the proof, unblinds, and derives the output.
//! let output = blind_result.state.finalize(&evaluation, None)?;
//! assert_eq!(output.len(), 32);
//! # Ok::<(), oprf_engine::Error>(())
//! ```
//!
//! Partially-oblivious evaluations take the info string on both sides:
//!
//! ```
//! use oprf_engine::{Mode, OprfClient, OprfServer};
//! use rand::rngs::OsRng;
//!
//! let mut rng = OsRng;
//! let server = OprfServer::new(Mode::Partial, &mut rng);
//! let client = OprfClient::new(Mode::Partial);
//!
//! let blind_result = client.blind(b"alice@example.org", &mut rng)?;
//! let evaluation = server.evaluate_with_info(&mut rng, &blind_result.message, b"app-v2")?;
//! let output = blind_result.state.finalize(&evaluation, Some(b"app-v2"))?;
//! # Ok::<(), oprf_engine::Error>(())
//! ```
//!
//! # Batching
//!
//! In the verifiable modes a single constant-size proof can cover any number
//! of evaluations (up to 65535). [`OprfServer::batch_evaluate`] attaches the
//! same proof to every result, and [`ClientState::batch_finalize`] checks it
//! once for the whole batch.
//!
//! # Key rotation
//!
//! [`KeyManager`] holds multiple key generations so tokens derived before a
//! rotation stay resolvable while clients migrate:
//!
//! ```
//! use oprf_engine::{KeyManager, Mode};
//! use rand::rngs::OsRng;
//!
//! let mut rng = OsRng;
//! let manager = KeyManager::new(Mode::Verifiable, &mut rng);
//! assert_eq!(manager.current_version(), 1);
//!
//! let new_version = manager.rotate(&mut rng);
//! assert_eq!(new_version, 2);
//!
//! // Old generations remain available until retired.
//! let old_server = manager.server(1).expect("version 1 still installed");
//! manager.retire(1)?;
//! // The held handle keeps working; the key is freed when it drops.
//! assert_eq!(old_server.mode(), Mode::Verifiable);
//! # Ok::<(), oprf_engine::Error>(())
//! ```
//!
//! Rotation is serialized internally and atomically replaces the current
//! snapshot; evaluations and lookups run lock-free of one another and may
//! proceed in parallel with a rotation.
//!
//! # Wire contract
//!
//! All byte-level interfaces are fixed: public keys and group elements are
//! 33-byte SEC1 compressed encodings that never name the identity, private
//! keys are 32-byte big-endian scalars in `[1, n)`, proofs are 64 bytes
//! (`c || s`), and protocol outputs are 32 bytes. Decoding enforces these
//! invariants at every boundary.

#![deny(unsafe_code)]
#![warn(clippy::cargo, clippy::missing_errors_doc, missing_docs)]
#![allow(clippy::multiple_crate_versions)]

pub mod ciphersuite;
mod client;
mod dleq;
mod error;
mod group;
mod keypair;
mod manager;
mod server;
mod util;

#[cfg(test)]
mod tests;

// Exports

pub use crate::client::{ClientBlindResult, ClientState, OprfClient, Output};
pub use crate::dleq::{verify_proof, Proof};
pub use crate::error::{Error, Result};
pub use crate::group::{Element, Scalar};
pub use crate::keypair::KeyPair;
pub use crate::manager::{CurrentKey, KeyManager, KeyMetadata};
pub use crate::server::{BlindedElement, EvaluationElement, EvaluationResult, OprfServer};
pub use crate::util::Mode;
