// SPDX-License-Identifier: MIT OR Apache-2.0

//! The reference client: blinding, proof verification, unblinding and
//! output derivation. This module fixes the wire contract the server is
//! evaluated against; production clients typically live elsewhere.

use rand_core::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::ciphersuite::{HASH_LENGTH, MAX_BATCH_SIZE, MAX_INFO_LENGTH, MAX_INPUT_LENGTH};
use crate::dleq::verify_proof;
use crate::group::{hash_to_curve, Element, Scalar};
use crate::server::{BlindedElement, EvaluationResult};
use crate::util::{hash_to_group_dst, length_prefixed, Mode, STR_FINALIZE};
use crate::{Error, Result};

/// The 32-byte protocol output.
pub type Output = [u8; HASH_LENGTH];

/// A client for a fixed mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OprfClient {
    mode: Mode,
}

/// Contains the fields that are returned by a client blind
#[derive(Debug)]
pub struct ClientBlindResult {
    /// The state to be persisted on the client for the final step.
    pub state: ClientState,
    /// The message to send to the server.
    pub message: BlindedElement,
}

/// Per-evaluation client state: the input, the ephemeral blind and the
/// blinded element sent to the server. The blind and input are wiped on
/// drop and withheld from `Debug` output.
#[derive(Clone)]
pub struct ClientState {
    mode: Mode,
    input: Vec<u8>,
    blind: Scalar,
    blinded_element: Element,
}

impl core::fmt::Debug for ClientState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClientState")
            .field("mode", &self.mode)
            .field("blinded_element", &self.blinded_element)
            .finish_non_exhaustive()
    }
}

impl OprfClient {
    /// Creates a client for the given mode.
    pub fn new(mode: Mode) -> Self {
        Self { mode }
    }

    /// The mode this client runs in.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Computes the first step of the protocol: hash the input to the curve
    /// and multiply by a fresh random nonzero blind.
    ///
    /// # Errors
    /// [`Error::Input`] if the input is longer than 65535 bytes.
    pub fn blind<R: RngCore + CryptoRng>(
        &self,
        input: &[u8],
        blinding_factor_rng: &mut R,
    ) -> Result<ClientBlindResult> {
        self.blind_with_scalar(input, Scalar::random(blinding_factor_rng))
    }

    // Inner function for blind that takes the blinding factor as input; the
    // deterministic path the test vectors exercise.
    pub(crate) fn blind_with_scalar(
        &self,
        input: &[u8],
        blind: Scalar,
    ) -> Result<ClientBlindResult> {
        if input.len() > MAX_INPUT_LENGTH {
            return Err(Error::Input);
        }
        let hashed_point = hash_to_curve(&[input], &hash_to_group_dst(self.mode))?;
        let blinded_element = hashed_point * blind;
        Ok(ClientBlindResult {
            state: ClientState {
                mode: self.mode,
                input: input.to_vec(),
                blind,
                blinded_element,
            },
            message: BlindedElement(blinded_element),
        })
    }
}

impl ClientState {
    /// Computes the final step of the protocol: verify the proof in
    /// verifiable modes, unblind the server's response and hash the
    /// Finalize transcript into the 32-byte output.
    ///
    /// `info` is required in partially-oblivious mode and must be absent
    /// otherwise.
    ///
    /// # Errors
    /// - [`Error::Mode`] if `info` presence does not match the mode.
    /// - [`Error::ProofVerification`] if the proof is missing or invalid.
    pub fn finalize(&self, result: &EvaluationResult, info: Option<&[u8]>) -> Result<Output> {
        let outputs = Self::batch_finalize(
            core::slice::from_ref(self),
            core::slice::from_ref(result),
            info,
        )?;
        Ok(outputs[0])
    }

    /// Finalizes a batch evaluated under a single shared proof. States and
    /// results must be in matching order.
    ///
    /// # Errors
    /// As [`finalize`](Self::finalize), plus [`Error::Batch`] for empty or
    /// mismatched slices.
    pub fn batch_finalize(
        states: &[ClientState],
        results: &[EvaluationResult],
        info: Option<&[u8]>,
    ) -> Result<Vec<Output>> {
        if states.is_empty() || states.len() != results.len() || states.len() > MAX_BATCH_SIZE {
            return Err(Error::Batch);
        }
        let mode = states[0].mode;
        if states.iter().any(|state| state.mode != mode) {
            return Err(Error::Mode);
        }
        match (mode, info) {
            (Mode::Partial, None) => return Err(Error::Mode),
            (Mode::Base | Mode::Verifiable, Some(_)) => return Err(Error::Mode),
            _ => {}
        }
        if info.is_some_and(|info| info.len() > MAX_INFO_LENGTH) {
            return Err(Error::Info);
        }

        if mode.is_verifiable() {
            let proof = results[0]
                .proof
                .as_ref()
                .ok_or(Error::ProofVerification)?;
            let public_key = results[0].public_key;

            let blinded: Vec<Element> = states.iter().map(|state| state.blinded_element).collect();
            let evaluated: Vec<Element> = results.iter().map(|result| result.evaluated.0).collect();
            // Partially-oblivious proofs are formed over (Ds, Cs); see the
            // server's key preparation.
            let (cs, ds) = match mode {
                Mode::Partial => (&evaluated, &blinded),
                _ => (&blinded, &evaluated),
            };
            if !verify_proof(mode, Element::generator(), public_key, cs, ds, proof) {
                return Err(Error::ProofVerification);
            }
        }

        states
            .iter()
            .zip(results)
            .map(|(state, result)| {
                let unblinded_element = result.evaluated.0 * state.blind.invert()?;
                finalize_after_unblind(mode, &state.input, info, &unblinded_element)
            })
            .collect()
    }

}

impl Drop for ClientState {
    fn drop(&mut self) {
        self.blind.zeroize();
        self.input.zeroize();
    }
}

// hashInput = I2OSP(len(input), 2) || input ||
//             [I2OSP(len(info), 2) || info ||]     (partial mode only)
//             I2OSP(len(unblindedElement), 2) || unblindedElement ||
//             "Finalize"
fn finalize_after_unblind(
    mode: Mode,
    input: &[u8],
    info: Option<&[u8]>,
    unblinded_element: &Element,
) -> Result<Output> {
    let mut hash_input = length_prefixed(input)?;
    if let (Mode::Partial, Some(info)) = (mode, info) {
        hash_input.extend_from_slice(&length_prefixed(info)?);
    }
    hash_input.extend_from_slice(&length_prefixed(&unblinded_element.to_bytes())?);
    hash_input.extend_from_slice(STR_FINALIZE);

    let mut output = [0; HASH_LENGTH];
    output.copy_from_slice(&Sha256::digest(&hash_input));
    Ok(output)
}

///////////
// Tests //
// ===== //
///////////
