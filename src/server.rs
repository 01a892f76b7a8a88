// SPDX-License-Identifier: MIT OR Apache-2.0

//! The server side of the protocol: the BlindEvaluate operation over
//! blinded client inputs, in all three modes

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::ciphersuite::{ELEMENT_LENGTH, MAX_BATCH_SIZE, MAX_INFO_LENGTH, SCALAR_LENGTH};
use crate::dleq::{self, Proof};
use crate::group::{hash_to_scalar, Element, Scalar};
use crate::keypair::KeyPair;
use crate::util::{hash_to_scalar_dst, i2osp_2, Mode, STR_INFO};
use crate::{Error, Result};

/////////////////////
// Wire structures //
// =============== //
/////////////////////

/// The first message of the protocol: a client input hashed to the curve and
/// multiplied by an ephemeral blind. Never the identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BlindedElement(pub(crate) Element);

/// The server's response element `evaluationScalar * blindedElement`.
/// Never the identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EvaluationElement(pub(crate) Element);

macro_rules! impl_wire_element {
    ($name:ident) => {
        impl $name {
            /// Serialization into bytes
            pub fn serialize(&self) -> [u8; ELEMENT_LENGTH] {
                self.0.to_bytes()
            }

            /// Deserialization from bytes
            ///
            /// # Errors
            /// [`Error::Point`] if the input is not a 33-byte SEC1 compressed
            /// encoding of a non-identity curve point.
            pub fn deserialize(input: &[u8]) -> Result<Self> {
                Element::from_bytes(input).map(Self)
            }
        }
    };
}

impl_wire_element!(BlindedElement);
impl_wire_element!(EvaluationElement);

/// One entry of a server response: the evaluated element, the DLEQ proof in
/// verifiable modes (shared across a batch), and the public key the proof
/// verifies against (the tweaked key in partially-oblivious mode).
#[derive(Clone, Copy, Debug)]
pub struct EvaluationResult {
    /// The evaluated element to return to the client.
    pub evaluated: EvaluationElement,
    /// The DLEQ proof; `None` in base mode.
    pub proof: Option<Proof>,
    /// The key the client verifies the proof against.
    pub public_key: Element,
}

////////////
// Server //
// ====== //
////////////

/// An OPRF server for a fixed mode and key pair.
///
/// The server never learns the client's input: it sees only blinded curve
/// points, multiplies them by its (possibly tweaked) secret, and in the
/// verifiable modes proves that it used the claimed key.
#[derive(Clone, Debug)]
pub struct OprfServer {
    mode: Mode,
    key_pair: KeyPair,
}

impl OprfServer {
    /// Produces a new server with a freshly generated random key.
    pub fn new<R: RngCore + CryptoRng>(mode: Mode, rng: &mut R) -> Self {
        Self {
            mode,
            key_pair: KeyPair::generate(rng),
        }
    }

    /// Produces a server from an existing 32-byte private key.
    ///
    /// # Errors
    /// [`Error::Scalar`] if the bytes are not a canonical nonzero scalar.
    pub fn new_with_key(mode: Mode, private_key: &[u8]) -> Result<Self> {
        Ok(Self {
            mode,
            key_pair: KeyPair::from_private_key_bytes(private_key)?,
        })
    }

    /// Produces a server with a key derived from a seed and info string.
    ///
    /// Corresponds to the DeriveKeyPair() function from RFC 9497.
    ///
    /// # Errors
    /// See [`KeyPair::derive`].
    pub fn new_from_seed(mode: Mode, seed: &[u8], info: &[u8]) -> Result<Self> {
        Ok(Self {
            mode,
            key_pair: KeyPair::derive(mode, seed, info)?,
        })
    }

    /// The mode this server evaluates under.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The server's public key.
    pub fn public_key(&self) -> Element {
        self.key_pair.public_key()
    }

    /// The server's public key in SEC1 compressed form (33 bytes).
    pub fn export_public_key(&self) -> [u8; ELEMENT_LENGTH] {
        self.key_pair.export_public_key()
    }

    /// The server's private key (32 bytes). The returned buffer is a fresh
    /// copy and wipes itself when dropped. Handle with care.
    pub fn export_private_key(&self) -> Zeroizing<[u8; SCALAR_LENGTH]> {
        self.key_pair.export_private_key()
    }

    // Only used by the vector tests, which regenerate proofs with the
    // RFC's fixed nonces.
    #[cfg(test)]
    pub(crate) fn private_key_scalar(&self) -> Scalar {
        self.key_pair.private_key()
    }

    /// Evaluates a single blinded element. Available in base and verifiable
    /// modes; partially-oblivious servers must supply an info string through
    /// [`evaluate_with_info`](Self::evaluate_with_info).
    ///
    /// # Errors
    /// - [`Error::Mode`] in partially-oblivious mode.
    /// - [`Error::Point`] if the blinded element is the identity.
    pub fn evaluate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        blinded_element: &BlindedElement,
    ) -> Result<EvaluationResult> {
        let mut results = self.batch_evaluate(rng, core::slice::from_ref(blinded_element))?;
        Ok(results.swap_remove(0))
    }

    /// Evaluates a single blinded element under a public info string.
    /// Only available in partially-oblivious mode.
    ///
    /// # Errors
    /// - [`Error::Mode`] outside partially-oblivious mode.
    /// - [`Error::Info`] if `info` exceeds 65535 bytes.
    /// - [`Error::Scalar`] if the tweaked key `sk + t` is zero.
    pub fn evaluate_with_info<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        blinded_element: &BlindedElement,
        info: &[u8],
    ) -> Result<EvaluationResult> {
        let mut results =
            self.batch_evaluate_with_info(rng, core::slice::from_ref(blinded_element), info)?;
        Ok(results.swap_remove(0))
    }

    /// Evaluates a batch of blinded elements. In verifiable mode a single
    /// proof covers the whole batch and is attached to every result entry.
    ///
    /// # Errors
    /// - [`Error::Mode`] in partially-oblivious mode.
    /// - [`Error::Batch`] for an empty batch or more than 65535 entries.
    pub fn batch_evaluate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        blinded_elements: &[BlindedElement],
    ) -> Result<Vec<EvaluationResult>> {
        if self.mode == Mode::Partial {
            return Err(Error::Mode);
        }
        self.evaluate_inner(rng, blinded_elements, None)
    }

    /// Evaluates a batch of blinded elements under a public info string.
    /// Only available in partially-oblivious mode.
    ///
    /// # Errors
    /// As [`evaluate_with_info`](Self::evaluate_with_info), plus
    /// [`Error::Batch`] for an empty or oversized batch.
    pub fn batch_evaluate_with_info<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        blinded_elements: &[BlindedElement],
        info: &[u8],
    ) -> Result<Vec<EvaluationResult>> {
        if self.mode != Mode::Partial {
            return Err(Error::Mode);
        }
        self.evaluate_inner(rng, blinded_elements, Some(info))
    }

    fn evaluate_inner<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
        blinded_elements: &[BlindedElement],
        info: Option<&[u8]>,
    ) -> Result<Vec<EvaluationResult>> {
        if blinded_elements.is_empty() || blinded_elements.len() > MAX_BATCH_SIZE {
            return Err(Error::Batch);
        }
        for blinded_element in blinded_elements {
            if blinded_element.0.is_identity() {
                return Err(Error::Point);
            }
        }

        let sk = self.key_pair.private_key();
        let pk = self.key_pair.public_key();

        // Mode-specific key preparation. In partially-oblivious mode the
        // evaluation uses the inverse of the tweaked key, and the proof is
        // formed over the tweaked key pair.
        let (evaluation_scalar, proof_scalar, proof_key) = match info {
            Some(info) => {
                let t = info_tweak(info)?;
                let tweaked_key = sk + t;
                if tweaked_key.is_zero() {
                    return Err(Error::Scalar);
                }
                (
                    tweaked_key.invert()?,
                    tweaked_key,
                    pk + Element::generator() * t,
                )
            }
            None => (sk, sk, pk),
        };

        let evaluated: Vec<Element> = blinded_elements
            .iter()
            .map(|blinded_element| blinded_element.0 * evaluation_scalar)
            .collect();
        for element in &evaluated {
            if element.is_identity() {
                return Err(Error::Point);
            }
        }

        let proof = if self.mode.is_verifiable() {
            let blinded: Vec<Element> = blinded_elements
                .iter()
                .map(|blinded_element| blinded_element.0)
                .collect();
            // In partially-oblivious mode the proved scalar is the inverse of
            // the evaluation scalar, so the (Cs, Ds) lists swap places.
            let (cs, ds) = match self.mode {
                Mode::Partial => (&evaluated, &blinded),
                _ => (&blinded, &evaluated),
            };
            Some(dleq::generate_proof(
                self.mode,
                rng,
                proof_scalar,
                Element::generator(),
                proof_key,
                cs,
                ds,
            )?)
        } else {
            None
        };

        Ok(evaluated
            .into_iter()
            .map(|element| EvaluationResult {
                evaluated: EvaluationElement(element),
                proof,
                public_key: proof_key,
            })
            .collect())
    }
}

// framedInfo = "Info" || I2OSP(len(info), 2) || info;
// t = G.HashToScalar(framedInfo)
pub(crate) fn info_tweak(info: &[u8]) -> Result<Scalar> {
    if info.len() > MAX_INFO_LENGTH {
        return Err(Error::Info);
    }
    let framed_info = [STR_INFO, &i2osp_2(info.len())?[..], info].concat();
    hash_to_scalar(&[&framed_info], &hash_to_scalar_dst(Mode::Partial))
}

///////////
// Tests //
// ===== //
///////////

#[cfg(test)]
mod tests {
    use rand::rngs::OsRng;

    use super::*;
    use crate::dleq::verify_proof;
    use crate::util::hash_to_group_dst;

    fn blind(mode: Mode, input: &[u8]) -> BlindedElement {
        let hashed = crate::group::hash_to_curve(&[input], &hash_to_group_dst(mode)).unwrap();
        BlindedElement(hashed * Scalar::random(&mut OsRng))
    }

    #[test]
    fn base_mode_emits_no_proof() {
        let mut rng = OsRng;
        let server = OprfServer::new(Mode::Base, &mut rng);
        let result = server.evaluate(&mut rng, &blind(Mode::Base, b"input")).unwrap();
        assert!(result.proof.is_none());
        assert_eq!(result.public_key, server.public_key());
    }

    #[test]
    fn verifiable_mode_proof_checks_out() {
        let mut rng = OsRng;
        let server = OprfServer::new(Mode::Verifiable, &mut rng);
        let blinded = blind(Mode::Verifiable, b"input");
        let result = server.evaluate(&mut rng, &blinded).unwrap();

        let proof = result.proof.unwrap();
        assert!(verify_proof(
            Mode::Verifiable,
            Element::generator(),
            server.public_key(),
            &[blinded.0],
            &[result.evaluated.0],
            &proof
        ));
    }

    #[test]
    fn batch_shares_one_proof() {
        let mut rng = OsRng;
        let server = OprfServer::new(Mode::Verifiable, &mut rng);
        let blinded: Vec<BlindedElement> = (0..4)
            .map(|i| blind(Mode::Verifiable, &[i as u8]))
            .collect();
        let results = server.batch_evaluate(&mut rng, &blinded).unwrap();

        assert_eq!(results.len(), 4);
        let first = results[0].proof.unwrap();
        assert!(results.iter().all(|result| result.proof == Some(first)));

        let cs: Vec<Element> = blinded.iter().map(|blinded| blinded.0).collect();
        let ds: Vec<Element> = results.iter().map(|result| result.evaluated.0).collect();
        assert!(verify_proof(
            Mode::Verifiable,
            Element::generator(),
            server.public_key(),
            &cs,
            &ds,
            &first
        ));
    }

    #[test]
    fn partial_mode_tweaks_the_public_key() {
        let mut rng = OsRng;
        let server = OprfServer::new(Mode::Partial, &mut rng);
        let blinded = blind(Mode::Partial, b"input");
        let result = server
            .evaluate_with_info(&mut rng, &blinded, b"info")
            .unwrap();

        let t = info_tweak(b"info").unwrap();
        assert_eq!(
            result.public_key,
            server.public_key() + Element::generator() * t
        );

        // The proof is over (Ds, Cs), i.e. swapped.
        assert!(verify_proof(
            Mode::Partial,
            Element::generator(),
            result.public_key,
            &[result.evaluated.0],
            &[blinded.0],
            &result.proof.unwrap()
        ));
    }

    #[test]
    fn info_rules_per_mode() {
        let mut rng = OsRng;
        let base = OprfServer::new(Mode::Base, &mut rng);
        let partial = OprfServer::new(Mode::Partial, &mut rng);
        let blinded = blind(Mode::Base, b"input");

        assert!(matches!(
            partial.evaluate(&mut rng, &blinded),
            Err(Error::Mode)
        ));
        assert!(matches!(
            base.evaluate_with_info(&mut rng, &blinded, b"info"),
            Err(Error::Mode)
        ));
        let oversized = vec![0; MAX_INFO_LENGTH + 1];
        assert!(matches!(
            partial.evaluate_with_info(&mut rng, &blinded, &oversized),
            Err(Error::Info)
        ));
    }

    #[test]
    fn batch_limits() {
        let mut rng = OsRng;
        let server = OprfServer::new(Mode::Verifiable, &mut rng);
        assert!(matches!(
            server.batch_evaluate(&mut rng, &[]),
            Err(Error::Batch)
        ));

        let oversized = vec![blind(Mode::Verifiable, b"input"); MAX_BATCH_SIZE + 1];
        assert!(matches!(
            server.batch_evaluate(&mut rng, &oversized),
            Err(Error::Batch)
        ));
    }

    #[test]
    fn changing_info_changes_the_evaluation() {
        let mut rng = OsRng;
        let server = OprfServer::new(Mode::Partial, &mut rng);
        let blinded = blind(Mode::Partial, b"input");

        let one = server
            .evaluate_with_info(&mut rng, &blinded, b"info-1")
            .unwrap();
        let two = server
            .evaluate_with_info(&mut rng, &blinded, b"info-2")
            .unwrap();
        assert_ne!(one.evaluated, two.evaluated);
        assert_ne!(one.public_key, two.public_key);
    }
}
