// SPDX-License-Identifier: MIT OR Apache-2.0

//! The RFC 9497 Appendix A test vectors for the P256-SHA256 suite. Every
//! fixed-width value must bit-match the fixtures.

use crate::dleq::generate_proof_with_nonce;
use crate::group::{Element, Scalar};
use crate::server::info_tweak;
use crate::{ClientState, Mode, OprfClient, OprfServer};

const SEED: [u8; 32] = [0xa3; 32];
const KEY_INFO: &[u8] = b"test key";
const INFO: &[u8] = b"test info";

const BLIND: &str = "3338fa65ec36e0290022b48eb562889d89dbfa691d1cde91517fa222ed7ad364";
const BLIND_2: &str = "f9db001266677f62c095021db018cd8cbb55941d4073698ce45c405d1348b7b1";
const BATCH_PROOF_NONCE: &str = "350e8040f828bf6ceca27405420cdf3d63cb3aef005f40ba51943c8026877963";

struct SingleVector {
    input: &'static [u8],
    blinded_element: &'static str,
    evaluation_element: &'static str,
    output: &'static str,
}

struct BatchVector {
    inputs: [&'static [u8]; 2],
    blinds: [&'static str; 2],
    blinded_elements: [&'static str; 2],
    evaluation_elements: [&'static str; 2],
    proof: &'static str,
    outputs: [&'static str; 2],
}

fn scalar(hex: &str) -> Scalar {
    Scalar::from_bytes(&hex::decode(hex).unwrap()).unwrap()
}

// Runs one full protocol round with a fixed blind, asserting every wire
// value along the way, and returns what the deterministic prover needs.
fn run_single(
    server: &OprfServer,
    mode: Mode,
    vector: &SingleVector,
    blind: &str,
    info: Option<&[u8]>,
) -> (Element, Element) {
    let client = OprfClient::new(mode);
    let blind_result = client
        .blind_with_scalar(vector.input, scalar(blind))
        .unwrap();
    assert_eq!(
        vector.blinded_element,
        hex::encode(blind_result.message.serialize())
    );

    let mut rng = rand::rngs::OsRng;
    let evaluation = match info {
        Some(info) => server
            .evaluate_with_info(&mut rng, &blind_result.message, info)
            .unwrap(),
        None => server.evaluate(&mut rng, &blind_result.message).unwrap(),
    };
    assert_eq!(
        vector.evaluation_element,
        hex::encode(evaluation.evaluated.serialize())
    );

    let output = blind_result.state.finalize(&evaluation, info).unwrap();
    assert_eq!(vector.output, hex::encode(output));

    let blinded = Element::from_bytes(&hex::decode(vector.blinded_element).unwrap()).unwrap();
    let evaluated =
        Element::from_bytes(&hex::decode(vector.evaluation_element).unwrap()).unwrap();
    (blinded, evaluated)
}

#[test]
fn oprf_vectors() {
    let server = OprfServer::new_from_seed(Mode::Base, &SEED, KEY_INFO).unwrap();
    let vectors = [
        SingleVector {
            input: &[0x00],
            blinded_element: "03723a1e5c09b8b9c18d1dcbca29e8007e95f14f4732d9346d490ffc195110368d",
            evaluation_element:
                "030de02ffec47a1fd53efcdd1c6faf5bdc270912b8749e783c7ca75bb412958832",
            output: "a0b34de5fa4c5b6da07e72af73cc507cceeb48981b97b7285fc375345fe495dd",
        },
        SingleVector {
            input: &[0x5a; 17],
            blinded_element: "03cc1df781f1c2240a64d1c297b3f3d16262ef5d4cf102734882675c26231b0838",
            evaluation_element:
                "03a0395fe3828f2476ffcd1f4fe540e5a8489322d398be3c4e5a869db7fcb7c52c",
            output: "c748ca6dd327f0ce85f4ae3a8cd6d4d5390bbb804c9e12dcf94f853fece3dcce",
        },
    ];

    for vector in &vectors {
        run_single(&server, Mode::Base, vector, BLIND, None);
    }
}

#[test]
fn voprf_vectors() {
    let server = OprfServer::new_from_seed(Mode::Verifiable, &SEED, KEY_INFO).unwrap();
    let vectors = [
        (
            SingleVector {
                input: &[0x00][..],
                blinded_element:
                    "02dd05901038bb31a6fae01828fd8d0e49e35a486b5c5d4b4994013648c01277da",
                evaluation_element:
                    "0209f33cab60cf8fe69239b0afbcfcd261af4c1c5632624f2e9ba29b90ae83e4a2",
                output: "0412e8f78b02c415ab3a288e228978376f99927767ff37c5718d420010a645a1",
            },
            "e7c2b3c5c954c035949f1f74e6bce2ed539a3be267d1481e9ddb178533df4c26\
             64f69d065c604a4fd953e100b856ad83804eb3845189babfa5a702090d6fc5fa",
        ),
        (
            SingleVector {
                input: &[0x5a; 17][..],
                blinded_element:
                    "03cd0f033e791c4d79dfa9c6ed750f2ac009ec46cd4195ca6fd3800d1e9b887dbd",
                evaluation_element:
                    "030d2985865c693bf7af47ba4d3a3813176576383d19aff003ef7b0784a0d83cf1",
                output: "771e10dcd6bcd3664e23b8f2a710cfaaa8357747c4a8cbba03133967b5c24f18",
            },
            "2787d729c57e3d9512d3aa9e8708ad226bc48e0f1750b0767aaff73482c44b8d\
             2873d74ec88aebd3504961acea16790a05c542d9fbff4fe269a77510db00abab",
        ),
    ];

    for (vector, expected_proof) in &vectors {
        let (blinded, evaluated) = run_single(&server, Mode::Verifiable, vector, BLIND, None);

        // The per-vector proofs in the RFC use BLIND_2 as the prover nonce.
        let proof = generate_proof_with_nonce(
            Mode::Verifiable,
            server.private_key_scalar(),
            Element::generator(),
            server.public_key(),
            &[blinded],
            &[evaluated],
            scalar(BLIND_2),
        )
        .unwrap();
        assert_eq!(*expected_proof, hex::encode(proof.serialize()));
    }

    run_batch(
        &server,
        Mode::Verifiable,
        &BatchVector {
            inputs: [&[0x00], &[0x5a; 17]],
            blinds: [BLIND, BLIND_2],
            blinded_elements: [
                "02dd05901038bb31a6fae01828fd8d0e49e35a486b5c5d4b4994013648c01277da",
                "03462e9ae64cae5b83ba98a6b360d942266389ac369b923eb3d557213b1922f8ab",
            ],
            evaluation_elements: [
                "0209f33cab60cf8fe69239b0afbcfcd261af4c1c5632624f2e9ba29b90ae83e4a2",
                "02bb24f4d838414aef052a8f044a6771230ca69c0a5677540fff738dd31bb69771",
            ],
            proof: "bdcc351707d02a72ce49511c7db990566d29d6153ad6f8982fad2b435d6ce4d6\
                    0da1e6b3fa740811bde34dd4fe0aa1b5fe6600d0440c9ddee95ea7fad7a60cf2",
            outputs: [
                "0412e8f78b02c415ab3a288e228978376f99927767ff37c5718d420010a645a1",
                "771e10dcd6bcd3664e23b8f2a710cfaaa8357747c4a8cbba03133967b5c24f18",
            ],
        },
        None,
    );
}

#[test]
fn poprf_vectors() {
    let server = OprfServer::new_from_seed(Mode::Partial, &SEED, KEY_INFO).unwrap();
    let vectors = [
        (
            SingleVector {
                input: &[0x00][..],
                blinded_element:
                    "031563e127099a8f61ed51eeede05d747a8da2be329b40ba1f0db0b2bd9dd4e2c0",
                evaluation_element:
                    "02c5e5300c2d9e6ba7f3f4ad60500ad93a0157e6288eb04b67e125db024a2c74d2",
                output: "193a92520bd8fd1f37accb918040a57108daa110dc4f659abe212636d245c592",
            },
            "f8a33690b87736c854eadfcaab58a59b8d9c03b569110b6f31f8bf7577f3fbb8\
             5a8a0c38468ccde1ba942be501654adb106167c8eb178703ccb42bccffb9231a",
        ),
        (
            SingleVector {
                input: &[0x5a; 17][..],
                blinded_element:
                    "021a440ace8ca667f261c10ac7686adc66a12be31e3520fca317643a1eee9dcd4d",
                evaluation_element:
                    "0208ca109cbae44f4774fc0bdd2783efdcb868cb4523d52196f700210e777c5de3",
                output: "1e6d164cfd835d88a31401623549bf6b9b306628ef03a7962921d62bc5ffce8c",
            },
            "043a8fb7fc7fd31e35770cabda4753c5bf0ecc1e88c68d7d35a62bf2631e875a\
             f4613641be2d1875c31d1319d191c4bbc0d04875f4fd03c31d3d17dd8e069b69",
        ),
    ];

    let t = info_tweak(INFO).unwrap();
    let tweaked_key = server.private_key_scalar() + t;
    let tweaked_public_key = server.public_key() + Element::generator() * t;

    for (vector, expected_proof) in &vectors {
        let (blinded, evaluated) = run_single(&server, Mode::Partial, vector, BLIND, Some(INFO));

        // Partially-oblivious proofs swap the lists: (Ds, Cs).
        let proof = generate_proof_with_nonce(
            Mode::Partial,
            tweaked_key,
            Element::generator(),
            tweaked_public_key,
            &[evaluated],
            &[blinded],
            scalar(BLIND_2),
        )
        .unwrap();
        assert_eq!(*expected_proof, hex::encode(proof.serialize()));
    }

    run_batch(
        &server,
        Mode::Partial,
        &BatchVector {
            inputs: [&[0x00], &[0x5a; 17]],
            blinds: [BLIND, BLIND_2],
            blinded_elements: [
                "031563e127099a8f61ed51eeede05d747a8da2be329b40ba1f0db0b2bd9dd4e2c0",
                "03ca4ff41c12fadd7a0bc92cf856732b21df652e01a3abdf0fa8847da053db213c",
            ],
            evaluation_elements: [
                "02c5e5300c2d9e6ba7f3f4ad60500ad93a0157e6288eb04b67e125db024a2c74d2",
                "02f0b6bcd467343a8d8555a99dc2eed0215c71898c5edb77a3d97ddd0dbad478e8",
            ],
            proof: "8fbd85a32c13aba79db4b42e762c00687d6dbf9c8cb97b2a225645ccb00d9d75\
                    80b383c885cdfd07df448d55e06f50f6173405eee5506c0ed0851ff718d13e68",
            outputs: [
                "193a92520bd8fd1f37accb918040a57108daa110dc4f659abe212636d245c592",
                "1e6d164cfd835d88a31401623549bf6b9b306628ef03a7962921d62bc5ffce8c",
            ],
        },
        Some(INFO),
    );
}

fn run_batch(server: &OprfServer, mode: Mode, vector: &BatchVector, info: Option<&[u8]>) {
    let client = OprfClient::new(mode);
    let mut rng = rand::rngs::OsRng;

    let blind_results: Vec<_> = vector
        .inputs
        .iter()
        .zip(&vector.blinds)
        .map(|(input, blind)| client.blind_with_scalar(input, scalar(blind)).unwrap())
        .collect();
    for (blind_result, expected) in blind_results.iter().zip(&vector.blinded_elements) {
        assert_eq!(*expected, hex::encode(blind_result.message.serialize()));
    }

    let messages: Vec<_> = blind_results
        .iter()
        .map(|blind_result| blind_result.message)
        .collect();
    let results = match info {
        Some(info) => server
            .batch_evaluate_with_info(&mut rng, &messages, info)
            .unwrap(),
        None => server.batch_evaluate(&mut rng, &messages).unwrap(),
    };
    for (result, expected) in results.iter().zip(&vector.evaluation_elements) {
        assert_eq!(*expected, hex::encode(result.evaluated.serialize()));
    }

    // Regenerate the batch proof under the RFC's fixed nonce.
    let blinded: Vec<Element> = messages.iter().map(|message| message.0).collect();
    let evaluated: Vec<Element> = results.iter().map(|result| result.evaluated.0).collect();
    let (proof_key, proof_public, cs, ds) = match info {
        Some(info) => {
            let t = info_tweak(info).unwrap();
            (
                server.private_key_scalar() + t,
                server.public_key() + Element::generator() * t,
                evaluated.clone(),
                blinded.clone(),
            )
        }
        None => (
            server.private_key_scalar(),
            server.public_key(),
            blinded.clone(),
            evaluated.clone(),
        ),
    };
    let proof = generate_proof_with_nonce(
        mode,
        proof_key,
        Element::generator(),
        proof_public,
        &cs,
        &ds,
        scalar(BATCH_PROOF_NONCE),
    )
    .unwrap();
    assert_eq!(vector.proof, hex::encode(proof.serialize()));

    let states: Vec<ClientState> = blind_results
        .into_iter()
        .map(|blind_result| blind_result.state)
        .collect();
    let outputs = ClientState::batch_finalize(&states, &results, info).unwrap();
    for (output, expected) in outputs.iter().zip(&vector.outputs) {
        assert_eq!(*expected, hex::encode(output));
    }
}
