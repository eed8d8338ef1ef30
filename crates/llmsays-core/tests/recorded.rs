//! Decoding a reply recorded from the attestation service (nested layout).

#![allow(clippy::unwrap_used)]

use llmsays_core::io::read_outcome;
use llmsays_core::prelude::*;
use llmsays_core::MerkleTree;
use llmsays_crypto::hash_fragment;
use std::path::PathBuf;

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/recorded_legacy.json")
}

fn recorded() -> ResponseEnvelope {
    read_outcome(fixture()).unwrap().into_envelope().unwrap()
}

#[test]
fn recorded_reply_decodes() {
    let env = recorded();
    assert_eq!(env.thinking().len(), 7);
    assert_eq!(env.response(), ["SWAP|ETH|1|USDC"]);
    assert_eq!(env.leaves().len(), 4);
    assert_eq!(env.leaf_order(), LeafOrder::ResponseFirst);
    assert_eq!(
        env.root(),
        Digest::from_hex("0x5a39f5bf3371b170cf4d1ffe90823ac771e05f174615c6efb1f5bf1c0dc4f2d").unwrap()
    );
}

#[test]
fn recorded_response_is_the_first_leaf() {
    let env = recorded();
    assert_eq!(hash_fragment(&env.response()[0]), env.leaves()[0]);
    assert_eq!(env.response_index(0), Some(0));
    assert_eq!(env.fragment(0), Some("SWAP|ETH|1|USDC"));
}

#[test]
fn recorded_leaves_rebuild_the_claimed_root() {
    let env = recorded();
    assert_eq!(MerkleTree::build(env.leaves()).unwrap().root(), env.root());
}

#[test]
fn recorded_signature_verifies_under_default_key() {
    let env = recorded();
    let report = Verifier::default().origin_verify(&env).unwrap();
    assert_eq!(report.root, env.root());
    assert!(report.valid, "{:?}", report.failure);
    assert_eq!(report.failure, None);
}

#[test]
fn recorded_reply_verifies_end_to_end() {
    let env = recorded();
    let idx = env.response_index(0).unwrap();
    let report = Verifier::default().verify(&env, idx).unwrap();
    assert!(report.is_valid(), "{:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.response.index, 0);
    assert_eq!(report.response.proof_verifies, Some(true));
}

#[test]
fn recorded_thinking_fragments_are_not_recommitted() {
    // Only the response is among the leaves; the other three leaves do not
    // belong to any thinking fragment.
    let env = recorded();
    let leaves = env.leaves();
    for t in env.thinking() {
        assert!(!leaves.contains(&hash_fragment(t)), "{t:?}");
    }

    let report = Verifier::default().response_verify(&env, 1).unwrap();
    assert!(report.root_matches);
    assert!(!report.fragment_matches);
    assert!(matches!(
        report.failures.as_slice(),
        [Failure::RecommitmentMismatch { index: 1, .. }]
    ));

    assert!(matches!(
        Verifier::default().response_verify(&env, 4),
        Err(VerifyError::IndexOutOfRange {
            index: 4,
            leaves: 4,
            fragments: 8
        })
    ));
}

#[test]
fn recorded_reply_reserializes_in_its_own_layout() {
    let env = recorded();
    let json = serde_json::to_value(VerificationOutcome::Success(env.clone())).unwrap();
    assert!(json.get("merkle_tree").is_some());
    assert!(json.get("heuristics").is_none());
    let back = ResponseEnvelope::from_json(&serde_json::to_vec(&json).unwrap()).unwrap();
    assert_eq!(back, env);
    assert_eq!(back.response_index(0), Some(0));
}
