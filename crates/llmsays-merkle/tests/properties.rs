//! Merkle commitment properties.
//!
//! - roots are a pure function of the ordered leaf sequence,
//! - every generated proof replays to the root,
//! - changing a committed leaf invalidates its proof,
//! - reordering leaves changes the root.

use llmsays_crypto::Digest;
use llmsays_merkle::{compute_root, verify_proof, MerkleTree};
use proptest::prelude::*;

/// Arbitrary field elements: clear the top bits so every value is below `p`.
fn digest() -> impl Strategy<Value = Digest> {
    any::<[u8; 32]>().prop_map(|mut b| {
        b[0] &= 0x03;
        Digest::from_be_bytes(b).unwrap()
    })
}

fn leaves(max: usize) -> impl Strategy<Value = Vec<Digest>> {
    prop::collection::vec(digest(), 1..=max)
}

proptest! {
    // Pedersen is not free; keep case counts modest.
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn root_is_deterministic(l in leaves(12)) {
        let a = MerkleTree::build(&l).unwrap().root();
        let b = MerkleTree::build(&l.clone()).unwrap().root();
        prop_assert_eq!(a, b);
        prop_assert_eq!(a, compute_root(&l).unwrap());
    }

    #[test]
    fn every_proof_verifies(l in leaves(12)) {
        let tree = MerkleTree::build(&l).unwrap();
        let root = tree.root();
        for (i, leaf) in l.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            prop_assert_eq!(proof.index, i);
            prop_assert!(verify_proof(leaf, &proof, &root), "leaf {} of {}", i, l.len());
        }
    }

    #[test]
    fn flipped_leaf_bit_breaks_proof(
        l in leaves(10),
        pick in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let tree = MerkleTree::build(&l).unwrap();
        let i = pick.index(l.len());
        let proof = tree.proof(i).unwrap();

        let mut bytes = l[i].to_be_bytes();
        bytes[31] ^= 1 << bit;
        let tampered = Digest::from_be_bytes(bytes).unwrap();

        prop_assert!(!verify_proof(&tampered, &proof, &tree.root()));
    }

    #[test]
    fn out_of_range_proof_is_an_error(l in leaves(8), extra in 0usize..4) {
        let tree = MerkleTree::build(&l).unwrap();
        prop_assert!(tree.proof(l.len() + extra).is_err());
    }
}

#[test]
fn leaf_order_is_committed() {
    let a = Digest::from_hex("0x1").unwrap();
    let b = Digest::from_hex("0x2").unwrap();
    let c = Digest::from_hex("0x3").unwrap();
    // Sorted pair hashing makes siblings commute, but moving a leaf across a
    // subtree boundary must still change the root.
    let r1 = compute_root(&[a, b, c]).unwrap();
    let r2 = compute_root(&[a, c, b]).unwrap();
    assert_ne!(r1, r2);
}
