// crates/llmsays-merkle/src/lib.rs

//! Merkle commitment over ordered fragment digests.
//!
//! - Node hash: [`CommitmentHasher::hash_pair`] (sorted Pedersen for Starknet).
//! - Odd levels: the unpaired last node is hashed with [`Digest::ZERO`]. This
//!   is part of the commitment format; changing it changes every odd-length
//!   root.
//! - A single leaf is its own root.
//! - Proofs carry `(sibling, side)` steps bottom→top and verify from the leaf
//!   alone, without the tree.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

/// JSON/CBOR file codec.
pub mod io;
/// Commitment manifests and their JSON/CBOR I/O.
pub mod manifest;

pub use manifest::{
    commit_fragments, read_manifest_auto, validate_fragments_against_manifest, validate_manifest,
    write_manifest_auto, CommitManifest, MANIFEST_VERSION,
};

use llmsays_crypto::{CommitmentHasher, Digest, StarknetHasher};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structural errors; both are malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// No leaves to commit to.
    #[error("cannot build a Merkle tree from zero leaves")]
    EmptyInput,
    /// Requested leaf does not exist.
    #[error("leaf index {index} out of range for {len} leaves")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of leaves in the tree.
        len: usize,
    },
}

/// Which side of the running node a sibling sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sibling is the left child; the running node is on the right.
    Left,
    /// Sibling is the right child (or the zero pad).
    Right,
}

/// One level of an inclusion proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    /// Digest to combine with.
    pub sibling: Digest,
    /// Position of `sibling` relative to the running node.
    pub side: Side,
}

/// Inclusion proof: leaf index plus siblings bottom→top.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Index of the proven leaf.
    pub index: usize,
    /// Steps from the leaf level up to (excluding) the root.
    pub steps: Vec<ProofStep>,
}

impl MerkleProof {
    /// Replay the proof from `leaf` with an explicit hasher.
    #[must_use]
    pub fn verify_with<H: CommitmentHasher>(
        &self,
        hasher: &H,
        leaf: &Digest,
        expected_root: &Digest,
    ) -> bool {
        let computed = self.steps.iter().fold(*leaf, |cur, step| match step.side {
            Side::Left => hasher.hash_pair(&step.sibling, &cur),
            Side::Right => hasher.hash_pair(&cur, &step.sibling),
        });
        computed == *expected_root
    }

    /// Sibling digests, bottom→top.
    pub fn siblings(&self) -> impl Iterator<Item = &Digest> + '_ {
        self.steps.iter().map(|s| &s.sibling)
    }
}

/// Replay `proof` from `leaf` with the Starknet hasher.
#[must_use]
pub fn verify_proof(leaf: &Digest, proof: &MerkleProof, expected_root: &Digest) -> bool {
    proof.verify_with(&StarknetHasher, leaf, expected_root)
}

/// Binary Merkle tree retaining every level.
#[derive(Clone, Debug)]
pub struct MerkleTree<H = StarknetHasher> {
    hasher: H,
    levels: Vec<Vec<Digest>>, // levels[0] = leaves, last level = [root]
    root: Digest,
}

impl MerkleTree<StarknetHasher> {
    /// Build over `leaves` with the Starknet hasher.
    pub fn build(leaves: &[Digest]) -> Result<Self, MerkleError> {
        Self::build_with(StarknetHasher, leaves)
    }
}

impl<H: CommitmentHasher> MerkleTree<H> {
    /// Build over `leaves` with an explicit hasher.
    pub fn build_with(hasher: H, leaves: &[Digest]) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }
        let mut levels = vec![leaves.to_vec()];
        let mut cur = leaves.to_vec();
        while cur.len() > 1 {
            cur = parent_level(&hasher, &cur);
            levels.push(cur.clone());
        }
        Ok(Self {
            hasher,
            levels,
            root: cur[0],
        })
    }

    /// Root digest.
    #[inline]
    #[must_use]
    pub const fn root(&self) -> Digest {
        self.root
    }

    /// Committed leaves in order.
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> &[Digest] {
        &self.levels[0]
    }

    /// Number of hashing levels above the leaves.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        let len = self.levels[0].len();
        if index >= len {
            return Err(MerkleError::IndexOutOfRange { index, len });
        }

        let mut steps = Vec::with_capacity(self.depth());
        let mut idx = index;
        for level in &self.levels[..self.depth()] {
            let step = if idx % 2 == 0 {
                ProofStep {
                    sibling: level.get(idx + 1).copied().unwrap_or(Digest::ZERO),
                    side: Side::Right,
                }
            } else {
                ProofStep {
                    sibling: level[idx - 1],
                    side: Side::Left,
                }
            };
            steps.push(step);
            idx /= 2;
        }
        Ok(MerkleProof { index, steps })
    }

    /// Replay `proof` with this tree's hasher against its root.
    #[must_use]
    pub fn verify(&self, leaf: &Digest, proof: &MerkleProof) -> bool {
        proof.verify_with(&self.hasher, leaf, &self.root)
    }
}

/// Root of `leaves` without retaining levels.
pub fn compute_root(leaves: &[Digest]) -> Result<Digest, MerkleError> {
    compute_root_with(&StarknetHasher, leaves)
}

/// [`compute_root`] with an explicit hasher.
pub fn compute_root_with<H: CommitmentHasher>(
    hasher: &H,
    leaves: &[Digest],
) -> Result<Digest, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::EmptyInput);
    }
    let mut cur = leaves.to_vec();
    while cur.len() > 1 {
        cur = parent_level(hasher, &cur);
    }
    Ok(cur[0])
}

fn parent_level<H: CommitmentHasher>(hasher: &H, level: &[Digest]) -> Vec<Digest> {
    level
        .chunks(2)
        .map(|pair| {
            // Pad an unpaired last node with zero.
            let right = pair.get(1).unwrap_or(&Digest::ZERO);
            hasher.hash_pair(&pair[0], right)
        })
        .collect()
}
