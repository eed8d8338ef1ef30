//! Commitment manifests: the leaves and root an attestor signs over.
//!
//! - [`commit_fragments`] hashes fragment text into leaves and derives the root.
//! - [`validate_manifest`] / [`validate_fragments_against_manifest`] recompute
//!   and compare.
//! - Read/write as JSON or CBOR, chosen by file extension (see [`crate::io`]).

use crate::{compute_root, MerkleError};
use anyhow::{anyhow, Context, Result};
use llmsays_crypto::{hash_fragment, Digest};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format version for [`CommitManifest`].
pub const MANIFEST_VERSION: u32 = 1;

/// Leaves plus the root committing to them.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitManifest {
    /// Schema/encoding version.
    pub version: u32,
    /// Merkle root over `leaves`.
    pub root: Digest,
    /// Leaf digests in commitment order.
    pub leaves: Vec<Digest>,
}

/// Hash each fragment into a leaf and commit to the sequence.
pub fn commit_fragments<S: AsRef<str>>(fragments: &[S]) -> Result<CommitManifest, MerkleError> {
    let leaves: Vec<Digest> = fragments
        .iter()
        .map(|f| hash_fragment(f.as_ref()))
        .collect();
    let root = compute_root(&leaves)?;
    Ok(CommitManifest {
        version: MANIFEST_VERSION,
        root,
        leaves,
    })
}

/// Recompute the root from the manifest's own leaves.
pub fn validate_manifest(man: &CommitManifest) -> Result<()> {
    if man.version != MANIFEST_VERSION {
        anyhow::bail!(
            "unsupported manifest version {} (expected {})",
            man.version,
            MANIFEST_VERSION
        );
    }
    let recomputed = compute_root(&man.leaves)?;
    if recomputed != man.root {
        return Err(anyhow!(
            "root mismatch: manifest={}, recomputed={}",
            man.root,
            recomputed
        ));
    }
    Ok(())
}

/// Recompute leaves and root from fragment text and compare with `man`.
pub fn validate_fragments_against_manifest<S: AsRef<str>>(
    fragments: &[S],
    man: &CommitManifest,
) -> Result<()> {
    let recomputed = commit_fragments(fragments)?;
    if recomputed.leaves.len() != man.leaves.len() {
        return Err(anyhow!(
            "leaf count mismatch: manifest={}, recomputed={}",
            man.leaves.len(),
            recomputed.leaves.len()
        ));
    }
    if let Some(i) = (0..man.leaves.len()).find(|&i| man.leaves[i] != recomputed.leaves[i]) {
        return Err(anyhow!(
            "leaf {i} mismatch: manifest={}, recomputed={}",
            man.leaves[i],
            recomputed.leaves[i]
        ));
    }
    if recomputed.root != man.root {
        return Err(anyhow!(
            "root mismatch: manifest={}, recomputed={}",
            man.root,
            recomputed.root
        ));
    }
    Ok(())
}

/// Read a manifest, format chosen by extension (`.json` / `.cbor`).
pub fn read_manifest_auto<P: AsRef<Path>>(path: P) -> Result<CommitManifest> {
    let path = path.as_ref();
    crate::io::read_auto(path).with_context(|| format!("reading manifest {}", path.display()))
}

/// Write a manifest, format chosen by extension (JSON when unrecognized).
pub fn write_manifest_auto<P: AsRef<Path>>(path: P, v: &CommitManifest) -> Result<()> {
    let path = path.as_ref();
    crate::io::write_auto(path, v).with_context(|| format!("writing manifest {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragments() -> Vec<&'static str> {
        vec!["think one", "think two", "SWAP|ETH|1|USDC"]
    }

    #[test]
    fn commit_and_validate_roundtrip() {
        let man = commit_fragments(&fragments()).unwrap();
        assert_eq!(man.leaves.len(), 3);
        validate_manifest(&man).unwrap();
        validate_fragments_against_manifest(&fragments(), &man).unwrap();
    }

    #[test]
    fn commit_rejects_empty() {
        let none: [&str; 0] = [];
        assert_eq!(commit_fragments(&none).unwrap_err(), MerkleError::EmptyInput);
    }

    #[test]
    fn validation_names_the_changed_leaf() {
        let man = commit_fragments(&fragments()).unwrap();
        let mut edited = fragments();
        edited[1] = "think 2";
        let err = validate_fragments_against_manifest(&edited, &man).unwrap_err();
        assert!(err.to_string().contains("leaf 1 mismatch"), "{err}");

        let mut forged = man.clone();
        forged.root = man.leaves[0];
        let err = validate_manifest(&forged).unwrap_err();
        assert!(err.to_string().contains("root mismatch"), "{err}");
    }

    #[test]
    fn json_and_cbor_files_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let man = commit_fragments(&fragments()).unwrap();

        for name in ["m.json", "m.cbor"] {
            let path = dir.path().join(name);
            write_manifest_auto(&path, &man).unwrap();
            assert_eq!(read_manifest_auto(&path).unwrap(), man);
        }

        assert!(read_manifest_auto(dir.path().join("m.txt")).is_err());
        assert!(read_manifest_auto(dir.path().join("m")).is_err());
    }
}
