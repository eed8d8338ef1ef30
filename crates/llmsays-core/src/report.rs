//! Verification reports.
//!
//! A report is produced for every well-formed envelope, whether or not it
//! checks out. Negative results are listed as [`Failure`]s so an auditor can
//! tell a bogus commitment apart from a fragment that was never in it.

use llmsays_crypto::{Digest, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cryptographic check that ran and did not hold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    /// Root rebuilt from the leaves differs from the claimed root.
    RootMismatch {
        /// Root carried by the envelope.
        claimed: Digest,
        /// Root rebuilt from the envelope's leaves.
        recomputed: Digest,
    },
    /// The signature over the claimed root does not verify.
    SignatureInvalid,
    /// The fragment text does not hash to its leaf.
    RecommitmentMismatch {
        /// Leaf index.
        index: usize,
        /// Leaf carried by the envelope.
        leaf: Digest,
        /// Hash of the fragment text.
        recomputed: Digest,
    },
    /// The leaf's inclusion proof does not replay to the claimed root.
    InclusionProofFailed {
        /// Leaf index.
        index: usize,
    },
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootMismatch {
                claimed,
                recomputed,
            } => write!(f, "root mismatch: claimed={claimed}, recomputed={recomputed}"),
            Self::SignatureInvalid => f.write_str("signature over root is invalid"),
            Self::RecommitmentMismatch {
                index,
                leaf,
                recomputed,
            } => write!(
                f,
                "fragment {index} does not match its leaf: leaf={leaf}, recomputed={recomputed}"
            ),
            Self::InclusionProofFailed { index } => {
                write!(f, "inclusion proof for leaf {index} does not reach the claimed root")
            }
        }
    }
}

/// Outcome of origin verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginReport {
    /// Signature verified under the configured key.
    pub valid: bool,
    /// The signed message (the claimed root).
    pub root: Digest,
    /// Key the signature was checked against.
    pub verifying_key: VerifyingKey,
    /// Set when `valid` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<Failure>,
}

/// Outcome of response verification for one fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseReport {
    /// Leaf index that was checked.
    pub index: usize,
    /// Rebuilt root equals the claimed root.
    pub root_matches: bool,
    /// Fragment text hashes to its leaf.
    pub fragment_matches: bool,
    /// Inclusion proof replay against the claimed root, if it was run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_verifies: Option<bool>,
    /// Root carried by the envelope.
    pub claimed_root: Digest,
    /// Root rebuilt from the envelope's leaves.
    pub recomputed_root: Digest,
    /// Leaf carried by the envelope at `index`.
    pub leaf: Digest,
    /// Hash of the fragment text at `index`.
    pub recomputed_leaf: Digest,
    /// Every check that did not hold, in the order they ran.
    #[serde(default)]
    pub failures: Vec<Failure>,
}

impl ResponseReport {
    /// All response checks held.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Both checks for one envelope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Signature check.
    pub origin: OriginReport,
    /// Commitment check for the chosen fragment.
    pub response: ResponseReport,
}

impl VerificationReport {
    /// Origin and response checks both held.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.origin.valid && self.response.is_valid()
    }

    /// Every failure across both checks.
    pub fn failures(&self) -> impl Iterator<Item = &Failure> + '_ {
        self.origin.failure.iter().chain(self.response.failures.iter())
    }
}

/// Outcome of checking a single disclosed fragment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureReport {
    /// Leaf index named by the proof.
    pub index: usize,
    /// Disclosed text hashes to the disclosed leaf.
    pub fragment_matches: bool,
    /// The proof replays from the leaf to the signed root.
    pub proof_verifies: bool,
    /// Hash of the disclosed text.
    pub recomputed_leaf: Digest,
    /// Signature check over the disclosed root.
    pub origin: OriginReport,
    /// Response-side checks that did not hold.
    #[serde(default)]
    pub failures: Vec<Failure>,
}

impl DisclosureReport {
    /// Signature, recommitment and inclusion all held.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.origin.valid && self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_json_is_tagged() {
        let f = Failure::InclusionProofFailed { index: 3 };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["kind"], "inclusion_proof_failed");
        assert_eq!(json["index"], 3);

        let sig = serde_json::to_value(Failure::SignatureInvalid).unwrap();
        assert_eq!(sig, serde_json::json!({ "kind": "signature_invalid" }));
    }

    #[test]
    fn failure_display_names_the_check() {
        let d = Digest::from_hex("0x1").unwrap();
        let msg = Failure::RecommitmentMismatch {
            index: 2,
            leaf: d,
            recomputed: Digest::ZERO,
        }
        .to_string();
        assert!(msg.starts_with("fragment 2 does not match its leaf"), "{msg}");
    }
}
