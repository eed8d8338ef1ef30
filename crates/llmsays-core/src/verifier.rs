//! Origin and response verification over a [`ResponseEnvelope`].
//!
//! Every call is a pure function of the envelope and the injected
//! [`VerifierConfig`]; a `Verifier` can be shared freely across threads.

use crate::config::VerifierConfig;
use crate::disclosure::Disclosure;
use crate::envelope::{ResponseEnvelope, VerificationOutcome};
use crate::error::{Result, VerifyError};
use crate::report::{DisclosureReport, Failure, OriginReport, ResponseReport, VerificationReport};
use llmsays_crypto::{hash_fragment, verify_signature, Digest, Signature, VerifyingKey};
use llmsays_merkle::{verify_proof, MerkleTree};
use tracing::{debug, warn};

/// Checks envelopes against one trusted attestor key.
#[derive(Clone, Debug, Default)]
pub struct Verifier {
    config: VerifierConfig,
}

impl Verifier {
    /// Verifier with an explicit configuration.
    #[must_use]
    pub const fn new(config: VerifierConfig) -> Self {
        Self { config }
    }

    /// Verifier configured from the environment (see [`VerifierConfig::from_env`]).
    pub fn from_env() -> Result<Self> {
        VerifierConfig::from_env().map(Self::new)
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Key signatures are checked against.
    #[must_use]
    pub const fn verifying_key(&self) -> &VerifyingKey {
        &self.config.verifying_key
    }

    /// Check the signature over the envelope's claimed root.
    ///
    /// A signature that does not verify yields `valid: false`; only an
    /// unusable key or an over-wide root is an error.
    pub fn origin_verify(&self, envelope: &ResponseEnvelope) -> Result<OriginReport> {
        self.check_signature(envelope.root(), &envelope.signature())
    }

    /// Check that fragment `index` is committed under the claimed root.
    ///
    /// Runs, independently:
    /// - root match: leaves rebuilt into a tree give the claimed root;
    /// - recommitment: the fragment text hashes to `leaves[index]`;
    /// - optionally, the leaf's inclusion proof replays to the claimed root.
    pub fn response_verify(
        &self,
        envelope: &ResponseEnvelope,
        index: usize,
    ) -> Result<ResponseReport> {
        let leaves = envelope.leaves();
        let tree = MerkleTree::build(leaves)?;

        let out_of_range = || VerifyError::IndexOutOfRange {
            index,
            leaves: leaves.len(),
            fragments: envelope.fragment_count(),
        };
        let leaf = *leaves.get(index).ok_or_else(out_of_range)?;
        let text = envelope.fragment(index).ok_or_else(out_of_range)?;

        let claimed_root = envelope.root();
        let recomputed_root = tree.root();
        let recomputed_leaf = hash_fragment(text);
        let root_matches = recomputed_root == claimed_root;
        let fragment_matches = recomputed_leaf == leaf;

        let proof_verifies = if self.config.check_inclusion_proof {
            let proof = tree.proof(index)?;
            Some(verify_proof(&leaf, &proof, &claimed_root))
        } else {
            None
        };

        let mut failures = Vec::new();
        if !root_matches {
            failures.push(Failure::RootMismatch {
                claimed: claimed_root,
                recomputed: recomputed_root,
            });
        }
        if !fragment_matches {
            failures.push(Failure::RecommitmentMismatch {
                index,
                leaf,
                recomputed: recomputed_leaf,
            });
        }
        if proof_verifies == Some(false) {
            failures.push(Failure::InclusionProofFailed { index });
        }

        if failures.is_empty() {
            debug!(index, leaves = leaves.len(), root = %claimed_root, "fragment committed under root");
        } else {
            for f in &failures {
                warn!(index, "{f}");
            }
        }

        Ok(ResponseReport {
            index,
            root_matches,
            fragment_matches,
            proof_verifies,
            claimed_root,
            recomputed_root,
            leaf,
            recomputed_leaf,
            failures,
        })
    }

    /// Origin and response verification for fragment `index`.
    pub fn verify(&self, envelope: &ResponseEnvelope, index: usize) -> Result<VerificationReport> {
        Ok(VerificationReport {
            origin: self.origin_verify(envelope)?,
            response: self.response_verify(envelope, index)?,
        })
    }

    /// [`Verifier::verify`] on a raw service reply; error replies are rejected.
    pub fn verify_outcome(
        &self,
        outcome: &VerificationOutcome,
        index: usize,
    ) -> Result<VerificationReport> {
        match outcome {
            VerificationOutcome::Success(env) => self.verify(env, index),
            VerificationOutcome::Error { message } => Err(VerifyError::Rejected {
                message: message.clone(),
            }),
        }
    }

    /// Check a single disclosed fragment without the rest of the envelope.
    pub fn verify_disclosure(&self, disclosure: &Disclosure) -> Result<DisclosureReport> {
        let origin = self.check_signature(disclosure.root, &disclosure.signature)?;

        let index = disclosure.proof.index;
        let recomputed_leaf = hash_fragment(&disclosure.text);
        let fragment_matches = recomputed_leaf == disclosure.leaf;
        let proof_verifies = verify_proof(&disclosure.leaf, &disclosure.proof, &disclosure.root);

        let mut failures = Vec::new();
        if !fragment_matches {
            failures.push(Failure::RecommitmentMismatch {
                index,
                leaf: disclosure.leaf,
                recomputed: recomputed_leaf,
            });
        }
        if !proof_verifies {
            failures.push(Failure::InclusionProofFailed { index });
        }
        for f in &failures {
            warn!(index, "{f}");
        }

        Ok(DisclosureReport {
            index,
            fragment_matches,
            proof_verifies,
            recomputed_leaf,
            origin,
            failures,
        })
    }

    fn check_signature(&self, root: Digest, signature: &Signature) -> Result<OriginReport> {
        let key = self.config.verifying_key;
        let valid = verify_signature(&root, signature, &key)?;
        if valid {
            debug!(%root, %key, "signature over root verified");
        } else {
            warn!(%root, %key, "signature over root does not verify");
        }
        Ok(OriginReport {
            valid,
            root,
            verifying_key: key,
            failure: (!valid).then_some(Failure::SignatureInvalid),
        })
    }
}
