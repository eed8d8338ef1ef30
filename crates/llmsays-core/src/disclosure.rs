//! Selective disclosure: one fragment, its leaf, an inclusion proof, and the
//! signed root. Enough to verify an excerpt without the rest of the output.

use crate::envelope::ResponseEnvelope;
use crate::error::{Result, VerifyError};
use llmsays_crypto::{Digest, Signature};
use llmsays_merkle::{MerkleProof, MerkleTree};
use serde::{Deserialize, Serialize};

/// A single disclosed fragment with everything needed to check it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    /// Fragment text.
    pub text: String,
    /// Leaf committing the fragment.
    pub leaf: Digest,
    /// Path from `leaf` to `root`.
    pub proof: MerkleProof,
    /// Signed root.
    pub root: Digest,
    /// Attestor's signature over `root`.
    pub signature: Signature,
}

impl Disclosure {
    /// Extract fragment `index` from a full envelope.
    ///
    /// The proof is generated from the envelope's own leaves; the root is the
    /// claimed (signed) one, so a forged leaf set yields a proof that does
    /// not verify.
    pub fn from_envelope(envelope: &ResponseEnvelope, index: usize) -> Result<Self> {
        let out_of_range = || VerifyError::IndexOutOfRange {
            index,
            leaves: envelope.leaves().len(),
            fragments: envelope.fragment_count(),
        };
        let tree = MerkleTree::build(envelope.leaves())?;
        let leaf = *envelope.leaves().get(index).ok_or_else(out_of_range)?;
        let text = envelope.fragment(index).ok_or_else(out_of_range)?;

        Ok(Self {
            text: text.to_owned(),
            leaf,
            proof: tree.proof(index)?,
            root: envelope.root(),
            signature: envelope.signature(),
        })
    }
}
