//! Response envelopes as delivered by the attestation service.
//!
//! Two JSON layouts are accepted on input and normalized to one
//! [`ResponseEnvelope`]:
//!
//! ```json
//! { "status": "success",
//!   "thinking": ["…"], "response": ["…"],
//!   "heuristics": { "leaves": ["0x…"], "root": "0x…", "r": "0x…", "s": "0x…" } }
//! ```
//!
//! and the earlier nested one (`data.{thinking,response}`,
//! `merkle_tree.{leaves,root}`, `signature.{r,s}`).
//!
//! The two layouts commit fragments in different orders. The current one
//! hashes thinking fragments first; the nested one commits the response
//! first, so `response[0]` sits at `leaves[0]`. The order is kept on the
//! envelope as a [`LeafOrder`], every leaf index is interpreted through it,
//! and serialization writes the layout the order belongs to, always with
//! canonical 64-digit hex.
//!
//! Hex fields are decoded once, at the boundary, so a malformed digest or an
//! out-of-range scalar is rejected before any verification runs.

use crate::error::{Result, VerifyError};
use llmsays_crypto::{Digest, Scalar, Signature};
use llmsays_merkle::{commit_fragments, CommitManifest, MerkleError};
use serde::{Deserialize, Serialize, Serializer};

/// Model output split into committed fragments.
///
/// Which list occupies the first leaves is a [`LeafOrder`]; the plain
/// accessors below assume [`LeafOrder::ThinkingFirst`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragments {
    /// Reasoning fragments.
    #[serde(default)]
    pub thinking: Vec<String>,
    /// Output fragments.
    #[serde(default)]
    pub response: Vec<String>,
}

/// Which fragment list occupies the first leaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafOrder {
    /// `thinking ++ response` (current layout).
    #[default]
    ThinkingFirst,
    /// `response ++ thinking` (nested layout).
    ResponseFirst,
}

impl Fragments {
    /// All fragments, thinking first.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter_in(LeafOrder::ThinkingFirst)
    }

    /// All fragments in the given leaf order.
    pub fn iter_in(&self, order: LeafOrder) -> impl Iterator<Item = &str> + '_ {
        let (first, second) = match order {
            LeafOrder::ThinkingFirst => (&self.thinking, &self.response),
            LeafOrder::ResponseFirst => (&self.response, &self.thinking),
        };
        first.iter().chain(second.iter()).map(String::as_str)
    }

    /// Fragment at global `index`, thinking first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.iter().nth(index)
    }

    /// Total number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.thinking.len() + self.response.len()
    }

    /// No fragments at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Leaf index of the `j`-th response fragment under `order`.
    #[must_use]
    pub fn response_index_in(&self, order: LeafOrder, j: usize) -> Option<usize> {
        let offset = match order {
            LeafOrder::ThinkingFirst => self.thinking.len(),
            LeafOrder::ResponseFirst => 0,
        };
        (j < self.response.len()).then(|| offset + j)
    }

    /// Global index of the `j`-th response fragment, thinking first.
    #[must_use]
    pub fn response_index(&self, j: usize) -> Option<usize> {
        self.response_index_in(LeafOrder::ThinkingFirst, j)
    }

    /// Hash every fragment into a leaf and commit to the sequence, thinking first.
    pub fn commit(&self) -> std::result::Result<CommitManifest, MerkleError> {
        self.commit_in(LeafOrder::ThinkingFirst)
    }

    /// [`Fragments::commit`] in the given leaf order.
    pub fn commit_in(&self, order: LeafOrder) -> std::result::Result<CommitManifest, MerkleError> {
        let all: Vec<&str> = self.iter_in(order).collect();
        commit_fragments(&all)
    }
}

/// Commitment and signature carried alongside the fragments.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Heuristics {
    /// One leaf per fragment, in fragment order.
    pub leaves: Vec<Digest>,
    /// Claimed Merkle root; the signed message.
    pub root: Digest,
    /// Signature component `r`.
    pub r: Scalar,
    /// Signature component `s`.
    pub s: Scalar,
}

impl Heuristics {
    /// Assemble from a commitment and its signature.
    #[must_use]
    pub fn new(leaves: Vec<Digest>, root: Digest, signature: Signature) -> Self {
        Self {
            leaves,
            root,
            r: signature.r,
            s: signature.s,
        }
    }

    /// The `(r, s)` pair.
    #[must_use]
    pub const fn signature(&self) -> Signature {
        Signature::new(self.r, self.s)
    }
}

/// A decoded, successful attestation reply. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireEnvelope")]
pub struct ResponseEnvelope {
    fragments: Fragments,
    heuristics: Heuristics,
    leaf_order: LeafOrder,
}

impl ResponseEnvelope {
    /// Assemble an envelope whose leaves are thinking first.
    #[must_use]
    pub const fn new(fragments: Fragments, heuristics: Heuristics) -> Self {
        Self {
            fragments,
            heuristics,
            leaf_order: LeafOrder::ThinkingFirst,
        }
    }

    /// Same envelope, leaves interpreted in `order`.
    #[must_use]
    pub const fn with_leaf_order(mut self, order: LeafOrder) -> Self {
        self.leaf_order = order;
        self
    }

    /// Order in which fragments were committed.
    #[must_use]
    pub const fn leaf_order(&self) -> LeafOrder {
        self.leaf_order
    }

    /// Decode a JSON reply and require `status: "success"`.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        VerificationOutcome::from_json(bytes)?.into_envelope()
    }

    /// Fragment text.
    #[must_use]
    pub const fn fragments(&self) -> &Fragments {
        &self.fragments
    }

    /// Reasoning fragments.
    #[must_use]
    pub fn thinking(&self) -> &[String] {
        &self.fragments.thinking
    }

    /// Output fragments.
    #[must_use]
    pub fn response(&self) -> &[String] {
        &self.fragments.response
    }

    /// Commitment and signature.
    #[must_use]
    pub const fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Committed leaves.
    #[must_use]
    pub fn leaves(&self) -> &[Digest] {
        &self.heuristics.leaves
    }

    /// Claimed root.
    #[must_use]
    pub const fn root(&self) -> Digest {
        self.heuristics.root
    }

    /// Signature over the root.
    #[must_use]
    pub const fn signature(&self) -> Signature {
        self.heuristics.signature()
    }

    /// Fragment committed at leaf `index`.
    #[must_use]
    pub fn fragment(&self, index: usize) -> Option<&str> {
        self.fragments.iter_in(self.leaf_order).nth(index)
    }

    /// Number of fragments (thinking + response).
    #[must_use]
    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    /// Leaf index of the `j`-th response fragment.
    #[must_use]
    pub fn response_index(&self, j: usize) -> Option<usize> {
        self.fragments.response_index_in(self.leaf_order, j)
    }

    /// Split into fragments and heuristics (see [`Self::leaf_order`]).
    #[must_use]
    pub fn into_parts(self) -> (Fragments, Heuristics) {
        (self.fragments, self.heuristics)
    }
}

impl Serialize for ResponseEnvelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let h = &self.heuristics;
        match self.leaf_order {
            LeafOrder::ThinkingFirst => CurrentOut {
                thinking: &self.fragments.thinking,
                response: &self.fragments.response,
                heuristics: h,
            }
            .serialize(serializer),
            LeafOrder::ResponseFirst => LegacyOut {
                data: &self.fragments,
                merkle_tree: TreeOut {
                    leaves: &h.leaves,
                    root: &h.root,
                },
                signature: SignatureOut { r: &h.r, s: &h.s },
            }
            .serialize(serializer),
        }
    }
}

/// The service reply: one tagged union instead of optional fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum VerificationOutcome {
    /// Attested output.
    Success(ResponseEnvelope),
    /// The service declined or failed.
    Error {
        /// Service-supplied reason.
        #[serde(default)]
        message: String,
    },
}

impl VerificationOutcome {
    /// Decode a JSON reply with typed errors for malformed hex and scalars.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<WireOutcome>(bytes)? {
            WireOutcome::Success(wire) => Ok(Self::Success(ResponseEnvelope::try_from(wire)?)),
            WireOutcome::Error { message } => Ok(Self::Error { message }),
        }
    }

    /// The envelope, or [`VerifyError::Rejected`] for an error reply.
    pub fn into_envelope(self) -> Result<ResponseEnvelope> {
        match self {
            Self::Success(env) => Ok(env),
            Self::Error { message } => Err(VerifyError::Rejected { message }),
        }
    }
}

/* ------------------------------ wire layouts ------------------------------ */

#[derive(Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum WireOutcome {
    Success(WireEnvelope),
    Error {
        #[serde(default)]
        message: String,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireEnvelope {
    Current {
        thinking: Vec<String>,
        response: Vec<String>,
        heuristics: WireHeuristics,
    },
    Legacy {
        data: Fragments,
        merkle_tree: WireTree,
        signature: WireSignature,
    },
}

#[derive(Deserialize)]
struct WireHeuristics {
    leaves: Vec<String>,
    root: String,
    r: String,
    s: String,
}

#[derive(Deserialize)]
struct WireTree {
    leaves: Vec<String>,
    root: String,
}

#[derive(Deserialize)]
struct WireSignature {
    r: String,
    s: String,
}

#[derive(Serialize)]
struct CurrentOut<'a> {
    thinking: &'a [String],
    response: &'a [String],
    heuristics: &'a Heuristics,
}

#[derive(Serialize)]
struct LegacyOut<'a> {
    data: &'a Fragments,
    merkle_tree: TreeOut<'a>,
    signature: SignatureOut<'a>,
}

#[derive(Serialize)]
struct TreeOut<'a> {
    leaves: &'a [Digest],
    root: &'a Digest,
}

#[derive(Serialize)]
struct SignatureOut<'a> {
    r: &'a Scalar,
    s: &'a Scalar,
}

impl TryFrom<WireEnvelope> for ResponseEnvelope {
    type Error = VerifyError;

    fn try_from(wire: WireEnvelope) -> Result<Self> {
        let (fragments, leaves, root, r, s, order) = match wire {
            WireEnvelope::Current {
                thinking,
                response,
                heuristics: h,
            } => (
                Fragments { thinking, response },
                h.leaves,
                h.root,
                h.r,
                h.s,
                LeafOrder::ThinkingFirst,
            ),
            WireEnvelope::Legacy {
                data,
                merkle_tree,
                signature,
            } => (
                data,
                merkle_tree.leaves,
                merkle_tree.root,
                signature.r,
                signature.s,
                LeafOrder::ResponseFirst,
            ),
        };

        let leaves = leaves
            .iter()
            .map(|l| Digest::from_hex(l))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let root = Digest::from_hex(&root)?;
        let signature = Signature::from_hex(&r, &s)?;

        Ok(Self::new(fragments, Heuristics::new(leaves, root, signature)).with_leaf_order(order))
    }
}
