//! Malformed-input errors.
//!
//! Only inputs that cannot be checked at all abort a verification call.
//! Root mismatches, bad signatures and recommitment failures are ordinary
//! outcomes and live in [`crate::report::Failure`] instead.

use llmsays_crypto::CryptoError;
use llmsays_merkle::MerkleError;
use thiserror::Error;

/// Why an envelope could not be verified.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Hex, field or scalar decoding failed, or the key/message is unusable.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Empty leaf list (or a proof request past the end).
    #[error(transparent)]
    Merkle(#[from] MerkleError),

    /// The requested fragment has no leaf, no text, or neither.
    #[error("fragment index {index} out of range ({leaves} leaves, {fragments} fragments)")]
    IndexOutOfRange {
        /// Requested global fragment index.
        index: usize,
        /// Leaves in the envelope.
        leaves: usize,
        /// Thinking + response fragments in the envelope.
        fragments: usize,
    },

    /// The attestation service answered with `status: "error"`.
    #[error("attestation service returned an error: {message}")]
    Rejected {
        /// Message supplied by the service (may be empty).
        message: String,
    },

    /// The payload is not JSON of either envelope layout.
    #[error("malformed envelope: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for verification calls.
pub type Result<T, E = VerifyError> = std::result::Result<T, E>;
