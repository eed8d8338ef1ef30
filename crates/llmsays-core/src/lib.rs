//! llmsays-core: envelopes, reports, and the verifier for attested LLM output.
//!
//! This crate defines the boundary consumers work against:
//! - [`ResponseEnvelope`] / [`VerificationOutcome`]: the attestation service's
//!   reply, decoded and range-checked once;
//! - [`Verifier`]: **origin** verification (signature over the root) and
//!   **response** verification (root match + fragment recommitment);
//! - [`Disclosure`]: one fragment plus its inclusion proof, verifiable alone;
//! - reports and the malformed-input error taxonomy.
//!
//! ```no_run
//! use llmsays_core::{ResponseEnvelope, Verifier, VerifierConfig};
//! # let bytes: &[u8] = b"{}";
//! let envelope = ResponseEnvelope::from_json(bytes)?;
//! let verifier = Verifier::new(VerifierConfig::default());
//! let origin = verifier.origin_verify(&envelope)?;
//! let idx = envelope.response_index(0).unwrap_or(0);
//! let response = verifier.response_verify(&envelope, idx)?;
//! println!("signed: {}, committed: {}", origin.valid, response.fragment_matches);
//! # Ok::<(), llmsays_core::VerifyError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Small, explicit allowlist to keep docs readable and APIs ergonomic.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown
)]

/// Verifier configuration (injected key, optional checks, env overrides).
pub mod config;
/// Single-fragment disclosures.
pub mod disclosure;
/// Wire layouts and the decoded envelope.
pub mod envelope;
/// Malformed-input errors.
pub mod error;
/// JSON file/stdin helpers.
pub mod io;
/// Verification reports and reported failures.
pub mod report;
/// Origin and response verification.
pub mod verifier;

pub use config::*;
pub use disclosure::*;
pub use envelope::*;
pub use error::*;
pub use report::*;
pub use verifier::*;

pub use llmsays_crypto::{Digest, Scalar, Signature, VerifyingKey};
pub use llmsays_merkle::{MerkleProof, MerkleTree};

/// Commonly-used items for quick imports.
///
/// ```rust
/// use llmsays_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        envelope::{Fragments, LeafOrder, ResponseEnvelope, VerificationOutcome},
        report::{Failure, OriginReport, ResponseReport, VerificationReport},
        verifier::Verifier,
        VerifierConfig, VerifyError,
    };
    pub use llmsays_crypto::{Digest, Signature, VerifyingKey};
}
