use thiserror::Error;

/// Rejections raised while decoding or checking cryptographic inputs.
///
/// Every variant describes malformed input. A signature that is well formed
/// but does not verify is reported as `Ok(false)`, never as an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The string is not a usable hex integer.
    #[error("invalid hex {input:?}: {reason}")]
    InvalidHex {
        /// Offending input, verbatim.
        input: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// The value is not below the Stark field prime.
    #[error("{0} is not an element of the Stark field")]
    NotAFieldElement(String),

    /// A signature scalar is zero or not reduced modulo the curve order.
    #[error("signature scalar {name} = {value} is outside [1, n)")]
    ScalarOutOfRange {
        /// Which component (`r` or `s`).
        name: &'static str,
        /// Canonical hex of the rejected value.
        value: String,
    },

    /// The message digest is wider than the 251 bits a Stark signature covers.
    #[error("message digest {0} is wider than 251 bits")]
    MessageOutOfRange(String),

    /// The verifying key is not the x-coordinate of a curve point.
    #[error("verifying key {0} is not the x-coordinate of a Stark curve point")]
    InvalidVerifyingKey(String),
}
