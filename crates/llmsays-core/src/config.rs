//! Verifier configuration.
//!
//! The attestor's key is configuration, not protocol: the default is the
//! deployed attestor, `LLMSAYS_VERIFYING_KEY` overrides it, and callers (the
//! CLI, tests) may inject any key directly.

use crate::error::Result;
use llmsays_crypto::{Digest, VerifyingKey};
use std::env;

/// Environment variable holding the verifying key as hex.
pub const ENV_VERIFYING_KEY: &str = "LLMSAYS_VERIFYING_KEY";

/// Environment variable that disables the redundant inclusion-proof check.
pub const ENV_SKIP_INCLUSION_PROOF: &str = "LLMSAYS_SKIP_INCLUSION_PROOF";

/// Public key (x-coordinate) of the deployed attestor.
pub const DEFAULT_VERIFYING_KEY: &str =
    "0x058c57fc0f90bac2bbd38c74169bca8d00d2f9be0998a6f21cc176765dde22a8";

const DEFAULT_VERIFYING_KEY_BYTES: [u8; 32] = [
    0x05, 0x8c, 0x57, 0xfc, 0x0f, 0x90, 0xba, 0xc2, 0xbb, 0xd3, 0x8c, 0x74, 0x16, 0x9b, 0xca, 0x8d,
    0x00, 0xd2, 0xf9, 0xbe, 0x09, 0x98, 0xa6, 0xf2, 0x1c, 0xc1, 0x76, 0x76, 0x5d, 0xde, 0x22, 0xa8,
];

const DEFAULT_VERIFYING_KEY_X: Digest =
    match Digest::checked_from_be_bytes(DEFAULT_VERIFYING_KEY_BYTES) {
        Some(x) => x,
        None => panic!("default verifying key is not a field element"),
    };

/// Settings for [`crate::Verifier`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Key signatures are checked against.
    pub verifying_key: VerifyingKey,
    /// Also replay the leaf's inclusion proof during response verification.
    pub check_inclusion_proof: bool,
}

impl VerifierConfig {
    /// Config for `verifying_key` with the inclusion-proof check enabled.
    #[must_use]
    pub const fn new(verifying_key: VerifyingKey) -> Self {
        Self {
            verifying_key,
            check_inclusion_proof: true,
        }
    }

    /// Toggle the inclusion-proof check.
    #[must_use]
    pub const fn with_inclusion_proof(mut self, enabled: bool) -> Self {
        self.check_inclusion_proof = enabled;
        self
    }

    /// The deployed attestor's key.
    #[must_use]
    pub const fn default_verifying_key() -> VerifyingKey {
        VerifyingKey::new(DEFAULT_VERIFYING_KEY_X)
    }

    /// Defaults overridden by [`ENV_VERIFYING_KEY`] and
    /// [`ENV_SKIP_INCLUSION_PROOF`].
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        if let Ok(hex) = env::var(ENV_VERIFYING_KEY) {
            if !hex.trim().is_empty() {
                cfg.verifying_key = VerifyingKey::from_hex(&hex)?;
            }
        }
        Ok(cfg.with_inclusion_proof_from_env())
    }

    /// Apply [`ENV_SKIP_INCLUSION_PROOF`] only, leaving the key untouched.
    #[must_use]
    pub fn with_inclusion_proof_from_env(mut self) -> Self {
        if let Ok(flag) = env::var(ENV_SKIP_INCLUSION_PROOF) {
            self.check_inclusion_proof = !is_truthy(&flag);
        }
        self
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::new(Self::default_verifying_key())
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(
        v.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
