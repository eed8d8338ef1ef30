// crates/llmsays-crypto/src/lib.rs

//! Crypto substrate for attested LLM output.
//!
//! - [`Digest`]: a Stark-field element carried as 32 big-endian bytes, with
//!   one explicit hex normalization path (optional `0x`, zero padding).
//! - [`CommitmentHasher`] / [`StarknetHasher`]: starknet-keccak for leaves,
//!   sorted-pair Pedersen for internal Merkle nodes.
//! - [`verify_signature`]: Stark-curve ECDSA over a digest, with scalar range
//!   checks performed when a [`Signature`] is constructed.
//!
//! Nothing in this crate holds private key material.

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

/// Field-element digests and hex normalization.
pub mod digest;
/// Stark-curve ECDSA verification.
pub mod ecdsa;
/// Error type shared by the crate.
pub mod error;
/// Leaf and node hashing.
pub mod hash;

pub use digest::{parse_hex_be32, Digest, FIELD_PRIME};
pub use ecdsa::{verify_signature, Scalar, Signature, VerifyingKey, CURVE_ORDER};
pub use error::CryptoError;
pub use hash::{hash_fragment, starknet_keccak, CommitmentHasher, StarknetHasher};

/// Field element type of the underlying Stark arithmetic.
pub use starknet_crypto::Felt;
