//! Stark-curve ECDSA verification over a commitment root.
//!
//! Signature components are range-checked when a [`Scalar`] is built, so a
//! [`Signature`] value is always well formed and [`verify_signature`] only
//! ever answers the cryptographic question.

use crate::digest::{encode_hex_be32, parse_hex_be32, Digest};
use crate::error::CryptoError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use starknet_crypto::{Felt, VerifyError};
use std::fmt;

/// Order `n` of the Stark curve group, big-endian.
pub const CURVE_ORDER: [u8; 32] = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xb7, 0x81, 0x12, 0x6d, 0xca, 0xe7, 0xb2, 0x32, 0x1e, 0x66, 0xa2, 0x41, 0xad, 0xc6, 0x4d, 0x2f,
];

/// Widest message a Stark signature commits to.
const MAX_MESSAGE_BITS: u32 = 251;

/// A signature component in `[1, n)`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scalar([u8; 32]);

impl Scalar {
    /// Range-check big-endian bytes. `name` labels the component in errors.
    pub fn from_be_bytes(name: &'static str, bytes: [u8; 32]) -> Result<Self, CryptoError> {
        if bytes == [0u8; 32] || bytes >= CURVE_ORDER {
            return Err(CryptoError::ScalarOutOfRange {
                name,
                value: encode_hex_be32(&bytes),
            });
        }
        Ok(Self(bytes))
    }

    /// Decode a hex integer and range-check it.
    pub fn from_hex(name: &'static str, input: &str) -> Result<Self, CryptoError> {
        Self::from_be_bytes(name, parse_hex_be32(input)?)
    }

    /// Range-check a field element.
    pub fn from_felt(name: &'static str, f: &Felt) -> Result<Self, CryptoError> {
        Self::from_be_bytes(name, f.to_bytes_be())
    }

    /// Canonical `0x` + 64 hex digits.
    #[must_use]
    pub fn to_hex(&self) -> String {
        encode_hex_be32(&self.0)
    }

    /// Borrow the big-endian bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<&Scalar> for Felt {
    fn from(s: &Scalar) -> Self {
        Self::from_bytes_be(&s.0)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Scalar({})", self.to_hex())
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex("scalar", &s).map_err(serde::de::Error::custom)
    }
}

/// An `(r, s)` Stark ECDSA signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// First component.
    pub r: Scalar,
    /// Second component.
    pub s: Scalar,
}

impl Signature {
    /// Assemble from validated components.
    #[must_use]
    pub const fn new(r: Scalar, s: Scalar) -> Self {
        Self { r, s }
    }

    /// Decode both components from hex.
    pub fn from_hex(r: &str, s: &str) -> Result<Self, CryptoError> {
        Ok(Self {
            r: Scalar::from_hex("r", r)?,
            s: Scalar::from_hex("s", s)?,
        })
    }

    /// Fixed-width compact encoding: `r ‖ s`, each zero-padded to 32 bytes.
    #[must_use]
    pub fn to_compact_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r.0);
        out[32..].copy_from_slice(&self.s.0);
        out
    }

    /// Inverse of [`Signature::to_compact_bytes`].
    pub fn from_compact_bytes(bytes: &[u8; 64]) -> Result<Self, CryptoError> {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(Self {
            r: Scalar::from_be_bytes("r", r)?,
            s: Scalar::from_be_bytes("s", s)?,
        })
    }

    /// Compact encoding as 128 hex digits, no prefix.
    #[must_use]
    pub fn to_compact_hex(&self) -> String {
        hex::encode(self.to_compact_bytes())
    }
}

/// The attestor's public key: x-coordinate of its point on the Stark curve.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct VerifyingKey(Digest);

impl VerifyingKey {
    /// Key from an x-coordinate already known to be a field element.
    #[must_use]
    pub const fn new(x: Digest) -> Self {
        Self(x)
    }

    /// Parse an x-coordinate from hex.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        Digest::from_hex(input).map(Self)
    }

    /// The x-coordinate.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> &Digest {
        &self.0
    }

    /// Canonical hex of the x-coordinate.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }
}

impl fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", self.to_hex())
    }
}

impl Serialize for VerifyingKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VerifyingKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Digest::deserialize(deserializer).map(Self)
    }
}

/// Check `signature` over `message` against `key`.
///
/// Returns `Ok(false)` when the verification equation fails. Errors are
/// reserved for inputs that could never carry a valid signature: a message
/// wider than 251 bits or a key that is not on the curve.
pub fn verify_signature(
    message: &Digest,
    signature: &Signature,
    key: &VerifyingKey,
) -> Result<bool, CryptoError> {
    if message.bit_len() > MAX_MESSAGE_BITS {
        return Err(CryptoError::MessageOutOfRange(message.to_hex()));
    }

    let r = Felt::from(&signature.r);
    let s = Felt::from(&signature.s);
    match starknet_crypto::verify(&Felt::from(key.0), &Felt::from(*message), &r, &s) {
        Ok(valid) => Ok(valid),
        Err(VerifyError::InvalidPublicKey) => Err(CryptoError::InvalidVerifyingKey(key.to_hex())),
        Err(VerifyError::InvalidMessageHash) => {
            Err(CryptoError::MessageOutOfRange(message.to_hex()))
        }
        // In-range scalars the curve arithmetic still refuses (e.g. r >= 2^251)
        // cannot verify.
        Err(_) => Ok(false),
    }
}
