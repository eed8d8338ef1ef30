//! Stark-field digests and fixed-width hex decoding.
//!
//! Wire values arrive as hex strings of varying shape (`0x1fc4…`, `1FC4…`,
//! with or without leading zeros). They are decoded exactly once, here, into
//! a 32-byte big-endian array; every comparison afterwards is on bytes.

use crate::error::CryptoError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use starknet_crypto::Felt;
use std::fmt;
use std::str::FromStr;

/// Stark field prime `p = 2^251 + 17·2^192 + 1`, big-endian.
pub const FIELD_PRIME: [u8; 32] = [
    0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01,
];

/// Decode a hex integer into 32 big-endian bytes, left-padded with zeros.
///
/// Accepts an optional `0x`/`0X` prefix, surrounding whitespace, any number
/// of leading zeros and odd digit counts. Rejects empty input, non-hex
/// characters and values wider than 256 bits.
pub fn parse_hex_be32(input: &str) -> Result<[u8; 32], CryptoError> {
    let invalid = |reason| CryptoError::InvalidHex {
        input: input.to_owned(),
        reason,
    };

    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Err(invalid("no digits"));
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("non-hex character"));
    }

    let significant = digits.trim_start_matches('0');
    if significant.len() > 64 {
        return Err(invalid("wider than 256 bits"));
    }

    let padded = format!("{significant:0>64}");
    let mut out = [0u8; 32];
    hex::decode_to_slice(&padded, &mut out).map_err(|_| invalid("non-hex character"))?;
    Ok(out)
}

/// Canonical `0x`-prefixed, 64-digit lowercase hex.
#[must_use]
pub(crate) fn encode_hex_be32(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Output of the commitment hashes: an element of the Stark field.
///
/// Ordering is numeric (big-endian byte order), which is what the sorted-pair
/// node hash relies on.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    /// The zero element, used to pad odd Merkle levels.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wrap big-endian bytes, rejecting values `>= p`.
    pub fn from_be_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        Self::checked_from_be_bytes(bytes)
            .ok_or_else(|| CryptoError::NotAFieldElement(encode_hex_be32(&bytes)))
    }

    /// [`Digest::from_be_bytes`] usable in `const` items; `None` when `>= p`.
    #[must_use]
    pub const fn checked_from_be_bytes(bytes: [u8; 32]) -> Option<Self> {
        let mut i = 0;
        while i < 32 {
            if bytes[i] != FIELD_PRIME[i] {
                return if bytes[i] < FIELD_PRIME[i] {
                    Some(Self(bytes))
                } else {
                    None
                };
            }
            i += 1;
        }
        None
    }

    /// Parse a hex string (see [`parse_hex_be32`]) and range-check it.
    pub fn from_hex(input: &str) -> Result<Self, CryptoError> {
        Self::from_be_bytes(parse_hex_be32(input)?)
    }

    /// Bytes already known to be below `p` (e.g. masked hash output).
    #[inline]
    pub(crate) const fn from_reduced(bytes: [u8; 32]) -> Self {
        Self(bytes)
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

    /// Copy out the big-endian bytes.
    #[inline]
    #[must_use]
    pub const fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Number of significant bits.
    #[must_use]
    pub fn bit_len(&self) -> u32 {
        self.0
            .iter()
            .position(|&b| b != 0)
            .map_or(0, |i| {
                let rest = u32::try_from(31 - i).unwrap_or(0);
                rest * 8 + (8 - self.0[i].leading_zeros())
            })
    }
}

impl From<Digest> for Felt {
    fn from(d: Digest) -> Self {
        Self::from_bytes_be(&d.0)
    }
}

impl From<Felt> for Digest {
    fn from(f: Felt) -> Self {
        // A `Felt` is always reduced.
        Self(f.to_bytes_be())
    }
}

impl FromStr for Digest {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_shapes_normalize_to_same_bytes() {
        let want = parse_hex_be32("0x01fc4e9a").unwrap();
        for s in ["0x1fc4e9a", "1fc4e9a", "0X1FC4E9A", "  0x0001fc4e9a\n", "01fc4e9a"] {
            assert_eq!(parse_hex_be32(s).unwrap(), want, "{s:?}");
        }
        assert_eq!(want[28..], [0x01, 0xfc, 0x4e, 0x9a]);
        assert!(want[..28].iter().all(|&b| b == 0));
    }

    #[test]
    fn zero_is_accepted() {
        assert_eq!(parse_hex_be32("0x0").unwrap(), [0u8; 32]);
        assert_eq!(parse_hex_be32("0000").unwrap(), [0u8; 32]);
    }

    #[test]
    fn malformed_hex_is_rejected() {
        for s in ["", "0x", "   ", "0xzz", "12 34", "-1"] {
            assert!(
                matches!(parse_hex_be32(s), Err(CryptoError::InvalidHex { .. })),
                "{s:?} should be rejected"
            );
        }
        let too_wide = format!("0x1{}", "0".repeat(64));
        assert!(parse_hex_be32(&too_wide).is_err());
        // Leading zeros do not count toward the width.
        let padded = format!("0x{}{}", "0".repeat(10), "f".repeat(64));
        assert_eq!(parse_hex_be32(&padded).unwrap(), [0xff; 32]);
    }

    #[test]
    fn field_bound_is_enforced() {
        assert!(Digest::from_be_bytes(FIELD_PRIME).is_err());
        let mut below = FIELD_PRIME;
        below[31] = 0;
        assert!(Digest::from_be_bytes(below).is_ok());
        assert!(matches!(
            Digest::from_hex(&format!("0x{}", "f".repeat(64))),
            Err(CryptoError::NotAFieldElement(_))
        ));
    }

    #[test]
    fn const_constructor_agrees_with_checked_one() {
        const SMALL: Option<Digest> = Digest::checked_from_be_bytes([0x07; 32]);
        assert_eq!(SMALL, Some(Digest::from_be_bytes([0x07; 32]).unwrap()));
        assert_eq!(Digest::checked_from_be_bytes(FIELD_PRIME), None);
        assert_eq!(Digest::checked_from_be_bytes([0xff; 32]), None);

        // p - 1 differs from p only in the last byte.
        let mut top = FIELD_PRIME;
        top[31] -= 1;
        assert_eq!(Digest::checked_from_be_bytes(top).map(Digest::to_be_bytes), Some(top));
        // Differs from p at byte 7 and is below it.
        let mut mid = FIELD_PRIME;
        mid[7] = 0x10;
        assert!(Digest::checked_from_be_bytes(mid).is_some());
    }

    #[test]
    fn canonical_encoding_and_ordering() {
        let d = Digest::from_hex("0xabc").unwrap();
        assert_eq!(d.to_hex(), format!("0x{}abc", "0".repeat(61)));
        assert_eq!(d.to_string(), d.to_hex());
        assert_eq!(d.bit_len(), 12);
        assert_eq!(Digest::ZERO.bit_len(), 0);

        let small = Digest::from_hex("0xff").unwrap();
        let large = Digest::from_hex("0x100").unwrap();
        assert!(small < large);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let d = Digest::from_hex("0x2a").unwrap();
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"0x{}2a\"", "0".repeat(62)));
        let back: Digest = serde_json::from_str("\"2A\"").unwrap();
        assert_eq!(back, d);
        assert!(serde_json::from_str::<Digest>("\"0xnope\"").is_err());
    }

    #[test]
    fn felt_conversion_roundtrips() {
        let d = Digest::from_hex("0x58c57fc0f90bac2bbd38c74169bca8d00d2f9be0998a6f21cc176765dde22a8")
            .unwrap();
        let f = Felt::from(d);
        assert_eq!(Digest::from(f), d);
    }
}
