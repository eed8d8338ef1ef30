//! Commitment hashing.
//!
//! Leaves are starknet-keccak digests of fragment text; internal nodes are
//! Pedersen hashes of the numerically sorted child pair. Both match what the
//! Starknet attestor commits to, so neither may be swapped for a generic hash.

use crate::digest::Digest;
use sha3::{Digest as _, Keccak256};
use starknet_crypto::{pedersen_hash, Felt};

/// Hashing interface used by Merkle commitments.
///
/// Implementations must be pure and deterministic.
pub trait CommitmentHasher {
    /// Hash an arbitrary byte string into a leaf digest.
    fn hash_bytes(&self, bytes: &[u8]) -> Digest;

    /// Combine two child digests into their parent.
    ///
    /// `left`/`right` are given in tree order; an implementation may
    /// normalize the order (the Starknet one does).
    fn hash_pair(&self, left: &Digest, right: &Digest) -> Digest;
}

/// Starknet commitment hashes: starknet-keccak leaves, sorted Pedersen nodes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StarknetHasher;

impl CommitmentHasher for StarknetHasher {
    #[inline]
    fn hash_bytes(&self, bytes: &[u8]) -> Digest {
        starknet_keccak(bytes)
    }

    fn hash_pair(&self, left: &Digest, right: &Digest) -> Digest {
        let (lo, hi) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        Digest::from(pedersen_hash(&Felt::from(*lo), &Felt::from(*hi)))
    }
}

/// Keccak-256 truncated to its low 250 bits.
#[must_use]
pub fn starknet_keccak(bytes: &[u8]) -> Digest {
    let h = Keccak256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&h);
    out[0] &= 0x03;
    Digest::from_reduced(out)
}

/// Leaf digest of one text fragment (UTF-8 bytes).
#[inline]
#[must_use]
pub fn hash_fragment(text: &str) -> Digest {
    starknet_keccak(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_matches_published_selector() {
        // Entry-point selector of `transfer`.
        let want = Digest::from_hex(
            "0x0083afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e",
        )
        .unwrap();
        assert_eq!(starknet_keccak(b"transfer"), want);
    }

    #[test]
    fn keccak_output_is_250_bits() {
        for input in [&b""[..], b"a", b"SWAP|ETH|1|USDC", &[0xff; 200]] {
            assert!(starknet_keccak(input).bit_len() <= 250);
        }
    }

    #[test]
    fn fragment_hash_is_utf8_keccak() {
        let text = "swap 1 eth → usdc";
        assert_eq!(hash_fragment(text), starknet_keccak(text.as_bytes()));
        assert_ne!(hash_fragment(text), hash_fragment("swap 1 eth"));
    }

    #[test]
    fn pair_hash_is_order_normalized() {
        let h = StarknetHasher;
        let a = h.hash_bytes(b"left");
        let b = h.hash_bytes(b"right");
        assert_eq!(h.hash_pair(&a, &b), h.hash_pair(&b, &a));
        assert_ne!(h.hash_pair(&a, &b), h.hash_pair(&a, &a));
    }

    #[test]
    fn pair_hash_is_pedersen_of_sorted_pair() {
        let h = StarknetHasher;
        let lo = Digest::from_hex("0x1").unwrap();
        let hi = Digest::from_hex("0x2").unwrap();
        let want = Digest::from(pedersen_hash(&Felt::from(1u64), &Felt::from(2u64)));
        assert_eq!(h.hash_pair(&hi, &lo), want);
    }
}
