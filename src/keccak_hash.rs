use core::{fmt, str::FromStr};

use sha3::{Digest, Keccak256};

use crate::standard_merkle::{error::TreeError, tree::MerkleHash};

/// The length of a hash in bytes
pub const HASH_LEN: usize = 32;

/// A 32 byte keccak256 digest.
///
/// Hashes order lexicographically by their bytes, which is the order used both to sort the leaves
/// of a tree and to sort the two children of an inner node before hashing them.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default)]
#[cfg_attr(
    any(test, feature = "borsh"),
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
pub struct Hash32(pub [u8; HASH_LEN]);

impl Hash32 {
    /// Returns the raw bytes of the hash
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Encodes the hash as lowercase hex with a `0x` prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<[u8; HASH_LEN]> for Hash32 {
    fn from(value: [u8; HASH_LEN]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Hash32 {
    type Error = TreeError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; HASH_LEN] = value
            .try_into()
            .map_err(|_| TreeError::InvalidHashLength(value.len()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for Hash32 {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)?;
        Self::try_from(bytes.as_slice())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({self})")
    }
}

impl serde::Serialize for Hash32 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for Hash32 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let encoded = <String as serde::Deserialize>::deserialize(deserializer)?;
        encoded.parse().map_err(serde::de::Error::custom)
    }
}

/// Hashes the given bytes with keccak256
pub fn keccak256(data: &[u8]) -> Hash32 {
    let digest: [u8; HASH_LEN] = Keccak256::digest(data).into();
    Hash32(digest)
}

/// The hasher used by OpenZeppelin's `StandardMerkleTree`.
///
/// Leaves are hashed twice so that a leaf preimage can never be mistaken for the 64 byte
/// preimage of an inner node. Inner nodes hash their children in sorted order, which lets a
/// verifier fold a proof without knowing whether each sibling sat on the left or the right.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeccakSortedHasher;

impl KeccakSortedHasher {
    /// Create a new instance of the hasher
    pub fn new() -> Self {
        KeccakSortedHasher
    }
}

impl MerkleHash for KeccakSortedHasher {
    type Output = Hash32;

    fn hash_leaf(&self, data: &[u8]) -> Self::Output {
        keccak256(keccak256(data).as_ref())
    }

    fn hash_nodes(&self, left: &Self::Output, right: &Self::Output) -> Self::Output {
        let (first, second) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        let digest: [u8; HASH_LEN] = Keccak256::new()
            .chain_update(first)
            .chain_update(second)
            .finalize()
            .into();
        Hash32(digest)
    }
}
