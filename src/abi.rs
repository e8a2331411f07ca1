//! Solidity `abi.encode` for the static types that can appear in a standard merkle tree leaf.
//!
//! Every supported type occupies exactly one 32 byte word, so a leaf of `n` values always encodes
//! to `32 * n` bytes.

use core::{fmt, str::FromStr};

pub use alloy_primitives::Address;
use alloy_primitives::{AddressError, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

use crate::standard_merkle::error::TreeError;

/// The size of an ABI word in bytes
pub const WORD_LEN: usize = 32;

/// The ABI type of one field of a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeafType {
    Address,
    #[serde(alias = "uint")]
    Uint256,
    Bytes32,
    Bool,
}

impl LeafType {
    /// The Solidity name of the type
    pub fn name(&self) -> &'static str {
        match self {
            LeafType::Address => "address",
            LeafType::Uint256 => "uint256",
            LeafType::Bytes32 => "bytes32",
            LeafType::Bool => "bool",
        }
    }

    /// Parses a value of this type from its usual string form
    pub fn parse_value(&self, raw: &str) -> Result<LeafValue, TreeError> {
        let raw = raw.trim();
        match self {
            LeafType::Address => parse_address(raw).map(LeafValue::Address),
            LeafType::Uint256 => {
                // An empty string would otherwise read as zero
                if raw.is_empty() || raw == "0x" {
                    return Err(self.invalid(raw));
                }
                let value = U256::from_str(raw).map_err(|_| self.invalid(raw))?;
                Ok(LeafValue::Uint256(value))
            }
            LeafType::Bytes32 => {
                let value = B256::from_str(raw).map_err(|_| self.invalid(raw))?;
                Ok(LeafValue::Bytes32(value))
            }
            LeafType::Bool => match raw {
                "true" => Ok(LeafValue::Bool(true)),
                "false" => Ok(LeafValue::Bool(false)),
                _ => Err(self.invalid(raw)),
            },
        }
    }

    fn invalid(&self, raw: &str) -> TreeError {
        TreeError::InvalidValue {
            ty: *self,
            value: raw.to_string(),
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LeafType {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "address" => Ok(LeafType::Address),
            "uint256" | "uint" => Ok(LeafType::Uint256),
            "bytes32" => Ok(LeafType::Bytes32),
            "bool" => Ok(LeafType::Bool),
            other => Err(TreeError::UnsupportedType(other.to_string())),
        }
    }
}

/// Parses a 20 byte hex address, with or without the `0x` prefix.
///
/// Single-case input is taken as is. Mixed-case input must carry a valid EIP-55 checksum.
pub fn parse_address(raw: &str) -> Result<Address, TreeError> {
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        return Address::parse_checksummed(format!("0x{digits}"), None).map_err(|err| match err {
            AddressError::InvalidChecksum => TreeError::InvalidChecksum(raw.to_string()),
            _ => TreeError::InvalidAddress(raw.to_string()),
        });
    }
    Address::from_str(digits).map_err(|_| TreeError::InvalidAddress(raw.to_string()))
}

/// A single typed value inside a leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafValue {
    Address(Address),
    Uint256(U256),
    Bytes32(B256),
    Bool(bool),
}

impl LeafValue {
    /// The ABI type of this value
    pub fn leaf_type(&self) -> LeafType {
        match self {
            LeafValue::Address(_) => LeafType::Address,
            LeafValue::Uint256(_) => LeafType::Uint256,
            LeafValue::Bytes32(_) => LeafType::Bytes32,
            LeafValue::Bool(_) => LeafType::Bool,
        }
    }

    /// The 32 byte word this value occupies in an ABI encoding
    pub fn abi_encode(&self) -> Vec<u8> {
        match self {
            LeafValue::Address(address) => address.abi_encode(),
            LeafValue::Uint256(value) => value.abi_encode(),
            LeafValue::Bytes32(value) => value.abi_encode(),
            LeafValue::Bool(value) => value.abi_encode(),
        }
    }
}

impl fmt::Display for LeafValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Addresses display with their checksum
            LeafValue::Address(address) => fmt::Display::fmt(address, f),
            LeafValue::Uint256(value) => fmt::Display::fmt(value, f),
            LeafValue::Bytes32(value) => fmt::Display::fmt(value, f),
            LeafValue::Bool(value) => fmt::Display::fmt(value, f),
        }
    }
}

/// Parses one value per declared type
pub fn parse_values(
    leaf_types: &[LeafType],
    raw: &[impl AsRef<str>],
) -> Result<Vec<LeafValue>, TreeError> {
    if leaf_types.len() != raw.len() {
        return Err(TreeError::ArityMismatch {
            expected: leaf_types.len(),
            got: raw.len(),
        });
    }
    leaf_types
        .iter()
        .zip(raw)
        .map(|(ty, raw)| ty.parse_value(raw.as_ref()))
        .collect()
}

/// ABI-encodes `values` as a tuple of `leaf_types`.
///
/// A tuple of static types encodes as its fields' words laid end to end.
pub fn encode(leaf_types: &[LeafType], values: &[LeafValue]) -> Result<Vec<u8>, TreeError> {
    if leaf_types.len() != values.len() {
        return Err(TreeError::ArityMismatch {
            expected: leaf_types.len(),
            got: values.len(),
        });
    }
    let mut out = Vec::with_capacity(WORD_LEN * values.len());
    for (ty, value) in leaf_types.iter().zip(values) {
        if value.leaf_type() != *ty {
            return Err(TreeError::TypeMismatch {
                expected: *ty,
                got: value.leaf_type(),
            });
        }
        out.extend_from_slice(&value.abi_encode());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHECKSUMMED: &str = "0xf9681Cb4b3Fd6ea3512BAfADCDcb25be41affc7a";

    #[test]
    fn test_parse_address_with_and_without_prefix() {
        let with_prefix = parse_address(CHECKSUMMED).unwrap();
        let without_prefix = parse_address(&CHECKSUMMED[2..]).unwrap();
        assert_eq!(with_prefix, without_prefix);
        assert_eq!(with_prefix[0], 0xf9);
        assert_eq!(with_prefix[19], 0x7a);
    }

    #[test]
    fn test_parse_address_single_case_skips_checksum() {
        let lower = parse_address(&CHECKSUMMED.to_lowercase()).unwrap();
        let upper = parse_address(&format!("0x{}", CHECKSUMMED[2..].to_uppercase())).unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_parse_address_rejects_bad_checksum() {
        // Same address, first letter flipped to uppercase
        let bad = "0xF9681Cb4b3Fd6ea3512BAfADCDcb25be41affc7a";
        assert_eq!(
            parse_address(bad),
            Err(TreeError::InvalidChecksum(bad.to_string()))
        );
    }

    #[test]
    fn test_parse_address_invalid() {
        assert!(matches!(
            parse_address("0x1234"),
            Err(TreeError::InvalidAddress(_))
        ));
        assert!(matches!(
            parse_address("0xghijklmnopqrstuvwxyzghijklmnopqrstuvwxyz"),
            Err(TreeError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_address_displays_with_checksum() {
        let value = LeafType::Address
            .parse_value(&CHECKSUMMED.to_lowercase())
            .unwrap();
        assert_eq!(value.to_string(), CHECKSUMMED);
    }

    #[test]
    fn test_encode_address_is_left_padded() {
        let address = parse_address(CHECKSUMMED).unwrap();
        let encoded = encode(&[LeafType::Address], &[LeafValue::Address(address)]).unwrap();
        assert_eq!(encoded.len(), WORD_LEN);
        assert_eq!(encoded[..12], [0u8; 12]);
        assert_eq!(encoded[12..], address[..]);
    }

    #[test]
    fn test_encode_tuple_concatenates_words() {
        let address = parse_address(CHECKSUMMED).unwrap();
        let values = [
            LeafValue::Address(address),
            LeafType::Uint256.parse_value("1").unwrap(),
            LeafValue::Bool(true),
        ];
        let encoded = encode(
            &[LeafType::Address, LeafType::Uint256, LeafType::Bool],
            &values,
        )
        .unwrap();
        assert_eq!(encoded.len(), 3 * WORD_LEN);
        assert_eq!(encoded[12..WORD_LEN], address[..]);
        assert_eq!(encoded[2 * WORD_LEN - 1], 1);
        assert_eq!(encoded[3 * WORD_LEN - 1], 1);
    }

    #[test]
    fn test_encode_checks_schema() {
        let address = parse_address(CHECKSUMMED).unwrap();
        assert_eq!(
            encode(&[LeafType::Address, LeafType::Uint256], &[LeafValue::Address(address)]),
            Err(TreeError::ArityMismatch {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            encode(&[LeafType::Uint256], &[LeafValue::Address(address)]),
            Err(TreeError::TypeMismatch {
                expected: LeafType::Uint256,
                got: LeafType::Address
            })
        );
    }

    #[test]
    fn test_uint256_decimal_and_hex() {
        let from_decimal = LeafType::Uint256.parse_value("5000000000000000000").unwrap();
        let from_hex = LeafType::Uint256.parse_value("0x4563918244f40000").unwrap();
        assert_eq!(from_decimal, from_hex);
        assert_eq!(from_decimal.to_string(), "5000000000000000000");
        assert_eq!(LeafType::Uint256.parse_value("0").unwrap().to_string(), "0");

        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let parsed = LeafType::Uint256.parse_value(max).unwrap();
        assert_eq!(parsed, LeafValue::Uint256(U256::MAX));
        assert_eq!(parsed.abi_encode(), vec![0xff; WORD_LEN]);
        assert_eq!(parsed.to_string(), max);
    }

    #[test]
    fn test_uint256_rejects_overflow_and_garbage() {
        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(LeafType::Uint256.parse_value(too_big).is_err());
        assert!(LeafType::Uint256.parse_value("-1").is_err());
        assert!(LeafType::Uint256.parse_value("").is_err());
        assert!(LeafType::Uint256.parse_value("0x").is_err());
    }

    #[test]
    fn test_bool_and_bytes32() {
        assert_eq!(LeafType::Bool.parse_value("true").unwrap().abi_encode()[31], 1);
        assert_eq!(
            LeafType::Bool.parse_value("false").unwrap().abi_encode(),
            vec![0u8; WORD_LEN]
        );
        assert!(LeafType::Bool.parse_value("yes").is_err());

        let raw = format!("0x{}", "ab".repeat(32));
        let value = LeafType::Bytes32.parse_value(&raw).unwrap();
        assert_eq!(value.abi_encode(), vec![0xab; WORD_LEN]);
        assert_eq!(value.to_string(), raw);
        assert!(LeafType::Bytes32.parse_value("0xabcd").is_err());
    }

    #[test]
    fn test_leaf_type_names() {
        for ty in [
            LeafType::Address,
            LeafType::Uint256,
            LeafType::Bytes32,
            LeafType::Bool,
        ] {
            assert_eq!(ty.to_string().parse::<LeafType>().unwrap(), ty);
        }
        assert_eq!(
            "string".parse::<LeafType>(),
            Err(TreeError::UnsupportedType("string".to_string()))
        );
    }

    #[test]
    fn test_uint_alias_parses_and_deserializes() {
        assert_eq!("uint".parse::<LeafType>().unwrap(), LeafType::Uint256);
        let parsed: Vec<LeafType> = serde_json::from_str("[\"uint\", \"uint256\"]").unwrap();
        assert_eq!(parsed, vec![LeafType::Uint256, LeafType::Uint256]);
        assert_eq!(
            serde_json::to_string(&LeafType::Uint256).unwrap(),
            "\"uint256\""
        );
    }
}
