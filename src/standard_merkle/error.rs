use thiserror::Error;

use crate::abi::LeafType;

/// An error that occurred while building, querying or checking a standard merkle tree.
#[derive(Debug, Error, PartialEq, Clone)]
pub enum TreeError {
    /// The tree was built from an empty set of values. Even a single-leaf tree needs one leaf.
    #[error("expected a non-zero number of leaves")]
    EmptyTree,
    /// A value index was past the end of the value list
    #[error("index {index} is out of bounds for a tree with {len} values")]
    IndexOutOfBounds { index: usize, len: usize },
    /// The requested value hashes to a leaf which is not in the tree
    #[error("leaf is not in the tree")]
    LeafNotFound,
    /// The proof produced for a value does not lead back to the root
    #[error("unable to prove value at index {0}")]
    InvalidProof(usize),
    /// The node at the given index does not match its children or its value
    #[error("merkle tree is invalid at node {0}")]
    InvalidTree(usize),
    /// The root has no parent and no sibling
    #[error("node {0} has no parent")]
    NoParent(usize),
    /// A dumped tree was in a format this crate does not understand
    #[error("unknown tree dump format {0:?}")]
    UnknownFormat(String),
    /// An ABI type name that the leaf encoder does not support
    #[error("unsupported leaf type {0:?}")]
    UnsupportedType(String),
    /// The number of values in a leaf doesn't match the leaf encoding
    #[error("expected {expected} values per leaf, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    /// A value's type doesn't match the type declared for its position
    #[error("expected a value of type {expected}, got {got}")]
    TypeMismatch { expected: LeafType, got: LeafType },
    /// The string is not a 20-byte hex address
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    /// A mixed-case address whose casing is not its EIP-55 checksum
    #[error("bad address checksum {0:?}")]
    InvalidChecksum(String),
    /// Malformed hex
    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    /// A hash that is not exactly 32 bytes long
    #[error("invalid hash length: expected 32 bytes, got {0}")]
    InvalidHashLength(usize),
    /// The participant list doesn't line up with the values the tree was built from
    #[error("expected {expected} participants, got {got}")]
    ParticipantCountMismatch { expected: usize, got: usize },
    /// The string cannot be parsed as a value of the given type
    #[error("invalid {ty} value {value:?}")]
    InvalidValue { ty: LeafType, value: String },
}
