//! Implements an OpenZeppelin `StandardMerkleTree` compatible merkle tree: sorted leaves, sorted
//! pairs, and double-hashed leaves, stored as a flat complete binary tree.

/// Defines errors that might arise while building or checking a tree.
pub mod error;
/// Defines proofs on the tree.
pub mod proof;
/// Defines the merkle tree itself.
pub mod tree;
/// Index arithmetic for the flat node array.
pub mod utils;
