#![forbid(unsafe_code)]
//! This crate builds [OpenZeppelin](https://github.com/OpenZeppelin/merkle-tree) compatible
//! "standard" merkle trees over an allowlist of addresses, and emits the root along with an
//! inclusion proof for every participant.
//!
//! Leaves are ABI-encoded tuples hashed twice with keccak256. Inner nodes hash their two children
//! in sorted order, so a proof is just a list of sibling hashes and can be checked on-chain with
//! `MerkleProof.verify`.

/// Solidity ABI encoding of leaf values.
pub mod abi;
/// The hard-coded generator inputs.
pub mod config;
/// The generation pipeline.
pub mod generate;
/// Keccak256 hashes and the sorted-pair hasher.
pub mod keccak_hash;
/// The document written to disk.
pub mod output;
/// The standard merkle tree.
pub mod standard_merkle;

pub use abi::{Address, LeafType, LeafValue};
pub use config::GeneratorConfig;
pub use generate::{generate, run};
pub use keccak_hash::{keccak256, Hash32, KeccakSortedHasher};
pub use output::{MerkleData, ProofRecord};
pub use standard_merkle::{
    error::TreeError,
    proof::Proof,
    tree::{MerkleHash, StandardMerkleTree, TreeDump},
};
