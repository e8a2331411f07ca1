use std::collections::HashMap;
use std::fmt::{Debug, Write};
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::TreeError;
use super::proof::Proof;
use super::utils::{is_internal_node, is_leaf_node, left_child, parent, right_child, sibling};
use crate::abi::{self, LeafType, LeafValue};
use crate::keccak_hash::{Hash32, KeccakSortedHasher};

/// The format tag written into every [`TreeDump`]
pub const STANDARD_V1_FORMAT: &str = "standard-v1";

/// A trait for hashing data into a merkle tree
pub trait MerkleHash {
    /// The output of this hasher.
    #[cfg(not(any(test, feature = "borsh")))]
    type Output: Debug
        + PartialEq
        + Eq
        + Clone
        + Default
        + Hash
        + Ord
        + Serialize
        + serde::de::DeserializeOwned;

    /// The output of this hasher.
    #[cfg(any(test, feature = "borsh"))]
    type Output: Debug
        + PartialEq
        + Eq
        + Clone
        + Default
        + Hash
        + Ord
        + Serialize
        + serde::de::DeserializeOwned
        + borsh::BorshSerialize
        + borsh::BorshDeserialize;

    /// Hashes an encoded leaf. This operation *should* be domain separated from `hash_nodes`.
    fn hash_leaf(&self, data: &[u8]) -> Self::Output;
    /// Hashes two digests into one.
    fn hash_nodes(&self, l: &Self::Output, r: &Self::Output) -> Self::Output;
}

#[derive(Debug, Clone, PartialEq)]
struct IndexedValue {
    value: Vec<LeafValue>,
    tree_index: usize,
}

/// A serializable snapshot of a tree, compatible with OpenZeppelin's `StandardMerkleTree.dump()`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeDump<H> {
    /// The dump format. Always [`STANDARD_V1_FORMAT`].
    pub format: String,
    /// The ABI types of the fields of each value
    pub leaf_encoding: Vec<LeafType>,
    /// Every node of the tree, root first
    pub tree: Vec<H>,
    /// The values in input order
    pub values: Vec<DumpedValue>,
}

/// One value of a [`TreeDump`], in its string form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpedValue {
    /// The fields of the value, one string per leaf type
    pub value: Vec<String>,
    /// The position of the value's leaf in [`TreeDump::tree`]
    pub tree_index: usize,
}

/// A merkle tree over ABI-encoded values, laid out the way OpenZeppelin's `StandardMerkleTree`
/// lays it out.
///
/// Leaves are hashed, sorted, and stored in the last `n` slots of a flat array of `2n - 1` nodes,
/// with the smallest hash in the very last slot. Inner node `i` is the sorted-pair hash of nodes
/// `2i + 1` and `2i + 2`, and the root sits at index 0. Odd leaf counts need no padding: the
/// array is always a complete binary tree, some leaves simply sit one level higher than others.
///
/// ```ascii
///  values: [v0, v1, v2]        sorted leaf hashes: h(v1) < h(v2) < h(v0)
///
///                 0
///              /     \
///             1     2: h(v0)
///            / \
///     3: h(v2)  4: h(v1)
/// ```
///
/// Values keep their input order; the position of a value in the input list is the index used
/// to request its proof.
pub struct StandardMerkleTree<M>
where
    M: MerkleHash,
{
    tree: Vec<M::Output>,
    values: Vec<IndexedValue>,
    leaf_types: Vec<LeafType>,
    hash_lookup: HashMap<M::Output, usize>,
    hasher: M,
}

impl StandardMerkleTree<KeccakSortedHasher> {
    /// Builds a keccak256 tree over `values`, each of which must match `leaf_types`
    pub fn of(values: Vec<Vec<LeafValue>>, leaf_types: Vec<LeafType>) -> Result<Self, TreeError> {
        Self::with_hasher(values, leaf_types, KeccakSortedHasher::new())
    }

    /// Checks a proof for `values` against a published root, without the tree at hand
    pub fn verify_against(
        root: &Hash32,
        leaf_types: &[LeafType],
        values: &[LeafValue],
        proof: &Proof<KeccakSortedHasher>,
    ) -> Result<bool, TreeError> {
        let hasher = KeccakSortedHasher::new();
        let leaf = hasher.hash_leaf(&abi::encode(leaf_types, values)?);
        Ok(proof.verify_with_hasher(root, &leaf, &hasher))
    }
}

impl<M> StandardMerkleTree<M>
where
    M: MerkleHash + Default,
{
    /// Restores a tree from a dump, re-checking every node
    pub fn load(dump: TreeDump<M::Output>) -> Result<Self, TreeError> {
        Self::load_with_hasher(dump, M::default())
    }
}

impl<M> StandardMerkleTree<M>
where
    M: MerkleHash,
{
    /// Builds a tree over `values` using the given hasher
    pub fn with_hasher(
        values: Vec<Vec<LeafValue>>,
        leaf_types: Vec<LeafType>,
        hasher: M,
    ) -> Result<Self, TreeError> {
        let mut hashed_values = values
            .iter()
            .enumerate()
            .map(|(value_idx, value)| {
                let encoded = abi::encode(&leaf_types, value)?;
                Ok((hasher.hash_leaf(&encoded), value_idx))
            })
            .collect::<Result<Vec<_>, TreeError>>()?;
        // Stable, so duplicate values keep their relative order
        hashed_values.sort_by(|a, b| a.0.cmp(&b.0));

        let leaves = hashed_values.iter().map(|(hash, _)| hash.clone()).collect();
        let tree = build_tree(leaves, &hasher)?;

        let mut tree_indices = vec![0; values.len()];
        for (leaf_idx, (_, value_idx)) in hashed_values.iter().enumerate() {
            tree_indices[*value_idx] = tree.len() - leaf_idx - 1;
        }
        let values = values
            .into_iter()
            .zip(tree_indices)
            .map(|(value, tree_index)| IndexedValue { value, tree_index })
            .collect();

        Ok(Self::from_parts(tree, values, leaf_types, hasher))
    }

    /// Restores a tree from a dump using the given hasher, re-checking every node
    pub fn load_with_hasher(dump: TreeDump<M::Output>, hasher: M) -> Result<Self, TreeError> {
        if dump.format != STANDARD_V1_FORMAT {
            return Err(TreeError::UnknownFormat(dump.format));
        }
        if dump.tree.is_empty() {
            return Err(TreeError::EmptyTree);
        }
        let values = dump
            .values
            .iter()
            .map(|dumped| {
                Ok(IndexedValue {
                    value: abi::parse_values(&dump.leaf_encoding, &dumped.value)?,
                    tree_index: dumped.tree_index,
                })
            })
            .collect::<Result<Vec<_>, TreeError>>()?;

        let tree = Self::from_parts(dump.tree, values, dump.leaf_encoding, hasher);
        tree.validate()?;
        Ok(tree)
    }

    fn from_parts(
        tree: Vec<M::Output>,
        values: Vec<IndexedValue>,
        leaf_types: Vec<LeafType>,
        hasher: M,
    ) -> Self {
        let mut hash_lookup = HashMap::with_capacity(values.len());
        for (value_idx, value) in values.iter().enumerate() {
            if let Some(leaf) = tree.get(value.tree_index) {
                // The first of several identical values wins
                hash_lookup.entry(leaf.clone()).or_insert(value_idx);
            }
        }
        Self {
            tree,
            values,
            leaf_types,
            hash_lookup,
            hasher,
        }
    }

    /// Returns the root of the tree
    pub fn root(&self) -> &M::Output {
        // Construction rejects empty trees, so the root always exists
        &self.tree[0]
    }

    /// The number of values in the tree
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tree holds no values. Always false for a successfully built tree.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The leaf encoding of the tree
    pub fn leaf_types(&self) -> &[LeafType] {
        &self.leaf_types
    }

    /// Iterates over the values of the tree in input order, along with their indices
    pub fn entries(&self) -> impl Iterator<Item = (usize, &[LeafValue])> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(idx, indexed)| (idx, indexed.value.as_slice()))
    }

    /// Hashes a value the way the leaves of this tree are hashed
    pub fn leaf_hash(&self, values: &[LeafValue]) -> Result<M::Output, TreeError> {
        let encoded = abi::encode(&self.leaf_types, values)?;
        Ok(self.hasher.hash_leaf(&encoded))
    }

    /// Finds the input index of a value
    pub fn leaf_lookup(&self, values: &[LeafValue]) -> Result<usize, TreeError> {
        let leaf = self.leaf_hash(values)?;
        self.hash_lookup
            .get(&leaf)
            .copied()
            .ok_or(TreeError::LeafNotFound)
    }

    /// Builds the proof for the value at `index` in the input list.
    ///
    /// The index must be the value's position in the list the tree was built from, not its
    /// position among the sorted leaves.
    pub fn get_proof(&self, index: usize) -> Result<Proof<M>, TreeError> {
        let leaf = self.validate_value(index)?;

        let mut siblings = Vec::new();
        let mut node_idx = self.values[index].tree_index;
        while node_idx > 0 {
            siblings.push(self.tree[sibling(node_idx)?].clone());
            node_idx = parent(node_idx)?;
        }
        let proof = Proof::new(siblings);

        if !proof.verify_with_hasher(self.root(), &leaf, &self.hasher) {
            return Err(TreeError::InvalidProof(index));
        }
        debug!(index, depth = proof.len(), "built inclusion proof");
        Ok(proof)
    }

    /// Builds the proof for a value, looking its index up by leaf hash
    pub fn get_proof_for_value(&self, values: &[LeafValue]) -> Result<Proof<M>, TreeError> {
        let index = self.leaf_lookup(values)?;
        self.get_proof(index)
    }

    /// Checks a proof for the value at `index` against this tree's root
    pub fn verify(&self, index: usize, proof: &Proof<M>) -> Result<bool, TreeError> {
        let value = self.values.get(index).ok_or(TreeError::IndexOutOfBounds {
            index,
            len: self.values.len(),
        })?;
        let leaf = self.leaf_hash(&value.value)?;
        Ok(proof.verify_with_hasher(self.root(), &leaf, &self.hasher))
    }

    /// Checks every value against its leaf, and every inner node against its children
    pub fn validate(&self) -> Result<(), TreeError> {
        for index in 0..self.values.len() {
            self.validate_value(index)?;
        }
        for (node_idx, node) in self.tree.iter().enumerate() {
            if is_internal_node(self.tree.len(), node_idx) {
                // A complete tree never has an inner node with a single child
                if right_child(node_idx) >= self.tree.len() {
                    return Err(TreeError::InvalidTree(node_idx));
                }
                let expected = self.hasher.hash_nodes(
                    &self.tree[left_child(node_idx)],
                    &self.tree[right_child(node_idx)],
                );
                if &expected != node {
                    return Err(TreeError::InvalidTree(node_idx));
                }
            }
        }
        Ok(())
    }

    /// Checks that the value at `index` hashes to the leaf it claims to occupy, returning that leaf
    fn validate_value(&self, index: usize) -> Result<M::Output, TreeError> {
        let value = self.values.get(index).ok_or(TreeError::IndexOutOfBounds {
            index,
            len: self.values.len(),
        })?;
        if !is_leaf_node(self.tree.len(), value.tree_index) {
            return Err(TreeError::InvalidTree(value.tree_index));
        }
        let leaf = self.leaf_hash(&value.value)?;
        if leaf != self.tree[value.tree_index] {
            return Err(TreeError::InvalidTree(value.tree_index));
        }
        Ok(leaf)
    }

    /// Snapshots the tree in a form that can be serialized and later restored with [`Self::load`]
    pub fn dump(&self) -> TreeDump<M::Output> {
        TreeDump {
            format: STANDARD_V1_FORMAT.to_string(),
            leaf_encoding: self.leaf_types.clone(),
            tree: self.tree.clone(),
            values: self
                .values
                .iter()
                .map(|indexed| DumpedValue {
                    value: indexed.value.iter().map(ToString::to_string).collect(),
                    tree_index: indexed.tree_index,
                })
                .collect(),
        }
    }

    /// Draws the tree, one node per line, depth-first from the root
    pub fn render(&self) -> String
    where
        M::Output: AsRef<[u8]>,
    {
        // Each path entry records whether the node on that level has a sibling still to be drawn
        let mut stack: Vec<(usize, Vec<bool>)> = vec![(0, Vec::new())];
        let mut out = String::new();
        while let Some((node_idx, path)) = stack.pop() {
            if let Some((last, ancestors)) = path.split_last() {
                for more in ancestors {
                    out.push_str(if *more { "│  " } else { "   " });
                }
                out.push_str(if *last { "├─ " } else { "└─ " });
            }
            // Writing to a String never fails
            let _ = writeln!(
                out,
                "{}) 0x{}",
                node_idx,
                hex::encode(self.tree[node_idx].as_ref())
            );
            if right_child(node_idx) < self.tree.len() {
                let mut right_path = path.clone();
                right_path.push(false);
                let mut left_path = path;
                left_path.push(true);
                stack.push((right_child(node_idx), right_path));
                stack.push((left_child(node_idx), left_path));
            }
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Lays the (already sorted) leaves out in the last slots of the node array and hashes the
/// inner nodes bottom-up.
fn build_tree<M: MerkleHash>(
    leaves: Vec<M::Output>,
    hasher: &M,
) -> Result<Vec<M::Output>, TreeError> {
    if leaves.is_empty() {
        return Err(TreeError::EmptyTree);
    }
    let num_leaves = leaves.len();
    let tree_len = 2 * num_leaves - 1;
    let mut tree = vec![M::Output::default(); tree_len];
    for (leaf_idx, leaf) in leaves.into_iter().enumerate() {
        tree[tree_len - 1 - leaf_idx] = leaf;
    }
    for node_idx in (0..tree_len - num_leaves).rev() {
        tree[node_idx] = hasher.hash_nodes(&tree[left_child(node_idx)], &tree[right_child(node_idx)]);
    }
    Ok(tree)
}
