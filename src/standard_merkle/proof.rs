use super::tree::MerkleHash;

/// An inclusion proof for a single leaf of a standard merkle tree.
///
/// The siblings are ordered from the leaf up to (but excluding) the root. Because inner nodes
/// hash their children in sorted order, no left/right path bits are needed.
#[derive(Debug, PartialEq, Clone)]
#[cfg_attr(
    any(test, feature = "borsh"),
    derive(borsh::BorshSerialize, borsh::BorshDeserialize)
)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Proof<M: MerkleHash> {
    /// The siblings to be used to build the path to the root.
    pub siblings: Vec<M::Output>,
}

impl<M: MerkleHash> Default for Proof<M> {
    fn default() -> Self {
        Self {
            siblings: Default::default(),
        }
    }
}

impl<M> Proof<M>
where
    M: MerkleHash + Default,
{
    /// Recomputes the root implied by this proof for the given leaf hash
    pub fn process(&self, leaf_hash: &M::Output) -> M::Output {
        self.process_with_hasher(leaf_hash, &M::default())
    }

    /// Checks that this proof leads from `leaf_hash` to `root`
    pub fn verify(&self, root: &M::Output, leaf_hash: &M::Output) -> bool {
        self.verify_with_hasher(root, leaf_hash, &M::default())
    }
}

impl<M> Proof<M>
where
    M: MerkleHash,
{
    /// Creates a proof from its siblings
    pub fn new(siblings: Vec<M::Output>) -> Self {
        Self { siblings }
    }

    /// Recomputes the root implied by this proof for the given leaf hash
    pub fn process_with_hasher(&self, leaf_hash: &M::Output, hasher: &M) -> M::Output {
        self.siblings
            .iter()
            .fold(leaf_hash.clone(), |node, sibling| {
                hasher.hash_nodes(&node, sibling)
            })
    }

    /// Checks that this proof leads from `leaf_hash` to `root`
    pub fn verify_with_hasher(&self, root: &M::Output, leaf_hash: &M::Output, hasher: &M) -> bool {
        &self.process_with_hasher(leaf_hash, hasher) == root
    }

    /// Returns the siblings provided as part of the proof.
    pub fn siblings(&self) -> &[M::Output] {
        &self.siblings
    }

    /// The number of siblings, which is the depth of the proven leaf
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    /// Whether the proof is empty. Only the leaf of a single-leaf tree has an empty proof.
    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }
}
