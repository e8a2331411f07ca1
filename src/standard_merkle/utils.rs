use super::error::TreeError;

// The tree is stored as a complete binary tree in a flat array: the root lives at index 0
// and the children of node `i` live at `2i + 1` and `2i + 2`.

/// Index of the left child of the node at `node_idx`
pub fn left_child(node_idx: usize) -> usize {
    2 * node_idx + 1
}

/// Index of the right child of the node at `node_idx`
pub fn right_child(node_idx: usize) -> usize {
    2 * node_idx + 2
}

/// Index of the parent of the node at `node_idx`. The root has no parent.
pub fn parent(node_idx: usize) -> Result<usize, TreeError> {
    if node_idx == 0 {
        return Err(TreeError::NoParent(node_idx));
    }
    Ok((node_idx - 1) / 2)
}

/// Index of the other child of this node's parent. Left children sit at odd indices.
pub fn sibling(node_idx: usize) -> Result<usize, TreeError> {
    if node_idx == 0 {
        return Err(TreeError::NoParent(node_idx));
    }
    if node_idx % 2 == 1 {
        Ok(node_idx + 1)
    } else {
        Ok(node_idx - 1)
    }
}

/// Whether `node_idx` addresses a node in a tree of `tree_len` nodes
pub fn is_tree_node(tree_len: usize, node_idx: usize) -> bool {
    node_idx < tree_len
}

/// Whether the node at `node_idx` has children.
/// In a complete tree a node has either two children or none, so checking the left one suffices.
pub fn is_internal_node(tree_len: usize, node_idx: usize) -> bool {
    is_tree_node(tree_len, left_child(node_idx))
}

/// Whether the node at `node_idx` exists and has no children
pub fn is_leaf_node(tree_len: usize, node_idx: usize) -> bool {
    is_tree_node(tree_len, node_idx) && !is_internal_node(tree_len, node_idx)
}
