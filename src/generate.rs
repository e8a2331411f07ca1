use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::abi::parse_values;
use crate::config::GeneratorConfig;
use crate::output::MerkleData;
use crate::standard_merkle::{error::TreeError, tree::StandardMerkleTree};

/// Builds the tree over the configured participants and collects one proof per participant.
/// Nothing is written to disk.
pub fn generate(config: &GeneratorConfig) -> Result<MerkleData, TreeError> {
    // Each participant becomes a one-field tuple
    let values = config
        .participants
        .iter()
        .map(|participant| parse_values(&config.leaf_types, &[participant]))
        .collect::<Result<Vec<_>, TreeError>>()?;

    let tree = StandardMerkleTree::of(values, config.leaf_types.clone())?;
    info!(root = %tree.root(), leaves = tree.len(), "built merkle tree");
    for (index, value) in tree.entries() {
        let leaf = tree.leaf_hash(value)?;
        debug!(index, %leaf, "leaf");
    }

    MerkleData::from_tree(&tree, &config.participants)
}

/// Generates the merkle data and writes it to the configured output path.
/// On any error, the output file is left untouched.
pub fn run(config: &GeneratorConfig) -> Result<MerkleData> {
    let data = generate(config).context("Failed to build merkle tree")?;
    data.write_to(&config.output_path)
        .context("Failed to write merkle data")?;
    Ok(data)
}
