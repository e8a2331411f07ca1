use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::keccak_hash::{Hash32, KeccakSortedHasher};
use crate::standard_merkle::{error::TreeError, proof::Proof, tree::StandardMerkleTree};

/// A participant together with the proof of its inclusion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofRecord {
    /// The address exactly as it was configured
    pub address: String,
    /// The sibling hashes from the participant's leaf up to the root
    pub proof: Proof<KeccakSortedHasher>,
}

/// The document written by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MerkleData {
    /// The root to publish on-chain
    pub root: Hash32,
    /// One record per participant, in configuration order
    pub participants: Vec<ProofRecord>,
}

impl MerkleData {
    /// Pairs each participant with its proof. `participants` must be the list, in the order,
    /// the tree was built from.
    pub fn from_tree(
        tree: &StandardMerkleTree<KeccakSortedHasher>,
        participants: &[impl AsRef<str>],
    ) -> Result<Self, TreeError> {
        if participants.len() != tree.len() {
            return Err(TreeError::ParticipantCountMismatch {
                expected: tree.len(),
                got: participants.len(),
            });
        }
        let participants = participants
            .iter()
            .enumerate()
            .map(|(index, address)| {
                Ok(ProofRecord {
                    address: address.as_ref().to_string(),
                    proof: tree.get_proof(index)?,
                })
            })
            .collect::<Result<Vec<_>, TreeError>>()?;
        Ok(Self {
            root: *tree.root(),
            participants,
        })
    }

    /// Writes the document as compact JSON.
    ///
    /// The JSON goes to a temporary sibling file first and is then renamed over `path`, so an
    /// interrupted run never leaves a truncated file behind.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize merkle data")?;
        write_file_atomic(path, &json)?;
        info!(path = %path.display(), bytes = json.len(), "wrote merkle data");
        Ok(())
    }

    /// Reads a document previously written with [`Self::write_to`]
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse merkle data in {}", path.display()))
    }
}

/// Writes `contents` to `path` through a temporary file in the same directory.
/// The temporary file is removed again if any step fails.
pub fn write_file_atomic(path: &Path, contents: &str) -> Result<()> {
    let temp_path = temp_path_for(path);
    let result = write_then_rename(&temp_path, path, contents);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// `merkle_data.json` becomes `merkle_data.json.tmp`
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_then_rename(temp_path: &Path, path: &Path, contents: &str) -> Result<()> {
    let mut file = File::create(temp_path)
        .with_context(|| format!("Failed to create temp file {}", temp_path.display()))?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.sync_all().context("Failed to flush temp file")?;
    fs::rename(temp_path, path)
        .with_context(|| format!("Failed to move temp file to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::LeafType;
    use crate::keccak_hash::keccak256;

    fn sample() -> MerkleData {
        MerkleData {
            root: keccak256(b"root"),
            participants: vec![ProofRecord {
                address: "0xf9681Cb4b3Fd6ea3512BAfADCDcb25be41affc7a".to_string(),
                proof: Proof::new(vec![keccak256(b"a"), keccak256(b"b")]),
            }],
        }
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&sample()).unwrap();
        let expected = format!(
            "{{\"root\":\"{}\",\"participants\":[{{\"address\":\"0xf9681Cb4b3Fd6ea3512BAfADCDcb25be41affc7a\",\"proof\":[\"{}\",\"{}\"]}}]}}",
            keccak256(b"root"),
            keccak256(b"a"),
            keccak256(b"b"),
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merkle_data.json");
        let data = sample();
        data.write_to(&path).unwrap();

        assert!(!temp_path_for(&path).exists());
        assert_eq!(MerkleData::read_from(&path).unwrap(), data);
    }

    #[test]
    fn test_temp_file_is_named_after_the_full_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merkle_data.tmp");
        assert_eq!(temp_path_for(&path), dir.path().join("merkle_data.tmp.tmp"));

        let data = sample();
        data.write_to(&path).unwrap();
        assert_eq!(MerkleData::read_from(&path).unwrap(), data);
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail
        let path = dir.path().join("merkle_data.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(sample().write_to(&path).is_err());
        assert!(!temp_path_for(&path).exists());
        assert!(path.is_dir());
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("merkle_data.json");
        assert!(sample().write_to(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_from_tree_uses_input_order() {
        let participants = [
            "0x87C481a4934df1C57Fe4Cd9833bDF28bDa96b20D",
            "0xf9681Cb4b3Fd6ea3512BAfADCDcb25be41affc7a",
        ];
        let values = participants
            .iter()
            .map(|p| vec![LeafType::Address.parse_value(p).unwrap()])
            .collect();
        let tree = StandardMerkleTree::of(values, vec![LeafType::Address]).unwrap();
        let data = MerkleData::from_tree(&tree, &participants).unwrap();

        assert_eq!(data.root, *tree.root());
        assert_eq!(data.participants.len(), 2);

        assert_eq!(
            MerkleData::from_tree(&tree, &participants[..1]),
            Err(TreeError::ParticipantCountMismatch {
                expected: 2,
                got: 1
            })
        );
        for (index, record) in data.participants.iter().enumerate() {
            assert_eq!(record.address, participants[index]);
            assert_eq!(record.proof, tree.get_proof(index).unwrap());
        }
    }
}
