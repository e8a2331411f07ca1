use std::path::PathBuf;

use crate::abi::LeafType;

/// The file the generator writes, relative to the working directory
pub const DEFAULT_OUTPUT_PATH: &str = "merkle_data.json";

/// The allowlist, in the order proofs are emitted
pub const DEFAULT_PARTICIPANTS: [&str; 4] = [
    "0xf9681Cb4b3Fd6ea3512BAfADCDcb25be41affc7a",
    "0x87C481a4934df1C57Fe4Cd9833bDF28bDa96b20D",
    "0x38234f5C88F0d1CcC5b85D4Da6805E6E243a8cBc",
    "0xF38EAC99B2eB75d39De3886001D9a453934F8a01",
];

/// Everything the generator needs to know. The binary always runs with [`Default::default`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Participant addresses, as they should appear in the output
    pub participants: Vec<String>,
    /// The ABI schema each participant is wrapped in. Every participant is a one-field tuple.
    pub leaf_types: Vec<LeafType>,
    /// Where the merkle data is written
    pub output_path: PathBuf,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            participants: DEFAULT_PARTICIPANTS.iter().map(|p| p.to_string()).collect(),
            leaf_types: vec![LeafType::Address],
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

impl GeneratorConfig {
    /// The default config, writing to `output_path` instead
    pub fn with_output_path(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            ..Default::default()
        }
    }
}
