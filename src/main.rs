#![forbid(unsafe_code)]

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use merkle_allowlist::{run, GeneratorConfig};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = GeneratorConfig::default();
    info!(
        participants = config.participants.len(),
        output = %config.output_path.display(),
        "generating merkle tree"
    );

    let data = run(&config)?;
    info!(root = %data.root, "done");
    Ok(())
}
