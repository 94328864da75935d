//! CLI command to decode a block file
use crate::utils::{decode_blocks, read_block_file};
use clap::Parser;
use ethblock_primitives::Block;
use std::path::PathBuf;
use tracing::info;

/// `ethblock decode` command
///
/// Prints every block of the file as JSON, together with its hash.
#[derive(Debug, Parser)]
pub struct Command {
    /// File of RLP encoded blocks, binary or hex.
    #[arg(value_name = "FILE")]
    path: PathBuf,
}

impl Command {
    /// Execute `decode` command
    pub async fn execute(&self) -> eyre::Result<()> {
        let blocks = decode_blocks(&read_block_file(&self.path).await?)?;
        info!(target: "ethblock::cli", count = blocks.len(), "Decoded blocks");
        println!("{}", render(&blocks)?);
        Ok(())
    }
}

fn render(blocks: &[Block]) -> eyre::Result<String> {
    let rendered = blocks
        .iter()
        .map(|block| serde_json::json!({ "hash": block.hash(), "block": block }))
        .collect::<Vec<_>>();
    Ok(serde_json::to_string_pretty(&rendered)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethblock_primitives::{Header, MAINNET_GENESIS_HASH};

    #[test]
    fn renders_hash_and_fields() {
        let block = Block::new(Header::mainnet_genesis(), vec![], vec![]);
        let rendered: serde_json::Value = serde_json::from_str(&render(&[block]).unwrap()).unwrap();
        assert_eq!(rendered[0]["hash"], serde_json::to_value(MAINNET_GENESIS_HASH).unwrap());
        assert_eq!(rendered[0]["block"]["header"]["gasLimit"], "0x1388");
        assert_eq!(rendered[0]["block"]["transactions"], serde_json::json!([]));
    }
}
