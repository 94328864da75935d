//! Common helpers for reading command inputs.

use ethblock_primitives::{hex, Block, ChainConfig, RawBlock};
use eyre::WrapErr;
use std::path::Path;
use tracing::debug;

/// Reads a file of wire encoded blocks.
///
/// The file holds either the binary encoding or its hex form, with an optional `0x` prefix and
/// any amount of whitespace.
pub async fn read_block_file(path: impl AsRef<Path>) -> eyre::Result<Vec<u8>> {
    let path = path.as_ref();
    let contents = tokio::fs::read(path)
        .await
        .wrap_err_with(|| format!("could not read {}", path.display()))?;

    let Ok(text) = std::str::from_utf8(&contents) else { return Ok(contents) };
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = compact.strip_prefix("0x").unwrap_or(&compact);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        let decoded = hex::decode(digits)
            .wrap_err_with(|| format!("invalid hex in {}", path.display()))?;
        debug!(target: "ethblock::cli", path = %path.display(), "Decoded hex block file");
        return Ok(decoded)
    }

    debug!(
        target: "ethblock::cli",
        path = %path.display(),
        "Block file is not hex, reading it as binary"
    );
    Ok(contents)
}

/// Decodes every block of a concatenation of wire encoded blocks, in order.
pub fn decode_blocks(mut data: &[u8]) -> eyre::Result<Vec<Block>> {
    let mut blocks = Vec::new();
    while !data.is_empty() {
        let raw = <RawBlock as alloy_rlp::Decodable>::decode(&mut data)
            .wrap_err_with(|| format!("could not decode block #{}", blocks.len()))?;
        let block = Block::from_raw(raw)
            .wrap_err_with(|| format!("block #{} violates the block schema", blocks.len()))?;
        blocks.push(block);
    }
    Ok(blocks)
}

/// Loads the chain configuration from a TOML file, or the mainnet configuration if no file is
/// given. Keys left out of the file keep their mainnet value.
pub fn load_chain_config(path: Option<&Path>) -> eyre::Result<ChainConfig> {
    let Some(path) = path else { return Ok(ChainConfig::mainnet()) };
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("could not read {}", path.display()))?;
    toml::from_str(&contents).wrap_err_with(|| format!("invalid chain config {}", path.display()))
}
