//! CLI command to write the chain config to stdout
use clap::Parser;
use ethblock_primitives::ChainConfig;

/// `ethblock config` command
#[derive(Debug, Parser)]
pub struct Command;

impl Command {
    /// Execute `config` command - write the chain config in effect to stdout
    pub async fn execute(&self, config: &ChainConfig) -> eyre::Result<()> {
        println!("{}", toml::to_string_pretty(config)?);
        Ok(())
    }
}
