//! CLI command to check blocks against the consensus rules
use crate::{
    file_client::FileBlockchain,
    utils::{decode_blocks, read_block_file},
};
use clap::Parser;
use ethblock_consensus::{validate_block_standalone, BlockValidator};
use ethblock_interfaces::BlockValidationError;
use ethblock_primitives::{Block, ChainConfig, B256};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

/// `ethblock check` command
///
/// Without a chain file only the rules that need no other block are checked: the uncle count, the
/// transaction trie root, every transaction and the uncle hash.
#[derive(Debug, Parser)]
pub struct Command {
    /// File of RLP encoded blocks to check, binary or hex.
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// File of RLP encoded ancestor blocks, parents first.
    ///
    /// Enables the checks against the parent block and the uncle checks.
    #[arg(long = "chain-file", value_name = "FILE")]
    chain_file: Option<PathBuf>,
}

/// Verdict for a single block.
pub type Verdict = (B256, Result<(), BlockValidationError>);

impl Command {
    /// Execute `check` command
    pub async fn execute(&self, config: ChainConfig) -> eyre::Result<()> {
        let blocks = decode_blocks(&read_block_file(&self.path).await?)?;
        let verdicts = match &self.chain_file {
            Some(chain_file) => {
                let chain = FileBlockchain::new(chain_file).await?;
                check_against_chain(&blocks, chain, config).await
            }
            None => check_standalone(&blocks, &config),
        };

        let total = verdicts.len();
        let mut invalid = 0;
        for (hash, verdict) in verdicts {
            match verdict {
                Ok(()) => println!("{hash}: valid"),
                Err(err) => {
                    invalid += 1;
                    println!("{hash}: {err}");
                }
            }
        }

        if invalid > 0 {
            eyre::bail!("{invalid} of {total} blocks are invalid")
        }
        info!(target: "ethblock::cli", total, "All blocks are valid");
        Ok(())
    }
}

/// Checks every block with the rules that need no other block.
pub fn check_standalone(blocks: &[Block], config: &ChainConfig) -> Vec<Verdict> {
    blocks
        .iter()
        .map(|block| {
            let errors = validate_block_standalone(block, config);
            let verdict =
                if errors.is_empty() { Ok(()) } else { Err(BlockValidationError::new(errors)) };
            (block.hash(), verdict)
        })
        .collect()
}

/// Checks every block against the given chain.
pub async fn check_against_chain(
    blocks: &[Block],
    chain: FileBlockchain,
    config: ChainConfig,
) -> Vec<Verdict> {
    if chain.is_empty() {
        warn!(target: "ethblock::cli", "Chain file holds no blocks");
    }
    let validator = BlockValidator::new(chain, Arc::new(config));
    let mut verdicts = Vec::with_capacity(blocks.len());
    for block in blocks {
        verdicts.push((block.hash(), validator.validate_block(block).await));
    }
    verdicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ethblock_consensus::canonical_difficulty;
    use ethblock_interfaces::ConsensusError;
    use ethblock_primitives::{Header, HeaderField, U256};
    use std::io::Write;

    fn child_of(parent: &Header) -> Header {
        let mut header = parent.clone();
        header.set(HeaderField::ParentHash, parent.hash().to_vec()).unwrap();
        header.set_integer(HeaderField::Number, parent.number() + U256::from(1)).unwrap();
        header.set_integer(HeaderField::Timestamp, parent.timestamp() + U256::from(20)).unwrap();
        let difficulty = canonical_difficulty(&header, parent, &ChainConfig::mainnet());
        header.set_integer(HeaderField::Difficulty, difficulty).unwrap();
        header
    }

    fn write_blocks(blocks: &[Block]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for block in blocks {
            file.write_all(&block.encoded()).unwrap();
        }
        file
    }

    #[tokio::test]
    async fn checks_against_chain_file() {
        let genesis = Header::mainnet_genesis();
        let first = child_of(&genesis);
        let chain = FileBlockchain::from_blocks([
            Block::new(genesis, vec![], vec![]),
            Block::new(first.clone(), vec![], vec![]),
        ]);

        let valid = Block::new(child_of(&first), vec![], vec![]);
        let mut header = child_of(&first);
        header.set_integer(HeaderField::Timestamp, first.timestamp()).unwrap();
        header.set(HeaderField::UncleHash, vec![0x11; 32]).unwrap();
        let invalid = Block::new(header, vec![], vec![]);

        let verdicts =
            check_against_chain(&[valid.clone(), invalid.clone()], chain, ChainConfig::mainnet())
                .await;
        assert_eq!(verdicts[0], (valid.hash(), Ok(())));
        assert_eq!(verdicts[1].0, invalid.hash());
        let errors = verdicts[1].1.clone().unwrap_err().into_errors();
        assert_eq!(errors.len(), 2);
        assert_matches!(errors[0], ConsensusError::DifficultyDiff(_));
        assert_matches!(errors[1], ConsensusError::BodyUnclesHashDiff(_));
    }

    #[tokio::test]
    async fn standalone_check() {
        let genesis = Block::new(Header::mainnet_genesis(), vec![], vec![]);
        let mut header = Header::mainnet_genesis();
        header.set(HeaderField::TransactionsTrie, vec![0x22; 32]).unwrap();
        let invalid = Block::new(header, vec![], vec![]);

        let verdicts = check_standalone(&[genesis.clone(), invalid], &ChainConfig::mainnet());
        assert_eq!(verdicts[0], (genesis.hash(), Ok(())));
        assert_matches!(
            verdicts[1].1.clone().unwrap_err().errors(),
            [ConsensusError::BodyTransactionRootDiff(_)]
        );

        let file = write_blocks(&[genesis.clone()]);
        let command = Command { path: file.path().to_path_buf(), chain_file: None };
        command.execute(ChainConfig::mainnet()).await.unwrap();

        let file = write_blocks(&[genesis, block_with_bad_uncle_hash()]);
        let command = Command { path: file.path().to_path_buf(), chain_file: None };
        let err = command.execute(ChainConfig::mainnet()).await.unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 blocks are invalid");
    }

    fn block_with_bad_uncle_hash() -> Block {
        let mut header = Header::mainnet_genesis();
        header.set(HeaderField::UncleHash, vec![0x33; 32]).unwrap();
        Block::new(header, vec![], vec![])
    }
}
