//! Blockchain backed by a block file.

use crate::utils::{decode_blocks, read_block_file};
use ethblock_interfaces::{BlockDetails, BlockchainReader, ProviderResult};
use ethblock_primitives::{Block, LegacyTransaction, B256, U256};
use std::{collections::HashMap, path::Path};
use tracing::{debug, trace};

/// Blockchain loaded from a file of blocks.
///
/// Blocks are assumed to be written one after another in the file, as rlp bytes, parents before
/// their children:
/// rlp(block1) || rlp(block2) || rlp(block3)
///
/// Every uncle header included by a loaded block is recorded as included.
#[derive(Debug, Default)]
pub struct FileBlockchain {
    /// Loaded blocks by hash.
    blocks: HashMap<B256, Block>,
    /// Details of loaded blocks and included uncles by hash.
    details: HashMap<B256, BlockDetails>,
}

impl FileBlockchain {
    /// Loads the blocks of a block file.
    pub async fn new<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let blocks = decode_blocks(&read_block_file(path.as_ref()).await?)?;
        let chain = Self::from_blocks(blocks);
        debug!(
            target: "ethblock::cli",
            path = %path.as_ref().display(),
            blocks = chain.len(),
            "Loaded blockchain"
        );
        Ok(chain)
    }

    /// Builds a blockchain from blocks given parents first.
    pub fn from_blocks(blocks: impl IntoIterator<Item = Block>) -> Self {
        let mut chain = Self::default();
        for block in blocks {
            chain.insert(block);
        }
        chain
    }

    /// Number of loaded blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no block has been loaded.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn insert(&mut self, block: Block) {
        let hash = block.hash();
        let parent_hash = block.header.parent_hash();
        let parent_td = self
            .details
            .get(&parent_hash)
            .map(|details| details.total_difficulty)
            .unwrap_or_default();
        let is_uncle = self.details.get(&hash).is_some_and(|details| details.is_uncle);
        self.details.insert(
            hash,
            BlockDetails {
                number: block.header.number(),
                total_difficulty: parent_td.saturating_add(block.header.difficulty()),
                parent_hash,
                is_uncle,
            },
        );

        for uncle in &block.uncle_headers {
            let uncle_hash = uncle.hash();
            trace!(target: "ethblock::cli", %hash, uncle = %uncle_hash, "Recording included uncle");
            let details = self.details.entry(uncle_hash).or_insert_with(|| BlockDetails {
                number: uncle.number(),
                total_difficulty: U256::ZERO,
                parent_hash: uncle.parent_hash(),
                is_uncle: false,
            });
            details.is_uncle = true;
        }
        self.blocks.insert(hash, block);
    }
}

#[async_trait::async_trait]
impl BlockchainReader for FileBlockchain {
    type Transaction = LegacyTransaction;

    async fn block(&self, hash: B256) -> ProviderResult<Option<Block>> {
        Ok(self.blocks.get(&hash).cloned())
    }

    async fn block_details(&self, hash: B256) -> ProviderResult<Option<BlockDetails>> {
        Ok(self.details.get(&hash).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethblock_primitives::{Header, HeaderField};
    use std::io::Write;

    fn child(parent: &Header, coinbase: u8) -> Header {
        let mut header = parent.clone();
        header.set(HeaderField::ParentHash, parent.hash().to_vec()).unwrap();
        header.set(HeaderField::Coinbase, vec![coinbase; 20]).unwrap();
        header.set_integer(HeaderField::Number, parent.number() + U256::from(1)).unwrap();
        header
    }

    #[tokio::test]
    async fn loads_chain_and_uncles() {
        let genesis = Header::mainnet_genesis();
        let first = child(&genesis, 1);
        let uncle = child(&genesis, 2);
        let second = child(&first, 1);

        let blocks = vec![
            Block::new(genesis.clone(), vec![], vec![]),
            Block::new(first.clone(), vec![], vec![]),
            Block::new(second.clone(), vec![], vec![uncle.clone()]),
        ];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for block in &blocks {
            file.write_all(&block.encoded()).unwrap();
        }

        let chain = FileBlockchain::new(file.path()).await.unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.block(second.hash()).await.unwrap(), Some(blocks[2].clone()));
        assert_eq!(chain.block(uncle.hash()).await.unwrap(), None);

        let details = chain.block_details(second.hash()).await.unwrap().unwrap();
        assert_eq!(details.number, U256::from(2));
        assert_eq!(details.total_difficulty, genesis.difficulty() * U256::from(3));
        assert!(!details.is_uncle);
        assert!(chain.block_details(uncle.hash()).await.unwrap().unwrap().is_uncle);
    }
}
