//! In-memory blockchain for tests.

use crate::{BlockDetails, BlockchainReader, ProviderError, ProviderResult};
use ethblock_primitives::{Block, BlockTransaction, LegacyTransaction, B256, U256};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory [`BlockchainReader`] filled by the test.
#[derive(Debug)]
pub struct TestBlockchain<T = LegacyTransaction> {
    blocks: RwLock<HashMap<B256, Block<T>>>,
    details: RwLock<HashMap<B256, BlockDetails>>,
    failure: RwLock<Option<ProviderError>>,
}

impl<T> Default for TestBlockchain<T> {
    fn default() -> Self {
        Self {
            blocks: Default::default(),
            details: Default::default(),
            failure: Default::default(),
        }
    }
}

impl<T: BlockTransaction> TestBlockchain<T> {
    /// Creates an empty blockchain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a block and derives its details from its parent, if known. Returns the block hash.
    pub fn insert_block(&self, block: Block<T>) -> B256 {
        let hash = block.hash();
        let parent_hash = block.header.parent_hash();
        let parent_td = self
            .details
            .read()
            .get(&parent_hash)
            .map(|details| details.total_difficulty)
            .unwrap_or_default();
        let details = BlockDetails {
            number: block.header.number(),
            total_difficulty: parent_td.saturating_add(block.header.difficulty()),
            parent_hash,
            is_uncle: false,
        };
        self.details.write().insert(hash, details);
        self.blocks.write().insert(hash, block);
        hash
    }

    /// Stores a chain of blocks, in order. Returns their hashes.
    pub fn extend_blocks(&self, blocks: impl IntoIterator<Item = Block<T>>) -> Vec<B256> {
        blocks.into_iter().map(|block| self.insert_block(block)).collect()
    }

    /// Overrides the details of a block.
    pub fn insert_details(&self, hash: B256, details: BlockDetails) {
        self.details.write().insert(hash, details);
    }

    /// Records that the block has been included as an uncle.
    pub fn mark_uncle(&self, hash: B256) {
        self.details.write().entry(hash).or_default().is_uncle = true;
    }

    /// Makes every following lookup fail with the given error, or succeed again with `None`.
    pub fn set_failure(&self, failure: Option<ProviderError>) {
        *self.failure.write() = failure;
    }

    /// Total difficulty recorded for a block.
    pub fn total_difficulty(&self, hash: &B256) -> Option<U256> {
        self.details.read().get(hash).map(|details| details.total_difficulty)
    }

    fn check_failure(&self) -> ProviderResult<()> {
        match self.failure.read().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl<T: BlockTransaction> BlockchainReader for TestBlockchain<T> {
    type Transaction = T;

    async fn block(&self, hash: B256) -> ProviderResult<Option<Block<T>>> {
        self.check_failure()?;
        Ok(self.blocks.read().get(&hash).cloned())
    }

    async fn block_details(&self, hash: B256) -> ProviderResult<Option<BlockDetails>> {
        self.check_failure()?;
        Ok(self.details.read().get(&hash).copied())
    }
}
