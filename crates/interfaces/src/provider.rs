use ethblock_primitives::{Block, BlockTransaction, B256, U256};
use serde::{Deserialize, Serialize};

/// Result alias for [`ProviderError`].
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors thrown by a blockchain backend.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum ProviderError {
    /// The backing database failed.
    #[error("database error: {0}")]
    Database(String),
}

/// Bookkeeping the blockchain keeps for every known block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDetails {
    /// Block number.
    pub number: U256,
    /// Total difficulty of the chain up to and including the block.
    pub total_difficulty: U256,
    /// Hash of the parent block.
    pub parent_hash: B256,
    /// Whether the block has been included as an uncle by another block.
    pub is_uncle: bool,
}

/// Read access to the blockchain.
///
/// Lookups may suspend, e.g. when they hit a database.
#[async_trait::async_trait]
#[auto_impl::auto_impl(&, Arc)]
pub trait BlockchainReader: Send + Sync {
    /// The transaction type of the stored blocks.
    type Transaction: BlockTransaction;

    /// Get a block by its hash.
    async fn block(&self, hash: B256) -> ProviderResult<Option<Block<Self::Transaction>>>;

    /// Get the details of a block by its hash.
    async fn block_details(&self, hash: B256) -> ProviderResult<Option<BlockDetails>>;
}
