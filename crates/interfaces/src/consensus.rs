use crate::ProviderError;
use ethblock_primitives::{GotExpected, InvalidTransactionError, B256, U256};
use ethblock_trie::TrieError;
use std::fmt;

/// Consensus errors, one per broken rule.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsensusError {
    /// The parent of the header is not known to the blockchain.
    #[error("could not find parent block {hash}")]
    ParentUnknown {
        /// Parent hash the header refers to.
        hash: B256,
    },

    /// A blockchain lookup failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The header number is not the parent number plus one.
    #[error(
        "invalid number: block number {block_number} does not follow parent block number {parent_block_number}"
    )]
    ParentBlockNumberMismatch {
        /// Number of the parent block.
        parent_block_number: U256,
        /// Number of the block.
        block_number: U256,
    },

    /// An uncle's parent must be two to seven generations behind the including block.
    #[error(
        "invalid uncle depth: uncle parent {uncle_parent_number} is not 2 to 7 blocks behind block {including_block_number}"
    )]
    UncleDepthOutOfRange {
        /// Number of the block including the uncle.
        including_block_number: U256,
        /// Number of the uncle's parent.
        uncle_parent_number: U256,
    },

    /// The declared difficulty is not the canonical difficulty.
    #[error("invalid difficulty: {0}")]
    DifficultyDiff(GotExpected<U256>),

    /// The gas limit moved by the bound divisor or more.
    #[error(
        "invalid gas limit: child gas limit {child_gas_limit} is out of bounds of parent gas limit {parent_gas_limit}"
    )]
    GasLimitOutOfBounds {
        /// Gas limit of the parent.
        parent_gas_limit: U256,
        /// Gas limit of the block.
        child_gas_limit: U256,
    },

    /// The gas limit is below the protocol minimum.
    #[error(
        "invalid gas limit: child gas limit {child_gas_limit} is below the minimum of {min_gas_limit}"
    )]
    GasLimitBelowMinimum {
        /// Gas limit of the block.
        child_gas_limit: U256,
        /// Protocol minimum.
        min_gas_limit: U256,
    },

    /// The timestamp is not after the parent timestamp.
    #[error(
        "invalid timestamp: block timestamp {timestamp} is not after parent timestamp {parent_timestamp}"
    )]
    TimestampIsInPast {
        /// Timestamp of the parent.
        parent_timestamp: U256,
        /// Timestamp of the block.
        timestamp: U256,
    },

    /// The extra data is longer than allowed.
    #[error("invalid amount of extra data: {len} bytes, maximum is {max}")]
    ExtraDataExceedsMax {
        /// Length of the extra data.
        len: usize,
        /// Maximum length.
        max: usize,
    },

    /// The block includes more uncles than allowed.
    #[error("too many uncle headers: {count}, maximum is {max}")]
    TooManyUncles {
        /// Number of uncles.
        count: usize,
        /// Maximum number of uncles.
        max: usize,
    },

    /// The same uncle is included twice.
    #[error("duplicate uncle header {hash}")]
    DuplicateUncle {
        /// Hash of the duplicated uncle.
        hash: B256,
    },

    /// An uncle header fails its own header validation.
    #[error("invalid uncle header {hash}: {error}")]
    UncleInvalid {
        /// Hash of the uncle.
        hash: B256,
        /// Why the uncle is invalid.
        error: Box<ConsensusError>,
    },

    /// The uncle has already been included by another block.
    #[error("uncle header {hash} is already included")]
    UncleAlreadyIncluded {
        /// Hash of the uncle.
        hash: B256,
    },

    /// The transaction trie root does not commit to the block's transactions.
    #[error("invalid transaction trie: {0}")]
    BodyTransactionRootDiff(GotExpected<B256>),

    /// A transaction fails its own validation.
    #[error("invalid transaction at index {index}: {error}")]
    TransactionInvalid {
        /// Position of the transaction in the block.
        index: usize,
        /// Why the transaction is invalid.
        error: InvalidTransactionError,
    },

    /// The uncle hash does not commit to the block's uncle headers.
    #[error("invalid uncle hash: {0}")]
    BodyUnclesHashDiff(GotExpected<B256>),

    /// The transaction trie could not be built.
    #[error("could not build the transaction trie: {0}")]
    TransactionTrie(#[from] TrieError),
}

/// Every consensus rule a block breaks, in the order they were found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockValidationError {
    errors: Vec<ConsensusError>,
}

impl BlockValidationError {
    /// Creates the error from a non-empty list of broken rules.
    pub fn new(errors: Vec<ConsensusError>) -> Self {
        debug_assert!(!errors.is_empty(), "a block validation error needs at least one reason");
        Self { errors }
    }

    /// The broken rules.
    pub fn errors(&self) -> &[ConsensusError] {
        &self.errors
    }

    /// Consumes the error and returns the broken rules.
    pub fn into_errors(self) -> Vec<ConsensusError> {
        self.errors
    }
}

impl From<ConsensusError> for BlockValidationError {
    fn from(error: ConsensusError) -> Self {
        Self { errors: vec![error] }
    }
}

impl fmt::Display for BlockValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for BlockValidationError {}
