//! Collection of methods for block validation.

use crate::canonical_difficulty;
use ethblock_interfaces::ConsensusError;
use ethblock_primitives::{
    Block, BlockTransaction, ChainConfig, GotExpected, Header, B256, EMPTY_ROOT_HASH, U256,
};
use ethblock_trie::{ordered_trie_root, TrieError, TrieMut};
use tracing::trace;

/// Validates that the header number follows the parent number.
#[inline]
pub fn validate_against_parent_number(
    header: &Header,
    parent: &Header,
) -> Result<(), ConsensusError> {
    let block_number = header.number();
    let parent_block_number = parent.number();
    if parent_block_number.checked_add(U256::from(1)) != Some(block_number) {
        return Err(ConsensusError::ParentBlockNumberMismatch { parent_block_number, block_number })
    }
    Ok(())
}

/// Validates that an uncle's parent is two to seven generations behind the including block.
#[inline]
pub fn validate_uncle_depth(
    uncle_parent: &Header,
    including_block_number: U256,
) -> Result<(), ConsensusError> {
    let uncle_parent_number = uncle_parent.number();
    match including_block_number.checked_sub(uncle_parent_number) {
        Some(depth) if depth > U256::from(1) && depth < U256::from(8) => Ok(()),
        _ => Err(ConsensusError::UncleDepthOutOfRange {
            including_block_number,
            uncle_parent_number,
        }),
    }
}

/// Validates that the declared difficulty is the canonical difficulty.
#[inline]
pub fn validate_difficulty(
    header: &Header,
    parent: &Header,
    config: &ChainConfig,
) -> Result<(), ConsensusError> {
    let expected = canonical_difficulty(header, parent, config);
    let got = header.difficulty();
    if got != expected {
        return Err(ConsensusError::DifficultyDiff(GotExpected { got, expected }))
    }
    Ok(())
}

/// Validates the gas limit against the parent gas limit.
///
/// The gas limit may move by strictly less than `parent_gas_limit / 1024` in either direction and
/// must not be below the minimum gas limit.
#[inline]
pub fn validate_gas_limit(
    header: &Header,
    parent: &Header,
    config: &ChainConfig,
) -> Result<(), ConsensusError> {
    let parent_gas_limit = parent.gas_limit();
    let child_gas_limit = header.gas_limit();
    let bound = parent_gas_limit / U256::from(config.gas_limit_bound_divisor);

    let within_bounds = if child_gas_limit > parent_gas_limit {
        child_gas_limit - parent_gas_limit < bound
    } else {
        parent_gas_limit - child_gas_limit < bound
    };
    if !within_bounds {
        return Err(ConsensusError::GasLimitOutOfBounds { parent_gas_limit, child_gas_limit })
    }

    let min_gas_limit = U256::from(config.min_gas_limit);
    if child_gas_limit < min_gas_limit {
        return Err(ConsensusError::GasLimitBelowMinimum { child_gas_limit, min_gas_limit })
    }
    Ok(())
}

/// Validates that the timestamp is after the parent timestamp.
#[inline]
pub fn validate_against_parent_timestamp(
    header: &Header,
    parent: &Header,
) -> Result<(), ConsensusError> {
    let timestamp = header.timestamp();
    let parent_timestamp = parent.timestamp();
    if timestamp <= parent_timestamp {
        return Err(ConsensusError::TimestampIsInPast { parent_timestamp, timestamp })
    }
    Ok(())
}

/// Validates the header's extra data length.
#[inline]
pub fn validate_header_extradata(
    header: &Header,
    config: &ChainConfig,
) -> Result<(), ConsensusError> {
    let len = header.extra_data().len();
    if len > config.maximum_extra_data_size {
        return Err(ConsensusError::ExtraDataExceedsMax { len, max: config.maximum_extra_data_size })
    }
    Ok(())
}

/// Validates a header against its already resolved parent and returns the first broken rule.
///
/// With `uncle_height` set the header is validated as an uncle included at that height.
pub fn validate_header_against_parent(
    header: &Header,
    parent: &Header,
    uncle_height: Option<U256>,
    config: &ChainConfig,
) -> Result<(), ConsensusError> {
    validate_against_parent_number(header, parent)?;
    if let Some(including_block_number) = uncle_height {
        validate_uncle_depth(parent, including_block_number)?;
    }
    validate_difficulty(header, parent, config)?;
    validate_gas_limit(header, parent, config)?;
    validate_against_parent_timestamp(header, parent)?;
    validate_header_extradata(header, config)?;
    Ok(())
}

/// Fills the trie with `(rlp(index), transaction)` pairs, in transaction order.
pub async fn build_transactions_trie<T, Trie>(
    transactions: &[T],
    trie: &mut Trie,
) -> Result<(), TrieError>
where
    T: BlockTransaction,
    Trie: TrieMut + ?Sized,
{
    for (index, transaction) in transactions.iter().enumerate() {
        trie.put(&alloy_rlp::encode(index), &transaction.encoded()).await?;
    }
    trace!(
        target: "consensus::block",
        count = transactions.len(),
        root = %trie.root(),
        "Built transaction trie"
    );
    Ok(())
}

/// Validates the header's transaction trie root against the root of a trie built from the block's
/// transactions. A block without transactions must commit to the empty trie.
pub fn validate_transactions_root<T>(block: &Block<T>, root: B256) -> Result<(), ConsensusError> {
    let got = if block.transactions.is_empty() { EMPTY_ROOT_HASH } else { root };
    let expected = block.header.transactions_trie();
    if got != expected {
        return Err(ConsensusError::BodyTransactionRootDiff(GotExpected { got, expected }))
    }
    Ok(())
}

/// Runs every transaction's own validation and returns one error per failing transaction.
///
/// Transactions are validated with the Homestead rules if the block is a Homestead block.
pub fn validate_transactions<T: BlockTransaction>(
    block: &Block<T>,
    config: &ChainConfig,
) -> Vec<ConsensusError> {
    let homestead = block.header.is_homestead(config);
    block
        .transactions
        .iter()
        .enumerate()
        .filter_map(|(index, transaction)| {
            transaction
                .validate(homestead)
                .err()
                .map(|error| ConsensusError::TransactionInvalid { index, error })
        })
        .collect()
}

/// Validates the block's uncle hash.
pub fn validate_uncles_hash<T>(block: &Block<T>) -> Result<(), ConsensusError> {
    let got = block.uncles_hash();
    let expected = block.header.uncle_hash();
    if got != expected {
        return Err(ConsensusError::BodyUnclesHashDiff(GotExpected { got, expected }))
    }
    Ok(())
}

/// Validates a block disregarding the chain: the uncle count, the transaction trie root, every
/// transaction and the uncle hash. Returns every broken rule.
pub fn validate_block_standalone<T: BlockTransaction>(
    block: &Block<T>,
    config: &ChainConfig,
) -> Vec<ConsensusError> {
    let mut errors = Vec::new();

    if block.uncle_headers.len() > config.max_uncles {
        errors.push(ConsensusError::TooManyUncles {
            count: block.uncle_headers.len(),
            max: config.max_uncles,
        });
    }
    errors.extend(validate_transactions_root(block, ordered_trie_root(&block.transactions)).err());
    errors.extend(validate_transactions(block, config));
    errors.extend(validate_uncles_hash(block).err());
    errors
}
