//! Proof of work consensus rules for blocks and headers.
//!
//! The free functions in [`validation`] check single rules against an already resolved parent.
//! [`BlockValidator`] resolves parents and uncle bookkeeping through a [`BlockchainReader`] and
//! combines every check into one verdict.

#![doc(issue_tracker_base_url = "https://github.com/ethblock/ethblock/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

use ethblock_interfaces::{BlockValidationError, BlockchainReader, ConsensusError};
use ethblock_primitives::{Block, ChainConfig, Header, B256, U256};
use ethblock_trie::{MemoryTrie, TrieMut};
use futures::future::join_all;
use std::{collections::HashSet, sync::Arc};
use tracing::{debug, trace};

mod difficulty;
pub use difficulty::canonical_difficulty;

pub mod validation;
pub use validation::{
    build_transactions_trie, validate_block_standalone, validate_header_against_parent,
    validate_transactions, validate_transactions_root, validate_uncles_hash,
};

/// Validates blocks and headers against the chain held by a [`BlockchainReader`].
#[derive(Debug, Clone)]
pub struct BlockValidator<P> {
    /// Blockchain the parents and uncle bookkeeping are read from.
    provider: P,
    /// Fork heights and protocol parameters.
    config: Arc<ChainConfig>,
}

impl<P> BlockValidator<P> {
    /// Creates a new validator.
    pub const fn new(provider: P, config: Arc<ChainConfig>) -> Self {
        Self { provider, config }
    }

    /// The blockchain the validator reads from.
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// The chain configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }
}

impl<P: BlockchainReader> BlockValidator<P> {
    /// Validates a header against its parent, which is looked up in the blockchain.
    ///
    /// With `uncle_height` set the header is validated as an uncle included at that height. Genesis
    /// headers always pass.
    pub async fn validate_header(
        &self,
        header: &Header,
        uncle_height: Option<U256>,
    ) -> Result<(), ConsensusError> {
        if header.is_genesis() {
            trace!(target: "consensus::header", "Skipping parent checks for genesis header");
            return Ok(())
        }

        let parent_hash = header.parent_hash();
        let parent = self
            .provider
            .block(parent_hash)
            .await?
            .ok_or(ConsensusError::ParentUnknown { hash: parent_hash })?;

        let result =
            validate_header_against_parent(header, &parent.header, uncle_height, &self.config);
        trace!(
            target: "consensus::header",
            number = %header.number(),
            ?uncle_height,
            ?result,
            "Validated header"
        );
        result
    }

    /// Validates the uncle headers of a block.
    ///
    /// A block may include at most [`ChainConfig::max_uncles`] distinct uncles. Every uncle must be
    /// a valid header two to seven generations behind the block and must not have been included
    /// before. Uncles are checked concurrently; the first failing uncle in list order is reported.
    pub async fn validate_uncles(
        &self,
        block: &Block<P::Transaction>,
    ) -> Result<(), ConsensusError> {
        if block.header.is_genesis() {
            return Ok(())
        }

        let count = block.uncle_headers.len();
        if count > self.config.max_uncles {
            return Err(ConsensusError::TooManyUncles { count, max: self.config.max_uncles })
        }

        let hashes: Vec<B256> = block.uncle_headers.iter().map(Header::hash).collect();
        let mut seen = HashSet::with_capacity(count);
        for hash in &hashes {
            if !seen.insert(*hash) {
                return Err(ConsensusError::DuplicateUncle { hash: *hash })
            }
        }

        let including_block_number = block.header.number();
        join_all(
            block
                .uncle_headers
                .iter()
                .zip(hashes)
                .map(|(uncle, hash)| self.validate_uncle(uncle, hash, including_block_number)),
        )
        .await
        .into_iter()
        .collect()
    }

    async fn validate_uncle(
        &self,
        uncle: &Header,
        hash: B256,
        including_block_number: U256,
    ) -> Result<(), ConsensusError> {
        let (header, details) = futures::join!(
            self.validate_header(uncle, Some(including_block_number)),
            self.provider.block_details(hash),
        );

        header.map_err(|error| ConsensusError::UncleInvalid { hash, error: Box::new(error) })?;
        if details?.is_some_and(|details| details.is_uncle) {
            return Err(ConsensusError::UncleAlreadyIncluded { hash })
        }
        Ok(())
    }

    /// Validates a block, building its transaction trie in memory.
    ///
    /// See [`Self::validate_block_with_trie`].
    pub async fn validate_block(
        &self,
        block: &Block<P::Transaction>,
    ) -> Result<(), BlockValidationError> {
        let mut trie = MemoryTrie::new();
        self.validate_block_with_trie(block, &mut trie).await
    }

    /// Validates a block and reports every broken rule.
    ///
    /// The uncles, the header and the transaction trie are processed concurrently and all of them
    /// run to completion. Their errors are reported in that order, followed by the transaction
    /// trie root, every transaction and the uncle hash.
    ///
    /// The trie must be empty.
    pub async fn validate_block_with_trie<Trie>(
        &self,
        block: &Block<P::Transaction>,
        trie: &mut Trie,
    ) -> Result<(), BlockValidationError>
    where
        Trie: TrieMut + ?Sized,
    {
        let hash = block.hash();
        debug!(
            target: "consensus::block",
            %hash,
            number = %block.header.number(),
            transactions = block.transactions.len(),
            uncles = block.uncle_headers.len(),
            "Validating block"
        );

        let (uncles, header, transactions_trie) = futures::join!(
            self.validate_uncles(block),
            self.validate_header(&block.header, None),
            build_transactions_trie(&block.transactions, &mut *trie),
        );

        let mut errors = Vec::new();
        errors.extend(uncles.err());
        errors.extend(header.err());
        errors.extend(transactions_trie.err().map(ConsensusError::from));

        errors.extend(validate_transactions_root(block, trie.root()).err());
        errors.extend(validate_transactions(block, &self.config));
        errors.extend(validate_uncles_hash(block).err());

        if errors.is_empty() {
            debug!(target: "consensus::block", %hash, "Block is valid");
            Ok(())
        } else {
            debug!(target: "consensus::block", %hash, errors = errors.len(), "Block is invalid");
            Err(BlockValidationError::new(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ethblock_interfaces::{test_utils::TestBlockchain, ProviderError};
    use ethblock_primitives::{
        Address, BlockTransaction, Bytes, HeaderField, InvalidTransactionError, LegacyTransaction,
        EMPTY_ROOT_HASH,
    };
    use ethblock_trie::{ordered_trie_root, TrieError};

    type Validator = BlockValidator<Arc<TestBlockchain>>;

    fn child_of(parent: &Header) -> Header {
        let config = ChainConfig::mainnet();
        let mut header = parent.clone();
        header.set(HeaderField::ParentHash, parent.hash().to_vec()).unwrap();
        header.set_integer(HeaderField::Number, parent.number() + U256::from(1)).unwrap();
        header.set_integer(HeaderField::Timestamp, parent.timestamp() + U256::from(15)).unwrap();
        let difficulty = canonical_difficulty(&header, parent, &config);
        header.set_integer(HeaderField::Difficulty, difficulty).unwrap();
        header
    }

    /// A sibling of `child_of(parent)` with a different hash.
    fn uncle_of(parent: &Header, tag: u8) -> Header {
        let mut uncle = child_of(parent);
        uncle.set(HeaderField::Coinbase, vec![tag; 20]).unwrap();
        uncle
    }

    fn seal_uncles(header: &mut Header, uncles: &[Header]) {
        let hash = ethblock_primitives::proofs::calculate_uncles_hash(uncles);
        header.set(HeaderField::UncleHash, hash.to_vec()).unwrap();
    }

    fn signed_transfer(nonce: u64) -> LegacyTransaction {
        let mut tx = LegacyTransaction::new(
            U256::from(nonce),
            U256::from(1),
            U256::from(21_000),
            Some(Address::repeat_byte(0x77)),
            U256::from(1),
            Bytes::new(),
        );
        tx.sign(B256::repeat_byte(0x99)).unwrap();
        tx
    }

    /// Genesis followed by `len` empty blocks, all stored in a fresh blockchain.
    fn chain(len: usize) -> (Validator, Vec<Header>) {
        let blockchain = Arc::new(TestBlockchain::new());
        let mut headers = vec![Header::mainnet_genesis()];
        for _ in 0..len {
            let next = child_of(headers.last().unwrap());
            headers.push(next);
        }
        blockchain.extend_blocks(headers.iter().cloned().map(|h| Block::new(h, vec![], vec![])));
        (BlockValidator::new(blockchain, Arc::new(ChainConfig::mainnet())), headers)
    }

    fn block_with_uncles(parent: &Header, uncles: Vec<Header>) -> Block {
        let mut header = child_of(parent);
        seal_uncles(&mut header, &uncles);
        Block::new(header, vec![], uncles)
    }

    #[tokio::test]
    async fn genesis_header_is_valid() {
        let (validator, _) = chain(0);
        let mut genesis = Header::mainnet_genesis();
        // no lookup happens for a genesis header
        genesis.set(HeaderField::ParentHash, vec![0xee; 32]).unwrap();
        assert_eq!(validator.validate_header(&genesis, None).await, Ok(()));
    }

    #[tokio::test]
    async fn header_chain_is_valid() {
        ethblock_tracing::init_test_tracing();
        let (validator, headers) = chain(3);
        for header in &headers[1..] {
            assert_eq!(validator.validate_header(header, None).await, Ok(()));
        }
    }

    #[tokio::test]
    async fn unknown_parent() {
        let (validator, headers) = chain(1);
        let orphan = child_of(&child_of(&headers[1]));
        assert_eq!(
            validator.validate_header(&orphan, None).await,
            Err(ConsensusError::ParentUnknown { hash: orphan.parent_hash() })
        );
    }

    #[tokio::test]
    async fn provider_failure_is_reported() {
        let (validator, headers) = chain(1);
        validator.provider().set_failure(Some(ProviderError::Database("offline".to_string())));
        assert_matches!(
            validator.validate_header(&headers[1], None).await,
            Err(ConsensusError::Provider(ProviderError::Database(_)))
        );
    }

    #[tokio::test]
    async fn header_rules_against_stored_parent() {
        let (validator, headers) = chain(1);
        let parent = &headers[1];

        let mut wrong_difficulty = child_of(parent);
        wrong_difficulty.set_integer(HeaderField::Difficulty, U256::from(131_072)).unwrap();
        assert_matches!(
            validator.validate_header(&wrong_difficulty, None).await,
            Err(ConsensusError::DifficultyDiff(_))
        );

        let mut wrong_number = child_of(parent);
        wrong_number.set_integer(HeaderField::Number, U256::from(5)).unwrap();
        assert_matches!(
            validator.validate_header(&wrong_number, None).await,
            Err(ConsensusError::ParentBlockNumberMismatch { .. })
        );

        let mut wrong_gas_limit = child_of(parent);
        wrong_gas_limit.set_integer(HeaderField::GasLimit, U256::from(6000)).unwrap();
        assert_matches!(
            validator.validate_header(&wrong_gas_limit, None).await,
            Err(ConsensusError::GasLimitOutOfBounds { .. })
        );
    }

    #[tokio::test]
    async fn uncle_depth() {
        let (validator, headers) = chain(8);
        let including_parent = &headers[8];

        // the including block is number 9, the uncle's parent is `depth` blocks behind it
        for (depth, valid) in [(1, false), (2, true), (7, true), (8, false)] {
            let uncle = uncle_of(&headers[9 - depth], 0xaa);
            let block = block_with_uncles(including_parent, vec![uncle.clone()]);
            let result = validator.validate_uncles(&block).await;
            if valid {
                assert_eq!(result, Ok(()), "depth {depth}");
            } else {
                assert_matches!(
                    result,
                    Err(ConsensusError::UncleInvalid { hash, error })
                        if hash == uncle.hash() &&
                            matches!(*error, ConsensusError::UncleDepthOutOfRange { .. }),
                    "depth {depth}"
                );
            }
        }
    }

    #[tokio::test]
    async fn too_many_uncles() {
        let (validator, headers) = chain(4);
        let uncles = vec![
            uncle_of(&headers[2], 1),
            uncle_of(&headers[2], 2),
            uncle_of(&headers[2], 3),
        ];
        let block = block_with_uncles(&headers[4], uncles);
        assert_eq!(
            validator.validate_uncles(&block).await,
            Err(ConsensusError::TooManyUncles { count: 3, max: 2 })
        );
    }

    #[tokio::test]
    async fn duplicate_uncles() {
        let (validator, headers) = chain(4);
        let uncle = uncle_of(&headers[2], 1);
        let block = block_with_uncles(&headers[4], vec![uncle.clone()]);
        assert_eq!(validator.validate_uncles(&block).await, Ok(()));

        let block = block_with_uncles(&headers[4], vec![uncle.clone(), uncle.clone()]);
        assert_eq!(
            validator.validate_uncles(&block).await,
            Err(ConsensusError::DuplicateUncle { hash: uncle.hash() })
        );
    }

    #[tokio::test]
    async fn uncle_already_included() {
        let (validator, headers) = chain(4);
        let first = uncle_of(&headers[2], 1);
        let second = uncle_of(&headers[3], 2);
        validator.provider().mark_uncle(second.hash());

        let block = block_with_uncles(&headers[4], vec![first, second.clone()]);
        assert_eq!(
            validator.validate_uncles(&block).await,
            Err(ConsensusError::UncleAlreadyIncluded { hash: second.hash() })
        );
    }

    #[tokio::test]
    async fn first_failing_uncle_is_reported() {
        let (validator, headers) = chain(4);
        let mut invalid = uncle_of(&headers[2], 1);
        invalid.set_integer(HeaderField::Timestamp, headers[2].timestamp()).unwrap();
        let included = uncle_of(&headers[3], 2);
        validator.provider().mark_uncle(included.hash());

        let block = block_with_uncles(&headers[4], vec![invalid.clone(), included]);
        assert_matches!(
            validator.validate_uncles(&block).await,
            Err(ConsensusError::UncleInvalid { hash, .. }) if hash == invalid.hash()
        );
    }

    #[tokio::test]
    async fn genesis_block_skips_uncle_rules() {
        let (validator, headers) = chain(1);
        let uncles = vec![headers[1].clone(); 3];
        let block = Block::new(Header::mainnet_genesis(), vec![], uncles);
        assert_eq!(validator.validate_uncles(&block).await, Ok(()));
    }

    #[tokio::test]
    async fn valid_block() {
        ethblock_tracing::init_test_tracing();
        let (validator, headers) = chain(4);

        let transactions = vec![signed_transfer(0), signed_transfer(1)];
        let uncles = vec![uncle_of(&headers[2], 1), uncle_of(&headers[3], 2)];
        let mut header = child_of(&headers[4]);
        seal_uncles(&mut header, &uncles);
        header
            .set(HeaderField::TransactionsTrie, ordered_trie_root(&transactions).to_vec())
            .unwrap();
        let block = Block::new(header, transactions, uncles);

        assert_eq!(validator.validate_block(&block).await, Ok(()));
    }

    #[tokio::test]
    async fn transaction_trie_mismatch() {
        let (validator, headers) = chain(1);
        let mut header = child_of(&headers[1]);
        header.set(HeaderField::TransactionsTrie, EMPTY_ROOT_HASH.to_vec()).unwrap();
        let block = Block::new(header, vec![signed_transfer(0)], vec![]);

        let error = validator.validate_block(&block).await.unwrap_err();
        assert_eq!(
            error.errors(),
            &[ConsensusError::BodyTransactionRootDiff(
                (ordered_trie_root(&block.transactions), EMPTY_ROOT_HASH).into()
            )]
        );
    }

    #[tokio::test]
    async fn every_broken_rule_is_reported() {
        let (validator, headers) = chain(1);

        let unsigned = LegacyTransaction::new(
            U256::ZERO,
            U256::from(1),
            U256::from(21_000),
            Some(Address::ZERO),
            U256::ZERO,
            Bytes::new(),
        );
        let mut header = child_of(&headers[1]);
        header.set_integer(HeaderField::Difficulty, header.difficulty() + U256::from(1)).unwrap();
        header.set(HeaderField::UncleHash, vec![0u8; 32]).unwrap();
        header
            .set(HeaderField::TransactionsTrie, ordered_trie_root(&[unsigned.clone()]).to_vec())
            .unwrap();
        let block = Block::new(header, vec![unsigned], vec![]);

        let error = validator.validate_block(&block).await.unwrap_err();
        assert_eq!(error.errors().len(), 3, "{error}");
        assert_matches!(error.errors()[0], ConsensusError::DifficultyDiff(_));
        assert_matches!(
            error.errors()[1],
            ConsensusError::TransactionInvalid {
                index: 0,
                error: InvalidTransactionError::InvalidSignature
            }
        );
        assert_matches!(error.errors()[2], ConsensusError::BodyUnclesHashDiff(_));

        let report = error.to_string();
        assert!(report.contains("invalid difficulty"));
        assert!(report.contains("invalid transaction at index 0"));
        assert!(report.contains("invalid uncle hash"));
    }

    #[tokio::test]
    async fn trie_is_filled_in_transaction_order() {
        let (validator, headers) = chain(1);
        let transactions = vec![signed_transfer(0), signed_transfer(1), signed_transfer(2)];
        let mut header = child_of(&headers[1]);
        header
            .set(HeaderField::TransactionsTrie, ordered_trie_root(&transactions).to_vec())
            .unwrap();
        let block = Block::new(header, transactions, vec![]);

        let mut trie = MemoryTrie::new();
        assert_eq!(validator.validate_block_with_trie(&block, &mut trie).await, Ok(()));
        for (index, tx) in block.transactions.iter().enumerate() {
            assert_eq!(trie.get(&alloy_rlp::encode(index)), Some(&tx.encoded()[..]));
        }
    }

    /// Trie whose storage gives out after a number of writes.
    struct FailingTrie {
        inner: MemoryTrie,
        remaining: usize,
    }

    #[async_trait::async_trait]
    impl TrieMut for FailingTrie {
        async fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
            if self.remaining == 0 {
                return Err(TrieError::Storage("disk".to_string()))
            }
            self.remaining -= 1;
            self.inner.put(key, value).await
        }

        fn root(&self) -> B256 {
            self.inner.root()
        }
    }

    #[tokio::test]
    async fn trie_failure_is_reported_before_ordered_checks() {
        let (validator, headers) = chain(1);
        let transactions = vec![signed_transfer(0), signed_transfer(1), signed_transfer(2)];
        let expected_root = ordered_trie_root(&transactions);
        let mut header = child_of(&headers[1]);
        header.set(HeaderField::TransactionsTrie, expected_root.to_vec()).unwrap();
        let block = Block::new(header, transactions, vec![]);

        let mut trie = FailingTrie { inner: MemoryTrie::new(), remaining: 1 };
        let error = validator.validate_block_with_trie(&block, &mut trie).await.unwrap_err();
        let partial_root = trie.root();
        assert_eq!(trie.inner.len(), 1);
        assert_ne!(partial_root, expected_root);

        assert_eq!(
            error.errors(),
            &[
                ConsensusError::TransactionTrie(TrieError::Storage("disk".to_string())),
                ConsensusError::BodyTransactionRootDiff((partial_root, expected_root).into()),
            ]
        );
        let report = error.to_string();
        assert!(report.starts_with(
            "could not build the transaction trie: trie storage error: disk; invalid transaction trie"
        ));
    }
}
