//! Interfaces between block validation and the rest of the node.
//!
//! Block validation reads blocks and their bookkeeping from a [`BlockchainReader`] and reports
//! every broken rule as a [`ConsensusError`].

#![doc(issue_tracker_base_url = "https://github.com/ethblock/ethblock/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

/// Consensus errors.
pub mod consensus;
pub use consensus::{BlockValidationError, ConsensusError};

/// Blockchain lookups.
pub mod provider;
pub use provider::{BlockDetails, BlockchainReader, ProviderError, ProviderResult};

#[cfg(any(test, feature = "test-utils"))]
/// Common test helpers for mocking out the blockchain.
pub mod test_utils;
