//! Commonly used types in ethblock.
//!
//! This crate contains the block, header and transaction primitives together with the declarative
//! field schema that drives their construction, canonical encoding and JSON projection.

#![doc(issue_tracker_base_url = "https://github.com/ethblock/ethblock/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod block;
mod chain;
pub mod constants;
mod error;
mod header;
pub mod proofs;
pub mod schema;
mod transaction;

pub use block::{Block, RawBlock};
pub use chain::ChainConfig;
pub use constants::{EMPTY_LIST_HASH, EMPTY_ROOT_HASH, MAINNET_GENESIS_HASH};
pub use error::{BlockDecodeError, FieldError, GotExpected};
pub use header::{Header, HeaderField, HEADER_FIELDS};
pub use transaction::{BlockTransaction, InvalidTransactionError, LegacyTransaction, TX_FIELDS};

pub use alloy_primitives::{self, hex, keccak256, Address, Bytes, B256, U256};
