//! Transactions carried in a block body.

use crate::{keccak256, Bytes, FieldError, B256};
use alloy_rlp::{Decodable, Encodable};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;

pub use error::InvalidTransactionError;
pub use legacy::{LegacyTransaction, TX_FIELDS};

mod error;
mod legacy;
mod util;

/// A transaction as seen by block validation.
///
/// The block only needs the raw field array, the canonical encoding that is committed to in the
/// transaction trie and the transaction's own stateless validation.
pub trait BlockTransaction:
    Encodable
    + Decodable
    + Serialize
    + DeserializeOwned
    + Clone
    + Debug
    + Eq
    + Send
    + Sync
    + 'static
{
    /// Builds the transaction from its raw field array.
    fn from_raw(fields: Vec<Bytes>) -> Result<Self, FieldError>;

    /// The raw field array in canonical order.
    fn raw(&self) -> &[Bytes];

    /// Canonical serialization, the value stored in the transaction trie.
    fn encoded(&self) -> Bytes {
        alloy_rlp::encode(self).into()
    }

    /// Transaction hash.
    fn hash(&self) -> B256 {
        keccak256(self.encoded())
    }

    /// Validates the signature and form of the transaction. `homestead` selects the Homestead
    /// rules.
    fn validate(&self, homestead: bool) -> Result<(), InvalidTransactionError>;
}
