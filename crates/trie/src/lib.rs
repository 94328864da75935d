//! The Merkle Patricia Trie used to commit to the transactions of a block.
//!
//! Block validation only needs to insert key-value pairs and read the resulting root, which is what
//! [`TrieMut`] exposes. [`MemoryTrie`] keeps the leaves in memory and hashes them on demand with
//! the [`HashBuilder`](alloy_trie::HashBuilder).
//! <https://ethereum.org/en/developers/docs/data-structures-and-encoding/patricia-merkle-trie/>

#![doc(issue_tracker_base_url = "https://github.com/ethblock/ethblock/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod errors;
pub use errors::TrieError;

mod memory;
pub use memory::MemoryTrie;

mod root;
pub use root::{adjust_index_for_rlp, ordered_trie_root, ordered_trie_root_with_encoder};

pub use alloy_trie::EMPTY_ROOT_HASH;

use alloy_primitives::B256;

/// A trie that can be written to and hashed.
///
/// Writes may suspend, e.g. when the trie is backed by a database.
#[async_trait::async_trait]
pub trait TrieMut: Send {
    /// Inserts a value under the given key. An empty value removes the key.
    async fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError>;

    /// Root hash reflecting every completed [`put`](TrieMut::put).
    fn root(&self) -> B256;
}
