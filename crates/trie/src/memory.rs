use crate::{TrieError, TrieMut};
use alloy_primitives::{hex, Bytes, B256};
use alloy_trie::{HashBuilder, Nibbles};
use std::{collections::BTreeMap, ops::Bound};
use tracing::trace;

/// An in-memory trie.
///
/// Leaves are kept in a sorted map; byte order of the keys is their nibble order, so the root is
/// computed by feeding the leaves to a [`HashBuilder`] in map order. Keys must be prefix free,
/// which always holds for RLP encoded indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTrie {
    leaves: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemoryTrie {
    /// Creates an empty trie.
    pub const fn new() -> Self {
        Self { leaves: BTreeMap::new() }
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Returns `true` if the trie holds no keys.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Returns the value stored under the key.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.leaves.get(key).map(Vec::as_slice)
    }

    /// Inserts a value under the given key. An empty value removes the key.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        if value.is_empty() {
            self.leaves.remove(key);
            return Ok(())
        }
        if !self.leaves.contains_key(key) && self.conflicts(key) {
            return Err(TrieError::KeyConflict { key: Bytes::copy_from_slice(key) })
        }
        trace!(
            target: "trie::memory",
            key = %hex::encode(key),
            len = value.len(),
            "Inserting leaf"
        );
        self.leaves.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    /// Checks whether a new key is a prefix of a stored key or the other way around.
    ///
    /// Stored keys are prefix free, so only the direct neighbours of the key have to be checked.
    fn conflicts(&self, key: &[u8]) -> bool {
        let mut before = self.leaves.range::<[u8], _>((Bound::Unbounded, Bound::Excluded(key)));
        let mut after = self.leaves.range::<[u8], _>((Bound::Included(key), Bound::Unbounded));
        let previous = before.next_back();
        let next = after.next();
        previous.is_some_and(|(stored, _)| key.starts_with(stored)) ||
            next.is_some_and(|(stored, _)| stored.starts_with(key))
    }

    /// Computes the root hash.
    pub fn root_hash(&self) -> B256 {
        let mut hb = HashBuilder::default();
        for (key, value) in &self.leaves {
            hb.add_leaf(Nibbles::unpack(key), value);
        }
        hb.root()
    }
}

#[async_trait::async_trait]
impl TrieMut for MemoryTrie {
    async fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), TrieError> {
        self.insert(key, value)
    }

    fn root(&self) -> B256 {
        self.root_hash()
    }
}
