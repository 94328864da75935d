use alloy_primitives::Bytes;

/// Errors that can occur while writing to a trie.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    /// The key is a strict prefix of a stored key, or a stored key is a strict prefix of it.
    #[error("key {key} conflicts with a stored key")]
    KeyConflict {
        /// The rejected key.
        key: Bytes,
    },
    /// The backing storage failed.
    #[error("trie storage error: {0}")]
    Storage(String),
}
