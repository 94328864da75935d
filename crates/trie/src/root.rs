use alloy_primitives::B256;
use alloy_rlp::Encodable;
use alloy_trie::{HashBuilder, Nibbles};
use bytes::{BufMut, BytesMut};

/// Adjust the index of an item for rlp encoding.
///
/// Leaves have to be added to the [`HashBuilder`] in key order, and the RLP encoding of `0`
/// (`0x80`) sorts after the encodings of `1..=0x7f`.
pub const fn adjust_index_for_rlp(i: usize, len: usize) -> usize {
    if i > 0x7f {
        i
    } else if i == 0x7f || i + 1 == len {
        0
    } else {
        i + 1
    }
}

/// Compute a trie root of the collection of rlp encodable items.
pub fn ordered_trie_root<T: Encodable>(items: &[T]) -> B256 {
    ordered_trie_root_with_encoder(items, |item, buf| item.encode(buf))
}

/// Compute a trie root of the collection of items with a custom encoder.
///
/// The trie holds `(rlp(index), encode(item))` pairs.
pub fn ordered_trie_root_with_encoder<T, F>(items: &[T], mut encode: F) -> B256
where
    F: FnMut(&T, &mut dyn BufMut),
{
    let mut index_buffer = BytesMut::new();
    let mut value_buffer = BytesMut::new();

    let mut hb = HashBuilder::default();
    let items_len = items.len();
    for i in 0..items_len {
        let index = adjust_index_for_rlp(i, items_len);

        index_buffer.clear();
        index.encode(&mut index_buffer);

        value_buffer.clear();
        encode(&items[index], &mut value_buffer);

        hb.add_leaf(Nibbles::unpack(&index_buffer), &value_buffer);
    }

    hb.root()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryTrie, TrieMut, EMPTY_ROOT_HASH};

    fn items(count: usize) -> Vec<Vec<u8>> {
        (0..count).map(|i| format!("item {i}").into_bytes()).collect()
    }

    #[test]
    fn empty() {
        let empty: [Vec<u8>; 0] = [];
        let root = ordered_trie_root_with_encoder(&empty, |item, buf| buf.put_slice(item));
        assert_eq!(root, EMPTY_ROOT_HASH);
    }

    #[tokio::test]
    async fn matches_insertion_trie() {
        for count in [1, 2, 3, 127, 128, 129, 300] {
            let items = items(count);
            let mut trie = MemoryTrie::new();
            for (index, item) in items.iter().enumerate() {
                trie.put(&alloy_rlp::encode(index), item).await.unwrap();
            }
            let root = ordered_trie_root_with_encoder(&items, |item, buf| buf.put_slice(item));
            assert_eq!(root, trie.root(), "{count} items");
        }
    }
}
