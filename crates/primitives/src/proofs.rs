//! Helper functions for calculating commitment hashes.

use crate::{keccak256, Header, B256};

/// Calculates the uncle hash for a header: the keccak256 hash of the RLP list of the uncle
/// headers' raw field arrays.
pub fn calculate_uncles_hash(uncles: &[Header]) -> B256 {
    let mut out = Vec::new();
    alloy_rlp::encode_list(uncles, &mut out);
    keccak256(out)
}
