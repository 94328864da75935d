//! Ethereum protocol-related constants

use alloy_primitives::{b256, B256, U256};

/// Keccak-256 hash of the RLP of an empty list, KEC("\xc0").
///
/// This is the uncle hash of a block without uncles.
pub const EMPTY_LIST_HASH: B256 =
    b256!("1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347");

/// Root hash of an empty trie.
pub const EMPTY_ROOT_HASH: B256 =
    b256!("56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421");

/// The mainnet genesis hash.
pub const MAINNET_GENESIS_HASH: B256 =
    b256!("d4e56740f876aef8c010b86a40d5f56745a118d0906a34e69aec8c0db1cb8fa3");

/// Block number at which the Homestead fork activates on mainnet.
pub const HOMESTEAD_BLOCK: u64 = 1_150_000;

/// Block number at which the Homestead gas reprice (EIP-150) activates on mainnet.
pub const HOMESTEAD_REPRICE_BLOCK: u64 = 2_463_000;

/// The minimum that the difficulty may ever be.
pub const MINIMUM_DIFFICULTY: u64 = 131_072;

/// Bound divisor of the difficulty, used in the update calculations.
pub const DIFFICULTY_BOUND_DIVISOR: u64 = 2048;

/// The decision boundary on the blocktime duration used to determine whether the frontier
/// difficulty should go up or down.
pub const DURATION_LIMIT: u64 = 13;

/// Exponential difficulty period.
pub const EXP_DIFF_PERIOD: u64 = 100_000;

/// The bound divisor of the gas limit, used in update calculations.
pub const GAS_LIMIT_BOUND_DIVISOR: u64 = 1024;

/// Minimum the gas limit may ever be.
pub const MINIMUM_GAS_LIMIT: u64 = 5000;

/// The maximum size of the extra data field in bytes.
pub const MAXIMUM_EXTRA_DATA_SIZE: usize = 32;

/// The maximum number of uncle headers a block may include.
pub const MAX_UNCLES: usize = 2;

/// Gas paid by every transaction.
pub const TX_GAS: u64 = 21_000;

/// Additional gas paid by contract creating transactions from Homestead on.
pub const TX_CREATE_GAS: u64 = 32_000;

/// Gas paid per zero byte of transaction data.
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Gas paid per non-zero byte of transaction data.
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

/// The order of the secp256k1 curve.
pub const SECP256K1N: U256 = U256::from_limbs([
    0xbfd25e8cd0364141,
    0xbaaedce6af48a03b,
    0xfffffffffffffffe,
    0xffffffffffffffff,
]);

/// The order of the secp256k1 curve, divided by two. Signatures with a larger `s` value are
/// rejected from Homestead on, see [EIP-2](https://eips.ethereum.org/EIPS/eip-2).
pub const SECP256K1N_HALF: U256 = U256::from_limbs([
    0xdfe92f46681b20a0,
    0x5d576e7357a4501d,
    0xffffffffffffffff,
    0x7fffffffffffffff,
]);

/// Mainnet genesis state root.
pub(crate) const MAINNET_GENESIS_STATE_ROOT: B256 =
    b256!("d7f8974fb5ac78d9ac099b9ad5018bedc2ce0a72dad1827a1709da30580f0544");
