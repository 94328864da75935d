use crate::constants::{
    DIFFICULTY_BOUND_DIVISOR, DURATION_LIMIT, EXP_DIFF_PERIOD, GAS_LIMIT_BOUND_DIVISOR,
    HOMESTEAD_BLOCK, HOMESTEAD_REPRICE_BLOCK, MAXIMUM_EXTRA_DATA_SIZE, MAX_UNCLES,
    MINIMUM_DIFFICULTY, MINIMUM_GAS_LIMIT,
};
use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

/// Fork heights and protocol parameters the consensus rules are evaluated against.
///
/// Every field falls back to its mainnet value when left out of a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Homestead hard fork block.
    pub homestead_block: u64,
    /// Homestead gas reprice (EIP-150) hard fork block.
    pub homestead_reprice_block: u64,
    /// The minimum that the difficulty may ever be.
    pub minimum_difficulty: u64,
    /// Bound divisor of the difficulty.
    pub difficulty_bound_divisor: u64,
    /// Frontier blocktime boundary deciding whether difficulty goes up or down.
    pub duration_limit: u64,
    /// Number of blocks per step of the exponential difficulty bomb.
    pub exp_diff_period: u64,
    /// Bound divisor of the gas limit.
    pub gas_limit_bound_divisor: u64,
    /// Minimum the gas limit may ever be.
    pub min_gas_limit: u64,
    /// Maximum size of the extra data field in bytes.
    pub maximum_extra_data_size: usize,
    /// Maximum number of uncle headers in a block.
    pub max_uncles: usize,
}

impl ChainConfig {
    /// The mainnet configuration.
    pub const fn mainnet() -> Self {
        Self {
            homestead_block: HOMESTEAD_BLOCK,
            homestead_reprice_block: HOMESTEAD_REPRICE_BLOCK,
            minimum_difficulty: MINIMUM_DIFFICULTY,
            difficulty_bound_divisor: DIFFICULTY_BOUND_DIVISOR,
            duration_limit: DURATION_LIMIT,
            exp_diff_period: EXP_DIFF_PERIOD,
            gas_limit_bound_divisor: GAS_LIMIT_BOUND_DIVISOR,
            min_gas_limit: MINIMUM_GAS_LIMIT,
            maximum_extra_data_size: MAXIMUM_EXTRA_DATA_SIZE,
            max_uncles: MAX_UNCLES,
        }
    }

    /// Returns `true` if Homestead is active at the given block number.
    pub fn is_homestead_active_at_block(&self, number: U256) -> bool {
        number >= U256::from(self.homestead_block)
    }

    /// Returns `true` if the Homestead gas reprice is active at the given block number.
    pub fn is_homestead_reprice_active_at_block(&self, number: U256) -> bool {
        number >= U256::from(self.homestead_reprice_block)
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::mainnet()
    }
}
