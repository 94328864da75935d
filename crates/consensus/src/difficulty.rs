use ethblock_primitives::{ChainConfig, Header, U256};

/// The difficulty a header must declare, given its parent.
///
/// ## Algorithm
///
/// Frontier:
/// block_diff = pdiff + pdiff / 2048 * (1 if ptime + 13 > time else -1)
///
/// Homestead:
/// block_diff = pdiff + pdiff / 2048 * max(1 - (time - ptime) / 10, -99)
///
/// Both eras then add the exponential bomb `2 ^ (num / 100000 - 2)` once `num / 100000 >= 2`, and
/// the result is never below the minimum difficulty.
///
/// Where:
/// - pdiff = parent.difficulty
/// - ptime = parent.timestamp
/// - time = header.timestamp
/// - num = header.number
pub fn canonical_difficulty(header: &Header, parent: &Header, config: &ChainConfig) -> U256 {
    let mut difficulty = if header.is_homestead(config) {
        calc_difficulty_homestead(header.timestamp(), parent, config)
    } else {
        calc_difficulty_frontier(header.timestamp(), parent, config)
    };

    let period = header.number() / U256::from(config.exp_diff_period);
    if period >= U256::from(2) {
        let exponent = period - U256::from(2);
        let bomb = if exponent < U256::from(U256::BITS) {
            U256::from(1) << exponent.as_limbs()[0] as usize
        } else {
            U256::MAX
        };
        difficulty = difficulty.saturating_add(bomb);
    }

    difficulty.max(U256::from(config.minimum_difficulty))
}

/// `pdiff / 2048`, the unit of every adjustment.
fn difficulty_offset(parent: &Header, config: &ChainConfig) -> U256 {
    parent.difficulty() / U256::from(config.difficulty_bound_divisor)
}

fn calc_difficulty_frontier(timestamp: U256, parent: &Header, config: &ChainConfig) -> U256 {
    let parent_difficulty = parent.difficulty();
    let offset = difficulty_offset(parent, config);

    if parent.timestamp().saturating_add(U256::from(config.duration_limit)) > timestamp {
        parent_difficulty.saturating_add(offset)
    } else {
        parent_difficulty.saturating_sub(offset)
    }
}

/// Computes the Homestead adjustment on unsigned integers:
/// `1 - (time - ptime) / 10`, truncated toward zero and clamped to `-99`.
fn calc_difficulty_homestead(timestamp: U256, parent: &Header, config: &ChainConfig) -> U256 {
    let parent_difficulty = parent.difficulty();
    let parent_timestamp = parent.timestamp();
    let offset = difficulty_offset(parent, config);
    let ten = U256::from(10);

    if timestamp < parent_timestamp {
        // the elapsed time is negative, so the adjustment is `1 + (ptime - time) / 10`
        let adjustment = ((parent_timestamp - timestamp) / ten).saturating_add(U256::from(1));
        return parent_difficulty.saturating_add(offset.saturating_mul(adjustment))
    }

    let elapsed = (timestamp - parent_timestamp) / ten;
    if elapsed.is_zero() {
        parent_difficulty.saturating_add(offset)
    } else {
        let decrease = (elapsed - U256::from(1)).min(U256::from(99));
        parent_difficulty.saturating_sub(offset.saturating_mul(decrease))
    }
}
