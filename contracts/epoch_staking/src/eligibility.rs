use soroban_sdk::Address;

use crate::config::RangeConfig;
use crate::position_manager::PositionInfo;
use crate::StakingError;

/// Check a range position against the configured pair, fee tier and tick
/// bounds, in that order; the first failing rule is reported.
pub fn validate(
    rules: &RangeConfig,
    token_a: &Address,
    token_b: &Address,
    fee: u32,
    tick_lower: i32,
    tick_upper: i32,
) -> Result<(), StakingError> {
    let same_order = *token_a == rules.token_a && *token_b == rules.token_b;
    let swapped = *token_a == rules.token_b && *token_b == rules.token_a;
    if !same_order && !swapped {
        return Err(StakingError::PairMismatch);
    }

    if fee != rules.fee {
        return Err(StakingError::FeeMismatch);
    }

    if tick_lower > tick_upper || tick_lower < rules.tick_min || tick_upper > rules.tick_max {
        return Err(StakingError::RangeOutOfBounds);
    }

    Ok(())
}

pub fn validate_info(rules: &RangeConfig, info: &PositionInfo) -> Result<(), StakingError> {
    validate(
        rules,
        &info.token_a,
        &info.token_b,
        info.fee,
        info.tick_lower,
        info.tick_upper,
    )
}
