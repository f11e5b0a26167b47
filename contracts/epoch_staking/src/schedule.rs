//! Owner-populated reward table: epoch index → amount distributed in that
//! epoch. Bounded to `[0, max_weeks)`.

use soroban_sdk::{symbol_short, Env, Symbol, Vec};

use crate::config::Configuration;
use crate::StakingError;

const REWARD: Symbol = symbol_short!("RWD");

const TTL_THRESHOLD: u32 = 518_400;
const TTL_EXTEND_TO: u32 = 1_555_200;

fn bucket_key(epoch: u32) -> (Symbol, u32) {
    (REWARD, epoch)
}

fn check_epoch(config: &Configuration, epoch: u32) -> Result<(), StakingError> {
    if epoch >= config.max_weeks {
        return Err(StakingError::InvalidRange);
    }
    Ok(())
}

fn write_bucket(env: &Env, epoch: u32, amount: i128) {
    let key = bucket_key(epoch);
    env.storage().persistent().set(&key, &amount);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Reward scheduled for `epoch`; zero when never set.
pub fn reward_for(env: &Env, epoch: u32) -> i128 {
    env.storage()
        .persistent()
        .get(&bucket_key(epoch))
        .unwrap_or(0)
}

/// Overwrite the buckets for every listed epoch.
///
/// The whole batch is validated before the first write, so a bad entry
/// anywhere leaves the table untouched. Returns the number of entries written.
pub fn set_rewards(
    env: &Env,
    config: &Configuration,
    epochs: &Vec<u32>,
    amounts: &Vec<i128>,
) -> Result<u32, StakingError> {
    if epochs.is_empty() || epochs.len() != amounts.len() {
        return Err(StakingError::LengthMismatch);
    }
    for (epoch, amount) in epochs.iter().zip(amounts.iter()) {
        check_epoch(config, epoch)?;
        if amount < 0 {
            return Err(StakingError::InvalidAmount);
        }
    }

    for (epoch, amount) in epochs.iter().zip(amounts.iter()) {
        write_bucket(env, epoch, amount);
    }
    Ok(epochs.len())
}

/// Add `amount` on top of whatever `epoch` already holds.
pub fn top_up(
    env: &Env,
    config: &Configuration,
    epoch: u32,
    amount: i128,
) -> Result<i128, StakingError> {
    check_epoch(config, epoch)?;
    if amount <= 0 {
        return Err(StakingError::InvalidAmount);
    }
    let total = reward_for(env, epoch)
        .checked_add(amount)
        .ok_or(StakingError::ArithmeticOverflow)?;
    write_bucket(env, epoch, total);
    Ok(total)
}
