//! Turns elapsed epochs into claimable reward.
//!
//! A position's reward for epoch `E` is
//! `reward_for(E) × weight / WeightedStakeTotal(E)`, truncated per epoch, so
//! the claims of all positions for one epoch never exceed its bucket. Epochs
//! with no stake contribute nothing and their bucket stays in the contract.

use soroban_sdk::{Env, I256};

use crate::positions::{self, StakePosition};
use crate::schedule;
use crate::StakingError;

/// Result of walking a position's unclaimed epochs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Accrual {
    pub amount: i128,
    /// First epoch left unclaimed once `amount` is paid.
    pub reached: u32,
}

/// Pro-rata share of one epoch's bucket, truncated toward zero.
///
/// The product `reward × weight` is taken in 256 bits; the quotient never
/// exceeds `reward` because `weight <= total`.
pub fn share(env: &Env, reward: i128, weight: i128, total: i128) -> Result<i128, StakingError> {
    if total <= 0 || reward == 0 || weight == 0 {
        return Ok(0);
    }
    I256::from_i128(env, reward)
        .mul(&I256::from_i128(env, weight))
        .div(&I256::from_i128(env, total))
        .to_i128()
        .ok_or(StakingError::ArithmeticOverflow)
}

/// Last epoch boundary a claim may reach: never past the requested bound,
/// the current (still running) epoch, or the end of the lock.
fn horizon(position: &StakePosition, upto_epoch: u32, current_epoch: u32) -> u32 {
    upto_epoch.min(current_epoch).min(position.end_epoch)
}

/// Reward accrued over `[claimed_through_epoch, horizon)`. Read-only.
pub fn accrue(
    env: &Env,
    position: &StakePosition,
    upto_epoch: u32,
    current_epoch: u32,
) -> Result<Accrual, StakingError> {
    let from = position.claimed_through_epoch;
    let reached = horizon(position, upto_epoch, current_epoch);
    if reached <= from {
        return Ok(Accrual {
            amount: 0,
            reached: from,
        });
    }

    let mut amount: i128 = 0;
    positions::fold_totals(env, from, reached, |epoch, total| {
        let part = share(env, schedule::reward_for(env, epoch), position.weight, total)?;
        amount = amount
            .checked_add(part)
            .ok_or(StakingError::ArithmeticOverflow)?;
        Ok(())
    })?;

    Ok(Accrual { amount, reached })
}

/// Settle the position up to the horizon and persist the new cursor.
///
/// Returns the amount owed; zero when no further epoch has elapsed.
pub fn claim(
    env: &Env,
    position: &mut StakePosition,
    upto_epoch: u32,
    current_epoch: u32,
) -> Result<i128, StakingError> {
    positions::settle(env, horizon(position, upto_epoch, current_epoch))?;

    let accrual = accrue(env, position, upto_epoch, current_epoch)?;
    if accrual.reached != position.claimed_through_epoch {
        position.claimed_through_epoch = accrual.reached;
        positions::save(env, position);
    }
    Ok(accrual.amount)
}
