use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

use crate::StakingError;

const CONFIG: Symbol = symbol_short!("CONFIG");

/// Strkey of the all-zero ed25519 account.
const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
/// Strkey of the all-zero contract id.
const ZERO_CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

// ── Types ────────────────────────────────────────────────────────────────────

/// Engine-wide parameters supplied once at `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EngineParams {
    /// Length of one epoch in seconds.
    pub epoch_length: u64,
    /// Upper bound on lock duration and on the reward schedule index.
    pub max_weeks: u32,
    /// Highest accepted scale; a position at `max_scale` weighs 2×.
    pub max_scale: u32,
    /// Lock duration used when a staker does not pick one.
    pub default_lock_weeks: u32,
}

/// Eligibility rules for NFT-backed range positions.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeConfig {
    /// Contract that custodies range positions and reports their metadata.
    pub position_manager: Address,
    pub token_a: Address,
    pub token_b: Address,
    pub fee: u32,
    pub tick_min: i32,
    pub tick_max: i32,
}

/// Immutable deployment configuration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Configuration {
    pub liquidity_token: Address,
    pub reward_token: Address,
    pub start_date: u64,
    pub end_date: u64,
    pub reward_periods: u32,
    pub epoch_length: u64,
    pub max_weeks: u32,
    pub max_scale: u32,
    pub default_lock_weeks: u32,
    pub range: Option<RangeConfig>,
}

impl Configuration {
    /// Epoch containing `timestamp`. Everything before `start_date` maps to
    /// epoch 0, which has not elapsed yet.
    pub fn epoch_at(&self, timestamp: u64) -> u32 {
        if timestamp < self.start_date {
            return 0;
        }
        let epoch = (timestamp - self.start_date) / self.epoch_length;
        u32::try_from(epoch).unwrap_or(u32::MAX)
    }

    pub fn has_ended(&self, timestamp: u64) -> bool {
        timestamp >= self.end_date
    }

    /// Resolve an optional lock duration against the default and the bounds.
    pub fn lock_weeks(&self, requested: Option<u32>) -> Result<u32, StakingError> {
        let weeks = requested.unwrap_or(self.default_lock_weeks);
        if weeks == 0 || weeks > self.max_weeks {
            return Err(StakingError::InvalidDuration);
        }
        Ok(weeks)
    }

    pub fn check_scale(&self, scale: u32) -> Result<(), StakingError> {
        if scale > self.max_scale {
            return Err(StakingError::InvalidScale);
        }
        Ok(())
    }

    pub fn range(&self) -> Result<&RangeConfig, StakingError> {
        self.range.as_ref().ok_or(StakingError::RangeStakingDisabled)
    }

    /// A deployment stakes either fungible tokens or range NFTs, never both.
    pub fn require_fungible(&self) -> Result<(), StakingError> {
        if self.range.is_some() {
            return Err(StakingError::FungibleStakingDisabled);
        }
        Ok(())
    }
}

// ── Validation ───────────────────────────────────────────────────────────────

/// True for the all-zero account or contract address.
pub fn is_zero_address(env: &Env, address: &Address) -> bool {
    *address == Address::from_string(&String::from_str(env, ZERO_ACCOUNT))
        || *address == Address::from_string(&String::from_str(env, ZERO_CONTRACT))
}

fn check_address(env: &Env, address: &Address) -> Result<(), StakingError> {
    if is_zero_address(env, address) || *address == env.current_contract_address() {
        return Err(StakingError::InvalidAddress);
    }
    Ok(())
}

/// Validate the `initialize` arguments and assemble the configuration.
///
/// Checks run in a fixed order: token addresses, reward periods, start date,
/// engine parameters, then the optional range rules.
#[allow(clippy::too_many_arguments)]
pub fn build(
    env: &Env,
    liquidity_token: Address,
    reward_token: Address,
    start_date: u64,
    reward_periods: u32,
    params: EngineParams,
    range: Option<RangeConfig>,
    now: u64,
) -> Result<Configuration, StakingError> {
    check_address(env, &liquidity_token)?;
    check_address(env, &reward_token)?;

    if reward_periods == 0 {
        return Err(StakingError::InvalidRewardPeriods);
    }
    if start_date <= now {
        return Err(StakingError::InvalidStartDate);
    }

    if params.epoch_length == 0 || params.max_weeks == 0 {
        return Err(StakingError::InvalidDuration);
    }
    if params.default_lock_weeks == 0 || params.default_lock_weeks > params.max_weeks {
        return Err(StakingError::InvalidDuration);
    }

    if let Some(rules) = &range {
        check_address(env, &rules.position_manager)?;
        check_address(env, &rules.token_a)?;
        check_address(env, &rules.token_b)?;
        if rules.tick_min > rules.tick_max {
            return Err(StakingError::InvalidRange);
        }
    }

    let end_date = params
        .epoch_length
        .checked_mul(u64::from(reward_periods))
        .and_then(|span| span.checked_add(start_date))
        .ok_or(StakingError::ArithmeticOverflow)?;

    Ok(Configuration {
        liquidity_token,
        reward_token,
        start_date,
        end_date,
        reward_periods,
        epoch_length: params.epoch_length,
        max_weeks: params.max_weeks,
        max_scale: params.max_scale,
        default_lock_weeks: params.default_lock_weeks,
        range,
    })
}

// ── Storage ──────────────────────────────────────────────────────────────────

pub fn load(env: &Env) -> Result<Configuration, StakingError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(StakingError::NotInitialized)
}

pub fn store(env: &Env, config: &Configuration) {
    env.storage().instance().set(&CONFIG, config);
}

pub fn exists(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}
