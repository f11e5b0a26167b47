#![no_std]

pub mod accrual;
pub mod config;
pub mod eligibility;
pub mod events;
pub mod governance;
pub mod position_manager;
pub mod positions;
pub mod schedule;

use soroban_sdk::{contract, contractimpl, log, token, Address, Env, Vec};

pub use config::{Configuration, EngineParams, RangeConfig};
pub use governance::{Implementation, LogicRecord};
pub use position_manager::{PositionInfo, PositionManagerClient};
pub use positions::{PositionKind, RangeStake, StakePosition, WeightCurve};

use positions::OpenRequest;

const INSTANCE_TTL_THRESHOLD: u32 = 518_400;
const INSTANCE_TTL_EXTEND_TO: u32 = 1_555_200;

// ── Contract errors ──────────────────────────────────────────────────────────

/// Error codes returned by every fallible entry point.
///
/// # Code ranges
/// | Range   | Purpose                          |
/// |---------|----------------------------------|
/// | 1 – 9   | Lifecycle / authorization        |
/// | 10 – 19 | Input validation                 |
/// | 20 – 29 | Range-position eligibility       |
/// | 30 – 39 | Position state                   |
/// | 40+     | Arithmetic                       |
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum StakingError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotOwner = 3,
    NoPendingOwner = 4,

    InvalidAddress = 10,
    InvalidAmount = 11,
    InvalidDuration = 12,
    InvalidScale = 13,
    InvalidRange = 14,
    LengthMismatch = 15,
    InvalidRewardPeriods = 16,
    InvalidStartDate = 17,

    PairMismatch = 20,
    FeeMismatch = 21,
    RangeOutOfBounds = 22,
    RangeStakingDisabled = 23,
    FungibleStakingDisabled = 24,

    PositionNotFound = 30,
    NotPositionOwner = 31,
    PositionLocked = 32,
    UnclaimedRewards = 33,
    ProgramEnded = 34,

    ArithmeticOverflow = 40,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct EpochStakingContract;

#[contractimpl]
impl EpochStakingContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract. Callable once.
    ///
    /// * `liquidity_token` – token locked by fungible positions.
    /// * `reward_token`    – token paid out of the per-epoch schedule.
    /// * `start_date`      – first second of epoch 0; must be in the future.
    /// * `reward_periods`  – number of epochs the program runs for.
    /// * `range`           – eligibility rules; `None` disables NFT staking.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        env: Env,
        owner: Address,
        liquidity_token: Address,
        reward_token: Address,
        start_date: u64,
        reward_periods: u32,
        params: EngineParams,
        range: Option<RangeConfig>,
    ) -> Result<(), StakingError> {
        if config::exists(&env) {
            return Err(StakingError::AlreadyInitialized);
        }
        owner.require_auth();

        let now = env.ledger().timestamp();
        let config = config::build(
            &env,
            liquidity_token,
            reward_token,
            start_date,
            reward_periods,
            params,
            range,
            now,
        )?;

        config::store(&env, &config);
        governance::install(&env, &owner, now);
        Self::extend_instance_ttl(&env);

        log!(&env, "initialized", config.start_date, config.end_date);
        events::publish_initialized(
            &env,
            owner,
            config.liquidity_token.clone(),
            config.reward_token.clone(),
            config.start_date,
            config.end_date,
            config.range.is_some(),
        );

        Ok(())
    }

    // ── Reward schedule ─────────────────────────────────────────────────────

    /// Overwrite the reward bucket of every listed epoch.
    ///
    /// Returns the number of entries written.
    pub fn set_rewards(
        env: Env,
        caller: Address,
        epochs: Vec<u32>,
        amounts: Vec<i128>,
    ) -> Result<u32, StakingError> {
        governance::require_initialized(&env)?;
        caller.require_auth();
        governance::require_owner(&env, &caller)?;

        let config = config::load(&env)?;
        let written = schedule::set_rewards(&env, &config, &epochs, &amounts)?;
        Self::extend_instance_ttl(&env);

        events::publish_rewards_scheduled(&env, written);
        Ok(written)
    }

    /// Add `amount` to the bucket of `epoch`. Returns the new bucket total.
    pub fn top_up_rewards(
        env: Env,
        caller: Address,
        epoch: u32,
        amount: i128,
    ) -> Result<i128, StakingError> {
        governance::require_initialized(&env)?;
        caller.require_auth();
        governance::require_owner(&env, &caller)?;

        let config = config::load(&env)?;
        let total = schedule::top_up(&env, &config, epoch, amount)?;
        Self::extend_instance_ttl(&env);

        events::publish_reward_topped_up(&env, epoch, amount, total);
        Ok(total)
    }

    pub fn reward_for(env: Env, epoch: u32) -> i128 {
        schedule::reward_for(&env, epoch)
    }

    // ── Positions ───────────────────────────────────────────────────────────

    /// Lock `principal` liquidity tokens for `lock_weeks` epochs (the
    /// configured default when `None`) at the given `scale`. Unavailable on
    /// range deployments.
    ///
    /// Returns the new position id.
    pub fn open_position(
        env: Env,
        owner: Address,
        principal: i128,
        lock_weeks: Option<u32>,
        scale: u32,
    ) -> Result<u64, StakingError> {
        governance::require_initialized(&env)?;
        owner.require_auth();

        let config = config::load(&env)?;
        config.require_fungible()?;
        let now = env.ledger().timestamp();
        if config.has_ended(now) {
            return Err(StakingError::ProgramEnded);
        }

        let curve = governance::logic(&env)?.curve;
        let position = positions::open(
            &env,
            &config,
            curve,
            OpenRequest {
                owner: owner.clone(),
                principal,
                lock_weeks,
                scale,
                kind: PositionKind::Fungible,
            },
            config.epoch_at(now),
        )?;

        token::Client::new(&env, &config.liquidity_token).transfer(
            &owner,
            &env.current_contract_address(),
            &principal,
        );
        Self::extend_instance_ttl(&env);

        events::publish_position_opened(
            &env,
            position.id,
            owner,
            position.principal,
            position.weight,
            position.start_epoch,
            position.end_epoch,
            None,
        );
        Ok(position.id)
    }

    /// Lock the range-position NFT `nft_id`. Its liquidity becomes the
    /// principal once the position passes the eligibility rules.
    pub fn open_range_position(
        env: Env,
        owner: Address,
        nft_id: u64,
        lock_weeks: Option<u32>,
        scale: u32,
    ) -> Result<u64, StakingError> {
        governance::require_initialized(&env)?;
        owner.require_auth();

        let config = config::load(&env)?;
        let rules = config.range()?;
        let now = env.ledger().timestamp();
        if config.has_ended(now) {
            return Err(StakingError::ProgramEnded);
        }

        let manager = PositionManagerClient::new(&env, &rules.position_manager);
        let info = manager.position(&nft_id);
        eligibility::validate_info(rules, &info)?;

        let curve = governance::logic(&env)?.curve;
        let position = positions::open(
            &env,
            &config,
            curve,
            OpenRequest {
                owner: owner.clone(),
                principal: info.liquidity,
                lock_weeks,
                scale,
                kind: PositionKind::Range(RangeStake {
                    nft_id,
                    token_a: info.token_a,
                    token_b: info.token_b,
                    fee: info.fee,
                    tick_lower: info.tick_lower,
                    tick_upper: info.tick_upper,
                }),
            },
            config.epoch_at(now),
        )?;

        manager.transfer(&owner, &env.current_contract_address(), &nft_id);
        Self::extend_instance_ttl(&env);

        events::publish_position_opened(
            &env,
            position.id,
            owner,
            position.principal,
            position.weight,
            position.start_epoch,
            position.end_epoch,
            Some(nft_id),
        );
        Ok(position.id)
    }

    /// Check a range position against the configured pair, fee tier and
    /// tick bounds without opening it.
    pub fn validate_range_position(
        env: Env,
        token_a: Address,
        token_b: Address,
        fee: u32,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<(), StakingError> {
        let config = config::load(&env)?;
        eligibility::validate(
            config.range()?,
            &token_a,
            &token_b,
            fee,
            tick_lower,
            tick_upper,
        )
    }

    /// Return the principal of a position whose lock has expired and whose
    /// every epoch has been claimed. The position is deleted.
    pub fn close_position(env: Env, owner: Address, position_id: u64) -> Result<i128, StakingError> {
        governance::require_initialized(&env)?;
        owner.require_auth();

        let position = positions::load(&env, position_id)?;
        if position.owner != owner {
            return Err(StakingError::NotPositionOwner);
        }

        let config = config::load(&env)?;
        let current_epoch = config.epoch_at(env.ledger().timestamp());
        if current_epoch < position.end_epoch {
            return Err(StakingError::PositionLocked);
        }
        if !position.is_settled() {
            return Err(StakingError::UnclaimedRewards);
        }

        // Delete before returning custody.
        positions::remove(&env, &position);

        match &position.kind {
            PositionKind::Fungible => {
                token::Client::new(&env, &config.liquidity_token).transfer(
                    &env.current_contract_address(),
                    &owner,
                    &position.principal,
                );
            }
            PositionKind::Range(stake) => {
                let rules = config.range()?;
                PositionManagerClient::new(&env, &rules.position_manager).transfer(
                    &env.current_contract_address(),
                    &owner,
                    &stake.nft_id,
                );
            }
        }

        Self::extend_instance_ttl(&env);

        events::publish_position_closed(&env, position_id, owner, position.principal);
        Ok(position.principal)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Reward a position would receive by claiming up to `upto_epoch`.
    pub fn claimable(env: Env, position_id: u64, upto_epoch: u32) -> Result<i128, StakingError> {
        let config = config::load(&env)?;
        let position = positions::load(&env, position_id)?;
        let current_epoch = config.epoch_at(env.ledger().timestamp());
        Ok(accrual::accrue(&env, &position, upto_epoch, current_epoch)?.amount)
    }

    /// Pay out every fully elapsed epoch of `position_id` below `upto_epoch`.
    ///
    /// Returns zero, not an error, when nothing new has elapsed.
    pub fn claim(
        env: Env,
        owner: Address,
        position_id: u64,
        upto_epoch: u32,
    ) -> Result<i128, StakingError> {
        governance::require_initialized(&env)?;
        owner.require_auth();

        let mut position = positions::load(&env, position_id)?;
        if position.owner != owner {
            return Err(StakingError::NotPositionOwner);
        }

        let config = config::load(&env)?;
        let current_epoch = config.epoch_at(env.ledger().timestamp());
        let amount = accrual::claim(&env, &mut position, upto_epoch, current_epoch)?;
        if amount == 0 {
            return Ok(0);
        }

        token::Client::new(&env, &config.reward_token).transfer(
            &env.current_contract_address(),
            &owner,
            &amount,
        );

        Self::extend_instance_ttl(&env);

        events::publish_reward_claimed(
            &env,
            position_id,
            owner,
            amount,
            position.claimed_through_epoch,
        );
        Ok(amount)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn get_position(env: Env, position_id: u64) -> Result<StakePosition, StakingError> {
        positions::load(&env, position_id)
    }

    /// Ids of the open positions held by `owner`.
    pub fn positions_of(env: Env, owner: Address) -> Vec<u64> {
        positions::positions_of(&env, &owner)
    }

    /// Number of positions ever opened.
    pub fn position_count(env: Env) -> u64 {
        positions::position_count(&env)
    }

    /// Sum of the weights of every position active during `epoch`.
    pub fn weighted_stake_total(env: Env, epoch: u32) -> Result<i128, StakingError> {
        positions::weighted_stake_total(&env, epoch)
    }

    pub fn current_epoch(env: Env) -> Result<u32, StakingError> {
        Ok(config::load(&env)?.epoch_at(env.ledger().timestamp()))
    }

    pub fn get_config(env: Env) -> Result<Configuration, StakingError> {
        config::load(&env)
    }

    pub fn start_date(env: Env) -> Result<u64, StakingError> {
        Ok(config::load(&env)?.start_date)
    }

    pub fn end_date(env: Env) -> Result<u64, StakingError> {
        Ok(config::load(&env)?.end_date)
    }

    pub fn liquidity_token(env: Env) -> Result<Address, StakingError> {
        Ok(config::load(&env)?.liquidity_token)
    }

    pub fn reward_token(env: Env) -> Result<Address, StakingError> {
        Ok(config::load(&env)?.reward_token)
    }

    pub fn is_initialized(env: Env) -> bool {
        config::exists(&env)
    }

    pub fn owner(env: Env) -> Result<Address, StakingError> {
        governance::owner(&env)
    }

    pub fn logic(env: Env) -> Result<LogicRecord, StakingError> {
        governance::logic(&env)
    }

    // ── Governance ──────────────────────────────────────────────────────────

    /// Install new logic. Existing configuration and positions are left
    /// exactly as they are. Returns the new revision.
    pub fn upgrade_logic(
        env: Env,
        caller: Address,
        new_implementation: Implementation,
    ) -> Result<u32, StakingError> {
        governance::require_initialized(&env)?;
        caller.require_auth();
        governance::require_owner(&env, &caller)?;

        let record = governance::upgrade(
            &env,
            new_implementation.clone(),
            env.ledger().timestamp(),
        )?;
        Self::extend_instance_ttl(&env);

        log!(&env, "logic upgraded", record.revision);
        events::publish_logic_upgraded(&env, record.revision, new_implementation);
        Ok(record.revision)
    }

    /// Propose a new owner. The proposed address must call `accept_owner`.
    pub fn propose_owner(
        env: Env,
        current_owner: Address,
        new_owner: Address,
    ) -> Result<(), StakingError> {
        governance::require_initialized(&env)?;
        current_owner.require_auth();
        governance::require_owner(&env, &current_owner)?;

        governance::propose_owner(&env, &new_owner);
        Self::extend_instance_ttl(&env);

        events::publish_owner_transfer_proposed(&env, current_owner, new_owner);
        Ok(())
    }

    pub fn accept_owner(env: Env, new_owner: Address) -> Result<(), StakingError> {
        governance::require_initialized(&env)?;
        new_owner.require_auth();

        let old_owner = governance::accept_owner(&env, &new_owner)?;
        Self::extend_instance_ttl(&env);

        events::publish_owner_transfer_accepted(&env, old_owner, new_owner);
        Ok(())
    }

    pub fn cancel_owner_transfer(env: Env, current_owner: Address) -> Result<(), StakingError> {
        governance::require_initialized(&env)?;
        current_owner.require_auth();
        governance::require_owner(&env, &current_owner)?;

        let pending = governance::cancel_owner_transfer(&env)?;
        Self::extend_instance_ttl(&env);

        events::publish_owner_transfer_cancelled(&env, current_owner, pending);
        Ok(())
    }

    pub fn pending_owner(env: Env) -> Option<Address> {
        governance::pending_owner(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_governance;
