#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::governance::Implementation;

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the contract is bootstrapped.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub owner: Address,
    pub liquidity_token: Address,
    pub reward_token: Address,
    pub start_date: u64,
    pub end_date: u64,
    pub range_enabled: bool,
    pub timestamp: u64,
}

/// Fired when the owner overwrites schedule entries.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardsScheduledEvent {
    pub entries: u32,
    pub timestamp: u64,
}

/// Fired when the owner adds to a single bucket.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardToppedUpEvent {
    pub epoch: u32,
    pub amount: i128,
    pub new_total: i128,
    pub timestamp: u64,
}

/// Fired when a staker locks value.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionOpenedEvent {
    pub position_id: u64,
    pub owner: Address,
    pub principal: i128,
    pub weight: i128,
    pub start_epoch: u32,
    pub end_epoch: u32,
    pub nft_id: Option<u64>,
    pub timestamp: u64,
}

/// Fired when a claim pays out a non-zero amount.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RewardClaimedEvent {
    pub position_id: u64,
    pub owner: Address,
    pub amount: i128,
    pub claimed_through_epoch: u32,
    pub timestamp: u64,
}

/// Fired when a fully settled position returns its principal.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionClosedEvent {
    pub position_id: u64,
    pub owner: Address,
    pub principal: i128,
    pub timestamp: u64,
}

/// Fired when the owner installs new logic.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogicUpgradedEvent {
    pub revision: u32,
    pub implementation: Implementation,
    pub timestamp: u64,
}

/// Fired when an ownership transfer is proposed.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerTransferProposedEvent {
    pub current_owner: Address,
    pub proposed_owner: Address,
    pub timestamp: u64,
}

/// Fired when an ownership transfer is accepted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerTransferAcceptedEvent {
    pub old_owner: Address,
    pub new_owner: Address,
    pub timestamp: u64,
}

/// Fired when a pending ownership transfer is cancelled.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerTransferCancelledEvent {
    pub owner: Address,
    pub cancelled_proposed: Address,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(
    env: &Env,
    owner: Address,
    liquidity_token: Address,
    reward_token: Address,
    start_date: u64,
    end_date: u64,
    range_enabled: bool,
) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            owner,
            liquidity_token,
            reward_token,
            start_date,
            end_date,
            range_enabled,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_rewards_scheduled(env: &Env, entries: u32) {
    env.events().publish(
        (symbol_short!("RWD_SET"),),
        RewardsScheduledEvent {
            entries,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_topped_up(env: &Env, epoch: u32, amount: i128, new_total: i128) {
    env.events().publish(
        (symbol_short!("RWD_TOP"),),
        RewardToppedUpEvent {
            epoch,
            amount,
            new_total,
            timestamp: env.ledger().timestamp(),
        },
    );
}

#[allow(clippy::too_many_arguments)]
pub fn publish_position_opened(
    env: &Env,
    position_id: u64,
    owner: Address,
    principal: i128,
    weight: i128,
    start_epoch: u32,
    end_epoch: u32,
    nft_id: Option<u64>,
) {
    env.events().publish(
        (symbol_short!("OPENED"), owner.clone()),
        PositionOpenedEvent {
            position_id,
            owner,
            principal,
            weight,
            start_epoch,
            end_epoch,
            nft_id,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_reward_claimed(
    env: &Env,
    position_id: u64,
    owner: Address,
    amount: i128,
    claimed_through_epoch: u32,
) {
    env.events().publish(
        (symbol_short!("CLMD"), owner.clone()),
        RewardClaimedEvent {
            position_id,
            owner,
            amount,
            claimed_through_epoch,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_position_closed(env: &Env, position_id: u64, owner: Address, principal: i128) {
    env.events().publish(
        (symbol_short!("CLOSED"), owner.clone()),
        PositionClosedEvent {
            position_id,
            owner,
            principal,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_logic_upgraded(env: &Env, revision: u32, implementation: Implementation) {
    env.events().publish(
        (symbol_short!("UPGRADED"),),
        LogicUpgradedEvent {
            revision,
            implementation,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_owner_transfer_proposed(
    env: &Env,
    current_owner: Address,
    proposed_owner: Address,
) {
    env.events().publish(
        (symbol_short!("OWN_PROP"), current_owner.clone()),
        OwnerTransferProposedEvent {
            current_owner,
            proposed_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_owner_transfer_accepted(env: &Env, old_owner: Address, new_owner: Address) {
    env.events().publish(
        (symbol_short!("OWN_ACPT"), new_owner.clone()),
        OwnerTransferAcceptedEvent {
            old_owner,
            new_owner,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_owner_transfer_cancelled(env: &Env, owner: Address, cancelled_proposed: Address) {
    env.events().publish(
        (symbol_short!("OWN_CNCL"), owner.clone()),
        OwnerTransferCancelledEvent {
            owner,
            cancelled_proposed,
            timestamp: env.ledger().timestamp(),
        },
    );
}
