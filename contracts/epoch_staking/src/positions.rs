//! Lock position registry and per-epoch weighted stake totals.
//!
//! Totals are kept as a difference array: opening a position adds its weight
//! at `start_epoch` and removes it at `end_epoch`. Elapsed epochs are
//! materialized forward from a checkpoint (`SETTLED`), after which their
//! totals never change. Every epoch at or past the checkpoint is derived from
//! the last materialized total plus the pending deltas. No delta exists past
//! `EP_LAST`, so derivations stop there.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

use crate::config::Configuration;
use crate::StakingError;

const POSITION: Symbol = symbol_short!("POS");
const POSITION_CTR: Symbol = symbol_short!("POS_CTR");
const OWNER_POSITIONS: Symbol = symbol_short!("OWN_POS");
const EPOCH_DELTA: Symbol = symbol_short!("EP_DELTA");
const EPOCH_TOTAL: Symbol = symbol_short!("EP_TOTAL");
const SETTLED: Symbol = symbol_short!("SETTLED");
const LAST_DELTA: Symbol = symbol_short!("EP_LAST");

const TTL_THRESHOLD: u32 = 518_400;
const TTL_EXTEND_TO: u32 = 1_555_200;

// ── Types ────────────────────────────────────────────────────────────────────

/// Maps a position's scale to its stake multiplier.
///
/// Multipliers share the denominator `max_scale²`, so weights stay exact
/// integers and positions opened under different curves remain comparable.
/// Both curves run from 1× at scale 0 to 2× at `max_scale`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WeightCurve {
    Linear,
    Convex,
}

impl WeightCurve {
    pub fn multiplier(&self, scale: u32, max_scale: u32) -> i128 {
        if max_scale == 0 {
            return 1;
        }
        let max = i128::from(max_scale);
        let scale = i128::from(scale.min(max_scale));
        match self {
            WeightCurve::Linear => max * (max + scale),
            WeightCurve::Convex => max * max + scale * scale,
        }
    }
}

/// Metadata of the NFT backing a range position, captured at open time.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RangeStake {
    pub nft_id: u64,
    pub token_a: Address,
    pub token_b: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PositionKind {
    Fungible,
    Range(RangeStake),
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakePosition {
    pub id: u64,
    pub owner: Address,
    pub principal: i128,
    pub weight: i128,
    pub lock_weeks: u32,
    pub scale: u32,
    pub start_epoch: u32,
    pub end_epoch: u32,
    /// First epoch whose reward has not been claimed yet.
    pub claimed_through_epoch: u32,
    pub kind: PositionKind,
}

impl StakePosition {
    pub fn is_settled(&self) -> bool {
        self.claimed_through_epoch >= self.end_epoch
    }
}

/// Arguments of a position about to be opened.
pub struct OpenRequest {
    pub owner: Address,
    pub principal: i128,
    pub lock_weeks: Option<u32>,
    pub scale: u32,
    pub kind: PositionKind,
}

// ── Keys & storage helpers ───────────────────────────────────────────────────

fn position_key(id: u64) -> (Symbol, u64) {
    (POSITION, id)
}

pub(crate) fn owner_key(owner: &Address) -> (Symbol, Address) {
    (OWNER_POSITIONS, owner.clone())
}

fn delta(env: &Env, epoch: u32) -> i128 {
    env.storage()
        .persistent()
        .get(&(EPOCH_DELTA, epoch))
        .unwrap_or(0)
}

fn add_delta(env: &Env, epoch: u32, amount: i128) -> Result<(), StakingError> {
    let key = (EPOCH_DELTA, epoch);
    let updated = delta(env, epoch)
        .checked_add(amount)
        .ok_or(StakingError::ArithmeticOverflow)?;
    env.storage().persistent().set(&key, &updated);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    let beyond_last = match last_delta_epoch(env) {
        Some(last) => epoch > last,
        None => true,
    };
    if beyond_last {
        env.storage().instance().set(&LAST_DELTA, &epoch);
    }
    Ok(())
}

/// Highest epoch that carries a delta.
fn last_delta_epoch(env: &Env) -> Option<u32> {
    env.storage().instance().get(&LAST_DELTA)
}

fn stored_total(env: &Env, epoch: u32) -> i128 {
    env.storage()
        .persistent()
        .get(&(EPOCH_TOTAL, epoch))
        .unwrap_or(0)
}

/// Number of leading epochs whose totals are materialized.
fn settled_through(env: &Env) -> u32 {
    env.storage().instance().get(&SETTLED).unwrap_or(0)
}

fn next_id(env: &Env) -> u64 {
    let last: u64 = env.storage().instance().get(&POSITION_CTR).unwrap_or(0);
    let id = last + 1;
    env.storage().instance().set(&POSITION_CTR, &id);
    id
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// Record a new position starting at `current_epoch`.
///
/// All inputs are validated before anything is written.
pub fn open(
    env: &Env,
    config: &Configuration,
    curve: WeightCurve,
    request: OpenRequest,
    current_epoch: u32,
) -> Result<StakePosition, StakingError> {
    if request.principal <= 0 {
        return Err(StakingError::InvalidAmount);
    }
    let lock_weeks = config.lock_weeks(request.lock_weeks)?;
    config.check_scale(request.scale)?;

    let weight = request
        .principal
        .checked_mul(curve.multiplier(request.scale, config.max_scale))
        .ok_or(StakingError::ArithmeticOverflow)?;
    let end_epoch = current_epoch
        .checked_add(lock_weeks)
        .ok_or(StakingError::ArithmeticOverflow)?;

    add_delta(env, current_epoch, weight)?;
    add_delta(env, end_epoch, -weight)?;

    let position = StakePosition {
        id: next_id(env),
        owner: request.owner,
        principal: request.principal,
        weight,
        lock_weeks,
        scale: request.scale,
        start_epoch: current_epoch,
        end_epoch,
        claimed_through_epoch: current_epoch,
        kind: request.kind,
    };
    save(env, &position);

    let key = owner_key(&position.owner);
    let mut ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or(Vec::new(env));
    ids.push_back(position.id);
    env.storage().persistent().set(&key, &ids);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    Ok(position)
}

pub fn load(env: &Env, id: u64) -> Result<StakePosition, StakingError> {
    env.storage()
        .persistent()
        .get(&position_key(id))
        .ok_or(StakingError::PositionNotFound)
}

pub fn save(env: &Env, position: &StakePosition) {
    let key = position_key(position.id);
    env.storage().persistent().set(&key, position);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Delete a closed position and drop it from its owner's index.
///
/// Totals are untouched: the position stopped contributing at `end_epoch`.
pub fn remove(env: &Env, position: &StakePosition) {
    env.storage().persistent().remove(&position_key(position.id));

    let key = owner_key(&position.owner);
    let ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or(Vec::new(env));
    let mut kept = Vec::new(env);
    for id in ids.iter() {
        if id != position.id {
            kept.push_back(id);
        }
    }
    if kept.is_empty() {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &kept);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn positions_of(env: &Env, owner: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&owner_key(owner))
        .unwrap_or(Vec::new(env))
}

pub fn position_count(env: &Env) -> u64 {
    env.storage().instance().get(&POSITION_CTR).unwrap_or(0)
}

// ── Weighted totals ──────────────────────────────────────────────────────────

/// Materialize the totals of every epoch below `through`.
///
/// Callers only pass fully elapsed bounds, so a materialized total is final.
pub fn settle(env: &Env, through: u32) -> Result<(), StakingError> {
    let mut epoch = settled_through(env);
    if epoch >= through {
        return Ok(());
    }
    let mut running = if epoch == 0 {
        0
    } else {
        stored_total(env, epoch - 1)
    };
    while epoch < through {
        running = running
            .checked_add(delta(env, epoch))
            .ok_or(StakingError::ArithmeticOverflow)?;
        let key = (EPOCH_TOTAL, epoch);
        env.storage().persistent().set(&key, &running);
        env.storage()
            .persistent()
            .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
        epoch += 1;
    }
    env.storage().instance().set(&SETTLED, &through);
    Ok(())
}

/// Total at `epoch - 1` for an epoch at or past the checkpoint.
fn total_before(env: &Env, epoch: u32, settled: u32) -> Result<i128, StakingError> {
    let mut total = if settled == 0 {
        0
    } else {
        stored_total(env, settled - 1)
    };
    let stop = match last_delta_epoch(env) {
        Some(last) => epoch.min(last.saturating_add(1)),
        None => settled,
    };
    for pending in settled..stop {
        total = total
            .checked_add(delta(env, pending))
            .ok_or(StakingError::ArithmeticOverflow)?;
    }
    Ok(total)
}

/// Weighted stake active during `epoch`. Read-only.
pub fn weighted_stake_total(env: &Env, epoch: u32) -> Result<i128, StakingError> {
    let settled = settled_through(env);
    if epoch < settled {
        return Ok(stored_total(env, epoch));
    }
    total_before(env, epoch, settled)?
        .checked_add(delta(env, epoch))
        .ok_or(StakingError::ArithmeticOverflow)
}

/// Visit `(epoch, total)` for every epoch in `[from, to)` in one pass.
pub fn fold_totals<F>(env: &Env, from: u32, to: u32, mut visit: F) -> Result<(), StakingError>
where
    F: FnMut(u32, i128) -> Result<(), StakingError>,
{
    let settled = settled_through(env);
    let mut running: Option<i128> = None;
    for epoch in from..to {
        let total = if epoch < settled {
            stored_total(env, epoch)
        } else {
            let previous = match running {
                Some(total) => total,
                None => total_before(env, epoch, settled)?,
            };
            previous
                .checked_add(delta(env, epoch))
                .ok_or(StakingError::ArithmeticOverflow)?
        };
        running = Some(total);
        visit(epoch, total)?;
    }
    Ok(())
}
