//! Owner gating, the single-shot initialization guard and the replaceable
//! logic handle.
//!
//! An upgrade only ever rewrites the `LOGIC` record. Configuration,
//! positions, reward buckets and totals keep their layout and values.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol};

use crate::config;
use crate::positions::WeightCurve;
use crate::StakingError;

const OWNER: Symbol = symbol_short!("OWNER");
const PENDING_OWNER: Symbol = symbol_short!("PEND_OWN");
const LOGIC: Symbol = symbol_short!("LOGIC");

// ── Types ────────────────────────────────────────────────────────────────────

/// What an upgrade installs.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Implementation {
    /// Weight curve applied to positions opened after the upgrade.
    Curve(WeightCurve),
    /// Hash of an uploaded wasm blob replacing the contract code.
    Wasm(BytesN<32>),
}

/// The behavior currently installed.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LogicRecord {
    pub revision: u32,
    pub curve: WeightCurve,
    pub code_hash: Option<BytesN<32>>,
    pub upgraded_at: u64,
}

// ── Guards ───────────────────────────────────────────────────────────────────

pub fn require_initialized(env: &Env) -> Result<(), StakingError> {
    if !config::exists(env) {
        return Err(StakingError::NotInitialized);
    }
    Ok(())
}

pub fn owner(env: &Env) -> Result<Address, StakingError> {
    env.storage()
        .instance()
        .get(&OWNER)
        .ok_or(StakingError::NotInitialized)
}

/// Guard: `caller` must be the stored owner.
pub fn require_owner(env: &Env, caller: &Address) -> Result<(), StakingError> {
    if *caller != owner(env)? {
        return Err(StakingError::NotOwner);
    }
    Ok(())
}

// ── Lifecycle ────────────────────────────────────────────────────────────────

/// Record the owner and the first logic revision.
pub fn install(env: &Env, owner: &Address, now: u64) {
    env.storage().instance().set(&OWNER, owner);
    env.storage().instance().set(
        &LOGIC,
        &LogicRecord {
            revision: 1,
            curve: WeightCurve::Linear,
            code_hash: None,
            upgraded_at: now,
        },
    );
}

pub fn logic(env: &Env) -> Result<LogicRecord, StakingError> {
    env.storage()
        .instance()
        .get(&LOGIC)
        .ok_or(StakingError::NotInitialized)
}

/// Install `implementation` and bump the revision.
///
/// A wasm swap takes effect once the current invocation completes.
pub fn upgrade(
    env: &Env,
    implementation: Implementation,
    now: u64,
) -> Result<LogicRecord, StakingError> {
    let mut record = logic(env)?;
    record.revision = record
        .revision
        .checked_add(1)
        .ok_or(StakingError::ArithmeticOverflow)?;
    record.upgraded_at = now;

    match implementation {
        Implementation::Curve(curve) => {
            record.curve = curve;
            env.storage().instance().set(&LOGIC, &record);
        }
        Implementation::Wasm(hash) => {
            record.code_hash = Some(hash.clone());
            env.storage().instance().set(&LOGIC, &record);
            env.deployer().update_current_contract_wasm(hash);
        }
    }
    Ok(record)
}

// ── Ownership transfer (two-step) ────────────────────────────────────────────

pub fn pending_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&PENDING_OWNER)
}

pub fn propose_owner(env: &Env, new_owner: &Address) {
    env.storage().instance().set(&PENDING_OWNER, new_owner);
}

/// Promote the pending owner. Returns the previous owner.
pub fn accept_owner(env: &Env, new_owner: &Address) -> Result<Address, StakingError> {
    let pending = pending_owner(env).ok_or(StakingError::NoPendingOwner)?;
    if *new_owner != pending {
        return Err(StakingError::NotOwner);
    }
    let previous = owner(env)?;
    env.storage().instance().set(&OWNER, new_owner);
    env.storage().instance().remove(&PENDING_OWNER);
    Ok(previous)
}

/// Drop the pending proposal. Returns the address that was pending.
pub fn cancel_owner_transfer(env: &Env) -> Result<Address, StakingError> {
    let pending = pending_owner(env).ok_or(StakingError::NoPendingOwner)?;
    env.storage().instance().remove(&PENDING_OWNER);
    Ok(pending)
}
