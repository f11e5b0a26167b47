extern crate std;

use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::StellarAssetClient,
    vec, Address, Env, String,
};

use crate::{
    EngineParams, EpochStakingContract, EpochStakingContractClient, Implementation, RangeConfig,
    StakingError, WeightCurve,
};

const START: u64 = 1_688_212_800;
const ONE_WEEK: u64 = 604_800;
const THREE_YEARS: u32 = 52 * 3;

const ZERO_ACCOUNT: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";
const ZERO_CONTRACT: &str = "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAABSC4";

// ── Test helpers ─────────────────────────────────────────────────────────────

fn params() -> EngineParams {
    EngineParams {
        epoch_length: ONE_WEEK,
        max_weeks: 52,
        max_scale: 2,
        default_lock_weeks: 52,
    }
}

/// A registered but not yet initialized contract, plus two SAC tokens.
fn deploy() -> (Env, EpochStakingContractClient<'static>, Address, Address) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START - 10_000);

    let liquidity_token = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let reward_token = env.register_stellar_asset_contract_v2(Address::generate(&env));

    let contract_id = env.register(EpochStakingContract, ());
    let client = EpochStakingContractClient::new(&env, &contract_id);

    (env, client, liquidity_token.address(), reward_token.address())
}

fn setup() -> (
    Env,
    EpochStakingContractClient<'static>,
    Address, // owner
    Address, // liquidity_token
) {
    let (env, client, liquidity_token, reward_token) = deploy();
    let owner = Address::generate(&env);
    client.initialize(
        &owner,
        &liquidity_token,
        &reward_token,
        &START,
        &THREE_YEARS,
        &params(),
        &None,
    );
    StellarAssetClient::new(&env, &reward_token).mint(&client.address, &1_000_000_000i128);
    (env, client, owner, liquidity_token)
}

fn zero_address(env: &Env, strkey: &str) -> Address {
    Address::from_string(&String::from_str(env, strkey))
}

// ── Initialisation guards ────────────────────────────────────────────────────

#[test]
fn test_initialize_rejects_zero_liquidity_token() {
    let (env, client, _liquidity_token, reward_token) = deploy();
    let owner = Address::generate(&env);

    let result = client.try_initialize(
        &owner,
        &zero_address(&env, ZERO_ACCOUNT),
        &reward_token,
        &START,
        &THREE_YEARS,
        &params(),
        &None,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::InvalidAddress),
        _ => unreachable!("Expected InvalidAddress error"),
    }
    assert!(!client.is_initialized());
}

#[test]
fn test_initialize_rejects_zero_reward_token() {
    let (env, client, liquidity_token, _reward_token) = deploy();
    let owner = Address::generate(&env);

    let result = client.try_initialize(
        &owner,
        &liquidity_token,
        &zero_address(&env, ZERO_CONTRACT),
        &START,
        &THREE_YEARS,
        &params(),
        &None,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::InvalidAddress),
        _ => unreachable!("Expected InvalidAddress error"),
    }
}

#[test]
fn test_initialize_rejects_self_as_token() {
    let (env, client, liquidity_token, _reward_token) = deploy();
    let owner = Address::generate(&env);

    let result = client.try_initialize(
        &owner,
        &liquidity_token,
        &client.address,
        &START,
        &THREE_YEARS,
        &params(),
        &None,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::InvalidAddress),
        _ => unreachable!("Expected InvalidAddress error"),
    }
}

#[test]
fn test_initialize_rejects_zero_reward_periods() {
    let (env, client, liquidity_token, reward_token) = deploy();
    let owner = Address::generate(&env);

    let result = client.try_initialize(
        &owner,
        &liquidity_token,
        &reward_token,
        &START,
        &0,
        &params(),
        &None,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::InvalidRewardPeriods),
        _ => unreachable!("Expected InvalidRewardPeriods error"),
    }
}

#[test]
fn test_initialize_rejects_past_start_date() {
    let (env, client, liquidity_token, reward_token) = deploy();
    let owner = Address::generate(&env);

    let result = client.try_initialize(
        &owner,
        &liquidity_token,
        &reward_token,
        &1,
        &THREE_YEARS,
        &params(),
        &None,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::InvalidStartDate),
        _ => unreachable!("Expected InvalidStartDate error"),
    }

    // "Now" is not strictly in the future either.
    let now = env.ledger().timestamp();
    let result = client.try_initialize(
        &owner,
        &liquidity_token,
        &reward_token,
        &now,
        &THREE_YEARS,
        &params(),
        &None,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::InvalidStartDate),
        _ => unreachable!("Expected InvalidStartDate error"),
    }
}

#[test]
fn test_initialize_rejects_bad_durations() {
    let (env, client, liquidity_token, reward_token) = deploy();
    let owner = Address::generate(&env);

    let bad = [
        EngineParams {
            epoch_length: 0,
            ..params()
        },
        EngineParams {
            max_weeks: 0,
            ..params()
        },
        EngineParams {
            default_lock_weeks: 0,
            ..params()
        },
        EngineParams {
            default_lock_weeks: 53,
            ..params()
        },
    ];
    for engine in bad.iter() {
        let result = client.try_initialize(
            &owner,
            &liquidity_token,
            &reward_token,
            &START,
            &THREE_YEARS,
            engine,
            &None,
        );
        match result {
            Err(Ok(e)) => assert_eq!(e, StakingError::InvalidDuration),
            _ => unreachable!("Expected InvalidDuration error"),
        }
    }
}

#[test]
fn test_initialize_rejects_inverted_tick_bounds() {
    let (env, client, liquidity_token, reward_token) = deploy();
    let owner = Address::generate(&env);

    let range = RangeConfig {
        position_manager: Address::generate(&env),
        token_a: Address::generate(&env),
        token_b: Address::generate(&env),
        fee: 10_000,
        tick_min: 100,
        tick_max: -100,
    };
    let result = client.try_initialize(
        &owner,
        &liquidity_token,
        &reward_token,
        &START,
        &THREE_YEARS,
        &params(),
        &Some(range),
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::InvalidRange),
        _ => unreachable!("Expected InvalidRange error"),
    }
}

#[test]
fn test_initialize_twice_fails() {
    let (env, client, owner, liquidity_token) = setup();

    let other_reward = env.register_stellar_asset_contract_v2(Address::generate(&env));
    let result = client.try_initialize(
        &owner,
        &liquidity_token,
        &other_reward.address(),
        &START,
        &THREE_YEARS,
        &params(),
        &None,
    );
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::AlreadyInitialized),
        _ => unreachable!("Expected AlreadyInitialized error"),
    }
    assert_eq!(client.owner(), owner);
}

#[test]
fn test_entry_points_require_initialization() {
    let (env, client, _liquidity_token, _reward_token) = deploy();
    let caller = Address::generate(&env);

    let result = client.try_set_rewards(&caller, &vec![&env, 0u32], &vec![&env, 1i128]);
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NotInitialized),
        _ => unreachable!("Expected NotInitialized error"),
    }

    let result = client.try_open_position(&caller, &1_000, &None, &0);
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NotInitialized),
        _ => unreachable!("Expected NotInitialized error"),
    }

    let result = client.try_upgrade_logic(&caller, &Implementation::Curve(WeightCurve::Convex));
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NotInitialized),
        _ => unreachable!("Expected NotInitialized error"),
    }
}

// ── Upgrades ─────────────────────────────────────────────────────────────────

#[test]
fn test_upgrade_by_non_owner_fails() {
    let (env, client, _owner, _) = setup();

    let intruder = Address::generate(&env);
    let result = client.try_upgrade_logic(&intruder, &Implementation::Curve(WeightCurve::Convex));
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NotOwner),
        _ => unreachable!("Expected NotOwner error"),
    }

    let logic = client.logic();
    assert_eq!(logic.revision, 1);
    assert_eq!(logic.curve, WeightCurve::Linear);
}

#[test]
fn test_upgrade_preserves_existing_state() {
    let (env, client, owner, liquidity_token) = setup();

    let staker = Address::generate(&env);
    StellarAssetClient::new(&env, &liquidity_token).mint(&staker, &2_000);
    let old_id = client.open_position(&staker, &1_000, &Some(10), &1);
    client.set_rewards(&owner, &vec![&env, 0u32, 1], &vec![&env, 300i128, 200]);

    env.ledger().set_timestamp(START + ONE_WEEK);
    client.claim(&staker, &old_id, &1);

    // Snapshot everything that existed before the upgrade.
    let config_before = client.get_config();
    let position_before = client.get_position(&old_id);
    let totals_before: std::vec::Vec<i128> =
        (0..12u32).map(|e| client.weighted_stake_total(&e)).collect();
    let rewards_before = (client.reward_for(&0), client.reward_for(&1));
    let owner_before = client.owner();

    let revision = client.upgrade_logic(&owner, &Implementation::Curve(WeightCurve::Convex));
    assert_eq!(revision, 2);

    assert_eq!(client.get_config(), config_before);
    assert_eq!(client.start_date(), START);
    assert_eq!(client.get_position(&old_id), position_before);
    let totals_after: std::vec::Vec<i128> =
        (0..12u32).map(|e| client.weighted_stake_total(&e)).collect();
    assert_eq!(totals_after, totals_before);
    assert_eq!((client.reward_for(&0), client.reward_for(&1)), rewards_before);
    assert_eq!(client.owner(), owner_before);

    let logic = client.logic();
    assert_eq!(logic.revision, 2);
    assert_eq!(logic.curve, WeightCurve::Convex);
    assert!(logic.code_hash.is_none());

    // New positions pick up the new curve; the old one keeps its weight.
    let new_id = client.open_position(&staker, &1_000, &Some(10), &1);
    assert_eq!(client.get_position(&new_id).weight, 5_000);
    assert_eq!(client.get_position(&old_id).weight, 6_000);
}

#[test]
fn test_upgrade_revisions_increase() {
    let (_env, client, owner, _) = setup();

    assert_eq!(client.upgrade_logic(&owner, &Implementation::Curve(WeightCurve::Convex)), 2);
    assert_eq!(client.upgrade_logic(&owner, &Implementation::Curve(WeightCurve::Linear)), 3);
    assert_eq!(client.logic().curve, WeightCurve::Linear);
}

// ── Ownership transfer ───────────────────────────────────────────────────────

#[test]
fn test_two_step_ownership_transfer() {
    let (env, client, owner, _) = setup();
    let successor = Address::generate(&env);

    client.propose_owner(&owner, &successor);
    assert_eq!(client.pending_owner(), Some(successor.clone()));
    // Not effective until accepted.
    assert_eq!(client.owner(), owner);

    client.accept_owner(&successor);
    assert_eq!(client.owner(), successor);
    assert_eq!(client.pending_owner(), None);

    let result = client.try_set_rewards(&owner, &vec![&env, 0u32], &vec![&env, 1i128]);
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NotOwner),
        _ => unreachable!("Expected NotOwner error"),
    }
    assert_eq!(client.set_rewards(&successor, &vec![&env, 0u32], &vec![&env, 1i128]), 1);
}

#[test]
fn test_accept_by_wrong_address_fails() {
    let (env, client, owner, _) = setup();
    let successor = Address::generate(&env);
    let intruder = Address::generate(&env);

    let result = client.try_accept_owner(&successor);
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NoPendingOwner),
        _ => unreachable!("Expected NoPendingOwner error"),
    }

    client.propose_owner(&owner, &successor);
    let result = client.try_accept_owner(&intruder);
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NotOwner),
        _ => unreachable!("Expected NotOwner error"),
    }
}

#[test]
fn test_cancel_ownership_transfer() {
    let (env, client, owner, _) = setup();
    let successor = Address::generate(&env);

    client.propose_owner(&owner, &successor);
    client.cancel_owner_transfer(&owner);
    assert_eq!(client.pending_owner(), None);

    let result = client.try_accept_owner(&successor);
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NoPendingOwner),
        _ => unreachable!("Expected NoPendingOwner error"),
    }
}

#[test]
fn test_propose_by_non_owner_fails() {
    let (env, client, _owner, _) = setup();
    let intruder = Address::generate(&env);

    let result = client.try_propose_owner(&intruder, &intruder);
    match result {
        Err(Ok(e)) => assert_eq!(e, StakingError::NotOwner),
        _ => unreachable!("Expected NotOwner error"),
    }
}
