#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based state machine tests for the staking engine.
//!
//! Random sequences of opens, claims, closes, top-ups and ledger advances are
//! replayed against a live contract. After every step:
//! - rewards paid never exceed rewards scheduled
//! - the contract holds exactly the principal of the open positions
//! - no claim cursor passes the lock end or the current epoch

use epoch_staking::{EngineParams, EpochStakingContract, EpochStakingContractClient};
use proptest::prelude::*;
use proptest_derive::Arbitrary;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::token::{Client as TokenClient, StellarAssetClient};
use soroban_sdk::{Address, Env};

const START: u64 = 1_688_212_800;
const ONE_WEEK: u64 = 604_800;
const REWARD_SUPPLY: i128 = 1 << 100;

#[derive(Arbitrary, Clone, Debug)]
enum Action {
    Open {
        #[proptest(strategy = "1i128..=1_000_000_000_000_000_000_000_000_000i128")]
        principal: i128,
        #[proptest(strategy = "1u32..=6")]
        lock: u32,
        #[proptest(strategy = "0u32..=2")]
        scale: u32,
    },
    Claim {
        slot: u8,
        #[proptest(strategy = "0u32..=16")]
        upto: u32,
    },
    Close {
        slot: u8,
    },
    TopUp {
        #[proptest(strategy = "0u32..16")]
        epoch: u32,
        #[proptest(strategy = "1i128..=1_000_000_000_000_000_000_000_000i128")]
        amount: i128,
    },
    Advance {
        #[proptest(strategy = "1u32..=2")]
        epochs: u32,
    },
}

struct OpenPosition {
    owner: Address,
    id: u64,
    principal: i128,
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn setup() -> (
    Env,
    EpochStakingContractClient<'static>,
    Address, // owner
    Address, // liquidity_token
    Address, // reward_token
) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START - 1);

    let liquidity_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();
    let reward_token = env
        .register_stellar_asset_contract_v2(Address::generate(&env))
        .address();

    let contract_id = env.register(EpochStakingContract, ());
    let client = EpochStakingContractClient::new(&env, &contract_id);

    let owner = Address::generate(&env);
    client.initialize(
        &owner,
        &liquidity_token,
        &reward_token,
        &START,
        &52,
        &EngineParams {
            epoch_length: ONE_WEEK,
            max_weeks: 52,
            max_scale: 2,
            default_lock_weeks: 52,
        },
        &None,
    );
    env.ledger().set_timestamp(START);

    StellarAssetClient::new(&env, &reward_token).mint(&contract_id, &REWARD_SUPPLY);

    (env, client, owner, liquidity_token, reward_token)
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_random_sequences_stay_consistent(
        actions in prop::collection::vec(any::<Action>(), 1..40)
    ) {
        let (env, client, owner, liquidity_token, reward_token) = setup();
        let liquidity = TokenClient::new(&env, &liquidity_token);
        let rewards = TokenClient::new(&env, &reward_token);

        let mut open: std::vec::Vec<OpenPosition> = std::vec::Vec::new();
        let mut scheduled: i128 = 0;
        let mut paid: i128 = 0;
        let mut epoch: u32 = 0;

        for action in actions {
            match action {
                Action::Open { principal, lock, scale } => {
                    let staker = Address::generate(&env);
                    StellarAssetClient::new(&env, &liquidity_token).mint(&staker, &principal);
                    if let Ok(Ok(id)) = client.try_open_position(&staker, &principal, &Some(lock), &scale) {
                        open.push(OpenPosition { owner: staker, id, principal });
                    }
                }
                Action::Claim { slot, upto } => {
                    if open.is_empty() {
                        continue;
                    }
                    let position = &open[slot as usize % open.len()];
                    let before = rewards.balance(&position.owner);
                    let amount = client.claim(&position.owner, &position.id, &upto);
                    prop_assert!(amount >= 0);
                    prop_assert_eq!(rewards.balance(&position.owner) - before, amount);
                    paid += amount;
                }
                Action::Close { slot } => {
                    if open.is_empty() {
                        continue;
                    }
                    let index = slot as usize % open.len();
                    let position = &open[index];
                    let stored = client.get_position(&position.id);
                    let closable = epoch >= stored.end_epoch && stored.is_settled();
                    match client.try_close_position(&position.owner, &position.id) {
                        Ok(Ok(returned)) => {
                            prop_assert!(closable);
                            prop_assert_eq!(returned, position.principal);
                            prop_assert_eq!(liquidity.balance(&position.owner), position.principal);
                            open.swap_remove(index);
                        }
                        _ => prop_assert!(!closable),
                    }
                }
                Action::TopUp { epoch: target, amount } => {
                    client.top_up_rewards(&owner, &target, &amount);
                    scheduled += amount;
                }
                Action::Advance { epochs } => {
                    epoch += epochs;
                    env.ledger().set_timestamp(START + u64::from(epoch) * ONE_WEEK);
                }
            }

            prop_assert!(paid <= scheduled, "paid {} of {} scheduled", paid, scheduled);
            prop_assert_eq!(rewards.balance(&client.address), REWARD_SUPPLY - paid);

            let locked: i128 = open.iter().map(|p| p.principal).sum();
            prop_assert_eq!(liquidity.balance(&client.address), locked);

            for position in &open {
                let stored = client.get_position(&position.id);
                prop_assert!(stored.claimed_through_epoch <= stored.end_epoch);
                prop_assert!(stored.claimed_through_epoch <= epoch);
            }
        }
    }
}
