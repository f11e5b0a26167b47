#![no_main]

use arbitrary::Arbitrary;
use std::collections::BTreeMap;

use epoch_staking::{EngineParams, EpochStakingContract, EpochStakingContractClient};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    token::{Client as TokenClient, StellarAssetClient},
    Address, Env, Vec as SorobanVec,
};

const START: u64 = 1_688_212_800;
const ONE_WEEK: u64 = 604_800;
const REWARD_SUPPLY: i128 = 1 << 100;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Open { principal: u32, lock: u8, scale: u8 },
    Claim { slot: u8, upto: u8 },
    Close { slot: u8 },
    SetReward { epoch: u8, amount: u32 },
    TopUp { epoch: u8, amount: u32 },
    Advance { seconds: u32 },
}

fuzz_target!(|actions: Vec<FuzzAction>| {
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
            max_scale: 4,
            default_lock_weeks: 12,
        },
        &None,
    );
    StellarAssetClient::new(&env, &reward_token).mint(&contract_id, &REWARD_SUPPLY);
    let rewards = TokenClient::new(&env, &reward_token);

    let mut positions: Vec<(Address, u64)> = Vec::new();
    // Highest value each bucket has ever held.
    let mut peaks: BTreeMap<u32, i128> = BTreeMap::new();

    // Inputs are unclamped. Only panics escaping the contract's errors count.
    for action in actions {
        match action {
            FuzzAction::Open { principal, lock, scale } => {
                let staker = Address::generate(&env);
                let principal = i128::from(principal);
                if principal > 0 {
                    StellarAssetClient::new(&env, &liquidity_token).mint(&staker, &principal);
                }
                if let Ok(Ok(id)) = client.try_open_position(
                    &staker,
                    &principal,
                    &Some(u32::from(lock)),
                    &u32::from(scale),
                ) {
                    positions.push((staker, id));
                }
            }
            FuzzAction::Claim { slot, upto } => {
                if let Some((staker, id)) = positions.get(slot as usize % positions.len().max(1)) {
                    let _ = client.try_claim(staker, id, &u32::from(upto));
                }
            }
            FuzzAction::Close { slot } => {
                if let Some((staker, id)) = positions.get(slot as usize % positions.len().max(1)) {
                    let _ = client.try_close_position(staker, id);
                }
            }
            FuzzAction::SetReward { epoch, amount } => {
                let mut epochs = SorobanVec::new(&env);
                epochs.push_back(u32::from(epoch));
                let mut amounts = SorobanVec::new(&env);
                amounts.push_back(i128::from(amount));
                if let Ok(Ok(_)) = client.try_set_rewards(&owner, &epochs, &amounts) {
                    let peak = peaks.entry(u32::from(epoch)).or_insert(0);
                    *peak = (*peak).max(i128::from(amount));
                }
            }
            FuzzAction::TopUp { epoch, amount } => {
                if let Ok(Ok(total)) =
                    client.try_top_up_rewards(&owner, &u32::from(epoch), &i128::from(amount))
                {
                    let peak = peaks.entry(u32::from(epoch)).or_insert(0);
                    *peak = (*peak).max(total);
                }
            }
            FuzzAction::Advance { seconds } => {
                let now = env.ledger().timestamp();
                env.ledger().set_timestamp(now.saturating_add(u64::from(seconds)));
            }
        }

        let paid = REWARD_SUPPLY - rewards.balance(&contract_id);
        let ceiling: i128 = peaks.values().sum();
        assert!(paid <= ceiling, "paid {paid} exceeds scheduled {ceiling}");
    }

    // Every epoch total the contract reports must be non-negative.
    for epoch in 0..64u32 {
        if let Ok(Ok(total)) = client.try_weighted_stake_total(&epoch) {
            assert!(total >= 0, "negative total at epoch {epoch}");
        }
    }
});
