//! Interface of the concentrated-liquidity position manager that mints and
//! custodies range-position NFTs.

use soroban_sdk::{contractclient, contracttype, Address, Env};

/// Metadata the position manager reports for one NFT.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PositionInfo {
    pub token_a: Address,
    pub token_b: Address,
    pub fee: u32,
    pub tick_lower: i32,
    pub tick_upper: i32,
    pub liquidity: i128,
}

#[contractclient(name = "PositionManagerClient")]
pub trait PositionManager {
    /// Metadata of `token_id`. Panics for unknown ids.
    fn position(env: Env, token_id: u64) -> PositionInfo;

    /// Move `token_id` from `from` to `to`. Requires `from` auth.
    fn transfer(env: Env, from: Address, to: Address, token_id: u64);
}
