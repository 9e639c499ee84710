#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};

use pool_compose::engine::JoinRequest;
use pool_compose::model::fixed::ONE;
use pool_compose::model::pool::{PoolDescriptor, PoolToken, PoolType};

// ── Addresses ────────────────────────────────────────────────────────

pub const DAI: Address = Address::repeat_byte(0x11);
pub const AUSDC: Address = Address::repeat_byte(0x22);
pub const ROOT_POOL: Address = Address::repeat_byte(0x33);
pub const USDC: Address = Address::repeat_byte(0x44);
pub const LINEAR_POOL: Address = Address::repeat_byte(0x55);

pub const USER: Address = Address::repeat_byte(0xee);
pub const RELAYER: Address = Address::repeat_byte(0xff);

pub const ROOT_ID: B256 = B256::repeat_byte(0x33);
pub const LINEAR_ID: B256 = B256::repeat_byte(0x55);

// ── Fixture builders ─────────────────────────────────────────────────

pub fn units(n: u64) -> U256 {
    U256::from(n) * ONE
}

pub fn token(address: Address, balance: U256) -> PoolToken {
    PoolToken {
        address,
        balance,
        decimals: 18,
        weight: None,
        wrapped_underlying: None,
    }
}

pub fn wrapped_token(address: Address, underlying: Address, balance: U256) -> PoolToken {
    PoolToken {
        wrapped_underlying: Some(underlying),
        ..token(address, balance)
    }
}

/// ComposableStable root over [DAI, aUSDC(→USDC)], phantom BPT in the list.
pub fn composable_root() -> PoolDescriptor {
    PoolDescriptor {
        id: ROOT_ID,
        address: ROOT_POOL,
        pool_type: PoolType::ComposableStable,
        total_supply: units(2000),
        tokens: vec![
            token(DAI, units(1000)),
            wrapped_token(AUSDC, USDC, units(1000)),
            token(ROOT_POOL, U256::MAX / U256::from(2)),
        ],
    }
}

/// Aave linear pool over [USDC, aUSDC(→USDC)]; BPT acquired via swap.
pub fn linear_pool() -> PoolDescriptor {
    PoolDescriptor {
        id: LINEAR_ID,
        address: LINEAR_POOL,
        pool_type: PoolType::AaveLinear,
        total_supply: units(2000),
        tokens: vec![
            token(USDC, units(1000)),
            wrapped_token(AUSDC, USDC, units(1000)),
        ],
    }
}

pub fn join_request(
    pool_id: B256,
    expected_bpt_out: U256,
    tokens: Vec<(Address, U256)>,
    unwrap_leaf_tokens: bool,
) -> JoinRequest {
    JoinRequest {
        pool_id,
        expected_bpt_out,
        tokens,
        user: USER,
        unwrap_leaf_tokens,
        deadline: U256::from(1_700_000_000u64),
        authorisation: None,
    }
}
