mod common;

use std::collections::HashMap;

use alloy::primitives::{Address, B256, I256, U256};

use pool_compose::engine::actions::{CompiledAction, JoinUserData};
use pool_compose::engine::Composer;
use pool_compose::model::pool::{PoolDescriptor, PoolType};
use pool_compose::model::reference::{ChainedReference, InputAmount};
use pool_compose::registry::StaticRegistry;
use pool_compose::vault::math::ProportionalMath;
use pool_compose::vault::{
    snapshot_from_registry, PoolState, PoolStateToken, PoolsSnapshot, VaultError, VaultModel,
};

use common::*;

// ── Helpers ──────────────────────────────────────────────────────────

fn signed(amount: U256) -> I256 {
    I256::try_from(amount).unwrap()
}

fn delta(deltas: &HashMap<Address, I256>, token: Address) -> I256 {
    deltas.get(&token).copied().unwrap_or(I256::ZERO)
}

// ── Tests ────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_join_debits_inputs_and_credits_bpt() {
    let pool_id = B256::repeat_byte(0x01);
    let pool_address = Address::repeat_byte(0x01);
    let pool = PoolDescriptor {
        id: pool_id,
        address: pool_address,
        pool_type: PoolType::Weighted,
        total_supply: units(1000),
        tokens: vec![token(DAI, units(100)), token(USDC, units(100))],
    };
    let registry = StaticRegistry::new([pool]);
    let snapshot = snapshot_from_registry(&registry);
    let composer = Composer::new(registry, RELAYER);

    let request = join_request(
        pool_id,
        units(1),
        vec![(DAI, units(100)), (USDC, units(100))],
        false,
    );
    let composed = composer.join_pool(&request).await.unwrap();

    let deltas = VaultModel::new(ProportionalMath)
        .simulate(&composed.actions, &snapshot)
        .await
        .unwrap();

    // inputs leave the caller in full
    assert_eq!(delta(&deltas, DAI), -signed(units(100)));
    assert_eq!(delta(&deltas, USDC), -signed(units(100)));
    // pro-rata mint: deposit doubles the pool, supply doubles too
    assert_eq!(delta(&deltas, pool_address), signed(units(1000)));
}

#[tokio::test]
async fn wrap_join_sequence_nets_out_intermediates() {
    let registry = StaticRegistry::new([composable_root()]);
    let snapshot = snapshot_from_registry(&registry);
    let composer = Composer::new(registry, RELAYER);

    let request = join_request(
        ROOT_ID,
        units(1),
        vec![(DAI, units(1000)), (USDC, units(500))],
        true,
    );
    let composed = composer.join_pool(&request).await.unwrap();

    let deltas = VaultModel::new(ProportionalMath)
        .simulate(&composed.actions, &snapshot)
        .await
        .unwrap();

    // the wrapped intermediate is produced and consumed in the same sequence
    assert_eq!(delta(&deltas, AUSDC), I256::ZERO);
    assert_eq!(delta(&deltas, USDC), -signed(units(500)));
    assert_eq!(delta(&deltas, DAI), -signed(units(1000)));
    // 1500 of value into a 2000-value pool with 2000 supply
    assert_eq!(delta(&deltas, ROOT_POOL), signed(units(1500)));
}

#[tokio::test]
async fn batch_swap_output_flows_into_parent_join() {
    let root = PoolDescriptor {
        id: ROOT_ID,
        address: ROOT_POOL,
        pool_type: PoolType::ComposableStable,
        total_supply: units(2000),
        tokens: vec![
            token(DAI, units(1000)),
            token(LINEAR_POOL, units(1000)),
            token(ROOT_POOL, U256::MAX / U256::from(2)),
        ],
    };
    let registry = StaticRegistry::new([root, linear_pool()]);
    let snapshot = snapshot_from_registry(&registry);
    let composer = Composer::new(registry, RELAYER);

    let request = join_request(ROOT_ID, units(1), vec![(USDC, units(500))], false);
    let composed = composer.join_pool(&request).await.unwrap();

    let deltas = VaultModel::new(ProportionalMath)
        .simulate(&composed.actions, &snapshot)
        .await
        .unwrap();

    // linear BPT is minted by the swap and spent by the root join
    assert_eq!(delta(&deltas, LINEAR_POOL), I256::ZERO);
    assert_eq!(delta(&deltas, USDC), -signed(units(500)));
    // 500 value into a 2000-value linear pool mints 500 linear BPT; that 500
    // into the 2000-value root mints 500 root BPT
    assert_eq!(delta(&deltas, ROOT_POOL), signed(units(500)));
}

#[tokio::test]
async fn exit_pool_burns_shares_pro_rata() {
    let pool_id = B256::repeat_byte(0x01);
    let pool_address = Address::repeat_byte(0x01);
    let token_a = Address::repeat_byte(0x0a);
    let token_b = Address::repeat_byte(0x0b);
    let state = PoolState {
        id: pool_id,
        address: pool_address,
        pool_type: PoolType::Weighted,
        tokens: vec![
            PoolStateToken {
                address: token_a,
                balance: units(100),
                decimals: 18,
            },
            PoolStateToken {
                address: token_b,
                balance: units(100),
                decimals: 18,
            },
        ],
        total_supply: units(200),
    };
    let snapshot: PoolsSnapshot = HashMap::from([(pool_id, state)]);

    let exit = CompiledAction::ExitPool {
        pool_id,
        sender: USER,
        recipient: USER,
        assets: vec![token_a, token_b],
        min_amounts_out: vec![U256::ZERO, U256::ZERO],
        bpt_in: InputAmount::literal(units(100)),
        to_internal_balance: false,
        output_references: vec![],
    };

    let deltas = VaultModel::new(ProportionalMath)
        .simulate(&[exit], &snapshot)
        .await
        .unwrap();

    // burning half the supply returns half of each balance
    assert_eq!(delta(&deltas, token_a), signed(units(50)));
    assert_eq!(delta(&deltas, token_b), signed(units(50)));
    assert_eq!(delta(&deltas, pool_address), -signed(units(100)));
}

#[tokio::test]
async fn exit_burning_more_than_supply_fails() {
    let pool_id = B256::repeat_byte(0x01);
    let token_a = Address::repeat_byte(0x0a);
    let state = PoolState {
        id: pool_id,
        address: Address::repeat_byte(0x01),
        pool_type: PoolType::Weighted,
        tokens: vec![PoolStateToken {
            address: token_a,
            balance: units(100),
            decimals: 18,
        }],
        total_supply: units(200),
    };
    let snapshot: PoolsSnapshot = HashMap::from([(pool_id, state)]);

    let exit = CompiledAction::ExitPool {
        pool_id,
        sender: USER,
        recipient: USER,
        assets: vec![token_a],
        min_amounts_out: vec![U256::ZERO],
        bpt_in: InputAmount::literal(units(500)),
        to_internal_balance: false,
        output_references: vec![],
    };

    match VaultModel::new(ProportionalMath)
        .simulate(&[exit], &snapshot)
        .await
    {
        Err(VaultError::InsufficientBalance(id)) => assert_eq!(id, pool_id),
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }
}

#[tokio::test]
async fn chained_reference_read_before_write_fails() {
    let registry = StaticRegistry::new([composable_root()]);
    let snapshot = snapshot_from_registry(&registry);

    // a join whose amount points at a slot no prior action wrote
    let join = CompiledAction::JoinPool {
        pool_id: ROOT_ID,
        sender: USER,
        recipient: USER,
        assets: vec![DAI, AUSDC],
        max_amounts_in: vec![
            InputAmount::chained(ChainedReference::new(9)),
            InputAmount::zero(),
        ],
        user_data: JoinUserData {
            amounts_in: vec![
                InputAmount::chained(ChainedReference::new(9)),
                InputAmount::zero(),
            ],
            minimum_bpt: U256::ZERO,
        },
        value: U256::ZERO,
        from_internal_balance: false,
        output_reference: ChainedReference::new(0),
    };

    match VaultModel::new(ProportionalMath)
        .simulate(&[join], &snapshot)
        .await
    {
        Err(VaultError::UnresolvedReference(slot)) => assert_eq!(slot, 9),
        other => panic!("expected UnresolvedReference, got {other:?}"),
    }
}
