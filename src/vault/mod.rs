//! Simulation Engine (vault model): evaluates a compiled action sequence
//! against a point-in-time pool snapshot and predicts the net per-token
//! balance change a real execution would produce. No external state is
//! touched; each call works on its own copy of the snapshot.

pub mod math;
pub mod relayer;

use std::collections::HashMap;

use alloy::primitives::{Address, B256, I256, U256};
use thiserror::Error;

use crate::engine::actions::CompiledAction;
use crate::model::fixed::FixedPointError;
use crate::model::pool::{PoolDescriptor, PoolType};
use crate::registry::StaticRegistry;

use math::PoolMath;
use relayer::RelayerLedger;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("pool `{0}` not in snapshot")]
    UnknownPool(B256),

    #[error("token {token} is not part of pool `{pool}`")]
    UnknownToken { pool: B256, token: Address },

    #[error("chained reference slot {0} read before any action wrote it")]
    UnresolvedReference(u32),

    #[error("pool `{0}` holds less than the requested amount")]
    InsufficientBalance(B256),

    #[error("amount does not fit a signed delta")]
    DeltaOverflow,

    #[error("swap step indexes outside the asset array")]
    BadSwapStep,

    #[error(transparent)]
    FixedPoint(#[from] FixedPointError),
}

/// One token of a simulated pool (raw balance, own decimals).
#[derive(Debug, Clone, PartialEq)]
pub struct PoolStateToken {
    pub address: Address,
    pub balance: U256,
    pub decimals: u8,
}

/// Mutable working state of one pool during a simulation.
/// `tokens` excludes the pool's own share token; phantom BPT entries in
/// action asset arrays are recognized by address instead.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolState {
    pub id: B256,
    pub address: Address,
    pub pool_type: PoolType,
    pub tokens: Vec<PoolStateToken>,
    pub total_supply: U256,
}

impl PoolState {
    pub fn from_descriptor(descriptor: &PoolDescriptor) -> Self {
        Self {
            id: descriptor.id,
            address: descriptor.address,
            pool_type: descriptor.pool_type,
            tokens: descriptor
                .tokens_without_bpt()
                .map(|t| PoolStateToken {
                    address: t.address,
                    balance: t.balance,
                    decimals: t.decimals,
                })
                .collect(),
            total_supply: descriptor.total_supply,
        }
    }

    pub fn token_index(&self, address: Address) -> Result<usize, VaultError> {
        self.tokens
            .iter()
            .position(|t| t.address == address)
            .ok_or(VaultError::UnknownToken {
                pool: self.id,
                token: address,
            })
    }

    pub fn token(&self, address: Address) -> Result<&PoolStateToken, VaultError> {
        let index = self.token_index(address)?;
        Ok(&self.tokens[index])
    }
}

/// Point-in-time pool states keyed by pool id.
pub type PoolsSnapshot = HashMap<B256, PoolState>;

/// Build a snapshot from a static registry's current pool set.
pub fn snapshot_from_registry(registry: &StaticRegistry) -> PoolsSnapshot {
    registry
        .pools()
        .map(|pool| (pool.id, PoolState::from_descriptor(pool)))
        .collect()
}

/// Per-token signed balance change: negative for tokens leaving the caller,
/// positive for tokens the caller receives.
pub type Deltas = HashMap<Address, I256>;

fn credit(deltas: &mut Deltas, token: Address, amount: U256) -> Result<(), VaultError> {
    let amount = I256::try_from(amount).map_err(|_| VaultError::DeltaOverflow)?;
    let entry = deltas.entry(token).or_insert(I256::ZERO);
    *entry = entry.checked_add(amount).ok_or(VaultError::DeltaOverflow)?;
    Ok(())
}

fn debit(deltas: &mut Deltas, token: Address, amount: U256) -> Result<(), VaultError> {
    let amount = I256::try_from(amount).map_err(|_| VaultError::DeltaOverflow)?;
    let entry = deltas.entry(token).or_insert(I256::ZERO);
    *entry = entry.checked_sub(amount).ok_or(VaultError::DeltaOverflow)?;
    Ok(())
}

/// Off-line evaluator for compiled action sequences.
pub struct VaultModel<M> {
    math: M,
}

impl<M: PoolMath> VaultModel<M> {
    pub fn new(math: M) -> Self {
        Self { math }
    }

    /// Evaluate `actions` in order against a working copy of `snapshot` and
    /// return the caller's net per-token deltas. Chained references resolve
    /// through a per-call relayer ledger, exactly as the on-chain relayer
    /// would resolve them at execution time.
    pub async fn simulate(
        &self,
        actions: &[CompiledAction],
        snapshot: &PoolsSnapshot,
    ) -> Result<Deltas, VaultError> {
        let mut pools = snapshot.clone();
        let mut ledger = RelayerLedger::default();
        let mut deltas = Deltas::new();

        for action in actions {
            match action {
                CompiledAction::SetRelayerApproval { .. } => {}
                CompiledAction::Wrap {
                    static_token,
                    underlying,
                    amount,
                    output_reference,
                    ..
                } => {
                    // static-rate 1:1 wrap model
                    let amount = ledger.resolve(amount)?;
                    debit(&mut deltas, *underlying, amount)?;
                    credit(&mut deltas, *static_token, amount)?;
                    ledger.set(*output_reference, amount);
                }
                CompiledAction::JoinPool {
                    pool_id,
                    assets,
                    max_amounts_in,
                    output_reference,
                    ..
                } => {
                    let pool = pools
                        .get_mut(pool_id)
                        .ok_or(VaultError::UnknownPool(*pool_id))?;

                    let mut amounts_in = vec![U256::ZERO; pool.tokens.len()];
                    for (asset, amount) in assets.iter().zip(max_amounts_in) {
                        // phantom BPT placeholder carries no amount
                        if *asset == pool.address {
                            continue;
                        }
                        let index = pool.token_index(*asset)?;
                        amounts_in[index] = ledger.resolve(amount)?;
                    }

                    let bpt_out = self.math.bpt_out_given_tokens_in(pool, &amounts_in).await?;

                    for (token, amount) in pool.tokens.iter_mut().zip(&amounts_in) {
                        token.balance += *amount;
                        debit(&mut deltas, token.address, *amount)?;
                    }
                    pool.total_supply += bpt_out;
                    credit(&mut deltas, pool.address, bpt_out)?;
                    ledger.set(*output_reference, bpt_out);
                }
                CompiledAction::ExitPool {
                    pool_id,
                    assets,
                    bpt_in,
                    output_references,
                    ..
                } => {
                    let pool = pools
                        .get_mut(pool_id)
                        .ok_or(VaultError::UnknownPool(*pool_id))?;

                    let bpt = ledger.resolve(bpt_in)?;
                    let amounts_out = self.math.tokens_out_given_bpt_in(pool, bpt).await?;

                    for (token, amount) in pool.tokens.iter_mut().zip(&amounts_out) {
                        token.balance = token
                            .balance
                            .checked_sub(*amount)
                            .ok_or(VaultError::InsufficientBalance(*pool_id))?;
                        credit(&mut deltas, token.address, *amount)?;
                    }
                    pool.total_supply = pool
                        .total_supply
                        .checked_sub(bpt)
                        .ok_or(VaultError::InsufficientBalance(*pool_id))?;
                    debit(&mut deltas, pool.address, bpt)?;

                    for reference in output_references {
                        let asset = assets
                            .get(reference.index as usize)
                            .ok_or(VaultError::BadSwapStep)?;
                        let index = pool.token_index(*asset)?;
                        ledger.set(reference.key, amounts_out[index]);
                    }
                }
                CompiledAction::BatchSwap {
                    swaps,
                    assets,
                    output_reference,
                    ..
                } => {
                    let mut received = vec![U256::ZERO; assets.len()];

                    for step in swaps {
                        let pool = pools
                            .get_mut(&step.pool_id)
                            .ok_or(VaultError::UnknownPool(step.pool_id))?;
                        let token_in = *assets
                            .get(step.asset_in_index as usize)
                            .ok_or(VaultError::BadSwapStep)?;
                        let token_out = *assets
                            .get(step.asset_out_index as usize)
                            .ok_or(VaultError::BadSwapStep)?;

                        let amount_in = ledger.resolve(&step.amount)?;
                        let amount_out = self
                            .math
                            .out_given_in(pool, token_in, token_out, amount_in)
                            .await?;

                        // mutate the working copy so later hops see moved balances
                        if token_in == pool.address {
                            pool.total_supply = pool
                                .total_supply
                                .checked_sub(amount_in)
                                .ok_or(VaultError::InsufficientBalance(step.pool_id))?;
                        } else {
                            let index = pool.token_index(token_in)?;
                            pool.tokens[index].balance += amount_in;
                        }
                        if token_out == pool.address {
                            pool.total_supply += amount_out;
                        } else {
                            let index = pool.token_index(token_out)?;
                            pool.tokens[index].balance = pool.tokens[index]
                                .balance
                                .checked_sub(amount_out)
                                .ok_or(VaultError::InsufficientBalance(step.pool_id))?;
                        }

                        debit(&mut deltas, token_in, amount_in)?;
                        credit(&mut deltas, token_out, amount_out)?;
                        received[step.asset_out_index as usize] += amount_out;
                    }

                    let realized = *received
                        .get(output_reference.index as usize)
                        .ok_or(VaultError::BadSwapStep)?;
                    ledger.set(output_reference.key, realized);
                }
            }
        }

        Ok(deltas)
    }
}
