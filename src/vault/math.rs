//! Pool math boundary. Real AMM invariant math is an external collaborator;
//! [`ProportionalMath`] is the in-crate reference implementation used for
//! dry-run prediction and tests (fee-free, value-proportional).

use alloy::primitives::{Address, U256};
use async_trait::async_trait;

use crate::model::fixed;

use super::{PoolState, VaultError};

/// Pool-type-specific math consumed by the simulation engine.
#[async_trait]
pub trait PoolMath: Send + Sync {
    /// Share tokens minted for exact token amounts in.
    /// `amounts_in` is index-aligned with the pool's token list, raw units.
    async fn bpt_out_given_tokens_in(
        &self,
        pool: &PoolState,
        amounts_in: &[U256],
    ) -> Result<U256, VaultError>;

    /// Token amounts returned for burning exact share tokens, index-aligned
    /// with the pool's token list, raw units.
    async fn tokens_out_given_bpt_in(
        &self,
        pool: &PoolState,
        bpt_in: U256,
    ) -> Result<Vec<U256>, VaultError>;

    /// Exact-in swap output. Either side may be the pool's own share token
    /// (phantom-BPT pools trade their BPT like a constituent).
    async fn out_given_in(
        &self,
        pool: &PoolState,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, VaultError>;
}

/// Value-proportional reference math: joins and exits mint/burn pro rata to
/// the pool's total (decimal-normalized) balance, swaps are constant-product.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProportionalMath;

impl ProportionalMath {
    fn scaled_total(pool: &PoolState) -> Result<U256, VaultError> {
        let mut total = U256::ZERO;
        for token in &pool.tokens {
            total += fixed::scale_to_18(token.balance, token.decimals)?;
        }
        Ok(total)
    }
}

#[async_trait]
impl PoolMath for ProportionalMath {
    async fn bpt_out_given_tokens_in(
        &self,
        pool: &PoolState,
        amounts_in: &[U256],
    ) -> Result<U256, VaultError> {
        let mut value_in = U256::ZERO;
        for (token, amount) in pool.tokens.iter().zip(amounts_in) {
            value_in += fixed::scale_to_18(*amount, token.decimals)?;
        }
        let total = Self::scaled_total(pool)?;
        Ok(fixed::mul_div_down(pool.total_supply, value_in, total)?)
    }

    async fn tokens_out_given_bpt_in(
        &self,
        pool: &PoolState,
        bpt_in: U256,
    ) -> Result<Vec<U256>, VaultError> {
        pool.tokens
            .iter()
            .map(|token| {
                Ok(fixed::mul_div_down(
                    token.balance,
                    bpt_in,
                    pool.total_supply,
                )?)
            })
            .collect()
    }

    async fn out_given_in(
        &self,
        pool: &PoolState,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, VaultError> {
        // swapping for the pool's own BPT is a value-proportional mint
        if token_out == pool.address {
            let token = pool.token(token_in)?;
            let value_in = fixed::scale_to_18(amount_in, token.decimals)?;
            let total = Self::scaled_total(pool)?;
            return Ok(fixed::mul_div_down(pool.total_supply, value_in, total)?);
        }
        // and swapping the BPT away is a value-proportional burn
        if token_in == pool.address {
            let token = pool.token(token_out)?;
            let total = Self::scaled_total(pool)?;
            let value_out = fixed::mul_div_down(total, amount_in, pool.total_supply)?;
            let scaled_balance = fixed::scale_to_18(token.balance, token.decimals)?;
            let capped = value_out.min(scaled_balance);
            return Ok(fixed::scale_from_18(capped, token.decimals)?);
        }

        let token_in = pool.token(token_in)?;
        let token_out = pool.token(token_out)?;
        let balance_in = fixed::scale_to_18(token_in.balance, token_in.decimals)?;
        let balance_out = fixed::scale_to_18(token_out.balance, token_out.decimals)?;
        let amount = fixed::scale_to_18(amount_in, token_in.decimals)?;
        // x*y=k, fee-free
        let out = fixed::mul_div_down(balance_out, amount, balance_in + amount)?;
        Ok(fixed::scale_from_18(out, token_out.decimals)?)
    }
}
