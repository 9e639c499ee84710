use alloy::primitives::{Address, B256, U256};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::fixed::{self, FixedPointError};

/// A pool's unique identifier (Balancer-style bytes32: address ++ specialization ++ nonce).
pub type PoolId = B256;

/// Pool kinds the composer understands.
///
/// Determines both how a nested pool's share token is acquired (join vs swap)
/// and whether the pool pre-mints its own share token into its token list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PoolType {
    Weighted,
    Stable,
    MetaStable,
    /// Stable pool whose own BPT appears in its token list (phantom mint).
    ComposableStable,
    /// Aave linear pool (main token + wrapped aToken). BPT is acquired via swap.
    AaveLinear,
}

impl PoolType {
    /// Whether this pool's share token is acquired through a batch swap
    /// rather than a join (linear pools cannot be joined).
    pub fn acquired_via_swap(&self) -> bool {
        matches!(self, PoolType::AaveLinear)
    }

    /// Whether the pool phantom-mints its own share token into its token list,
    /// so join assets must include the BPT as a placeholder entry.
    pub fn has_phantom_bpt(&self) -> bool {
        matches!(self, PoolType::ComposableStable | PoolType::AaveLinear)
    }
}

/// One constituent token of a pool, as reported by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolToken {
    pub address: Address,
    /// Raw on-chain balance (in the token's own decimals).
    pub balance: U256,
    pub decimals: u8,
    /// Normalized weight (18-decimal), for weighted pools only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<U256>,
    /// For wrapped yield-bearing tokens (static aTokens): the real underlying asset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped_underlying: Option<Address>,
}

impl PoolToken {
    /// Balance scaled to 18-decimal fixed point.
    pub fn scaled_balance(&self) -> Result<U256, FixedPointError> {
        fixed::scale_to_18(self.balance, self.decimals)
    }
}

/// A pool's current composition as resolved by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolDescriptor {
    pub id: PoolId,
    pub address: Address,
    pub pool_type: PoolType,
    /// Circulating share token supply (18-decimal).
    pub total_supply: U256,
    /// Ordered token list. May include the pool's own BPT for phantom-mint kinds.
    pub tokens: Vec<PoolToken>,
}

impl PoolDescriptor {
    /// Tokens excluding the pool's own share token.
    pub fn tokens_without_bpt(&self) -> impl Iterator<Item = &PoolToken> {
        self.tokens.iter().filter(|t| t.address != self.address)
    }

    /// Each token's share of the pool, as an 18-decimal fraction summing to ~1.
    ///
    /// Weighted pools use normalized weights; everything else uses the token's
    /// share of total (decimal-scaled) balance. The pool's own BPT entry is
    /// excluded from the computation.
    pub fn token_proportions(&self) -> Result<Vec<(Address, U256)>, FixedPointError> {
        let tokens: Vec<&PoolToken> = self.tokens_without_bpt().collect();

        if !tokens.is_empty() && tokens.iter().all(|t| t.weight.is_some()) {
            return Ok(tokens
                .iter()
                .map(|t| (t.address, t.weight.unwrap_or_default()))
                .collect());
        }

        let scaled: Vec<U256> = tokens
            .iter()
            .map(|t| t.scaled_balance())
            .collect::<Result<_, _>>()?;
        let total: U256 = scaled.iter().fold(U256::ZERO, |acc, b| acc + b);

        tokens
            .iter()
            .zip(scaled)
            .map(|(t, b)| Ok((t.address, fixed::div_down(b, total)?)))
            .collect()
    }
}
