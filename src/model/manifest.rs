//! On-disk JSON formats for the CLI: a static pool registry and a join
//! request. String-encoded addresses/amounts so files stay hand-editable and
//! schema-friendly; parsed into the typed model before use.

use alloy::primitives::{Address, B256, Bytes, U256};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::pool::{PoolDescriptor, PoolToken, PoolType};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid address `{value}` in field `{field}`")]
    InvalidAddress { field: &'static str, value: String },

    #[error("invalid pool id `{value}`")]
    InvalidPoolId { value: String },

    #[error("invalid amount `{value}` in field `{field}`")]
    InvalidAmount { field: &'static str, value: String },

    #[error("invalid hex payload in field `{field}`")]
    InvalidHex { field: &'static str },
}

/// Registry file: the full set of pools the composer may encounter.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RegistryFile {
    pub pools: Vec<PoolEntry>,
}

/// One pool in the registry file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PoolEntry {
    /// Pool id as 0x-prefixed 32-byte hex.
    pub id: String,
    /// Share token address.
    pub address: String,
    pub pool_type: PoolType,
    /// Circulating share supply, base units (decimal or 0x-hex string).
    pub total_supply: String,
    pub tokens: Vec<TokenEntry>,
}

/// One constituent token of a pool entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TokenEntry {
    pub address: String,
    /// Raw balance in the token's own decimals.
    pub balance: String,
    pub decimals: u8,
    /// Normalized 18-decimal weight, weighted pools only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    /// Underlying asset when this token is a wrapped static yield token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped_underlying: Option<String>,
}

/// Join request file for `compile` / `simulate`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JoinRequestFile {
    /// Root pool id to deposit into.
    pub pool_id: String,
    /// Minimum acceptable share tokens out, base units.
    pub expected_bpt_out: String,
    /// The depositing user's address.
    pub user: String,
    /// Relayer (destination) contract address.
    pub relayer: String,
    /// Wrap leaf tokens that have a static wrapped form.
    #[serde(default)]
    pub unwrap_leaf_tokens: bool,
    /// Real assets the user supplies.
    pub tokens: Vec<TokenAmountEntry>,
    /// Optional pre-signed relayer approval payload (0x-hex).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorisation: Option<String>,
}

/// A `(token, amount)` pair the user supplies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TokenAmountEntry {
    pub address: String,
    /// Base units (decimal or 0x-hex string).
    pub amount: String,
}

pub fn parse_address(field: &'static str, value: &str) -> Result<Address, ManifestError> {
    value.parse().map_err(|_| ManifestError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}

pub fn parse_pool_id(value: &str) -> Result<B256, ManifestError> {
    value.parse().map_err(|_| ManifestError::InvalidPoolId {
        value: value.to_string(),
    })
}

pub fn parse_amount(field: &'static str, value: &str) -> Result<U256, ManifestError> {
    value.parse().map_err(|_| ManifestError::InvalidAmount {
        field,
        value: value.to_string(),
    })
}

impl TokenEntry {
    pub fn to_pool_token(&self) -> Result<PoolToken, ManifestError> {
        Ok(PoolToken {
            address: parse_address("tokens.address", &self.address)?,
            balance: parse_amount("tokens.balance", &self.balance)?,
            decimals: self.decimals,
            weight: self
                .weight
                .as_deref()
                .map(|w| parse_amount("tokens.weight", w))
                .transpose()?,
            wrapped_underlying: self
                .wrapped_underlying
                .as_deref()
                .map(|u| parse_address("tokens.wrapped_underlying", u))
                .transpose()?,
        })
    }
}

impl PoolEntry {
    pub fn to_descriptor(&self) -> Result<PoolDescriptor, ManifestError> {
        Ok(PoolDescriptor {
            id: parse_pool_id(&self.id)?,
            address: parse_address("address", &self.address)?,
            pool_type: self.pool_type,
            total_supply: parse_amount("total_supply", &self.total_supply)?,
            tokens: self
                .tokens
                .iter()
                .map(TokenEntry::to_pool_token)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl JoinRequestFile {
    pub fn authorisation_bytes(&self) -> Result<Option<Bytes>, ManifestError> {
        self.authorisation
            .as_deref()
            .map(|raw| {
                raw.parse()
                    .map_err(|_| ManifestError::InvalidHex { field: "authorisation" })
            })
            .transpose()
    }
}
