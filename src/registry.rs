//! Pool registry boundary: resolves pool ids / share-token addresses to
//! current pool composition. The composer only ever reads through
//! [`PoolRegistry`]; the in-memory [`StaticRegistry`] backs the CLI and tests.

use std::collections::HashMap;
use std::path::Path;

use alloy::primitives::Address;
use async_trait::async_trait;
use thiserror::Error;

use crate::model::manifest::{ManifestError, RegistryFile};
use crate::model::pool::{PoolDescriptor, PoolId};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("registry lookup failed: {0}")]
    Lookup(String),
}

/// Read-only pool lookup. Implementations may cache; the composer never does.
#[async_trait]
pub trait PoolRegistry: Send + Sync {
    /// Resolve a pool by its id.
    async fn find(&self, id: &PoolId) -> Result<Option<PoolDescriptor>, RegistryError>;

    /// Resolve a pool by its share token address (to detect nested pools).
    async fn find_by_address(
        &self,
        address: Address,
    ) -> Result<Option<PoolDescriptor>, RegistryError>;
}

/// In-memory registry over a fixed pool set.
#[derive(Debug, Default, Clone)]
pub struct StaticRegistry {
    by_id: HashMap<PoolId, PoolDescriptor>,
    by_address: HashMap<Address, PoolId>,
}

impl StaticRegistry {
    pub fn new(pools: impl IntoIterator<Item = PoolDescriptor>) -> Self {
        let mut registry = Self::default();
        for pool in pools {
            registry.by_address.insert(pool.address, pool.id);
            registry.by_id.insert(pool.id, pool);
        }
        registry
    }

    /// Load from a registry JSON file (see [`RegistryFile`]).
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path)?;
        let file: RegistryFile = serde_json::from_str(&contents)?;
        let pools = file
            .pools
            .iter()
            .map(|entry| entry.to_descriptor())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(pools))
    }

    pub fn pools(&self) -> impl Iterator<Item = &PoolDescriptor> {
        self.by_id.values()
    }
}

#[async_trait]
impl PoolRegistry for StaticRegistry {
    async fn find(&self, id: &PoolId) -> Result<Option<PoolDescriptor>, RegistryError> {
        Ok(self.by_id.get(id).cloned())
    }

    async fn find_by_address(
        &self,
        address: Address,
    ) -> Result<Option<PoolDescriptor>, RegistryError> {
        Ok(self
            .by_address
            .get(&address)
            .and_then(|id| self.by_id.get(id))
            .cloned())
    }
}
