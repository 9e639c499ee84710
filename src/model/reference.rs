use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// Key prefix marking a uint256 as a chained-reference read rather than a
/// literal amount (`0xba10` in the top bytes, relayer convention).
const CHAINED_REFERENCE_PREFIX: U256 =
    U256::from_limbs([0, 0, 0, 0xba10_0000_0000_0000u64]);

/// An opaque placeholder for an amount only known after a prior action
/// executes. Distinct from a literal amount by construction: callers must go
/// through [`ChainedReference::key`] to obtain the wire encoding, and the
/// encoding always carries the reference prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainedReference {
    slot: u32,
}

impl ChainedReference {
    pub fn new(slot: u32) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    /// The prefixed uint256 key the relayer resolves at execution time.
    pub fn key(&self) -> U256 {
        CHAINED_REFERENCE_PREFIX | U256::from(self.slot)
    }

    /// Whether a raw uint256 carries the chained-reference prefix.
    pub fn is_chained_key(value: U256) -> bool {
        value & CHAINED_REFERENCE_PREFIX == CHAINED_REFERENCE_PREFIX
    }
}

/// An amount flowing into an action: either a literal (known at compile time,
/// from the allocation pass) or a chained reference to a prior action's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputAmount {
    Literal { value: U256 },
    Chained { reference: ChainedReference },
}

impl InputAmount {
    pub fn literal(value: U256) -> Self {
        InputAmount::Literal { value }
    }

    pub fn chained(reference: ChainedReference) -> Self {
        InputAmount::Chained { reference }
    }

    pub fn zero() -> Self {
        InputAmount::Literal { value: U256::ZERO }
    }

    pub fn is_zero(&self) -> bool {
        matches!(self, InputAmount::Literal { value } if value.is_zero())
    }

    /// Wire encoding: the literal value, or the reference's prefixed key.
    pub fn encoded(&self) -> U256 {
        match self {
            InputAmount::Literal { value } => *value,
            InputAmount::Chained { reference } => reference.key(),
        }
    }
}
