use std::collections::HashMap;

use alloy::primitives::U256;

use crate::model::reference::{ChainedReference, InputAmount};

use super::VaultError;

/// Simulated relayer storage: chained-reference slot to realized amount.
/// Scoped to one simulation call.
#[derive(Debug, Default)]
pub struct RelayerLedger {
    slots: HashMap<u32, U256>,
}

impl RelayerLedger {
    pub fn set(&mut self, reference: ChainedReference, value: U256) {
        self.slots.insert(reference.slot(), value);
    }

    /// Resolve an action input to a concrete amount: literals pass through,
    /// chained references read the slot a prior action wrote.
    pub fn resolve(&self, amount: &InputAmount) -> Result<U256, VaultError> {
        match amount {
            InputAmount::Literal { value } => Ok(*value),
            InputAmount::Chained { reference } => self
                .slots
                .get(&reference.slot())
                .copied()
                .ok_or(VaultError::UnresolvedReference(reference.slot())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_read_before_write_is_an_error() {
        let ledger = RelayerLedger::default();
        let amount = InputAmount::chained(ChainedReference::new(3));
        assert!(matches!(
            ledger.resolve(&amount),
            Err(VaultError::UnresolvedReference(3))
        ));
    }

    #[test]
    fn writes_resolve_in_order() {
        let mut ledger = RelayerLedger::default();
        let reference = ChainedReference::new(1);
        ledger.set(reference, U256::from(42));
        assert_eq!(
            ledger.resolve(&InputAmount::chained(reference)).unwrap(),
            U256::from(42)
        );
        assert_eq!(
            ledger
                .resolve(&InputAmount::literal(U256::from(7)))
                .unwrap(),
            U256::from(7)
        );
    }
}
