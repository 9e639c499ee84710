use std::collections::HashMap;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::graph::PoolGraph;
use crate::model::fixed::{self, FixedPointError};
use crate::model::node::OutputRef;

/// Per-address sum of `proportion_of_parent` over every node in the graph.
/// Rebuilt fresh per compose call, never shared.
pub type TotalProportions = HashMap<Address, U256>;

#[derive(Debug, Error)]
pub enum AllocationError {
    /// An input token was requested for an address whose aggregate proportion
    /// is zero. Malformed graph; a programming-invariant violation, not a
    /// recoverable user error.
    #[error("total proportion for token {address} is zero")]
    ZeroTotalProportion { address: Address },

    #[error(transparent)]
    FixedPoint(#[from] FixedPointError),
}

/// Sum each address's proportion across all nodes. Needed when the same token
/// funds several paths (e.g. DAI supplied to two different sub-pools).
pub fn total_proportions(graph: &PoolGraph) -> TotalProportions {
    let mut totals = TotalProportions::new();
    for node in graph.nodes() {
        *totals.entry(node.address).or_insert(U256::ZERO) += node.proportion_of_parent;
    }
    totals
}

/// Split the caller-supplied amounts across input leaves in proportion to each
/// leaf's share of its address's aggregate proportion. Input nodes whose
/// address is not in `amounts` are allocated zero.
///
/// Resolves every input node's output to a literal amount; other nodes are
/// untouched (the action compiler resolves those).
pub fn allocate(
    graph: &mut PoolGraph,
    amounts: &HashMap<Address, U256>,
) -> Result<TotalProportions, AllocationError> {
    let totals = total_proportions(graph);

    for index in 0..graph.len() {
        let node = graph.node(index);
        if !node.is_input() {
            continue;
        }

        let allocated = match amounts.get(&node.address) {
            None => U256::ZERO,
            Some(supplied) => {
                let total = totals.get(&node.address).copied().unwrap_or_default();
                if total.is_zero() {
                    return Err(AllocationError::ZeroTotalProportion {
                        address: node.address,
                    });
                }
                // multiply-before-divide, 18-decimal fixed point
                let input_proportion = fixed::div_down(node.proportion_of_parent, total)?;
                fixed::mul_down(input_proportion, *supplied)?
            }
        };
        graph.node_mut(index).output = OutputRef::Amount { value: allocated };
    }

    Ok(totals)
}
