use std::collections::VecDeque;

use crate::graph::PoolGraph;
use crate::model::node::NodeIndex;

/// Linearize the tree into execution order: breadth-first from the root, then
/// reversed, so every node's children (one BFS layer deeper) strictly precede
/// it and sibling order stays deterministic left-to-right.
pub fn execution_order(graph: &PoolGraph) -> Vec<NodeIndex> {
    let mut queue = VecDeque::from([graph.root()]);
    let mut visited = Vec::with_capacity(graph.len());

    while let Some(index) = queue.pop_front() {
        visited.push(index);
        queue.extend(graph.node(index).children.iter().copied());
    }

    visited.reverse();
    visited
}

#[cfg(test)]
mod tests {
    use super::*;

    use alloy::primitives::{Address, B256, U256};

    use crate::model::fixed::ONE;
    use crate::model::pool::{PoolDescriptor, PoolToken, PoolType};
    use crate::registry::StaticRegistry;

    fn simple_token(address: Address, balance: u64) -> PoolToken {
        PoolToken {
            address,
            balance: U256::from(balance),
            decimals: 18,
            weight: None,
            wrapped_underlying: None,
        }
    }

    fn two_level_registry() -> (StaticRegistry, B256, B256) {
        let child_id = B256::repeat_byte(0x02);
        let child_address = Address::repeat_byte(0x02);
        let child = PoolDescriptor {
            id: child_id,
            address: child_address,
            pool_type: PoolType::Stable,
            total_supply: ONE,
            tokens: vec![
                simple_token(Address::repeat_byte(0x0a), 100),
                simple_token(Address::repeat_byte(0x0b), 100),
            ],
        };
        let root_id = B256::repeat_byte(0x01);
        let root = PoolDescriptor {
            id: root_id,
            address: Address::repeat_byte(0x01),
            pool_type: PoolType::Weighted,
            total_supply: ONE,
            tokens: vec![
                simple_token(Address::repeat_byte(0x0c), 100),
                simple_token(child_address, 100),
            ],
        };
        (StaticRegistry::new([root, child]), root_id, child_id)
    }

    #[tokio::test]
    async fn children_precede_parents() {
        let (registry, root_id, child_id) = two_level_registry();
        let graph = PoolGraph::build(&registry, &root_id, false).await.unwrap();
        let order = execution_order(&graph);

        assert_eq!(order.len(), graph.len());
        // root last
        assert_eq!(*order.last().unwrap(), graph.root());

        let position = |id: B256| {
            order
                .iter()
                .position(|&i| graph.node(i).pool_id == Some(id))
                .unwrap()
        };
        assert!(position(child_id) < position(root_id));

        // every child is emitted before its parent
        for (emitted_at, &index) in order.iter().enumerate() {
            for &child in &graph.node(index).children {
                let child_at = order.iter().position(|&i| i == child).unwrap();
                assert!(child_at < emitted_at);
            }
        }
    }
}
