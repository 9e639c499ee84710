use std::collections::HashMap;

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex as PgIndex};
use petgraph::Direction;

use super::{GraphError, PoolGraph};

/// Cross-check the built arena is a tree rooted at `graph.root()`:
/// acyclic, every non-root node has exactly one parent, everything reachable.
pub fn check_tree(graph: &PoolGraph) -> Result<(), GraphError> {
    let mut pg = DiGraph::<usize, ()>::new();
    let mut index_map: HashMap<usize, PgIndex> = HashMap::new();

    for index in 0..graph.len() {
        index_map.insert(index, pg.add_node(index));
    }
    for index in 0..graph.len() {
        for &child in &graph.node(index).children {
            pg.add_edge(index_map[&index], index_map[&child], ());
        }
    }

    if is_cyclic_directed(&pg) {
        return Err(GraphError::CycleDetected);
    }

    for index in 0..graph.len() {
        let parents = pg
            .edges_directed(index_map[&index], Direction::Incoming)
            .count();
        if index == graph.root() {
            if parents != 0 {
                return Err(GraphError::MultipleParents { index });
            }
        } else if parents != 1 {
            if parents == 0 {
                return Err(GraphError::Unreachable { index });
            }
            return Err(GraphError::MultipleParents { index });
        }
    }

    Ok(())
}
