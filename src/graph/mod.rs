//! Graph Builder: expands a root pool id into a tree of typed action nodes by
//! recursively resolving nested pool shares and wrapped leaf tokens through
//! the registry.

mod validate;

use std::future::Future;
use std::pin::Pin;

use alloy::primitives::{Address, U256};
use thiserror::Error;

use crate::model::fixed::{self, FixedPointError};
use crate::model::node::{Node, NodeAction, NodeIndex, NodeKind, OutputRef};
use crate::model::pool::{PoolDescriptor, PoolId};
use crate::registry::{PoolRegistry, RegistryError};

/// Maximum pool nesting depth. Bounds recursion so a cyclic or malformed
/// registry fails predictably instead of recursing indefinitely.
pub const MAX_DEPTH: usize = 8;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("pool `{0}` not found in registry")]
    PoolNotFound(PoolId),

    #[error("pool nesting exceeds {MAX_DEPTH} levels (cyclic registry?)")]
    MaxDepthExceeded,

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    FixedPoint(#[from] FixedPointError),

    #[error("built graph contains a cycle")]
    CycleDetected,

    #[error("node {index} has more than one parent")]
    MultipleParents { index: NodeIndex },

    #[error("node {index} is unreachable from the root")]
    Unreachable { index: NodeIndex },
}

/// The action tree for one compose call. Nodes live in an arena; `children`
/// hold arena indices. Built fresh per call, never shared across calls.
#[derive(Debug, Clone)]
pub struct PoolGraph {
    nodes: Vec<Node>,
    root: NodeIndex,
}

impl PoolGraph {
    /// Expand `root_id` into an action tree.
    ///
    /// With `unwrap_leaf_tokens`, a pool token that is a wrapped yield-bearing
    /// asset becomes a wrap node fed by an input node of its real underlying;
    /// otherwise the wrapped token itself is the input leaf.
    ///
    /// A root id the registry cannot resolve aborts with
    /// [`GraphError::PoolNotFound`]; no partial graph is returned on any error.
    pub async fn build(
        registry: &dyn PoolRegistry,
        root_id: &PoolId,
        unwrap_leaf_tokens: bool,
    ) -> Result<Self, GraphError> {
        let root_pool = registry
            .find(root_id)
            .await?
            .ok_or(GraphError::PoolNotFound(*root_id))?;

        let mut builder = Builder {
            registry,
            unwrap_leaf_tokens,
            nodes: Vec::new(),
        };
        let root = builder.expand_pool(root_pool, fixed::ONE, 0).await?;

        let graph = Self {
            nodes: builder.nodes,
            root,
        };
        validate::check_tree(&graph)?;
        Ok(graph)
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        &mut self.nodes[index]
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeIndex) -> Self {
        Self { nodes, root }
    }
}

struct Builder<'a> {
    registry: &'a dyn PoolRegistry,
    unwrap_leaf_tokens: bool,
    nodes: Vec<Node>,
}

impl Builder<'_> {
    fn alloc(&mut self, node: Node) -> NodeIndex {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn leaf(&mut self, action: NodeAction, address: Address, proportion: U256) -> Node {
        Node {
            slot: self.nodes.len() as u32,
            pool_id: None,
            address,
            kind: NodeKind::Token,
            action,
            children: Vec::new(),
            proportion_of_parent: proportion,
            output: OutputRef::Pending,
        }
    }

    /// Recursively expand one pool into its action subtree. `proportion` is
    /// the cumulative fraction of the whole operation this pool supplies.
    fn expand_pool<'b>(
        &'b mut self,
        pool: PoolDescriptor,
        proportion: U256,
        depth: usize,
    ) -> Pin<Box<dyn Future<Output = Result<NodeIndex, GraphError>> + Send + 'b>> {
        Box::pin(async move {
            if depth >= MAX_DEPTH {
                return Err(GraphError::MaxDepthExceeded);
            }

            let action = if pool.pool_type.acquired_via_swap() {
                NodeAction::BatchSwap
            } else {
                NodeAction::JoinPool
            };

            let proportions = pool.token_proportions()?;
            let mut children = Vec::new();

            let tokens: Vec<_> = pool.tokens_without_bpt().cloned().collect();
            for (token, (_, share)) in tokens.into_iter().zip(proportions) {
                let child_proportion = fixed::mul_down(proportion, share)?;

                if let Some(child_pool) = self.registry.find_by_address(token.address).await? {
                    children.push(
                        self.expand_pool(child_pool, child_proportion, depth + 1)
                            .await?,
                    );
                } else if let (true, Some(underlying)) =
                    (self.unwrap_leaf_tokens, token.wrapped_underlying)
                {
                    // wrap node sourced from an input node of the underlying
                    let input = self.leaf(NodeAction::Input, underlying, child_proportion);
                    let input_index = self.alloc(input);
                    let mut wrap = self.leaf(NodeAction::Wrap, token.address, child_proportion);
                    wrap.children.push(input_index);
                    children.push(self.alloc(wrap));
                } else {
                    let input = self.leaf(NodeAction::Input, token.address, child_proportion);
                    children.push(self.alloc(input));
                }
            }

            let node = Node {
                slot: self.nodes.len() as u32,
                pool_id: Some(pool.id),
                address: pool.address,
                kind: NodeKind::Pool {
                    pool_type: pool.pool_type,
                },
                action,
                children,
                proportion_of_parent: proportion,
                output: OutputRef::Pending,
            };
            Ok(self.alloc(node))
        })
    }
}
