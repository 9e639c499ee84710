use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::pool::{PoolId, PoolType};
use super::reference::ChainedReference;

/// Index of a node within its [`crate::graph::PoolGraph`] arena.
pub type NodeIndex = usize;

/// What a node represents: a pool (whose share token must be acquired or
/// disposed of) or a plain token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Pool { pool_type: PoolType },
    Token,
}

/// The atomic operation a node compiles to. Closed set: new pool kinds extend
/// this enum rather than matching on open-ended strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeAction {
    /// Terminal real-world token supplied by the user. Emits no action; its
    /// output is the allocated input amount.
    Input,
    /// Wrap an underlying asset into its static wrapped form (e.g. aUSDC).
    Wrap,
    /// Unwrap a static wrapped token back to its underlying.
    Unwrap,
    /// Acquire a pool's share token through a swap (linear pools).
    BatchSwap,
    /// Deposit into a pool for its share token.
    JoinPool,
    /// Withdraw from a pool by burning its share token.
    ExitPool,
    Noop,
}

/// The resolution state of a node's output amount.
///
/// Built `Pending`, then resolved by the allocation pass (inputs become
/// literal `Amount`s) and the action compiler (emitting nodes become
/// `Chained`, dead branches become `Zero`). A node's output must be resolved
/// before any parent consumes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum OutputRef {
    Pending,
    /// Literal amount, known at compile time (allocated inputs).
    Amount { value: U256 },
    /// Reference to whatever the node's action actually produces on-chain.
    Chained { reference: ChainedReference },
    /// Collapsed: no value flows through this node.
    Zero,
}

impl OutputRef {
    /// Whether no value flows out of this node (collapsed, or allocated zero).
    pub fn is_zero(&self) -> bool {
        match self {
            OutputRef::Zero => true,
            OutputRef::Amount { value } => value.is_zero(),
            _ => false,
        }
    }
}

/// One vertex of the action graph: a pool to join, a token to wrap, or a user
/// input. Owned by the arena in [`crate::graph::PoolGraph`]; children are
/// arena indices in insertion order (order determines on-chain array layout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Chained-reference slot for this node's output, unique per graph.
    pub slot: u32,
    /// Pool id when this node represents a pool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<PoolId>,
    /// Token address (a pool's share token address for pool nodes).
    pub address: Address,
    pub kind: NodeKind,
    pub action: NodeAction,
    /// Child nodes feeding this one, in pool token order.
    pub children: Vec<NodeIndex>,
    /// Cumulative 18-decimal fraction of the whole operation this node
    /// supplies (root = 1e18). Summed per address for input allocation.
    pub proportion_of_parent: U256,
    pub output: OutputRef,
}

impl Node {
    pub fn is_input(&self) -> bool {
        self.action == NodeAction::Input
    }
}
