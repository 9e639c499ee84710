//! Compose engine: graph build, proportional allocation, scheduling, and
//! action compilation behind one caller-facing entry point.

pub mod actions;
pub mod allocate;
pub mod order;

use std::collections::HashMap;

use alloy::primitives::{Address, Bytes, U256};
use thiserror::Error;

use crate::graph::{GraphError, PoolGraph};
use crate::model::node::OutputRef;
use crate::model::pool::PoolId;
use crate::model::reference::ChainedReference;
use crate::registry::PoolRegistry;

use actions::{CompileError, CompileParams, CompiledAction, Diagnostic};
use allocate::AllocationError;

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// A deposit request into a (possibly nested) pool.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    /// Root pool to deposit into.
    pub pool_id: PoolId,
    /// Minimum acceptable share tokens out.
    pub expected_bpt_out: U256,
    /// Real assets the user supplies.
    pub tokens: Vec<(Address, U256)>,
    pub user: Address,
    /// Wrap leaf tokens that have a static wrapped form.
    pub unwrap_leaf_tokens: bool,
    /// Batch swap deadline (unix seconds).
    pub deadline: U256,
    /// Optional pre-signed relayer approval, prepended to the sequence.
    pub authorisation: Option<Bytes>,
}

/// The compiled composite call: destination plus ordered action sequence.
/// Wire encoding happens at the transaction-batching boundary, not here.
#[derive(Debug)]
pub struct ComposedCall {
    /// Destination (relayer) address for the multicall.
    pub to: Address,
    pub actions: Vec<CompiledAction>,
    /// Non-fatal conditions accumulated during compilation.
    pub diagnostics: Vec<Diagnostic>,
    /// Where the root action's realized output lands, if chained.
    pub output_reference: Option<ChainedReference>,
}

/// Caller-facing compiler for nested-pool deposits.
pub struct Composer<R> {
    registry: R,
    relayer: Address,
}

impl<R: PoolRegistry> Composer<R> {
    pub fn new(registry: R, relayer: Address) -> Self {
        Self { registry, relayer }
    }

    /// Compile one atomic deposit sequence for `request`.
    ///
    /// Build the action graph, allocate the supplied amounts across input
    /// leaves, schedule children-first, then emit descriptors. Each call is
    /// self-contained: no state is shared across calls, and a failed registry
    /// lookup aborts the whole compile with no partial result.
    pub async fn join_pool(&self, request: &JoinRequest) -> Result<ComposedCall, ComposeError> {
        let mut graph = PoolGraph::build(
            &self.registry,
            &request.pool_id,
            request.unwrap_leaf_tokens,
        )
        .await?;

        let ordered = order::execution_order(&graph);

        let amounts: HashMap<Address, U256> = request.tokens.iter().copied().collect();
        allocate::allocate(&mut graph, &amounts)?;

        let output = actions::compile(
            &mut graph,
            &ordered,
            &CompileParams {
                root_id: request.pool_id,
                expected_out: request.expected_bpt_out,
                user: request.user,
                relayer: self.relayer,
                deadline: request.deadline,
                authorisation: request.authorisation.clone(),
            },
        )?;

        let output_reference = match graph.node(graph.root()).output {
            OutputRef::Chained { reference } => Some(reference),
            _ => None,
        };

        Ok(ComposedCall {
            to: self.relayer,
            actions: output.actions,
            diagnostics: output.diagnostics,
            output_reference,
        })
    }
}
