//! Action Compiler: walks the scheduled node list and emits one operation
//! descriptor per node, wiring inter-node data flow through chained
//! references and collapsing branches no value flows through.

use alloy::primitives::{Address, Bytes, B256, I256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::PoolGraph;
use crate::model::node::{NodeAction, NodeIndex, NodeKind, OutputRef};
use crate::model::pool::PoolId;
use crate::model::reference::{ChainedReference, InputAmount};

/// Vault fund-management flags for a swap: whether tokens come from / go to
/// relayer-held intermediate balances or the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundManagement {
    pub sender: Address,
    pub recipient: Address,
    pub from_internal_balance: bool,
    pub to_internal_balance: bool,
}

/// One hop of a batch swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSwapStep {
    pub pool_id: B256,
    pub asset_in_index: u32,
    pub asset_out_index: u32,
    pub amount: InputAmount,
    pub user_data: Bytes,
}

/// Where a swap's realized output is stored for downstream consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputReference {
    /// Index into the swap's asset array.
    pub index: u32,
    pub key: ChainedReference,
}

/// Join userData: exact tokens in for BPT out. Amounts exclude the pool's own
/// BPT entry even when the asset array includes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinUserData {
    pub amounts_in: Vec<InputAmount>,
    pub minimum_bpt: U256,
}

/// One compiled operation. Immutable once emitted; the sequence is consumed
/// by an external multicall encoder (wire format out of scope here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CompiledAction {
    /// Pre-signed approval letting the relayer act on the user's behalf.
    SetRelayerApproval {
        relayer: Address,
        approved: bool,
        authorisation: Bytes,
    },
    /// Wrap an underlying asset into its static wrapped form.
    Wrap {
        static_token: Address,
        underlying: Address,
        sender: Address,
        recipient: Address,
        amount: InputAmount,
        from_underlying: bool,
        output_reference: ChainedReference,
    },
    /// Swap into a pool's share token (exact-in).
    BatchSwap {
        swaps: Vec<BatchSwapStep>,
        assets: Vec<Address>,
        funds: FundManagement,
        /// Positive limits bound tokens entering the vault, negative limits
        /// bound tokens leaving it (the expected minimum output).
        limits: Vec<I256>,
        deadline: U256,
        output_reference: OutputReference,
    },
    /// Deposit into a pool for its share token.
    JoinPool {
        pool_id: B256,
        sender: Address,
        recipient: Address,
        /// Sorted by address; includes the pool's own BPT for phantom-mint kinds.
        assets: Vec<Address>,
        /// Index-aligned with `assets`.
        max_amounts_in: Vec<InputAmount>,
        user_data: JoinUserData,
        /// Native-asset value to attach (nonzero only when joining with ETH).
        value: U256,
        from_internal_balance: bool,
        output_reference: ChainedReference,
    },
    /// Withdraw from a pool by burning its share token. Not emitted by the
    /// deposit compiler; consumed by the simulation engine.
    ExitPool {
        pool_id: B256,
        sender: Address,
        recipient: Address,
        assets: Vec<Address>,
        min_amounts_out: Vec<U256>,
        bpt_in: InputAmount,
        to_internal_balance: bool,
        output_references: Vec<OutputReference>,
    },
}

/// A non-fatal condition encountered during compilation. The branch is
/// skipped and compilation continues with a best-effort action list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub node: NodeIndex,
    pub address: Address,
    pub action: NodeAction,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("node {index} consumed before its output was resolved")]
    UnresolvedOutput { index: NodeIndex },

    #[error("pool node {index} has no pool id")]
    MissingPoolId { index: NodeIndex },

    #[error("expected output {0} does not fit a signed swap limit")]
    LimitOverflow(U256),
}

/// Compiler inputs that are constant across the node walk.
#[derive(Debug, Clone)]
pub struct CompileParams {
    pub root_id: PoolId,
    /// Minimum share tokens out, enforced on the root action only.
    pub expected_out: U256,
    pub user: Address,
    pub relayer: Address,
    /// Batch swap deadline (unix seconds).
    pub deadline: U256,
    pub authorisation: Option<Bytes>,
}

/// The compiled sequence plus accumulated non-fatal diagnostics.
#[derive(Debug)]
pub struct CompileOutput {
    pub actions: Vec<CompiledAction>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile the scheduled nodes into an ordered action sequence.
///
/// Expects the allocation pass to have resolved every input node's output.
/// Resolves each emitting node's output to a fresh chained reference, so by
/// the time a parent is compiled all of its children are resolved.
pub fn compile(
    graph: &mut PoolGraph,
    ordered: &[NodeIndex],
    params: &CompileParams,
) -> Result<CompileOutput, CompileError> {
    let mut actions = Vec::new();
    let mut diagnostics = Vec::new();

    if let Some(authorisation) = &params.authorisation {
        actions.push(CompiledAction::SetRelayerApproval {
            relayer: params.relayer,
            approved: true,
            authorisation: authorisation.clone(),
        });
    }

    for &index in ordered {
        let node = graph.node(index).clone();
        let is_root = node.pool_id == Some(params.root_id);

        // Dead branch: nothing flows through a non-root, non-input node whose
        // children all resolved to zero. Forward a zero output, emit nothing.
        if !node.is_input()
            && !is_root
            && node
                .children
                .iter()
                .all(|&child| graph.node(child).output.is_zero())
        {
            graph.node_mut(index).output = OutputRef::Zero;
            continue;
        }

        let expected_out = if is_root {
            params.expected_out
        } else {
            U256::ZERO
        };
        // Real user funds enter wherever a child is an input or wrap node.
        let sender = if node.children.iter().any(|&child| {
            matches!(
                graph.node(child).action,
                NodeAction::Input | NodeAction::Wrap
            )
        }) {
            params.user
        } else {
            params.relayer
        };
        let recipient = if is_root { params.user } else { params.relayer };

        match node.action {
            // Inputs emit nothing; their output is the allocated amount,
            // already resolved by the allocation pass.
            NodeAction::Input => {}
            NodeAction::Wrap => {
                let child = *node
                    .children
                    .first()
                    .ok_or(CompileError::UnresolvedOutput { index })?;
                let amount = resolved_input(graph, child)?;
                let reference = ChainedReference::new(node.slot);
                actions.push(CompiledAction::Wrap {
                    static_token: node.address,
                    underlying: graph.node(child).address,
                    sender,
                    // the relayer may not spend its own wrapped tokens, so
                    // the recipient must be the user
                    recipient: params.user,
                    amount,
                    from_underlying: true,
                    output_reference: reference,
                });
                graph.node_mut(index).output = OutputRef::Chained { reference };
            }
            NodeAction::BatchSwap => {
                let pool_id = node.pool_id.ok_or(CompileError::MissingPoolId { index })?;
                let mut assets = vec![node.address];
                let mut swaps = Vec::new();
                let mut limits = vec![
                    I256::try_from(expected_out)
                        .map_err(|_| CompileError::LimitOverflow(expected_out))?
                        .checked_neg()
                        .ok_or(CompileError::LimitOverflow(expected_out))?,
                ];

                for &child in &node.children {
                    if graph.node(child).output.is_zero() {
                        continue;
                    }
                    let amount = resolved_input(graph, child)?;
                    assets.push(graph.node(child).address);
                    swaps.push(BatchSwapStep {
                        pool_id,
                        asset_in_index: (assets.len() - 1) as u32,
                        asset_out_index: 0,
                        amount,
                        user_data: Bytes::new(),
                    });
                    limits.push(I256::MAX);
                }

                let reference = ChainedReference::new(node.slot);
                actions.push(CompiledAction::BatchSwap {
                    swaps,
                    assets,
                    funds: FundManagement {
                        sender,
                        recipient,
                        from_internal_balance: sender == params.relayer,
                        to_internal_balance: recipient == params.relayer,
                    },
                    limits,
                    deadline: params.deadline,
                    output_reference: OutputReference {
                        index: 0,
                        key: reference,
                    },
                });
                graph.node_mut(index).output = OutputRef::Chained { reference };
            }
            NodeAction::JoinPool => {
                let pool_id = node.pool_id.ok_or(CompileError::MissingPoolId { index })?;

                // every child is included, zero amounts too: some pool kinds
                // require fixed-size arrays
                let mut pairs: Vec<(Address, InputAmount)> = Vec::new();
                for &child in &node.children {
                    let amount = if graph.node(child).output.is_zero() {
                        InputAmount::zero()
                    } else {
                        resolved_input(graph, child)?
                    };
                    pairs.push((graph.node(child).address, amount));
                }
                // phantom-mint pools count their own BPT among join assets
                let has_phantom_bpt = matches!(
                    node.kind,
                    NodeKind::Pool { pool_type } if pool_type.has_phantom_bpt()
                );
                if has_phantom_bpt {
                    pairs.push((node.address, InputAmount::zero()));
                }

                // canonical address order; amounts permuted identically
                pairs.sort_by_key(|(address, _)| *address);
                let assets: Vec<Address> = pairs.iter().map(|(a, _)| *a).collect();
                let max_amounts_in: Vec<InputAmount> = pairs.iter().map(|(_, m)| *m).collect();

                // userData amounts never include the joined pool's own BPT
                let amounts_in = pairs
                    .iter()
                    .filter(|(address, _)| *address != node.address)
                    .map(|(_, amount)| *amount)
                    .collect();

                let value = pairs
                    .iter()
                    .find(|(address, _)| *address == Address::ZERO)
                    .map(|(_, amount)| amount.encoded())
                    .unwrap_or_default();

                let reference = ChainedReference::new(node.slot);
                actions.push(CompiledAction::JoinPool {
                    pool_id,
                    sender,
                    recipient,
                    assets,
                    max_amounts_in,
                    user_data: JoinUserData {
                        amounts_in,
                        minimum_bpt: expected_out,
                    },
                    value,
                    from_internal_balance: sender == params.relayer,
                    output_reference: reference,
                });
                graph.node_mut(index).output = OutputRef::Chained { reference };
            }
            // No deposit-side mapping; report and continue best-effort.
            NodeAction::Unwrap | NodeAction::ExitPool | NodeAction::Noop => {
                diagnostics.push(Diagnostic {
                    node: index,
                    address: node.address,
                    action: node.action,
                    message: "unsupported action for a deposit sequence".to_string(),
                });
            }
        }
    }

    Ok(CompileOutput {
        actions,
        diagnostics,
    })
}

/// A child's resolved output as a parent-consumable input amount.
fn resolved_input(graph: &PoolGraph, index: NodeIndex) -> Result<InputAmount, CompileError> {
    match graph.node(index).output {
        OutputRef::Amount { value } => Ok(InputAmount::literal(value)),
        OutputRef::Chained { reference } => Ok(InputAmount::chained(reference)),
        OutputRef::Zero => Ok(InputAmount::zero()),
        OutputRef::Pending => Err(CompileError::UnresolvedOutput { index }),
    }
}

#[cfg(test)]
mod tests {
    use crate::model::fixed::ONE;
    use crate::model::node::Node;

    use super::*;

    fn node(slot: u32, action: NodeAction, children: Vec<NodeIndex>) -> Node {
        Node {
            slot,
            pool_id: None,
            address: Address::repeat_byte(slot as u8 + 1),
            kind: NodeKind::Token,
            action,
            children,
            proportion_of_parent: ONE,
            output: OutputRef::Pending,
        }
    }

    fn params(root_id: PoolId) -> CompileParams {
        CompileParams {
            root_id,
            expected_out: U256::from(1),
            user: Address::repeat_byte(0xee),
            relayer: Address::repeat_byte(0xff),
            deadline: U256::from(1_700_000_000u64),
            authorisation: None,
        }
    }

    #[test]
    fn unmapped_action_is_reported_not_fatal() {
        let root_id = B256::repeat_byte(0x01);
        let mut input = node(0, NodeAction::Input, vec![]);
        input.output = OutputRef::Amount { value: U256::from(10) };
        let mut exit = node(1, NodeAction::ExitPool, vec![0]);
        exit.pool_id = Some(root_id);
        let mut graph = PoolGraph::from_parts(vec![input, exit], 1);

        let output = compile(&mut graph, &[0, 1], &params(root_id)).unwrap();
        assert!(output.actions.is_empty());
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].action, NodeAction::ExitPool);
    }

    #[test]
    fn dead_branch_collapses_to_zero_output() {
        let root_id = B256::repeat_byte(0x01);
        let mut input = node(0, NodeAction::Input, vec![]);
        input.output = OutputRef::Amount { value: U256::ZERO };
        let wrap = node(1, NodeAction::Wrap, vec![0]);
        let mut root = node(2, NodeAction::JoinPool, vec![1]);
        root.pool_id = Some(root_id);
        root.kind = NodeKind::Pool {
            pool_type: crate::model::pool::PoolType::Weighted,
        };
        let mut graph = PoolGraph::from_parts(vec![input, wrap, root], 2);

        let output = compile(&mut graph, &[0, 1, 2], &params(root_id)).unwrap();
        // the wrap emitted nothing and forwarded a zero output
        assert_eq!(graph.node(1).output, OutputRef::Zero);
        assert_eq!(output.actions.len(), 1);
        assert!(matches!(output.actions[0], CompiledAction::JoinPool { .. }));
        assert!(output.diagnostics.is_empty());
    }
}
