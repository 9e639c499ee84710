//! Compiler for composite nested-pool deposits: expands a pool hierarchy into
//! an action graph, allocates user amounts across its input leaves, schedules
//! children-first, and emits a relayer action sequence whose inter-step data
//! flow is wired through chained references. A companion vault model
//! evaluates the same sequences off-line to predict net balance changes.

pub mod engine;
pub mod graph;
pub mod model;
pub mod registry;
pub mod vault;
