pub mod fixed;
pub mod manifest;
pub mod node;
pub mod pool;
pub mod reference;

pub use node::{Node, NodeAction, NodeIndex, NodeKind, OutputRef};
pub use pool::{PoolDescriptor, PoolId, PoolToken, PoolType};
pub use reference::{ChainedReference, InputAmount};
