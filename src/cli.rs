use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Nested-pool deposit compiler: expand pool graphs, compile relayer action
/// sequences, and simulate their net effect.
#[derive(Parser)]
#[command(name = "pool-compose", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Output the JSON schema for the registry or request file format
    Schema {
        /// Which format: "registry" or "request"
        #[arg(default_value = "registry")]
        kind: String,
    },

    /// Expand a pool into its action graph and print the tree
    Expand {
        /// Path to the pool registry JSON file
        #[arg(long)]
        pools: PathBuf,

        /// Root pool id (0x-prefixed 32-byte hex)
        #[arg(long)]
        pool_id: String,

        /// Wrap leaf tokens that have a static wrapped form
        #[arg(long)]
        unwrap: bool,
    },

    /// Compile a join request into a relayer action sequence
    Compile {
        /// Path to the pool registry JSON file
        #[arg(long)]
        pools: PathBuf,

        /// Path to the join request JSON file
        #[arg(long)]
        request: PathBuf,
    },

    /// Compile a join request, then simulate its net per-token deltas
    Simulate {
        /// Path to the pool registry JSON file
        #[arg(long)]
        pools: PathBuf,

        /// Path to the join request JSON file
        #[arg(long)]
        request: PathBuf,
    },
}
