use clap::Parser;

mod cli;
mod compile;
mod expand;
mod schema;
mod simulate;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Schema { kind } => schema::run(&kind),
        cli::Command::Expand {
            pools,
            pool_id,
            unwrap,
        } => expand::run(&pools, &pool_id, unwrap).await,
        cli::Command::Compile { pools, request } => compile::run(&pools, &request).await,
        cli::Command::Simulate { pools, request } => simulate::run(&pools, &request).await,
    }
}
