use std::path::Path;

use anyhow::Result;

use pool_compose::graph::PoolGraph;
use pool_compose::model::manifest::parse_pool_id;
use pool_compose::model::node::NodeIndex;
use pool_compose::registry::StaticRegistry;

/// CLI entry point for the `expand` subcommand: print the action tree.
pub async fn run(pools: &Path, pool_id: &str, unwrap: bool) -> Result<()> {
    let registry = StaticRegistry::load(pools)?;
    let root_id = parse_pool_id(pool_id)?;

    let graph = PoolGraph::build(&registry, &root_id, unwrap).await?;
    print_subtree(&graph, graph.root(), 0);
    println!("{} nodes", graph.len());
    Ok(())
}

fn print_subtree(graph: &PoolGraph, index: NodeIndex, depth: usize) {
    let node = graph.node(index);
    println!(
        "{}{:?} {} (proportion {})",
        "  ".repeat(depth),
        node.action,
        node.address,
        node.proportion_of_parent
    );
    for &child in &node.children {
        print_subtree(graph, child, depth + 1);
    }
}
