use std::path::Path;

use anyhow::Result;

use pool_compose::engine::Composer;
use pool_compose::registry::StaticRegistry;
use pool_compose::vault::{math::ProportionalMath, snapshot_from_registry, VaultModel};

use crate::compile::load_request;

/// CLI entry point for the `simulate` subcommand: compile a join request,
/// then predict its net per-token deltas against the registry's pool state.
pub async fn run(pools: &Path, request_path: &Path) -> Result<()> {
    let registry = StaticRegistry::load(pools)?;
    let (request, relayer) = load_request(request_path)?;

    let snapshot = snapshot_from_registry(&registry);
    let composer = Composer::new(registry, relayer);
    let composed = composer.join_pool(&request).await?;

    let model = VaultModel::new(ProportionalMath);
    let deltas = model.simulate(&composed.actions, &snapshot).await?;

    let mut rows: Vec<_> = deltas.into_iter().collect();
    rows.sort_by_key(|(token, _)| *token);
    for (token, delta) in rows {
        println!("{token} {delta}");
    }
    Ok(())
}
