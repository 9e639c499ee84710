use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::{Address, U256};
use anyhow::{Context, Result};
use serde_json::json;

use pool_compose::engine::{Composer, JoinRequest};
use pool_compose::model::manifest::{
    parse_address, parse_amount, parse_pool_id, JoinRequestFile,
};
use pool_compose::registry::StaticRegistry;

/// Load a join request file and convert it to the typed request plus the
/// relayer destination address.
pub fn load_request(path: &Path) -> Result<(JoinRequest, Address)> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading request file {}", path.display()))?;
    let file: JoinRequestFile = serde_json::from_str(&contents)?;

    let tokens = file
        .tokens
        .iter()
        .map(|entry| {
            Ok((
                parse_address("tokens.address", &entry.address)?,
                parse_amount("tokens.amount", &entry.amount)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let deadline = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|now| now.as_secs() + 3600)
        .unwrap_or_default();

    let request = JoinRequest {
        pool_id: parse_pool_id(&file.pool_id)?,
        expected_bpt_out: parse_amount("expected_bpt_out", &file.expected_bpt_out)?,
        tokens,
        user: parse_address("user", &file.user)?,
        unwrap_leaf_tokens: file.unwrap_leaf_tokens,
        deadline: U256::from(deadline),
        authorisation: file.authorisation_bytes()?,
    };
    let relayer = parse_address("relayer", &file.relayer)?;
    Ok((request, relayer))
}

/// CLI entry point for the `compile` subcommand.
pub async fn run(pools: &Path, request_path: &Path) -> Result<()> {
    let registry = StaticRegistry::load(pools)?;
    let (request, relayer) = load_request(request_path)?;

    let composer = Composer::new(registry, relayer);
    let composed = composer.join_pool(&request).await?;

    for diagnostic in &composed.diagnostics {
        eprintln!(
            "warning: node {} ({:?} {}): {}",
            diagnostic.node, diagnostic.action, diagnostic.address, diagnostic.message
        );
    }

    let output = json!({
        "to": composed.to,
        "actions": composed.actions,
        "output_reference": composed.output_reference,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
