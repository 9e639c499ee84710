use anyhow::bail;
use schemars::schema_for;

use pool_compose::model::manifest::{JoinRequestFile, RegistryFile};

/// Generate and print the JSON Schema for a file format.
pub fn run(kind: &str) -> anyhow::Result<()> {
    let schema = match kind {
        "registry" => schema_for!(RegistryFile),
        "request" => schema_for!(JoinRequestFile),
        other => bail!("unknown schema kind `{other}` (expected `registry` or `request`)"),
    };
    let json = serde_json::to_string_pretty(&schema)?;
    println!("{json}");
    Ok(())
}
