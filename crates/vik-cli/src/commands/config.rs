use super::Workspace;
use anyhow::{Context, Result};

pub fn show(workspace: &Workspace, json: bool) -> Result<()> {
    let config = workspace
        .config()
        .get_config()
        .with_context(|| format!("Failed to load {}", workspace.config_path().display()))?;

    let rendered = if json {
        serde_json::to_string_pretty(&config)?
    } else {
        toml::to_string_pretty(&config)?
    };
    println!("{}", rendered);
    Ok(())
}
