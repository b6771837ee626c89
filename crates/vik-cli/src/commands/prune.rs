use super::Workspace;
use anyhow::{Context, Result};
use std::path::Path;
use vik_core::role::{RoleDirectory, prune_stale_roles, stale_entries};
use vik_infrastructure::StaticRoleDirectory;

/// Prunes every server present in the live export. Servers missing from it
/// are left untouched.
pub async fn run(workspace: &Workspace, live: &Path, dry_run: bool) -> Result<()> {
    let directory = StaticRoleDirectory::from_json_file(live)
        .with_context(|| format!("Failed to read live roles from {}", live.display()))?;
    let snapshot = directory.snapshot().await?;
    let state = workspace.state().await?;

    if dry_run {
        let stale = stale_entries(&state.snapshot().await, &snapshot);
        for entry in &stale {
            println!("would remove role {} from {} on server {}", entry.role, entry.group, entry.server);
        }
        println!("{} stale entries", stale.len());
        return Ok(());
    }

    let report = state
        .mutate(|servers| Ok(prune_stale_roles(servers, &snapshot)))
        .await?;
    for entry in &report.removed {
        println!("removed role {} from {} on server {}", entry.role, entry.group, entry.server);
    }
    for server in &report.skipped_servers {
        tracing::warn!(server = %server, "no live roles exported, server skipped");
    }
    println!("groups pruned! ({} entries removed)", report.removed_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vik_core::ids::{RoleId, ServerId};

    const CONFIG: &str = r#"
[servers.1.groups.colors]
roles = [
    { role_id = "10", api_name = "red", emote_name = "", full_name = "Red", description = "" },
    { role_id = "11", api_name = "blue", emote_name = "", full_name = "Blue", description = "" },
]

[servers.2.groups.games]
roles = [
    { role_id = "20", api_name = "chess", emote_name = "", full_name = "Chess", description = "" },
]
"#;

    #[tokio::test]
    async fn test_prune_against_export() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("config.toml");
        let live = temp_dir.path().join("live.json");
        std::fs::write(&config, CONFIG).unwrap();
        std::fs::write(&live, r#"{ "1": [ { "id": "10", "name": "red" } ] }"#).unwrap();
        let workspace = Workspace::at(config);

        run(&workspace, &live, true).await.unwrap();
        let untouched = workspace.state().await.unwrap().snapshot().await;
        assert_eq!(untouched[&ServerId(1)].group("colors").unwrap().len(), 2);

        run(&workspace, &live, false).await.unwrap();
        let pruned = workspace.state().await.unwrap().snapshot().await;
        let colors = pruned[&ServerId(1)].group("colors").unwrap();
        assert_eq!(colors.len(), 1);
        assert!(colors.contains(RoleId(10)));
        // server 2 had no export
        assert_eq!(pruned[&ServerId(2)].group("games").unwrap().len(), 1);
    }
}
