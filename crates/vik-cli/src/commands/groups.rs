use super::Workspace;
use anyhow::{Result, bail};
use std::collections::BTreeMap;
use vik_core::ids::ServerId;
use vik_core::role::{RoleGroup, ServerState};

pub async fn list(workspace: &Workspace, server: Option<ServerId>) -> Result<()> {
    let servers = workspace.state().await?.snapshot().await;
    print!("{}", render(&servers, server));
    Ok(())
}

pub async fn add(workspace: &Workspace, server: ServerId, name: &str) -> Result<()> {
    let state = workspace.state().await?;
    let created = state
        .mutate_server(server, |state| {
            if state.groups.contains_key(name) {
                return Ok(false);
            }
            state.groups.insert(name.to_string(), RoleGroup::new());
            Ok(true)
        })
        .await?;

    if created {
        println!("{} group created!", name);
    } else {
        println!("{} already exists", name);
    }
    Ok(())
}

pub async fn remove(workspace: &Workspace, server: ServerId, name: &str) -> Result<()> {
    let state = workspace.state().await?;
    if state
        .server(server)
        .await
        .and_then(|state| state.group(name).cloned())
        .is_none()
    {
        bail!("{} does not exist on server {}", name, server);
    }

    state
        .mutate_server(server, |state| {
            state.groups.remove(name);
            Ok(())
        })
        .await?;
    println!("{} has been removed", name);
    Ok(())
}

fn render(servers: &BTreeMap<ServerId, ServerState>, only: Option<ServerId>) -> String {
    let mut out = String::new();
    for (id, state) in servers {
        if only.is_some_and(|only| only != *id) {
            continue;
        }
        out.push_str(&format!("server {}\n", id));
        if state.groups.is_empty() {
            out.push_str("  (no groups)\n");
        }
        for (name, group) in &state.groups {
            let limit = group
                .max_selectable
                .map(|max| format!(", max {}", max))
                .unwrap_or_default();
            out.push_str(&format!("  {} ({} roles{})\n", name, group.len(), limit));
            for entry in &group.roles {
                let d = &entry.descriptor;
                out.push_str(&format!(
                    "    {} {} {} - {}\n",
                    entry.role_id, d.emote_name, d.full_name, d.description
                ));
            }
        }
    }
    out
}
