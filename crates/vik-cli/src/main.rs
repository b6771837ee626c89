use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};
use vik_core::ids::ServerId;

mod commands;

use commands::Workspace;

#[derive(Parser)]
#[command(name = "vik")]
#[command(about = "VIKBOT admin CLI - inspect and curate role selector groups", long_about = None)]
struct Cli {
    /// Config file (defaults to $VIKBOT_CONFIG, then the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage role groups
    Groups {
        #[command(subcommand)]
        action: GroupsAction,
    },
    /// Drop group entries whose role no longer exists
    Prune {
        /// JSON export of the live roles per server
        #[arg(long)]
        live: PathBuf,
        /// Only report what would be removed
        #[arg(long)]
        dry_run: bool,
    },
    /// Inspect the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum GroupsAction {
    /// List groups and their entries
    List {
        #[arg(long)]
        server: Option<ServerId>,
    },
    /// Create an empty group
    Add {
        name: String,
        #[arg(long)]
        server: ServerId,
    },
    /// Remove a group
    Remove {
        name: String,
        #[arg(long)]
        server: ServerId,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show {
        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let workspace = Workspace::open(cli.config)?;

    match cli.command {
        Commands::Groups { action } => match action {
            GroupsAction::List { server } => commands::groups::list(&workspace, server).await?,
            GroupsAction::Add { name, server } => {
                commands::groups::add(&workspace, server, &name).await?
            }
            GroupsAction::Remove { name, server } => {
                commands::groups::remove(&workspace, server, &name).await?
            }
        },
        Commands::Prune { live, dry_run } => commands::prune::run(&workspace, &live, dry_run).await?,
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => commands::config::show(&workspace, json)?,
            ConfigAction::Path => println!("{}", workspace.config_path().display()),
        },
    }

    Ok(())
}
