//! CLI interface for STARNET.

pub mod handlers;
pub mod output;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::models::EntityKind;
use output::OutputMode;

/// STARNET - create, find and link entities, and run installed plugins
#[derive(Parser)]
#[command(name = "star", version, about, long_about = None)]
pub struct Cli {
    /// Override data directory (default: ~/.star)
    #[arg(long, env = "STAR_DATA_PATH", global = true)]
    pub data_path: Option<PathBuf>,

    /// Output results as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an entity and optionally attach its dependencies
    Create {
        /// Entity kind (quest, nft, nft-collection, wallet, ...)
        kind: EntityKind,
    },

    /// Find an entity by id or name and display it
    Show {
        kind: EntityKind,
        /// Id or name; prompts when omitted
        token: Option<String>,
    },

    /// List entities of a kind
    List {
        kind: EntityKind,
        /// Only entities created by the current avatar
        #[arg(long)]
        mine: bool,
    },

    /// Search entities of a kind by name
    Search {
        kind: EntityKind,
        /// Search term; prompts when omitted
        term: Option<String>,
        /// Only entities created by the current avatar
        #[arg(long)]
        mine: bool,
    },

    /// Edit the name or description of one of your entities
    Update {
        kind: EntityKind,
        token: Option<String>,
    },

    /// Delete one of your entities
    Delete {
        kind: EntityKind,
        token: Option<String>,
    },

    /// Attach dependencies to one of your entities
    AddDependency {
        kind: EntityKind,
        token: Option<String>,
    },

    /// Detach a dependency from one of your entities
    RemoveDependency {
        kind: EntityKind,
        token: Option<String>,
    },

    /// Installed plugins
    #[command(subcommand)]
    Plugin(PluginCommands),

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, elvish, powershell)
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum PluginCommands {
    /// List installed plugins
    List,

    /// Load an installed plugin into a sandbox and run it
    Run {
        /// Plugin name; choose from a numbered list when omitted
        name: Option<String>,
        /// Exact version to run
        #[arg(long)]
        version: Option<String>,
    },
}

/// Dispatch a parsed command.
pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    mode: OutputMode,
) -> anyhow::Result<()> {
    let token = |t: &Option<String>| t.clone().unwrap_or_default();

    match command {
        Commands::Create { kind } => handlers::entity::handle_create(ctx, *kind, mode).await?,
        Commands::Show { kind, token: t } => {
            handlers::entity::handle_show(ctx, *kind, &token(t), mode).await?
        }
        Commands::List { kind, mine } => {
            handlers::entity::handle_list(ctx, *kind, *mine, mode).await?
        }
        Commands::Search { kind, term, mine } => {
            handlers::entity::handle_search(ctx, *kind, &token(term), *mine, mode).await?
        }
        Commands::Update { kind, token: t } => {
            handlers::entity::handle_update(ctx, *kind, &token(t), mode).await?
        }
        Commands::Delete { kind, token: t } => {
            handlers::entity::handle_delete(ctx, *kind, &token(t), mode).await?
        }
        Commands::AddDependency { kind, token: t } => {
            handlers::entity::handle_add_dependency(ctx, *kind, &token(t), mode).await?
        }
        Commands::RemoveDependency { kind, token: t } => {
            handlers::entity::handle_remove_dependency(ctx, *kind, &token(t), mode).await?
        }
        Commands::Plugin(cmd) => match cmd {
            PluginCommands::List => handlers::plugin::handle_list(ctx, mode)?,
            PluginCommands::Run { name, version } => {
                handlers::plugin::handle_run(ctx, name.as_deref(), version.as_deref(), mode)?
            }
        },
        Commands::Completions { shell } => {
            print_completions(*shell);
        }
    }

    Ok(())
}

pub fn print_completions(shell: clap_complete::Shell) {
    clap_complete::generate(shell, &mut Cli::command(), "star", &mut std::io::stdout());
}
