//! star - STARNET command surface
//!
//! Usage:
//!   star create nft-collection         Create an entity, then attach dependencies
//!   star show quest "Dragon Quest"     Find an entity by id or name
//!   star delete wallet                 Delete one of your entities
//!   star plugin run Echo               Run an installed plugin in a sandbox
//!   star --help                        Show all commands

use anyhow::Result;
use clap::Parser;

use starnet::cli::output::OutputMode;
use starnet::cli::{print_completions, Cli, Commands};
use starnet::init::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr so prompts on stdout stay clean
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("starnet=warn".parse()?),
        )
        .init();

    let mode = OutputMode::from_json_flag(cli.json);

    match &cli.command {
        Commands::Completions { shell } => print_completions(*shell),
        cmd => {
            let ctx = AppContext::new(cli.data_path.clone(), mode).await?;
            let outcome = starnet::cli::execute(cmd, &ctx, mode).await;
            ctx.shutdown().await?;
            outcome?;
        }
    }

    Ok(())
}
