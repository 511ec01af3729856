//! Financing aggregator service binary.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use financing_aggregator::app::{self, Repositories};
use financing_aggregator::config::AppConfig;
use financing_aggregator::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "financing-aggregator",
    about = "Aggregate financing offers from multiple lending providers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Apply database migrations and exit
    Migrate,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Keep applications and offers in memory instead of PostgreSQL
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("failed to load configuration")?;
    telemetry::init(config.env, &config.telemetry)?;

    match cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()))
    {
        Command::Serve(args) => {
            let repositories = if args.in_memory {
                tracing::warn!("using in-memory storage; data is lost on exit");
                Repositories::in_memory()
            } else {
                Repositories::postgres(&config).await?
            };
            app::serve(config, repositories).await
        }
        Command::Migrate => app::migrate(&config).await,
    }
}
