//! Tenantry CLI - bootstrap diagnostics.
//!
//! Commands:
//! - `check`    - Validate a configuration file and print it normalized
//! - `storages` - Build a context and instantiate every configured storage

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

/// Where the runtime looks for its configuration by default.
const DEFAULT_CONFIG_PATH: &str = "/etc/cocaine/cocaine.conf";

#[derive(Parser)]
#[command(
    name = "tenantry",
    about = "Tenantry: bootstrap diagnostics for the multi-tenant service runtime",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(
        short,
        long,
        global = true,
        env = "TENANTRY_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print it normalized
    Check,

    /// Instantiate every configured storage
    Storages {
        /// Also count the objects stored in this namespace
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    tracing::debug!(config = %cli.config.display(), "Starting tenantry");

    match cli.command {
        Commands::Check => commands::check::run(&cli.config)?,
        Commands::Storages { namespace } => {
            commands::storages::run(&cli.config, namespace.as_deref()).await?
        }
    }

    Ok(())
}
