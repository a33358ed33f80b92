//! # Voice Admin Main Entry Point

use anyhow::Context;
use clap::{Parser, Subcommand};
use voice_admin::{config::ConfigLoader, db, seeds, server::run_server, telemetry};

#[derive(Debug, Parser)]
#[command(name = "voice-admin", version, about = "Voice agent administration API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Apply pending migrations before accepting traffic
        #[arg(long)]
        migrate: bool,
    },
    /// Apply pending migrations and seed catalog data, then exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;

    telemetry::init_tracing(&config).context("initializing tracing")?;
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!(profile = %config.profile, config = %redacted_json, "Loaded configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    match cli.command.unwrap_or(Command::Serve { migrate: false }) {
        Command::Migrate => {
            db::run_migrations(&db).await?;
            seeds::seed_billing_packages(&db).await?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::Serve { migrate } => {
            if migrate {
                db::run_migrations(&db).await?;
                seeds::seed_billing_packages(&db).await?;
            }
            run_server(config, db).await
        }
    }
}
