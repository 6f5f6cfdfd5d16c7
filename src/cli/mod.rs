pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "cardvault")]
#[command(about = "Cardvault CLI - administrative tasks against the card database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "User administration")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UserCommands,
    },

    #[command(about = "Demo collection maintenance")]
    Demo {
        #[command(subcommand)]
        cmd: commands::demo::DemoCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Environment-driven configuration plus a connected pool
pub(crate) async fn connect() -> anyhow::Result<(AppConfig, PgPool)> {
    let config = AppConfig::from_env()?;
    let pool = DatabaseManager::connect(&config.database).await?;
    Ok((config, pool))
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Users { cmd } => commands::users::handle(cmd, output_format).await,
        Commands::Demo { cmd } => commands::demo::handle(cmd, output_format).await,
    }
}
