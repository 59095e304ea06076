//! CLI command definitions and dispatch.

pub mod attribute;
pub mod attribute_value;
pub mod config;
pub mod list;
pub mod migrate;
pub mod sequence;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use erp_core::config::AppConfig;
use erp_core::error::AppError;
use erp_database::DatabasePool;

/// ERP data layer administration
#[derive(Debug, Parser)]
#[command(name = "erp", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `config/{env}.toml`
    #[arg(short, long, env = "ERP_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Document numbering sequences
    Sequence(sequence::SequenceArgs),
    /// Product attributes
    Attribute(attribute::AttributeArgs),
    /// Product attribute values
    AttributeValue(attribute_value::AttributeValueArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Load the configuration selected by `--config` and `--env`.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        AppConfig::load(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Sequence(args) => sequence::execute(args, config, self.format).await,
            Commands::Attribute(args) => attribute::execute(args, config, self.format).await,
            Commands::AttributeValue(args) => {
                attribute_value::execute(args, config, self.format).await
            }
            Commands::Config(args) => config::execute(args, config, &self.config, self.format),
        }
    }
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: ask before a destructive action unless `force` is set.
pub fn confirm(prompt: &str, force: bool) -> Result<bool, AppError> {
    if force {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {e}")))
}
