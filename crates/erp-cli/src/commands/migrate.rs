//! Database migration management commands.

use clap::{Args, Subcommand};

use crate::output;
use erp_core::config::AppConfig;
use erp_core::error::AppError;
use erp_database::migration::{MIGRATOR, run_migrations};

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// List the migrations embedded in this binary
    List,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let mut config = config.clone();
            config.database.run_migrations = false;
            let pool = super::create_db_pool(&config).await?;

            run_migrations(pool.pool()).await?;
            pool.close().await;
            output::print_success("All migrations applied successfully.");
        }
        MigrateCommand::List => {
            for migration in MIGRATOR.iter() {
                output::print_kv(&migration.version.to_string(), &migration.description);
            }
        }
    }

    Ok(())
}
