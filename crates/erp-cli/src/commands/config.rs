//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use erp_core::config::AppConfig;
use erp_core::error::AppError;
use erp_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the merged configuration with the database password masked
    Show,
    /// Validate the merged configuration
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            output::print_item(&shown, format);
        }
        ConfigCommand::Validate => {
            check(config).inspect_err(|e| {
                output::print_error(&format!("Configuration invalid: {e}"));
            })?;
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("Database", &mask_password(&config.database.url));
            output::print_kv(
                "Pool",
                &format!(
                    "{}..{} connections",
                    config.database.min_connections, config.database.max_connections
                ),
            );
            output::print_kv(
                "Page size",
                &format!(
                    "{} (max {})",
                    config.query.default_page_size, config.query.max_page_size
                ),
            );
            output::print_kv(
                "Logging",
                &format!("{} ({})", config.logging.level, config.logging.format),
            );
        }
    }

    Ok(())
}

/// Cross-field checks that deserialization alone does not enforce.
fn check(config: &AppConfig) -> Result<(), AppError> {
    if config.database.url.trim().is_empty() {
        return Err(AppError::configuration("database.url must not be empty"));
    }
    if config.database.min_connections > config.database.max_connections {
        return Err(AppError::configuration(
            "database.min_connections exceeds database.max_connections",
        ));
    }
    if config.query.default_page_size == 0
        || config.query.default_page_size > config.query.max_page_size
    {
        return Err(AppError::configuration(
            "query.default_page_size must be between 1 and query.max_page_size",
        ));
    }
    if !matches!(config.logging.format.as_str(), "pretty" | "json") {
        return Err(AppError::configuration(format!(
            "logging.format must be 'pretty' or 'json', got '{}'",
            config.logging.format
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(extra: &str) -> AppConfig {
        AppConfig::from_toml_str(&format!(
            "[database]\nurl = \"postgres://erp:pw@localhost/erp\"\n{extra}"
        ))
        .expect("config should parse")
    }

    #[test]
    fn test_check_accepts_defaults() {
        assert!(check(&config("")).is_ok());
    }

    #[test]
    fn test_check_rejects_bad_page_size() {
        let err = check(&config("[query]\ndefault_page_size = 5000\nmax_page_size = 1000")).unwrap_err();
        assert!(err.message.contains("default_page_size"));
    }

    #[test]
    fn test_check_rejects_unknown_log_format() {
        assert!(check(&config("[logging]\nformat = \"xml\"")).is_err());
    }
}
