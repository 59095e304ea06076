//! ERP CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod output;

use commands::Cli;
use erp_core::config::LoggingConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(e) => {
            output::print_error(&format!("{e}"));
            std::process::exit(1);
        }
    };
    init_logging(&config.logging);

    if let Err(e) = cli.execute(&config).await {
        output::print_error(&format!("{e}"));
        std::process::exit(1);
    }
}

/// Initialize tracing on stderr so command output stays machine readable.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
