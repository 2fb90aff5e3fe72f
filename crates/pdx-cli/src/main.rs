//! PDX CLI - Main entry point

use clap::Parser;
use pdx_cli::{Cli, Commands};
use pdx_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Load .env if present; real environment wins
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        // Verbose mode: log to console with debug level
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .log_file_prefix("pdx".to_string())
            .build()
    } else {
        // Normal mode: only warnings and errors to console
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .log_file_prefix("pdx".to_string())
            .build()
    };

    // Environment variables take precedence when any are set
    let log_config = if env_log_overrides() {
        LogConfig::from_env().unwrap_or(log_config)
    } else {
        log_config
    };

    // Initialize logging (ignore errors as CLI should work without logging)
    let _ = init_logging(&log_config);

    // Execute command
    let result = execute_command(cli).await;

    // Handle result
    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Whether any logging environment variable is present
fn env_log_overrides() -> bool {
    [
        "LOG_LEVEL",
        "LOG_OUTPUT",
        "LOG_FORMAT",
        "LOG_DIR",
        "LOG_FILE_PREFIX",
        "LOG_FILTER",
    ]
    .iter()
    .any(|var| std::env::var_os(var).is_some())
}

/// Execute the CLI command
async fn execute_command(cli: Cli) -> pdx_cli::Result<()> {
    let database_url = cli.database_url;

    match cli.command {
        Commands::Search {
            name,
            organism,
            domain,
            page,
            fresh,
            defer_count,
            format,
        } => {
            pdx_cli::commands::search::run(
                name,
                organism,
                domain,
                page,
                fresh,
                defer_count,
                format,
                database_url,
            )
            .await
        }

        Commands::Sequence {
            sequence,
            mode,
            page,
            format,
        } => pdx_cli::commands::sequence::run(sequence, mode, page, format, database_url).await,

        Commands::Show { id } => pdx_cli::commands::show::run(id, database_url).await,

        Commands::Export {
            name,
            organism,
            domain,
            page,
            output,
        } => {
            pdx_cli::commands::export::run(name, organism, domain, page, output, database_url).await
        }

        Commands::Saved { code, command } => {
            pdx_cli::commands::saved::run(code, command, database_url).await
        }

        Commands::Access { code } => pdx_cli::commands::access::run(code, database_url).await,
    }
}
