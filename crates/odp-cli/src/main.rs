//! ODP CLI - Main entry point

use clap::Parser;
use odp_cli::{Cli, Commands, Config};
use odp_common::logging::{init_logging, LogConfig, LogLevel};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Load .env before clap reads env-backed arguments
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        LogConfig::builder()
            .level(LogLevel::Debug)
            .log_file_prefix("odp".to_string())
            .build()
    } else {
        LogConfig::from_env().unwrap_or_default()
    };

    // Initialize logging (ignore errors as the CLI should work without it)
    let _ = init_logging(&log_config);

    // Execute command
    let result = execute_command(&cli).await;

    // Handle result
    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> odp_cli::Result<()> {
    // Command is guaranteed to exist at this point (checked in main)
    let Some(ref command) = cli.command else {
        unreachable!("Command should have been validated in main");
    };

    let config = Config::load(cli.env, cli.base_url.clone())?;

    match command {
        Commands::Create => odp_cli::commands::create::run(&config, &cli.datapackage).await,

        Commands::Upload { table, dry_run } => {
            odp_cli::commands::upload::run(&config, &cli.datapackage, table.clone(), *dry_run)
                .await
        },

        Commands::Metadata { table } => {
            odp_cli::commands::metadata::run(&config, &cli.datapackage, table.clone()).await
        },

        Commands::Check => odp_cli::commands::check::run(&config, &cli.datapackage).await,
    }
}
