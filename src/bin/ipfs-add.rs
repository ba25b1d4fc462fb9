//! ipfs-add CLI Binary
//!
//! Adds files and directory trees to IPFS through a gateway's HTTP API.

use clap::Parser;
use ipfs_add::cancel;
use ipfs_add::cli::{map_error, Cli, RunContext};
use ipfs_add::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match RunContext::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    };

    // Build logging config from CLI args on top of the loaded config
    let logging_config = build_logging_config(&cli, config.logging.clone());

    // Initialize logging early
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("ipfs-add starting");
    let context = RunContext::with_config(config);

    let (handle, cancellation) = cancel::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests");
            handle.cancel();
        }
    });

    if let Err(e) = context.execute(&cli, &cancellation).await {
        error!("Add failed: {}", e);
        eprintln!("{}", map_error(&e));
        process::exit(1);
    }
    info!("All paths added");
}

/// Apply CLI logging flags on top of the configured logging section.
/// Precedence: CLI flags override config file override defaults.
fn build_logging_config(cli: &Cli, mut config: LoggingConfig) -> LoggingConfig {
    if cli.quiet {
        config.level = "off".to_string();
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = file.clone();
    }

    config
}
