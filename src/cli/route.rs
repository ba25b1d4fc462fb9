//! CLI route: run context built from configuration. Dispatches to the path adder.

use crate::adder::PathAdder;
use crate::cancel::Cancellation;
use crate::cli::parse::Cli;
use crate::config::{AddConfig, ConfigLoader};
use crate::error::ApiError;
use crate::gateway::Gateway;
use std::path::Path;
use tracing::info;

/// Runtime context for CLI execution: the loaded configuration.
/// The configuration comes from [`RunContext::load_config`], loaded once.
pub struct RunContext {
    config: AddConfig,
}

impl RunContext {
    /// Load configuration from an explicit file, or from the default sources
    /// when no path is given. Uses ConfigLoader only.
    pub fn load_config(config_path: Option<&Path>) -> Result<AddConfig, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };
        Ok(config)
    }

    pub fn with_config(config: AddConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AddConfig {
        &self.config
    }

    /// Configuration with CLI flags applied on top, validated.
    pub fn resolve(&self, cli: &Cli) -> Result<AddConfig, ApiError> {
        let mut config = self.config.clone();
        if let Some(ref node) = cli.node {
            config.gateway.url = node.clone();
        }
        if cli.hidden {
            config.adder.handle_hidden_files = true;
        }
        config.validated()
    }

    /// Add every path on the command line, in order, stopping at the first
    /// failure.
    pub async fn execute(&self, cli: &Cli, cancel: &Cancellation) -> Result<(), ApiError> {
        let config = self.resolve(cli)?;
        let gateway = Gateway::from_config(&config.gateway)?;
        info!(gateway = gateway.url(), paths = cli.paths.len(), "Adding paths");

        let adder = PathAdder::new(gateway, config.adder.handle_hidden_files);
        for path in &cli.paths {
            adder.add_path(path, cancel).await?;
        }
        Ok(())
    }
}
