//! Configuration System
//!
//! Layered configuration for the adder: built-in defaults, the user config
//! file, `IPFS_ADD__*` environment variables, and finally CLI flags applied
//! by the caller. Sections map to the gateway client, the path adder and
//! logging.

use crate::error::ApiError;
use crate::gateway::DEFAULT_GATEWAY_URL;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::env::ENV_PREFIX;

/// Directory name used under the platform config directory.
pub const APP_DIR_NAME: &str = "ipfs-add";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub adder: AdderConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway API; `http://` is assumed when no scheme is given
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// TCP connect timeout. Requests themselves have no timeout.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_gateway_url() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Directory walk settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdderConfig {
    /// Include entries whose name starts with "."
    #[serde(default)]
    pub handle_hidden_files: bool,
}

impl AddConfig {
    /// Validate the configuration, collecting every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.gateway.url.trim().is_empty() {
            errors.push("gateway.url cannot be empty".to_string());
        }
        if self.gateway.connect_timeout_secs == 0 {
            errors.push("gateway.connect_timeout_secs must be greater than zero".to_string());
        }
        if let Err(e) = self.logging.validate() {
            errors.push(format!("logging: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and convert failures into a single configuration error.
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            ))
        })?;
        Ok(self)
    }
}
