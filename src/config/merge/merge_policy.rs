//! Merge rules: built-in defaults applied beneath every other source.

use crate::gateway::DEFAULT_GATEWAY_URL;
use config::builder::DefaultState;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("gateway.url", DEFAULT_GATEWAY_URL)?
        .set_default("gateway.connect_timeout_secs", 10)?
        .set_default("adder.handle_hidden_files", false)
}
