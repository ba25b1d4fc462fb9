//! Global config file source: $XDG_CONFIG_HOME/ipfs-add/config.toml or ~/.config/ipfs-add/config.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::PathBuf;
use tracing::debug;

/// Path to global config file.
pub fn global_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| {
        dirs.config_dir()
            .join(crate::config::APP_DIR_NAME)
            .join("config.toml")
    })
}

/// Add global config file source to builder if it exists.
pub fn add_to_builder(
    mut builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    if let Some(config_path) = global_config_path() {
        if config_path.exists() {
            let canonical = dunce::canonicalize(&config_path).unwrap_or(config_path);
            builder = builder.add_source(File::from(canonical).required(false));
        } else {
            debug!(
                config_path = %config_path.display(),
                "No user configuration file, using defaults"
            );
        }
    }
    Ok(builder)
}
