//! Config loader facade: assembles sources in precedence order.

use super::merge::merge_policy;
use super::sources::{env, global_file};
use super::AddConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};

/// Loads [`AddConfig`] from defaults, files and the environment.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the user config file, then `IPFS_ADD__*` variables.
    pub fn load() -> Result<AddConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = env::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Defaults, then `path` (must exist), then `IPFS_ADD__*` variables.
    pub fn load_from_file(path: &Path) -> Result<AddConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = env::add_to_builder(builder);
        builder.build()?.try_deserialize()
    }

    /// Location of the user config file, if a home directory is known.
    pub fn user_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
