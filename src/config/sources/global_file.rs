//! Global config file source: `$XDG_CONFIG_HOME/hfs-rehydrate/config.toml`, optional.

use crate::config::paths::xdg_root;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};

/// Add the global file if it exists. A missing HOME just means no global layer.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg_root::global_config_path() {
        Ok(path) if path.is_file() => Ok(builder.add_source(File::from(path).required(false))),
        _ => Ok(builder),
    }
}
