//! Merge policy: built-in defaults form the lowest layer.

use crate::config::RehydrateConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with `RehydrateConfig::default()`, so every later source is a partial
/// override.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&RehydrateConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
