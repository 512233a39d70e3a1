//! Environment variable source: HFS_REHYDRATE_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

pub const ENV_PREFIX: &str = "HFS_REHYDRATE";

/// Add environment variable overlay to builder.
/// `HFS_REHYDRATE__TREE__ALLOW_PARTIAL=false` sets `tree.allow_partial`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
