//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::RehydrateConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the global file, `explicit` if given, and environment.
    pub fn load(explicit: Option<&Path>) -> Result<RehydrateConfig, ConfigError> {
        MergeService::load(explicit)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<RehydrateConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> RehydrateConfig {
        RehydrateConfig::default()
    }
}
