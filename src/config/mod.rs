//! Configuration
//!
//! `RehydrateConfig` is assembled by `ConfigLoader` from built-in defaults, the optional
//! global file, an optional explicit file and `HFS_REHYDRATE__*` environment variables.

pub mod facade;
pub mod merge {
    pub mod policy;
    pub mod service;
}
pub mod paths {
    pub mod xdg_root;
}
pub mod sources {
    pub mod environment;
    pub mod global_file;
}

pub use facade::ConfigLoader;

use crate::encoding::TextEncoding;
use crate::logging::LoggingConfig;
use crate::rehydrate::{RehydrationOptions, ResourceForkMode};
use serde::{Deserialize, Serialize};

/// Application name used for config and state directories.
pub const APP_NAME: &str = "hfs-rehydrate";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RehydrateConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub tree: TreeConfig,
    #[serde(default)]
    pub rehydration: RehydrationConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Encoding for legacy (HFS) names when the volume does not say otherwise.
    #[serde(default)]
    pub text_encoding: TextEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Accept a tree with skipped entries or integrity faults instead of failing the build.
    #[serde(default = "default_true")]
    pub allow_partial: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            allow_partial: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RehydrationConfig {
    #[serde(default)]
    pub resource_forks: ResourceForkMode,
    #[serde(default = "default_true")]
    pub apply_metadata: bool,
}

impl Default for RehydrationConfig {
    fn default() -> Self {
        Self {
            resource_forks: ResourceForkMode::default(),
            apply_metadata: default_true(),
        }
    }
}

impl From<&RehydrationConfig> for RehydrationOptions {
    fn from(config: &RehydrationConfig) -> Self {
        Self {
            resource_forks: config.resource_forks,
            apply_metadata: config.apply_metadata,
        }
    }
}

fn default_true() -> bool {
    true
}
