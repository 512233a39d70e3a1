//! Destinations
//!
//! Where rehydrated items are written. A destination creates directories and files, takes
//! the resource fork through whatever side channel it has, and applies Finder metadata and
//! dates on a best-effort basis. Every setter may fail independently.

pub mod apple_double;
pub mod local;
pub mod memory;

pub use apple_double::AppleDouble;
pub use local::LocalFilesystem;
pub use memory::{MemoryDestination, MemoryNode};

use crate::error::DestinationError;
use crate::types::FourCharCode;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Per-item metadata the engine applies after the data fork is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataField {
    ResourceFork,
    FileType,
    Creator,
    CreationDate,
    ModificationDate,
}

impl fmt::Display for MetadataField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataField::ResourceFork => "resource fork",
            MetadataField::FileType => "file type",
            MetadataField::Creator => "creator",
            MetadataField::CreationDate => "creation date",
            MetadataField::ModificationDate => "modification date",
        })
    }
}

pub trait Destination {
    /// Create a directory, and any missing ancestors. An existing directory is not an error.
    fn create_directory(&self, path: &Path) -> Result<(), DestinationError>;

    /// Create or replace a file with the given contents.
    fn write_data_fork(&self, path: &Path, data: &[u8]) -> Result<(), DestinationError>;

    /// Store the resource fork of an already written file.
    fn write_resource_fork(&self, path: &Path, data: &[u8]) -> Result<(), DestinationError>;

    fn set_creation_date(&self, path: &Path, date: DateTime<Utc>) -> Result<(), DestinationError>;

    fn set_modification_date(
        &self,
        path: &Path,
        date: DateTime<Utc>,
    ) -> Result<(), DestinationError>;

    fn set_type_code(&self, path: &Path, code: FourCharCode) -> Result<(), DestinationError>;

    fn set_creator_code(&self, path: &Path, code: FourCharCode) -> Result<(), DestinationError>;

    /// Turn a decoded catalog name into a legal single path component.
    fn sanitize_name(&self, name: &str) -> String {
        sanitize_file_name(name)
    }

    /// Sibling names this destination writes alongside an item called `name`, such as a
    /// sidecar holding its resource fork. No other item may be given one of these names.
    fn companion_names(&self, _name: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Default filename rules: NFC, `/` becomes `:` (as the Finder displays it), NUL dropped,
/// and names that would be empty or refer to `.`/`..` replaced.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .nfc()
        .filter(|&c| c != '\0')
        .map(|c| if c == '/' { ':' } else { c })
        .collect();
    match cleaned.as_str() {
        "" => "_".to_string(),
        "." => "_.".to_string(),
        ".." => "_..".to_string(),
        _ => cleaned,
    }
}
