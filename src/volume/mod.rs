//! Source volumes
//!
//! The collaborator that owns the raw catalog and fork bytes. Reading B-tree nodes off a
//! device is someone else's job; a source volume hands out already-extracted key/record
//! pairs in the catalog's native order and answers fork reads by node ID.

pub mod memory;

pub use memory::{FileSpec, FolderSpec, MemorySourceVolume};

use crate::catalog::RawCatalogEntry;
use crate::encoding::TextEncoding;
use crate::error::VolumeError;
use crate::types::{CatalogNodeId, ForkType, ROOT_FOLDER_ID};

/// A volume that catalog entries and fork contents can be read from.
///
/// Items only ever hold a `Weak` handle to their volume, so implementations must be
/// shareable behind an `Arc`.
pub trait SourceVolume: Send + Sync {
    /// Human-readable label for log output. The authoritative volume name is the root
    /// folder's catalog name.
    fn volume_name_hint(&self) -> Option<String> {
        None
    }

    /// Every file and folder entry, in native catalog order.
    fn catalog_entries(&self) -> Result<Vec<RawCatalogEntry>, VolumeError>;

    /// Encoding currently configured for legacy (HFS) names. May change over the volume's
    /// lifetime.
    fn text_encoding(&self) -> TextEncoding;

    /// Read `logical_length` bytes of one fork of a file.
    fn read_fork(
        &self,
        node_id: CatalogNodeId,
        fork: ForkType,
        logical_length: u64,
    ) -> Result<Vec<u8>, VolumeError>;

    fn root_folder_id(&self) -> CatalogNodeId {
        ROOT_FOLDER_ID
    }
}
