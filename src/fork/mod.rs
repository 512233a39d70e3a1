//! Fork access
//!
//! `ForkReader` pulls a file's data or resource fork through the item's source volume.
//! The resource fork can then be handed to `VersionResourceParser`.

pub mod resource;
pub mod version;

pub use resource::{ResourceFork, ResourceForkBuilder, ResourceReference};
pub use version::{
    NumVersion, ReleaseStage, VersionResource, VersionResourceParser, VERSION_RESOURCE_ID,
    VERSION_RESOURCE_TYPE,
};

use crate::error::ForkError;
use crate::item::DehydratedItem;
use crate::types::ForkType;
use tracing::trace;

pub struct ForkReader;

impl ForkReader {
    /// Read one fork in full.
    ///
    /// `Ok(None)` for folders and volumes. A zero-length fork is `Ok(Some(empty))` and does not
    /// touch the volume.
    pub fn read(item: &DehydratedItem, fork: ForkType) -> Result<Option<Vec<u8>>, ForkError> {
        if item.is_directory() {
            return Ok(None);
        }
        let node_id = item.node_id();
        let length = item.fork_logical_length(fork);
        if length == 0 {
            return Ok(Some(Vec::new()));
        }

        let volume = item
            .source_volume()
            .ok_or(ForkError::VolumeUnavailable(node_id))?;
        trace!(node_id, ?fork, length, "Reading fork");
        let bytes = volume
            .read_fork(node_id, fork, length)
            .map_err(|source| ForkError::Read {
                node_id,
                fork,
                source,
            })?;
        if bytes.len() as u64 != length {
            return Err(ForkError::LengthMismatch {
                node_id,
                fork,
                expected: length,
                actual: bytes.len() as u64,
            });
        }
        Ok(Some(bytes))
    }

    /// Like [`ForkReader::read`], taking the on-disk selector byte. Any byte other than
    /// `0x00` or `0xFF` is `Ok(None)`.
    pub fn read_selector(
        item: &DehydratedItem,
        selector: u8,
    ) -> Result<Option<Vec<u8>>, ForkError> {
        match ForkType::from_raw(selector) {
            Some(fork) => Self::read(item, fork),
            None => Ok(None),
        }
    }
}
