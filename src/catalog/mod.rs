//! Catalog records
//!
//! Typed views of HFS (legacy) and HFS+ (modern) catalog keys and file/folder records, and
//! the adapter that normalizes either layout into one set of fields. Raw bytes are kept
//! alongside the typed view so format-specific fields are never lost.

pub mod adapter;
pub(crate) mod bytes;
pub mod legacy;
pub mod modern;

pub use adapter::{AdaptedRecord, CatalogFields, CatalogRecordAdapter, RawName, RecordKind};

use crate::types::{CatalogNodeId, FourCharCode};
use bytes::{BeReader, PutBe, Truncated};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which on-disk catalog layout a record was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogFormat {
    /// Original HFS: Pascal-string names, 16-bit extents, 32-bit fork lengths.
    Hfs,
    /// HFS+: UTF-16 names, 32-bit extents, 64-bit fork lengths.
    HfsPlus,
}

impl CatalogFormat {
    pub fn label(self) -> &'static str {
        match self {
            CatalogFormat::Hfs => "HFS",
            CatalogFormat::HfsPlus => "HFS+",
        }
    }
}

/// One catalog key/record pair as produced by a source volume, before decoding.
///
/// The byte buffers are shared and never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCatalogEntry {
    /// Node ID the entry was looked up or enumerated under.
    pub node_id: CatalogNodeId,
    pub format: CatalogFormat,
    pub key: Arc<[u8]>,
    pub record: Arc<[u8]>,
}

impl RawCatalogEntry {
    pub fn new(
        node_id: CatalogNodeId,
        format: CatalogFormat,
        key: impl Into<Arc<[u8]>>,
        record: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            node_id,
            format,
            key: key.into(),
            record: record.into(),
        }
    }
}

/// Decoded key and record, tagged by format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogRecord {
    Hfs {
        key: legacy::HfsCatalogKey,
        record: legacy::HfsRecord,
    },
    HfsPlus {
        key: modern::HfsPlusCatalogKey,
        record: modern::HfsPlusRecord,
    },
}

impl CatalogRecord {
    pub fn format(&self) -> CatalogFormat {
        match self {
            CatalogRecord::Hfs { .. } => CatalogFormat::Hfs,
            CatalogRecord::HfsPlus { .. } => CatalogFormat::HfsPlus,
        }
    }
}

/// Finder file info (FInfo / FileInfo). Same 16-byte layout in both formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileInfo {
    pub file_type: FourCharCode,
    pub creator: FourCharCode,
    pub finder_flags: u16,
    pub location_v: i16,
    pub location_h: i16,
    pub folder: i16,
}

impl FileInfo {
    pub const SIZE: usize = 16;

    pub(crate) fn import(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        Ok(Self {
            file_type: FourCharCode(source.u32()?),
            creator: FourCharCode(source.u32()?),
            finder_flags: source.u16()?,
            location_v: source.i16()?,
            location_h: source.i16()?,
            folder: source.i16()?,
        })
    }

    pub(crate) fn export(&self, out: &mut Vec<u8>) {
        out.put_u32(self.file_type.0);
        out.put_u32(self.creator.0);
        out.put_u16(self.finder_flags);
        out.put_i16(self.location_v);
        out.put_i16(self.location_h);
        out.put_i16(self.folder);
    }
}
