//! CatalogRecordAdapter: the single translation boundary between the two on-disk catalog
//! layouts and the format-agnostic fields a dehydrated item exposes.
//!
//! The adapter deliberately leaves names as raw bytes and dates as raw legacy timestamps.
//! Both are interpreted lazily by the item, so a change of the volume's encoding after
//! construction still changes the decoded name.

use super::legacy::{HfsCatalogKey, HfsRecord};
use super::modern::{HfsPlusCatalogKey, HfsPlusRecord};
use super::{CatalogFormat, CatalogRecord, RawCatalogEntry};
use crate::encoding::{NameCodec, TextEncoding};
use crate::error::DecodeFault;
use crate::types::{CatalogNodeId, FourCharCode};

/// File or folder, as recorded in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    File,
    Folder,
}

/// Undecoded name bytes as they appear in the catalog key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawName {
    /// HFS Pascal-string contents, in the volume's legacy encoding.
    Legacy(Vec<u8>),
    /// HFS+ UTF-16BE code units, as bytes.
    Utf16(Vec<u8>),
}

impl RawName {
    /// Decode with NameCodec. `volume_encoding` applies to legacy names only.
    pub fn decode(&self, volume_encoding: TextEncoding) -> String {
        match self {
            RawName::Legacy(bytes) => NameCodec::decode(bytes, volume_encoding),
            RawName::Utf16(bytes) => NameCodec::decode(bytes, TextEncoding::Utf16BigEndian),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RawName::Legacy(bytes) | RawName::Utf16(bytes) => bytes,
        }
    }
}

/// Normalized fields shared by both catalog layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogFields {
    pub node_id: CatalogNodeId,
    pub parent_id: CatalogNodeId,
    pub kind: RecordKind,
    pub data_fork_length: u64,
    pub resource_fork_length: u64,
    pub file_type: FourCharCode,
    pub creator: FourCharCode,
    /// Seconds since 1904-01-01.
    pub create_date: u32,
    /// Seconds since 1904-01-01.
    pub modify_date: u32,
    pub name: RawName,
}

/// Output of [`CatalogRecordAdapter::adapt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdaptedRecord {
    pub record: CatalogRecord,
    pub fields: CatalogFields,
}

pub struct CatalogRecordAdapter;

impl CatalogRecordAdapter {
    /// Decode one raw key/record pair.
    ///
    /// Fails when either buffer is malformed for its format, or when the record's own node
    /// ID differs from the ID the entry was enumerated under.
    pub fn adapt(entry: &RawCatalogEntry) -> Result<AdaptedRecord, DecodeFault> {
        let adapted = match entry.format {
            CatalogFormat::Hfs => {
                let key = HfsCatalogKey::import(&entry.key)?;
                let record = HfsRecord::import(&entry.record)?;
                let fields = Self::legacy_fields(&key, &record);
                AdaptedRecord {
                    record: CatalogRecord::Hfs { key, record },
                    fields,
                }
            }
            CatalogFormat::HfsPlus => {
                let key = HfsPlusCatalogKey::import(&entry.key)?;
                let record = HfsPlusRecord::import(&entry.record)?;
                let fields = Self::modern_fields(&key, &record);
                AdaptedRecord {
                    record: CatalogRecord::HfsPlus { key, record },
                    fields,
                }
            }
        };

        if adapted.fields.node_id != entry.node_id {
            return Err(DecodeFault::NodeIdMismatch {
                expected: entry.node_id,
                stored: adapted.fields.node_id,
            });
        }
        Ok(adapted)
    }

    fn legacy_fields(key: &HfsCatalogKey, record: &HfsRecord) -> CatalogFields {
        let name = RawName::Legacy(key.node_name.clone());
        match record {
            HfsRecord::File(file) => CatalogFields {
                node_id: file.file_id,
                parent_id: key.parent_id,
                kind: RecordKind::File,
                data_fork_length: file.data_logical_size as u64,
                resource_fork_length: file.rsrc_logical_size as u64,
                file_type: file.user_info.file_type,
                creator: file.user_info.creator,
                create_date: file.create_date,
                modify_date: file.modify_date,
                name,
            },
            HfsRecord::Folder(folder) => CatalogFields {
                node_id: folder.folder_id,
                parent_id: key.parent_id,
                kind: RecordKind::Folder,
                data_fork_length: 0,
                resource_fork_length: 0,
                file_type: FourCharCode::ZERO,
                creator: FourCharCode::ZERO,
                create_date: folder.create_date,
                modify_date: folder.modify_date,
                name,
            },
        }
    }

    fn modern_fields(key: &HfsPlusCatalogKey, record: &HfsPlusRecord) -> CatalogFields {
        let name = RawName::Utf16(key.name_bytes());
        match record {
            HfsPlusRecord::File(file) => CatalogFields {
                node_id: file.file_id,
                parent_id: key.parent_id,
                kind: RecordKind::File,
                data_fork_length: file.data_fork.logical_size,
                resource_fork_length: file.resource_fork.logical_size,
                file_type: file.user_info.file_type,
                creator: file.user_info.creator,
                create_date: file.dates.create_date,
                modify_date: file.dates.content_mod_date,
                name,
            },
            HfsPlusRecord::Folder(folder) => CatalogFields {
                node_id: folder.folder_id,
                parent_id: key.parent_id,
                kind: RecordKind::Folder,
                data_fork_length: 0,
                resource_fork_length: 0,
                file_type: FourCharCode::ZERO,
                creator: FourCharCode::ZERO,
                create_date: folder.dates.create_date,
                modify_date: folder.dates.content_mod_date,
                name,
            },
        }
    }
}
