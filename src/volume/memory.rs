//! In-memory source volume.
//!
//! Holds synthesized catalog entries and fork contents. Used for dry runs over hand-built
//! catalogs and throughout the tests; records are produced with the same `export()` layouts
//! a real catalog uses, so everything downstream goes through the regular decode path.

use super::SourceVolume;
use crate::catalog::legacy::{HfsCatalogKey, HfsFileRecord, HfsFolderRecord, HFS_MAX_NAME_LEN};
use crate::catalog::modern::{
    ForkData, HfsPlusCatalogKey, HfsPlusDates, HfsPlusFileRecord, HfsPlusFolderRecord,
    HFS_PLUS_MAX_NAME_LEN,
};
use crate::catalog::{CatalogFormat, FileInfo, RawCatalogEntry};
use crate::encoding::{NameCodec, TextEncoding};
use crate::error::{EncodeError, VolumeError};
use crate::types::{CatalogNodeId, FourCharCode, ForkType, ROOT_FOLDER_ID, ROOT_PARENT_ID};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Contents and Finder metadata for a synthesized file entry.
#[derive(Debug, Clone, Default)]
pub struct FileSpec {
    pub data: Vec<u8>,
    pub resource: Vec<u8>,
    pub file_type: FourCharCode,
    pub creator: FourCharCode,
    pub create_date: u32,
    pub modify_date: u32,
}

impl FileSpec {
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: data.into(),
            ..Self::default()
        }
    }
}

/// Dates for a synthesized folder entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct FolderSpec {
    pub create_date: u32,
    pub modify_date: u32,
}

/// In-memory catalog plus fork store.
pub struct MemorySourceVolume {
    format: CatalogFormat,
    encoding: RwLock<TextEncoding>,
    entries: Vec<RawCatalogEntry>,
    forks: HashMap<(CatalogNodeId, ForkType), Arc<[u8]>>,
    fork_reads: AtomicUsize,
}

impl MemorySourceVolume {
    /// Empty catalog, not even a root folder.
    pub fn new(format: CatalogFormat, encoding: TextEncoding) -> Self {
        Self {
            format,
            encoding: RwLock::new(encoding),
            entries: Vec::new(),
            forks: HashMap::new(),
            fork_reads: AtomicUsize::new(0),
        }
    }

    /// Catalog containing just the root folder, named `volume_name`.
    pub fn with_root(
        format: CatalogFormat,
        encoding: TextEncoding,
        volume_name: &str,
    ) -> Result<Self, EncodeError> {
        let mut volume = Self::new(format, encoding);
        volume.add_folder(ROOT_PARENT_ID, ROOT_FOLDER_ID, volume_name, FolderSpec::default())?;
        Ok(volume)
    }

    pub fn format(&self) -> CatalogFormat {
        self.format
    }

    /// Change the encoding used for legacy names. Items re-decode their names on the next
    /// `name()` call.
    pub fn set_text_encoding(&self, encoding: TextEncoding) {
        *self.encoding.write() = encoding;
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Number of `read_fork` calls served so far.
    pub fn fork_reads(&self) -> usize {
        self.fork_reads.load(Ordering::Relaxed)
    }

    /// Append a pre-built entry verbatim, including malformed ones.
    pub fn add_raw_entry(&mut self, entry: RawCatalogEntry) {
        self.entries.push(entry);
    }

    /// Replace the stored bytes of one fork without touching the catalog record.
    pub fn set_fork(&mut self, node_id: CatalogNodeId, fork: ForkType, bytes: impl Into<Arc<[u8]>>) {
        self.forks.insert((node_id, fork), bytes.into());
    }

    pub fn add_folder(
        &mut self,
        parent_id: CatalogNodeId,
        folder_id: CatalogNodeId,
        name: &str,
        spec: FolderSpec,
    ) -> Result<(), EncodeError> {
        let (key, record) = match self.format {
            CatalogFormat::Hfs => {
                let key = HfsCatalogKey::new(parent_id, self.legacy_name(name)?);
                let record = HfsFolderRecord {
                    folder_id,
                    create_date: spec.create_date,
                    modify_date: spec.modify_date,
                    ..HfsFolderRecord::default()
                };
                (key.export(), record.export())
            }
            CatalogFormat::HfsPlus => {
                let key = HfsPlusCatalogKey::new(parent_id, modern_name(name)?);
                let record = HfsPlusFolderRecord {
                    folder_id,
                    dates: HfsPlusDates {
                        create_date: spec.create_date,
                        content_mod_date: spec.modify_date,
                        ..HfsPlusDates::default()
                    },
                    ..HfsPlusFolderRecord::default()
                };
                (key.export(), record.export())
            }
        };
        self.entries
            .push(RawCatalogEntry::new(folder_id, self.format, key, record));
        Ok(())
    }

    pub fn add_file(
        &mut self,
        parent_id: CatalogNodeId,
        file_id: CatalogNodeId,
        name: &str,
        spec: FileSpec,
    ) -> Result<(), EncodeError> {
        let user_info = FileInfo {
            file_type: spec.file_type,
            creator: spec.creator,
            ..FileInfo::default()
        };
        let (key, record) = match self.format {
            CatalogFormat::Hfs => {
                let key = HfsCatalogKey::new(parent_id, self.legacy_name(name)?);
                let record = HfsFileRecord {
                    file_id,
                    user_info,
                    data_logical_size: spec.data.len() as u32,
                    rsrc_logical_size: spec.resource.len() as u32,
                    create_date: spec.create_date,
                    modify_date: spec.modify_date,
                    ..HfsFileRecord::default()
                };
                (key.export(), record.export())
            }
            CatalogFormat::HfsPlus => {
                let key = HfsPlusCatalogKey::new(parent_id, modern_name(name)?);
                let record = HfsPlusFileRecord {
                    file_id,
                    user_info,
                    dates: HfsPlusDates {
                        create_date: spec.create_date,
                        content_mod_date: spec.modify_date,
                        ..HfsPlusDates::default()
                    },
                    data_fork: ForkData {
                        logical_size: spec.data.len() as u64,
                        ..ForkData::default()
                    },
                    resource_fork: ForkData {
                        logical_size: spec.resource.len() as u64,
                        ..ForkData::default()
                    },
                    ..HfsPlusFileRecord::default()
                };
                (key.export(), record.export())
            }
        };
        self.entries
            .push(RawCatalogEntry::new(file_id, self.format, key, record));
        if !spec.data.is_empty() {
            self.set_fork(file_id, ForkType::Data, spec.data);
        }
        if !spec.resource.is_empty() {
            self.set_fork(file_id, ForkType::Resource, spec.resource);
        }
        Ok(())
    }

    fn legacy_name(&self, name: &str) -> Result<Vec<u8>, EncodeError> {
        let bytes = NameCodec::encode(name, self.text_encoding())?;
        if bytes.len() > HFS_MAX_NAME_LEN {
            return Err(EncodeError::TooLong {
                length: bytes.len(),
                max: HFS_MAX_NAME_LEN,
            });
        }
        Ok(bytes)
    }
}

fn modern_name(name: &str) -> Result<Vec<u16>, EncodeError> {
    let units: Vec<u16> = name.encode_utf16().collect();
    if units.len() > HFS_PLUS_MAX_NAME_LEN {
        return Err(EncodeError::TooLong {
            length: units.len(),
            max: HFS_PLUS_MAX_NAME_LEN,
        });
    }
    Ok(units)
}

impl SourceVolume for MemorySourceVolume {
    fn volume_name_hint(&self) -> Option<String> {
        Some(format!("memory {} volume", self.format.label()))
    }

    fn catalog_entries(&self) -> Result<Vec<RawCatalogEntry>, VolumeError> {
        Ok(self.entries.clone())
    }

    fn text_encoding(&self) -> TextEncoding {
        *self.encoding.read()
    }

    fn read_fork(
        &self,
        node_id: CatalogNodeId,
        fork: ForkType,
        logical_length: u64,
    ) -> Result<Vec<u8>, VolumeError> {
        self.fork_reads.fetch_add(1, Ordering::Relaxed);
        match self.forks.get(&(node_id, fork)) {
            Some(bytes) => {
                let end = (logical_length as usize).min(bytes.len());
                Ok(bytes[..end].to_vec())
            }
            None if logical_length == 0 => Ok(Vec::new()),
            None => Err(VolumeError::ForkUnavailable { node_id, fork }),
        }
    }
}
