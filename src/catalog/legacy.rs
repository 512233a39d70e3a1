//! HFS (legacy) catalog key and record layouts.

use super::bytes::{BeReader, PutBe, Truncated};
use super::FileInfo;
use crate::error::DecodeFault;
use crate::types::CatalogNodeId;

pub const HFS_FOLDER_RECORD: u16 = 0x0100;
pub const HFS_FILE_RECORD: u16 = 0x0200;
pub const HFS_FOLDER_THREAD_RECORD: u16 = 0x0300;
pub const HFS_FILE_THREAD_RECORD: u16 = 0x0400;

/// Longest name an HFS catalog key can hold.
pub const HFS_MAX_NAME_LEN: usize = 31;

fn key_truncated(t: Truncated) -> DecodeFault {
    DecodeFault::TruncatedKey {
        needed: t.needed,
        actual: t.actual,
    }
}

fn record_truncated(t: Truncated) -> DecodeFault {
    DecodeFault::TruncatedRecord {
        needed: t.needed,
        actual: t.actual,
    }
}

fn check_length(kind: &'static str, expected: usize, actual: usize) -> Result<(), DecodeFault> {
    if actual < expected {
        Err(DecodeFault::TruncatedRecord {
            needed: expected,
            actual,
        })
    } else if actual > expected {
        Err(DecodeFault::LengthMismatch {
            format: "HFS",
            kind,
            expected,
            actual,
        })
    } else {
        Ok(())
    }
}

/// HFSCatalogKey: parent folder ID plus the item's Pascal-string name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HfsCatalogKey {
    pub key_length: u8,
    pub reserved: u8,
    pub parent_id: CatalogNodeId,
    /// Name bytes without the length prefix.
    pub node_name: Vec<u8>,
}

impl HfsCatalogKey {
    pub fn new(parent_id: CatalogNodeId, node_name: Vec<u8>) -> Self {
        Self {
            key_length: (6 + node_name.len()) as u8,
            reserved: 0,
            parent_id,
            node_name,
        }
    }

    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        let mut source = BeReader::new(bytes);
        let key_length = source.u8().map_err(key_truncated)?;
        let reserved = source.u8().map_err(key_truncated)?;
        let parent_id = source.u32().map_err(key_truncated)?;
        let name_len = source.u8().map_err(key_truncated)? as usize;
        if name_len > HFS_MAX_NAME_LEN {
            return Err(DecodeFault::NameTooLong {
                length: name_len,
                max: HFS_MAX_NAME_LEN,
            });
        }
        let node_name = source.take(name_len).map_err(key_truncated)?.to_vec();
        Ok(Self {
            key_length,
            reserved,
            parent_id,
            node_name,
        })
    }

    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(7 + self.node_name.len());
        out.put_u8(self.key_length);
        out.put_u8(self.reserved);
        out.put_u32(self.parent_id);
        out.put_u8(self.node_name.len() as u8);
        out.extend_from_slice(&self.node_name);
        out
    }
}

/// HFSExtentDescriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HfsExtent {
    pub start_block: u16,
    pub block_count: u16,
}

pub type HfsExtentRecord = [HfsExtent; 3];

fn import_extents(source: &mut BeReader<'_>) -> Result<HfsExtentRecord, Truncated> {
    let mut record = [HfsExtent::default(); 3];
    for extent in record.iter_mut() {
        extent.start_block = source.u16()?;
        extent.block_count = source.u16()?;
    }
    Ok(record)
}

fn export_extents(record: &HfsExtentRecord, out: &mut Vec<u8>) {
    for extent in record {
        out.put_u16(extent.start_block);
        out.put_u16(extent.block_count);
    }
}

/// HFSCatalogFile
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HfsFileRecord {
    pub flags: u8,
    pub file_type: i8,
    pub user_info: FileInfo,
    pub file_id: CatalogNodeId,
    pub data_start_block: u16,
    pub data_logical_size: u32,
    pub data_physical_size: u32,
    pub rsrc_start_block: u16,
    pub rsrc_logical_size: u32,
    pub rsrc_physical_size: u32,
    pub create_date: u32,
    pub modify_date: u32,
    pub backup_date: u32,
    pub finder_info: [u8; 16],
    pub clump_size: u16,
    pub data_extents: HfsExtentRecord,
    pub rsrc_extents: HfsExtentRecord,
    pub reserved: u32,
}

impl HfsFileRecord {
    pub const SIZE: usize = 102;

    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        check_length("file", Self::SIZE, bytes.len())?;
        let mut source = BeReader::new(bytes);
        Self::import_from(&mut source).map_err(record_truncated)
    }

    fn import_from(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        let _record_type = source.u16()?;
        Ok(Self {
            flags: source.u8()?,
            file_type: source.i8()?,
            user_info: FileInfo::import(source)?,
            file_id: source.u32()?,
            data_start_block: source.u16()?,
            data_logical_size: source.u32()?,
            data_physical_size: source.u32()?,
            rsrc_start_block: source.u16()?,
            rsrc_logical_size: source.u32()?,
            rsrc_physical_size: source.u32()?,
            create_date: source.u32()?,
            modify_date: source.u32()?,
            backup_date: source.u32()?,
            finder_info: source.array()?,
            clump_size: source.u16()?,
            data_extents: import_extents(source)?,
            rsrc_extents: import_extents(source)?,
            reserved: source.u32()?,
        })
    }

    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.put_u16(HFS_FILE_RECORD);
        out.put_u8(self.flags);
        out.put_u8(self.file_type as u8);
        self.user_info.export(&mut out);
        out.put_u32(self.file_id);
        out.put_u16(self.data_start_block);
        out.put_u32(self.data_logical_size);
        out.put_u32(self.data_physical_size);
        out.put_u16(self.rsrc_start_block);
        out.put_u32(self.rsrc_logical_size);
        out.put_u32(self.rsrc_physical_size);
        out.put_u32(self.create_date);
        out.put_u32(self.modify_date);
        out.put_u32(self.backup_date);
        out.extend_from_slice(&self.finder_info);
        out.put_u16(self.clump_size);
        export_extents(&self.data_extents, &mut out);
        export_extents(&self.rsrc_extents, &mut out);
        out.put_u32(self.reserved);
        out
    }
}

/// HFSCatalogFolder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HfsFolderRecord {
    pub flags: u16,
    pub valence: u16,
    pub folder_id: CatalogNodeId,
    pub create_date: u32,
    pub modify_date: u32,
    pub backup_date: u32,
    pub user_info: [u8; 16],
    pub finder_info: [u8; 16],
    pub reserved: [u8; 16],
}

impl HfsFolderRecord {
    pub const SIZE: usize = 70;

    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        check_length("folder", Self::SIZE, bytes.len())?;
        let mut source = BeReader::new(bytes);
        Self::import_from(&mut source).map_err(record_truncated)
    }

    fn import_from(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        let _record_type = source.u16()?;
        Ok(Self {
            flags: source.u16()?,
            valence: source.u16()?,
            folder_id: source.u32()?,
            create_date: source.u32()?,
            modify_date: source.u32()?,
            backup_date: source.u32()?,
            user_info: source.array()?,
            finder_info: source.array()?,
            reserved: source.array()?,
        })
    }

    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.put_u16(HFS_FOLDER_RECORD);
        out.put_u16(self.flags);
        out.put_u16(self.valence);
        out.put_u32(self.folder_id);
        out.put_u32(self.create_date);
        out.put_u32(self.modify_date);
        out.put_u32(self.backup_date);
        out.extend_from_slice(&self.user_info);
        out.extend_from_slice(&self.finder_info);
        out.extend_from_slice(&self.reserved);
        out
    }
}

/// A decoded HFS file or folder record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HfsRecord {
    File(HfsFileRecord),
    Folder(HfsFolderRecord),
}

impl HfsRecord {
    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        let record_type = BeReader::new(bytes).u16().map_err(record_truncated)?;
        match record_type {
            HFS_FILE_RECORD => HfsFileRecord::import(bytes).map(HfsRecord::File),
            HFS_FOLDER_RECORD => HfsFolderRecord::import(bytes).map(HfsRecord::Folder),
            other => Err(DecodeFault::UnsupportedRecordType(other)),
        }
    }

    pub fn node_id(&self) -> CatalogNodeId {
        match self {
            HfsRecord::File(file) => file.file_id,
            HfsRecord::Folder(folder) => folder.folder_id,
        }
    }
}
