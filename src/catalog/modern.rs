//! HFS+ catalog key and record layouts (TN1150).

use super::bytes::{BeReader, PutBe, Truncated};
use super::FileInfo;
use crate::error::DecodeFault;
use crate::types::CatalogNodeId;

pub const HFS_PLUS_FOLDER_RECORD: u16 = 0x0001;
pub const HFS_PLUS_FILE_RECORD: u16 = 0x0002;
pub const HFS_PLUS_FOLDER_THREAD_RECORD: u16 = 0x0003;
pub const HFS_PLUS_FILE_THREAD_RECORD: u16 = 0x0004;

/// HFSUniStr255 holds at most this many UTF-16 code units.
pub const HFS_PLUS_MAX_NAME_LEN: usize = 255;

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
            format: "HFS+",
            kind,
            expected,
            actual,
        })
    } else {
        Ok(())
    }
}

/// HFSPlusCatalogKey: parent folder ID plus the item's UTF-16 name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HfsPlusCatalogKey {
    pub key_length: u16,
    pub parent_id: CatalogNodeId,
    pub node_name: Vec<u16>,
}

impl HfsPlusCatalogKey {
    pub fn new(parent_id: CatalogNodeId, node_name: Vec<u16>) -> Self {
        Self {
            key_length: (6 + 2 * node_name.len()) as u16,
            parent_id,
            node_name,
        }
    }

    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        let mut source = BeReader::new(bytes);
        let key_length = source.u16().map_err(key_truncated)?;
        let parent_id = source.u32().map_err(key_truncated)?;
        let name_len = source.u16().map_err(key_truncated)? as usize;
        if name_len > HFS_PLUS_MAX_NAME_LEN {
            return Err(DecodeFault::NameTooLong {
                length: name_len,
                max: HFS_PLUS_MAX_NAME_LEN,
            });
        }
        let mut node_name = Vec::with_capacity(name_len);
        for _ in 0..name_len {
            node_name.push(source.u16().map_err(key_truncated)?);
        }
        Ok(Self {
            key_length,
            parent_id,
            node_name,
        })
    }

    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + 2 * self.node_name.len());
        out.put_u16(self.key_length);
        out.put_u32(self.parent_id);
        out.put_u16(self.node_name.len() as u16);
        for unit in &self.node_name {
            out.put_u16(*unit);
        }
        out
    }

    /// Name as big-endian bytes, the form NameCodec decodes.
    pub fn name_bytes(&self) -> Vec<u8> {
        self.node_name.iter().flat_map(|unit| unit.to_be_bytes()).collect()
    }
}

/// HFSPlusBSDInfo
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BsdInfo {
    pub owner_id: u32,
    pub group_id: u32,
    pub admin_flags: u8,
    pub owner_flags: u8,
    pub file_mode: u16,
    pub special: u32,
}

impl BsdInfo {
    fn import(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        Ok(Self {
            owner_id: source.u32()?,
            group_id: source.u32()?,
            admin_flags: source.u8()?,
            owner_flags: source.u8()?,
            file_mode: source.u16()?,
            special: source.u32()?,
        })
    }

    fn export(&self, out: &mut Vec<u8>) {
        out.put_u32(self.owner_id);
        out.put_u32(self.group_id);
        out.put_u8(self.admin_flags);
        out.put_u8(self.owner_flags);
        out.put_u16(self.file_mode);
        out.put_u32(self.special);
    }
}

/// HFSPlusExtentDescriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HfsPlusExtent {
    pub start_block: u32,
    pub block_count: u32,
}

/// HFSPlusForkData
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForkData {
    pub logical_size: u64,
    pub clump_size: u32,
    pub total_blocks: u32,
    pub extents: [HfsPlusExtent; 8],
}

impl ForkData {
    pub const SIZE: usize = 80;

    fn import(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        let logical_size = source.u64()?;
        let clump_size = source.u32()?;
        let total_blocks = source.u32()?;
        let mut extents = [HfsPlusExtent::default(); 8];
        for extent in extents.iter_mut() {
            extent.start_block = source.u32()?;
            extent.block_count = source.u32()?;
        }
        Ok(Self {
            logical_size,
            clump_size,
            total_blocks,
            extents,
        })
    }

    fn export(&self, out: &mut Vec<u8>) {
        out.put_u64(self.logical_size);
        out.put_u32(self.clump_size);
        out.put_u32(self.total_blocks);
        for extent in &self.extents {
            out.put_u32(extent.start_block);
            out.put_u32(extent.block_count);
        }
    }
}

/// Timestamps carried by every HFS+ file and folder record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HfsPlusDates {
    pub create_date: u32,
    pub content_mod_date: u32,
    pub attribute_mod_date: u32,
    pub access_date: u32,
    pub backup_date: u32,
}

impl HfsPlusDates {
    fn import(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        Ok(Self {
            create_date: source.u32()?,
            content_mod_date: source.u32()?,
            attribute_mod_date: source.u32()?,
            access_date: source.u32()?,
            backup_date: source.u32()?,
        })
    }

    fn export(&self, out: &mut Vec<u8>) {
        out.put_u32(self.create_date);
        out.put_u32(self.content_mod_date);
        out.put_u32(self.attribute_mod_date);
        out.put_u32(self.access_date);
        out.put_u32(self.backup_date);
    }
}

/// HFSPlusCatalogFolder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HfsPlusFolderRecord {
    pub flags: u16,
    pub valence: u32,
    pub folder_id: CatalogNodeId,
    pub dates: HfsPlusDates,
    pub permissions: BsdInfo,
    pub user_info: [u8; 16],
    pub finder_info: [u8; 16],
    pub text_encoding: u32,
    pub reserved: u32,
}

impl HfsPlusFolderRecord {
    pub const SIZE: usize = 88;

    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        check_length("folder", Self::SIZE, bytes.len())?;
        let mut source = BeReader::new(bytes);
        Self::import_from(&mut source).map_err(record_truncated)
    }

    fn import_from(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        let _record_type = source.u16()?;
        Ok(Self {
            flags: source.u16()?,
            valence: source.u32()?,
            folder_id: source.u32()?,
            dates: HfsPlusDates::import(source)?,
            permissions: BsdInfo::import(source)?,
            user_info: source.array()?,
            finder_info: source.array()?,
            text_encoding: source.u32()?,
            reserved: source.u32()?,
        })
    }

    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.put_u16(HFS_PLUS_FOLDER_RECORD);
        out.put_u16(self.flags);
        out.put_u32(self.valence);
        out.put_u32(self.folder_id);
        self.dates.export(&mut out);
        self.permissions.export(&mut out);
        out.extend_from_slice(&self.user_info);
        out.extend_from_slice(&self.finder_info);
        out.put_u32(self.text_encoding);
        out.put_u32(self.reserved);
        out
    }
}

/// HFSPlusCatalogFile
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HfsPlusFileRecord {
    pub flags: u16,
    pub reserved1: u32,
    pub file_id: CatalogNodeId,
    pub dates: HfsPlusDates,
    pub permissions: BsdInfo,
    pub user_info: FileInfo,
    pub finder_info: [u8; 16],
    pub text_encoding: u32,
    pub reserved2: u32,
    pub data_fork: ForkData,
    pub resource_fork: ForkData,
}

impl HfsPlusFileRecord {
    pub const SIZE: usize = 248;

    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        check_length("file", Self::SIZE, bytes.len())?;
        let mut source = BeReader::new(bytes);
        Self::import_from(&mut source).map_err(record_truncated)
    }

    fn import_from(source: &mut BeReader<'_>) -> Result<Self, Truncated> {
        let _record_type = source.u16()?;
        Ok(Self {
            flags: source.u16()?,
            reserved1: source.u32()?,
            file_id: source.u32()?,
            dates: HfsPlusDates::import(source)?,
            permissions: BsdInfo::import(source)?,
            user_info: FileInfo::import(source)?,
            finder_info: source.array()?,
            text_encoding: source.u32()?,
            reserved2: source.u32()?,
            data_fork: ForkData::import(source)?,
            resource_fork: ForkData::import(source)?,
        })
    }

    pub fn export(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::SIZE);
        out.put_u16(HFS_PLUS_FILE_RECORD);
        out.put_u16(self.flags);
        out.put_u32(self.reserved1);
        out.put_u32(self.file_id);
        self.dates.export(&mut out);
        self.permissions.export(&mut out);
        self.user_info.export(&mut out);
        out.extend_from_slice(&self.finder_info);
        out.put_u32(self.text_encoding);
        out.put_u32(self.reserved2);
        self.data_fork.export(&mut out);
        self.resource_fork.export(&mut out);
        out
    }
}

/// A decoded HFS+ file or folder record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HfsPlusRecord {
    File(HfsPlusFileRecord),
    Folder(HfsPlusFolderRecord),
}

impl HfsPlusRecord {
    pub fn import(bytes: &[u8]) -> Result<Self, DecodeFault> {
        let record_type = BeReader::new(bytes).u16().map_err(record_truncated)?;
        match record_type {
            HFS_PLUS_FILE_RECORD => HfsPlusFileRecord::import(bytes).map(HfsPlusRecord::File),
            HFS_PLUS_FOLDER_RECORD => {
                HfsPlusFolderRecord::import(bytes).map(HfsPlusRecord::Folder)
            }
            other => Err(DecodeFault::UnsupportedRecordType(other)),
        }
    }

    pub fn node_id(&self) -> CatalogNodeId {
        match self {
            HfsPlusRecord::File(file) => file.file_id,
            HfsPlusRecord::Folder(folder) => folder.folder_id,
        }
    }
}
