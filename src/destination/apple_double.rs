//! AppleDouble (RFC 1740) sidecar files: `._name` next to the data file, carrying the Finder
//! info and resource fork the host filesystem cannot hold.

use crate::catalog::bytes::{BeReader, PutBe};
use crate::types::FourCharCode;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

pub const APPLE_DOUBLE_MAGIC: u32 = 0x0005_1607;
pub const APPLE_DOUBLE_VERSION: u32 = 0x0002_0000;

const ENTRY_RESOURCE_FORK: u32 = 2;
const ENTRY_FINDER_INFO: u32 = 9;
const FINDER_INFO_LEN: usize = 32;
const HEADER_LEN: usize = 26;
const ENTRY_LEN: usize = 12;

/// Decoded sidecar. Entries other than Finder info and resource fork are dropped on rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppleDouble {
    pub finder_info: [u8; FINDER_INFO_LEN],
    pub resource_fork: Vec<u8>,
}

impl Default for AppleDouble {
    fn default() -> Self {
        Self {
            finder_info: [0; FINDER_INFO_LEN],
            resource_fork: Vec::new(),
        }
    }
}

impl AppleDouble {
    /// Sidecar file name for a data file called `name`.
    pub fn sidecar_name(name: &str) -> String {
        format!("._{}", name)
    }

    /// Sidecar location for a data file: same directory, name prefixed with `._`.
    pub fn sidecar_path(path: &Path) -> PathBuf {
        let mut name = OsString::from("._");
        if let Some(file_name) = path.file_name() {
            name.push(file_name);
        }
        path.with_file_name(name)
    }

    pub fn file_type(&self) -> FourCharCode {
        FourCharCode::from_bytes([
            self.finder_info[0],
            self.finder_info[1],
            self.finder_info[2],
            self.finder_info[3],
        ])
    }

    pub fn creator(&self) -> FourCharCode {
        FourCharCode::from_bytes([
            self.finder_info[4],
            self.finder_info[5],
            self.finder_info[6],
            self.finder_info[7],
        ])
    }

    pub fn set_file_type(&mut self, code: FourCharCode) {
        self.finder_info[0..4].copy_from_slice(&code.to_bytes());
    }

    pub fn set_creator(&mut self, code: FourCharCode) {
        self.finder_info[4..8].copy_from_slice(&code.to_bytes());
    }

    pub fn parse(bytes: &[u8]) -> io::Result<Self> {
        let mut source = BeReader::new(bytes);
        let invalid = |what: &str| {
            io::Error::new(io::ErrorKind::InvalidData, format!("AppleDouble {}", what))
        };
        let magic = source.u32().map_err(|_| invalid("header truncated"))?;
        if magic != APPLE_DOUBLE_MAGIC {
            return Err(invalid("magic number mismatch"));
        }
        let _version = source.u32().map_err(|_| invalid("header truncated"))?;
        source.take(16).map_err(|_| invalid("header truncated"))?;
        let count = source.u16().map_err(|_| invalid("header truncated"))?;

        let mut double = Self::default();
        for _ in 0..count {
            let id = source.u32().map_err(|_| invalid("entry table truncated"))?;
            let offset = source.u32().map_err(|_| invalid("entry table truncated"))? as usize;
            let length = source.u32().map_err(|_| invalid("entry table truncated"))? as usize;
            let data = offset
                .checked_add(length)
                .and_then(|end| bytes.get(offset..end))
                .ok_or_else(|| invalid("entry runs past end of file"))?;
            match id {
                ENTRY_FINDER_INFO => {
                    let len = data.len().min(FINDER_INFO_LEN);
                    double.finder_info[..len].copy_from_slice(&data[..len]);
                }
                ENTRY_RESOURCE_FORK => double.resource_fork = data.to_vec(),
                _ => {}
            }
        }
        Ok(double)
    }

    /// Finder info first, resource fork last so it can grow.
    pub fn to_bytes(&self) -> Vec<u8> {
        let entries = 2;
        let finder_info_offset = HEADER_LEN + ENTRY_LEN * entries;
        let resource_offset = finder_info_offset + FINDER_INFO_LEN;

        let mut out = Vec::with_capacity(resource_offset + self.resource_fork.len());
        out.put_u32(APPLE_DOUBLE_MAGIC);
        out.put_u32(APPLE_DOUBLE_VERSION);
        out.extend_from_slice(&[0; 16]);
        out.put_u16(entries as u16);
        out.put_u32(ENTRY_FINDER_INFO);
        out.put_u32(finder_info_offset as u32);
        out.put_u32(FINDER_INFO_LEN as u32);
        out.put_u32(ENTRY_RESOURCE_FORK);
        out.put_u32(resource_offset as u32);
        out.put_u32(self.resource_fork.len() as u32);
        out.extend_from_slice(&self.finder_info);
        out.extend_from_slice(&self.resource_fork);
        out
    }
}
