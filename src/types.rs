//! Core types shared by the catalog, tree, and rehydration layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// CatalogNodeId: identifier assigned to every catalog entry by the source filesystem
pub type CatalogNodeId = u32;

/// Parent ID stored in the root folder's key. Nothing in the catalog has this ID.
pub const ROOT_PARENT_ID: CatalogNodeId = 1;

/// Node ID of the root folder of every HFS and HFS+ volume.
pub const ROOT_FOLDER_ID: CatalogNodeId = 2;

/// Lowest node ID handed out to user files and folders.
pub const FIRST_USER_NODE_ID: CatalogNodeId = 16;

/// A classic four-character code (OSType), such as a file type or creator code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FourCharCode(pub u32);

impl FourCharCode {
    pub const ZERO: FourCharCode = FourCharCode(0);

    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        FourCharCode(u32::from_be_bytes(bytes))
    }

    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl From<&[u8; 4]> for FourCharCode {
    fn from(bytes: &[u8; 4]) -> Self {
        FourCharCode::from_bytes(*bytes)
    }
}

impl fmt::Display for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Printable ASCII as-is, anything else as a hex escape ('APPL', 'rsrc', '\x00\x00\x00\x00')
        f.write_str("'")?;
        for byte in self.to_bytes() {
            if byte.is_ascii_graphic() || byte == b' ' {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "\\x{:02x}", byte)?;
            }
        }
        f.write_str("'")
    }
}

/// Which of a file's two forks to operate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkType {
    Data,
    Resource,
}

impl ForkType {
    /// Value used for the fork in on-disk extent keys.
    pub const fn raw(self) -> u8 {
        match self {
            ForkType::Data => 0x00,
            ForkType::Resource => 0xff,
        }
    }

    /// Returns `None` for any byte that is not a fork selector.
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0x00 => Some(ForkType::Data),
            0xff => Some(ForkType::Resource),
            _ => None,
        }
    }
}
