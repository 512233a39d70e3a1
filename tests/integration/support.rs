//! Shared fixtures: a small HFS or HFS+ volume with nested folders.

use hfs_rehydrate::fork::{
    NumVersion, ResourceForkBuilder, VersionResource, VERSION_RESOURCE_ID, VERSION_RESOURCE_TYPE,
};
use hfs_rehydrate::types::{FourCharCode, ROOT_FOLDER_ID};
use hfs_rehydrate::volume::{FileSpec, FolderSpec};
use hfs_rehydrate::{CatalogFormat, MemorySourceVolume, SourceVolume, TextEncoding};
use std::sync::Arc;

pub const CREATED: u32 = 2_900_000_000;
pub const MODIFIED: u32 = 3_000_000_000;

pub const APPLICATIONS: u32 = 16;
pub const SIMPLE_TEXT: u32 = 17;
pub const DOCUMENTS: u32 = 18;
pub const LETTERS: u32 = 19;
pub const READ_ME: u32 = 20;
pub const DRAFT: u32 = 21;
pub const NOTES: u32 = 22;

pub fn dates() -> FolderSpec {
    FolderSpec {
        create_date: CREATED,
        modify_date: MODIFIED,
    }
}

pub fn text_file(contents: &str) -> FileSpec {
    FileSpec {
        file_type: FourCharCode::from(b"TEXT"),
        creator: FourCharCode::from(b"ttxt"),
        create_date: CREATED,
        modify_date: MODIFIED,
        ..FileSpec::with_data(contents.as_bytes())
    }
}

/// `vers` resource fork for 1.2.3 final.
pub fn version_fork() -> Vec<u8> {
    let resource = VersionResource {
        number: NumVersion::from_bytes([0x01, 0x23, 0x80, 0x00]),
        region_code: 0,
        short_version: "1.2.3".to_string(),
        long_version: "1.2.3, © Example Software".to_string(),
    };
    ResourceForkBuilder::new()
        .add(
            VERSION_RESOURCE_TYPE,
            VERSION_RESOURCE_ID,
            resource.to_bytes().unwrap(),
        )
        .build()
}

/// ```text
/// Macintosh HD
/// ├── Applications
/// │   └── SimpleText      (vers 1.2.3 in its resource fork)
/// ├── Documents
/// │   ├── Letters
/// │   │   └── Draft
/// │   └── Read Me
/// └── Notes
/// ```
pub fn sample_volume(format: CatalogFormat) -> MemorySourceVolume {
    let mut volume =
        MemorySourceVolume::with_root(format, TextEncoding::MacRoman, "Macintosh HD").unwrap();
    volume
        .add_folder(ROOT_FOLDER_ID, APPLICATIONS, "Applications", dates())
        .unwrap();
    let simple_text = FileSpec {
        file_type: FourCharCode::from(b"APPL"),
        creator: FourCharCode::from(b"ttxt"),
        resource: version_fork(),
        ..text_file("code")
    };
    volume
        .add_file(APPLICATIONS, SIMPLE_TEXT, "SimpleText", simple_text)
        .unwrap();
    volume
        .add_folder(ROOT_FOLDER_ID, DOCUMENTS, "Documents", dates())
        .unwrap();
    volume
        .add_folder(DOCUMENTS, LETTERS, "Letters", dates())
        .unwrap();
    volume
        .add_file(DOCUMENTS, READ_ME, "Read Me", text_file("Welcome"))
        .unwrap();
    volume
        .add_file(LETTERS, DRAFT, "Draft", text_file("Dear"))
        .unwrap();
    volume
        .add_file(ROOT_FOLDER_ID, NOTES, "Notes", text_file("todo"))
        .unwrap();
    volume
}

pub fn shared(volume: MemorySourceVolume) -> Arc<dyn SourceVolume> {
    Arc::new(volume)
}
