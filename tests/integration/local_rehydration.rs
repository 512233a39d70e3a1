use crate::integration::support::*;
use hfs_rehydrate::dates::from_legacy_timestamp;
use hfs_rehydrate::destination::AppleDouble;
use hfs_rehydrate::types::{FourCharCode, ROOT_FOLDER_ID};
use hfs_rehydrate::volume::FileSpec;
use hfs_rehydrate::{
    CatalogFormat, LocalFilesystem, MemorySourceVolume, MetadataField, RehydrationEngine,
    TextEncoding, TreeBuilder,
};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

fn relative_paths(root: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| entry.unwrap().path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    paths.sort();
    paths
}

fn modified(path: &Path) -> DateTime<Utc> {
    DateTime::<Utc>::from(fs::metadata(path).unwrap().modified().unwrap())
}

#[test]
fn test_volume_rehydrates_onto_disk() {
    let temp = TempDir::new().unwrap();
    let volume = shared(sample_volume(CatalogFormat::HfsPlus));
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();
    let destination = LocalFilesystem::new();

    let report = RehydrationEngine::new(&destination)
        .rehydrate_into_directory(&tree, tree.root(), temp.path())
        .unwrap();
    assert_eq!(report.attempted(), 8);

    let root = temp.path().join("Macintosh HD");
    let mut expected: Vec<PathBuf> = [
        "Applications",
        "Applications/._SimpleText",
        "Applications/SimpleText",
        "Documents",
        "Documents/._Read Me",
        "Documents/Letters",
        "Documents/Letters/._Draft",
        "Documents/Letters/Draft",
        "Documents/Read Me",
        "._Notes",
        "Notes",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    expected.sort();
    assert_eq!(relative_paths(&root), expected);

    assert_eq!(fs::read(root.join("Documents/Letters/Draft")).unwrap(), b"Dear");
    assert_eq!(modified(&root.join("Notes")), from_legacy_timestamp(MODIFIED));
    // Directory dates survive their children being written.
    assert_eq!(modified(&root.join("Documents")), from_legacy_timestamp(MODIFIED));

    let sidecar_path = AppleDouble::sidecar_path(&root.join("Applications/SimpleText"));
    let sidecar = fs::read(sidecar_path).unwrap();
    let double = AppleDouble::parse(&sidecar).unwrap();
    assert_eq!(double.file_type(), FourCharCode::from(b"APPL"));
    assert_eq!(double.creator(), FourCharCode::from(b"ttxt"));
    assert_eq!(double.resource_fork, version_fork());

    // Only the creation date may be unsupported by the host.
    for outcome in report.degraded() {
        for field in outcome.fields.iter().filter(|field| field.is_failed()) {
            assert_eq!(field.field, MetadataField::CreationDate);
        }
    }
}

#[test]
fn test_rehydrating_twice_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let volume = shared(sample_volume(CatalogFormat::Hfs));
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();
    let destination = LocalFilesystem::new();
    let engine = RehydrationEngine::new(&destination);
    let documents = tree.find(DOCUMENTS).unwrap();

    let first = engine
        .rehydrate_into_directory(&tree, documents, temp.path())
        .unwrap();
    let paths = relative_paths(temp.path());
    let draft = fs::read(temp.path().join("Documents/Letters/Draft")).unwrap();

    let second = engine
        .rehydrate_into_directory(&tree, documents, temp.path())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(relative_paths(temp.path()), paths);
    assert_eq!(
        fs::read(temp.path().join("Documents/Letters/Draft")).unwrap(),
        draft
    );
}

#[test]
fn test_single_file_rehydration() {
    let temp = TempDir::new().unwrap();
    let volume = shared(sample_volume(CatalogFormat::HfsPlus));
    let tree = TreeBuilder::build(&volume).unwrap().tree;
    let destination = LocalFilesystem::new();
    let target = temp.path().join("copy of Read Me");

    let report = RehydrationEngine::new(&destination)
        .rehydrate(&tree, tree.find(READ_ME).unwrap(), &target)
        .unwrap();

    assert_eq!(report.attempted(), 1);
    assert_eq!(fs::read(&target).unwrap(), b"Welcome");
}

#[test]
fn test_two_destinations_get_identical_data_forks() {
    let volume = shared(sample_volume(CatalogFormat::HfsPlus));
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();
    let destination = LocalFilesystem::new();
    let engine = RehydrationEngine::new(&destination);
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    for target in [&first, &second] {
        engine
            .rehydrate_into_directory(&tree, tree.root(), target.path())
            .unwrap();
    }

    let data_files: Vec<PathBuf> = relative_paths(first.path())
        .into_iter()
        .filter(|path| first.path().join(path).is_file())
        .collect();
    assert_eq!(relative_paths(first.path()), relative_paths(second.path()));
    for path in data_files {
        assert_eq!(
            fs::read(first.path().join(&path)).unwrap(),
            fs::read(second.path().join(&path)).unwrap(),
            "{}",
            path.display()
        );
    }
}

#[test]
fn test_sibling_named_like_a_sidecar_keeps_both_forks() {
    let temp = TempDir::new().unwrap();
    let mut volume =
        MemorySourceVolume::with_root(CatalogFormat::HfsPlus, TextEncoding::MacRoman, "Disk")
            .unwrap();
    let foo = FileSpec {
        resource: version_fork(),
        ..text_file("foo data")
    };
    volume.add_file(ROOT_FOLDER_ID, 16, "foo", foo).unwrap();
    volume
        .add_file(ROOT_FOLDER_ID, 17, "._foo", text_file("dot data"))
        .unwrap();
    let volume = shared(volume);
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();
    let destination = LocalFilesystem::new();

    let report = RehydrationEngine::new(&destination)
        .rehydrate_into_directory(&tree, tree.root(), temp.path())
        .unwrap();
    for outcome in report.degraded() {
        for field in outcome.fields.iter().filter(|field| field.is_failed()) {
            assert_eq!(field.field, MetadataField::CreationDate);
        }
    }

    let root = temp.path().join("Disk");
    let data_file = |contents: &[u8]| {
        relative_paths(&root)
            .into_iter()
            .map(|path| root.join(path))
            .find(|path| fs::read(path).map(|bytes| bytes == contents).unwrap_or(false))
    };
    let foo_path = data_file(b"foo data").expect("foo data fork");
    let dot_path = data_file(b"dot data").expect("._foo data fork");
    assert_ne!(AppleDouble::sidecar_path(&foo_path), dot_path);

    let sidecar = fs::read(AppleDouble::sidecar_path(&foo_path)).unwrap();
    let double = AppleDouble::parse(&sidecar).unwrap();
    assert_eq!(double.resource_fork, version_fork());
}
