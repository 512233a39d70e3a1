use crate::integration::support::*;
use hfs_rehydrate::error::RehydrationError;
use hfs_rehydrate::rehydrate::FieldStatus;
use hfs_rehydrate::types::{ForkType, ROOT_FOLDER_ID};
use hfs_rehydrate::volume::FileSpec;
use hfs_rehydrate::{
    CatalogFormat, MemoryDestination, MetadataField, RehydrationEngine, TreeBuilder,
};
use std::path::Path;

#[test]
fn test_one_of_three_files_fails() {
    let mut volume = sample_volume(CatalogFormat::HfsPlus);
    for (id, name) in [(50, "a"), (51, "b"), (52, "c")] {
        volume
            .add_file(LETTERS, id, name, text_file(name))
            .unwrap();
    }
    let volume = shared(volume);
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();
    let destination = MemoryDestination::new();
    destination.fail_at("/out/Letters/b");

    let err = RehydrationEngine::new(&destination)
        .rehydrate_into_directory(&tree, tree.find(LETTERS).unwrap(), Path::new("/out"))
        .unwrap_err();
    let RehydrationError::Incomplete(report) = err;

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].node_id, 51);
    assert!(report.failures[0].error.contains("injected"));
    // Draft, a, c and the Letters folder itself.
    assert_eq!(report.outcomes.len(), 4);
    assert!(destination.contains(Path::new("/out/Letters/a")));
    assert!(destination.contains(Path::new("/out/Letters/c")));
    assert!(destination.contains(Path::new("/out/Letters/Draft")));
    assert!(report.to_json().unwrap().contains("\"node_id\": 51"));
}

#[test]
fn test_unreadable_data_fork_fails_only_that_file() {
    let mut volume = sample_volume(CatalogFormat::Hfs);
    // Catalog claims 4 data bytes; the fork store has none.
    volume
        .add_file(ROOT_FOLDER_ID, 60, "Damaged", FileSpec::with_data("gone"))
        .unwrap();
    volume.set_fork(60, ForkType::Data, Vec::<u8>::new());
    let volume = shared(volume);
    let tree = TreeBuilder::build(&volume).unwrap().tree;
    let destination = MemoryDestination::new();

    let err = RehydrationEngine::new(&destination)
        .rehydrate(&tree, tree.root(), Path::new("/vol"))
        .unwrap_err();

    let report = err.report();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].node_id, 60);
    assert_eq!(report.outcomes.len(), 8);
    assert!(!destination.contains(Path::new("/vol/Damaged")));
}

#[test]
fn test_degraded_metadata_is_reported_per_field() {
    let volume = shared(sample_volume(CatalogFormat::HfsPlus));
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();
    let destination = MemoryDestination::new();
    destination.fail_field(MetadataField::ResourceFork);

    let report = RehydrationEngine::new(&destination)
        .rehydrate(&tree, tree.find(APPLICATIONS).unwrap(), Path::new("/Apps"))
        .unwrap();

    assert!(report.is_complete());
    let degraded: Vec<u32> = report.degraded().map(|outcome| outcome.node_id).collect();
    assert_eq!(degraded, vec![SIMPLE_TEXT]);
    let simple_text = report.outcome(SIMPLE_TEXT).unwrap();
    assert!(matches!(
        simple_text.field(MetadataField::ResourceFork),
        Some(FieldStatus::Failed(_))
    ));
    assert_eq!(
        simple_text.field(MetadataField::FileType),
        Some(&FieldStatus::Applied)
    );
    assert!(destination.contains(Path::new("/Apps/SimpleText")));
}
