use crate::integration::support::*;
use hfs_rehydrate::config::RehydrateConfig;
use hfs_rehydrate::error::{IntegrityFault, TreeBuildError};
use hfs_rehydrate::types::ROOT_FOLDER_ID;
use hfs_rehydrate::volume::{FileSpec, FolderSpec};
use hfs_rehydrate::{
    CatalogFormat, ItemType, MemorySourceVolume, SourceVolume, TextEncoding, TreeBuilder,
};
use std::sync::Arc;

#[test]
fn test_sample_volume_builds_in_both_formats() {
    for format in [CatalogFormat::Hfs, CatalogFormat::HfsPlus] {
        let volume = shared(sample_volume(format));
        let built = TreeBuilder::build(&volume).unwrap();
        assert!(built.is_complete(), "{:?}: {:?}", format, built.faults);

        let tree = built.tree;
        assert_eq!(tree.len(), 8);
        assert_eq!(tree.root_item().item_type(), ItemType::Volume);
        assert_eq!(tree.root_item().name(), "Macintosh HD");

        let draft = tree.find(DRAFT).unwrap();
        assert_eq!(
            tree.path(draft).unwrap(),
            vec!["Macintosh HD", "Documents", "Letters", "Draft"]
        );
        assert_eq!(tree[draft].format(), format);
    }
}

#[test]
fn test_breadth_first_visits_by_depth() {
    let volume = shared(sample_volume(CatalogFormat::HfsPlus));
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();

    let mut visited = Vec::new();
    tree.walk_breadth_first(tree.root(), |depth, item| {
        visited.push((depth, item.node_id()))
    });

    assert_eq!(visited.len(), 8);
    assert_eq!(visited[0], (0, ROOT_FOLDER_ID));
    let depths: Vec<usize> = visited.iter().map(|(depth, _)| *depth).collect();
    assert!(depths.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(visited.contains(&(3, DRAFT)));
    assert!(visited.contains(&(1, NOTES)));

    let from_iterator: Vec<_> = tree
        .breadth_first(tree.root())
        .map(|(depth, id)| (depth, tree[id].node_id()))
        .collect();
    assert_eq!(from_iterator, visited);
}

#[test]
fn test_orphans_are_reported_not_attached() {
    let mut volume = sample_volume(CatalogFormat::Hfs);
    volume
        .add_folder(999, 40, "Lost", FolderSpec::default())
        .unwrap();
    volume
        .add_file(40, 41, "Lost File", FileSpec::with_data("x"))
        .unwrap();
    volume
        .add_file(NOTES, 42, "Inside A File", FileSpec::default())
        .unwrap();
    let volume = shared(volume);

    let built = TreeBuilder::build(&volume).unwrap();
    assert_eq!(built.tree.len(), 8);
    assert!(built.tree.find(40).is_none());
    assert!(built.faults.contains(&IntegrityFault::ParentMissing {
        node_id: 40,
        parent_id: 999,
    }));
    assert!(built.faults.contains(&IntegrityFault::ParentNotFolder {
        node_id: 42,
        parent_id: NOTES,
    }));
    assert!(built.faults.iter().any(|fault| fault.node_id() == 41));

    assert!(matches!(
        built.into_strict(),
        Err(TreeBuildError::Integrity(_))
    ));

    let allow_partial = RehydrateConfig::default().tree.allow_partial;
    let lenient = TreeBuilder::build(&volume)
        .unwrap()
        .into_tree(allow_partial)
        .unwrap();
    assert_eq!(lenient.len(), 8);
}

#[test]
fn test_missing_root_is_fatal() {
    let mut volume = MemorySourceVolume::new(CatalogFormat::HfsPlus, TextEncoding::MacRoman);
    volume
        .add_file(ROOT_FOLDER_ID, 16, "Stray", FileSpec::default())
        .unwrap();
    let volume: Arc<dyn SourceVolume> = Arc::new(volume);
    assert!(matches!(
        TreeBuilder::build(&volume),
        Err(TreeBuildError::MissingRoot(ROOT_FOLDER_ID))
    ));
}

#[test]
fn test_legacy_names_follow_the_volume_encoding() {
    let mut volume = sample_volume(CatalogFormat::Hfs);
    volume
        .add_file(ROOT_FOLDER_ID, 30, "Café", FileSpec::default())
        .unwrap();
    let volume = Arc::new(volume);
    let dyn_volume: Arc<dyn SourceVolume> = volume.clone();
    let tree = TreeBuilder::build(&dyn_volume).unwrap().tree;
    let cafe = tree.find(30).unwrap();

    assert_eq!(tree[cafe].name(), "Café");
    volume.set_text_encoding(TextEncoding::Unsupported(0x7E));
    assert_eq!(tree[cafe].name(), "Caf\u{FFFD}");
}
