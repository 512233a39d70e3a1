use crate::integration::support::*;
use hfs_rehydrate::types::ROOT_FOLDER_ID;
use hfs_rehydrate::volume::FileSpec;
use hfs_rehydrate::{CatalogFormat, TreeBuilder};

#[test]
fn test_version_strings_from_resource_fork() {
    for format in [CatalogFormat::Hfs, CatalogFormat::HfsPlus] {
        let volume = shared(sample_volume(format));
        let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();
        let app = &tree[tree.find(SIMPLE_TEXT).unwrap()];

        assert_eq!(app.short_version_string().unwrap().as_deref(), Some("1.2.3"));
        assert_eq!(
            app.version_string_from_version_number().unwrap().as_deref(),
            Some("1.2.3")
        );
        assert_eq!(
            app.long_version_string().unwrap().as_deref(),
            Some("1.2.3, © Example Software")
        );
    }
}

#[test]
fn test_absent_or_malformed_version_is_none() {
    let mut volume = sample_volume(CatalogFormat::HfsPlus);
    let garbage = FileSpec {
        resource: vec![0xFF; 40],
        ..FileSpec::with_data("x")
    };
    volume
        .add_file(ROOT_FOLDER_ID, 70, "Garbled", garbage)
        .unwrap();
    let volume = shared(volume);
    let tree = TreeBuilder::build(&volume).unwrap().into_strict().unwrap();

    let plain = &tree[tree.find(NOTES).unwrap()];
    assert_eq!(plain.short_version_string().unwrap(), None);

    let folder = &tree[tree.find(DOCUMENTS).unwrap()];
    assert_eq!(folder.version_resource().unwrap(), None);

    let garbled = &tree[tree.find(70).unwrap()];
    assert_eq!(garbled.short_version_string().unwrap(), None);
}
