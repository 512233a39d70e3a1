//! Rehydration
//!
//! Materializes a dehydrated item, and for folders everything below it, through a
//! `Destination`. A failed item is recorded and its siblings are still attempted. A failed
//! metadata field only degrades its item.

pub mod report;

pub use report::{FieldResult, FieldStatus, ItemFailure, ItemOutcome, RehydrationReport};

use crate::destination::{Destination, MetadataField};
use crate::error::{DestinationError, RehydrationError};
use crate::fork::ForkReader;
use crate::item::DehydratedItem;
use crate::tree::{ItemId, ItemTree};
use crate::types::{FourCharCode, ForkType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;
use std::path::Path;
use tracing::{debug, info, warn};

/// How resource forks reach the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceForkMode {
    /// Hand the fork to the destination's resource fork facility.
    #[default]
    AppleDouble,
    /// Do not copy resource forks.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RehydrationOptions {
    pub resource_forks: ResourceForkMode,
    /// Apply type, creator and dates. Data forks and directories are always written.
    pub apply_metadata: bool,
}

impl Default for RehydrationOptions {
    fn default() -> Self {
        Self {
            resource_forks: ResourceForkMode::AppleDouble,
            apply_metadata: true,
        }
    }
}

pub struct RehydrationEngine<'d, D: Destination + ?Sized> {
    destination: &'d D,
    options: RehydrationOptions,
}

impl<'d, D: Destination + ?Sized> RehydrationEngine<'d, D> {
    pub fn new(destination: &'d D) -> Self {
        Self::with_options(destination, RehydrationOptions::default())
    }

    pub fn with_options(destination: &'d D, options: RehydrationOptions) -> Self {
        Self {
            destination,
            options,
        }
    }

    /// Materialize `id` at exactly `destination`.
    ///
    /// Returns the full report when every item was written, even if some metadata was
    /// degraded; otherwise `RehydrationError::Incomplete` carrying the same report.
    pub fn rehydrate(
        &self,
        tree: &ItemTree,
        id: ItemId,
        destination: &Path,
    ) -> Result<RehydrationReport, RehydrationError> {
        let mut report = RehydrationReport::default();
        self.rehydrate_item(tree, id, destination, &mut report);
        info!(
            attempted = report.attempted(),
            failed = report.failures.len(),
            degraded = report.degraded().count(),
            destination = %destination.display(),
            "Rehydration finished"
        );
        if report.is_complete() {
            Ok(report)
        } else {
            Err(RehydrationError::Incomplete(Box::new(report)))
        }
    }

    /// Materialize `id` inside `parent`, under its sanitized name.
    pub fn rehydrate_into_directory(
        &self,
        tree: &ItemTree,
        id: ItemId,
        parent: &Path,
    ) -> Result<RehydrationReport, RehydrationError> {
        let name = self.destination.sanitize_name(&tree[id].name());
        self.rehydrate(tree, id, &parent.join(name))
    }

    fn rehydrate_item(
        &self,
        tree: &ItemTree,
        id: ItemId,
        path: &Path,
        report: &mut RehydrationReport,
    ) {
        let item = &tree[id];
        let result = if item.is_directory() {
            self.rehydrate_directory(tree, id, path, report)
        } else {
            self.rehydrate_file(item, path)
        };
        match result {
            Ok(fields) => {
                for failed in fields.iter().filter(|field| field.is_failed()) {
                    warn!(
                        node_id = item.node_id(),
                        path = %path.display(),
                        field = %failed.field,
                        status = ?failed.status,
                        "Metadata not applied"
                    );
                }
                report.outcomes.push(ItemOutcome {
                    node_id: item.node_id(),
                    destination: path.to_path_buf(),
                    kind: item.item_type(),
                    fields,
                });
            }
            Err(error) => {
                warn!(
                    node_id = item.node_id(),
                    path = %path.display(),
                    error = %error,
                    "Failed to rehydrate item"
                );
                report.failures.push(ItemFailure {
                    node_id: item.node_id(),
                    destination: path.to_path_buf(),
                    error,
                });
            }
        }
    }

    fn rehydrate_file(
        &self,
        item: &DehydratedItem,
        path: &Path,
    ) -> Result<Vec<FieldResult>, String> {
        let data = ForkReader::read(item, ForkType::Data)
            .map_err(|err| err.to_string())?
            .unwrap_or_default();
        self.destination
            .write_data_fork(path, &data)
            .map_err(|err| err.to_string())?;
        debug!(
            node_id = item.node_id(),
            path = %path.display(),
            bytes = data.len(),
            "Wrote data fork"
        );

        let mut fields = Vec::new();
        if item.resource_fork_logical_length() > 0 {
            fields.push(self.copy_resource_fork(item, path));
        }
        if self.options.apply_metadata {
            fields.push(self.apply_code(path, MetadataField::FileType, item.file_type_code()));
            fields.push(self.apply_code(path, MetadataField::Creator, item.creator_code()));
        }
        fields.extend(self.apply_dates(item, path));
        info!(node_id = item.node_id(), path = %path.display(), "Rehydrated file");
        Ok(fields)
    }

    fn rehydrate_directory(
        &self,
        tree: &ItemTree,
        id: ItemId,
        path: &Path,
        report: &mut RehydrationReport,
    ) -> Result<Vec<FieldResult>, String> {
        let item = &tree[id];
        self.destination
            .create_directory(path)
            .map_err(|err| err.to_string())?;

        match item.children() {
            Some(children) => {
                let mut used = HashSet::with_capacity(children.len());
                for &child in children {
                    let child_path = path.join(self.child_name(&tree[child], &mut used));
                    self.rehydrate_item(tree, child, &child_path, report);
                }
            }
            None => debug!(
                node_id = item.node_id(),
                "Children not populated; creating the directory only"
            ),
        }

        // After the children, so writing them does not disturb the directory's own dates.
        let fields = self.apply_dates(item, path);
        info!(node_id = item.node_id(), path = %path.display(), "Rehydrated directory");
        Ok(fields)
    }

    /// Sanitized name, disambiguated with the node ID if a sibling, or a companion file of
    /// a sibling, already took it. Reserves the chosen name and its own companions.
    fn child_name(&self, child: &DehydratedItem, used: &mut HashSet<String>) -> String {
        let name = self.destination.sanitize_name(&child.name());
        let node_id = child.node_id();
        let mut candidate = name.clone();
        let mut attempt = 1u32;
        loop {
            let companions = self.destination.companion_names(&candidate);
            let free = !used.contains(&candidate)
                && companions.iter().all(|companion| !used.contains(companion));
            if free {
                used.insert(candidate.clone());
                used.extend(companions);
                break;
            }
            candidate = if attempt == 1 {
                format!("{} ({})", name, node_id)
            } else {
                format!("{} ({} {})", name, node_id, attempt)
            };
            attempt += 1;
        }
        if candidate != name {
            warn!(
                node_id,
                name = %name,
                renamed = %candidate,
                "Sibling name collision after sanitizing"
            );
        }
        candidate
    }

    fn copy_resource_fork(&self, item: &DehydratedItem, path: &Path) -> FieldResult {
        let status = match self.options.resource_forks {
            ResourceForkMode::Skip => FieldStatus::Skipped,
            ResourceForkMode::AppleDouble => match ForkReader::read(item, ForkType::Resource) {
                Ok(fork) => status_of(
                    self.destination
                        .write_resource_fork(path, &fork.unwrap_or_default()),
                ),
                Err(err) => FieldStatus::Failed(err.to_string()),
            },
        };
        FieldResult {
            field: MetadataField::ResourceFork,
            status,
        }
    }

    fn apply_code(&self, path: &Path, field: MetadataField, code: FourCharCode) -> FieldResult {
        let status = if code.is_zero() {
            FieldStatus::Skipped
        } else if field == MetadataField::FileType {
            status_of(self.destination.set_type_code(path, code))
        } else {
            status_of(self.destination.set_creator_code(path, code))
        };
        FieldResult { field, status }
    }

    /// Creation then modification date. A raw timestamp of zero means the date was never
    /// set and is skipped.
    fn apply_dates(&self, item: &DehydratedItem, path: &Path) -> Vec<FieldResult> {
        let fields = item.fields();
        let dates = [
            (MetadataField::CreationDate, fields.create_date, item.creation_date()),
            (
                MetadataField::ModificationDate,
                fields.modify_date,
                item.modification_date(),
            ),
        ];
        dates
            .into_iter()
            .map(|(field, raw, date)| {
                let status = if !self.options.apply_metadata || raw == 0 {
                    FieldStatus::Skipped
                } else {
                    status_of(self.set_date(path, field, date))
                };
                FieldResult { field, status }
            })
            .collect()
    }

    fn set_date(
        &self,
        path: &Path,
        field: MetadataField,
        date: DateTime<Utc>,
    ) -> Result<(), DestinationError> {
        if field == MetadataField::CreationDate {
            self.destination.set_creation_date(path, date)
        } else {
            self.destination.set_modification_date(path, date)
        }
    }
}

fn status_of<E: Display>(result: Result<(), E>) -> FieldStatus {
    match result {
        Ok(()) => FieldStatus::Applied,
        Err(err) => FieldStatus::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogFormat;
    use crate::dates::from_legacy_timestamp;
    use crate::destination::{MemoryDestination, MemoryNode};
    use crate::encoding::TextEncoding;
    use crate::item::ItemType;
    use crate::tree::builder::TreeBuilder;
    use crate::types::ROOT_FOLDER_ID;
    use crate::volume::{FileSpec, FolderSpec, MemorySourceVolume, SourceVolume};
    use std::sync::Arc;

    const CREATED: u32 = 3_000_000_000;
    const MODIFIED: u32 = 3_100_000_000;

    fn build(format: CatalogFormat, fill: impl FnOnce(&mut MemorySourceVolume)) -> ItemTree {
        let mut volume =
            MemorySourceVolume::with_root(format, TextEncoding::MacRoman, "Disk").unwrap();
        fill(&mut volume);
        let volume: Arc<dyn SourceVolume> = Arc::new(volume);
        TreeBuilder::build(&volume).unwrap().into_strict().unwrap()
    }

    fn three_files(volume: &mut MemorySourceVolume) {
        let dates = FolderSpec {
            create_date: CREATED,
            modify_date: MODIFIED,
        };
        volume.add_folder(ROOT_FOLDER_ID, 16, "Docs", dates).unwrap();
        for (id, name) in [(17, "one"), (18, "two"), (19, "three")] {
            let spec = FileSpec {
                file_type: FourCharCode::from(b"TEXT"),
                creator: FourCharCode::from(b"ttxt"),
                create_date: CREATED,
                modify_date: MODIFIED,
                ..FileSpec::with_data(name.as_bytes())
            };
            volume.add_file(16, id, name, spec).unwrap();
        }
    }

    #[test]
    fn test_rehydrates_a_folder_recursively() {
        let tree = build(CatalogFormat::HfsPlus, three_files);
        let dest = MemoryDestination::new();
        let docs = tree.find(16).unwrap();

        let report = RehydrationEngine::new(&dest)
            .rehydrate_into_directory(&tree, docs, Path::new("/out"))
            .unwrap();

        assert!(report.is_fully_rehydrated());
        assert_eq!(report.attempted(), 4);
        assert_eq!(
            dest.get(Path::new("/out/Docs/two")).unwrap().data(),
            Some(&b"two"[..])
        );
        match dest.get(Path::new("/out/Docs/one")).unwrap() {
            MemoryNode::File {
                file_type,
                creator,
                created,
                ..
            } => {
                assert_eq!(file_type, FourCharCode::from(b"TEXT"));
                assert_eq!(creator, FourCharCode::from(b"ttxt"));
                assert_eq!(created, Some(from_legacy_timestamp(CREATED)));
            }
            other => panic!("expected file, got {:?}", other),
        }
        // Folder outcome comes after its children.
        assert_eq!(report.outcomes.last().map(|o| o.kind), Some(ItemType::Folder));
        let folder = dest.get(Path::new("/out/Docs")).unwrap();
        assert_eq!(folder.modified(), Some(from_legacy_timestamp(MODIFIED)));
    }

    #[test]
    fn test_one_failed_file_does_not_stop_siblings() {
        let tree = build(CatalogFormat::Hfs, three_files);
        let dest = MemoryDestination::new();
        dest.fail_at("/out/Docs/two");

        let err = RehydrationEngine::new(&dest)
            .rehydrate_into_directory(&tree, tree.find(16).unwrap(), Path::new("/out"))
            .unwrap_err();

        let report = err.report();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].node_id, 18);
        assert_eq!(report.outcomes.len(), 3);
        assert!(dest.contains(Path::new("/out/Docs/one")));
        assert!(dest.contains(Path::new("/out/Docs/three")));
        assert!(!dest.contains(Path::new("/out/Docs/two")));
    }

    #[test]
    fn test_failed_metadata_degrades_but_completes() {
        let tree = build(CatalogFormat::HfsPlus, three_files);
        let dest = MemoryDestination::new();
        dest.fail_field(MetadataField::CreationDate);

        let report = RehydrationEngine::new(&dest)
            .rehydrate(&tree, tree.find(17).unwrap(), Path::new("/out/one"))
            .unwrap();

        assert!(report.is_complete());
        assert!(!report.is_fully_rehydrated());
        let outcome = report.outcome(17).unwrap();
        assert!(matches!(
            outcome.field(MetadataField::CreationDate),
            Some(FieldStatus::Failed(_))
        ));
        assert_eq!(
            outcome.field(MetadataField::ModificationDate),
            Some(&FieldStatus::Applied)
        );
    }

    #[test]
    fn test_zero_metadata_is_skipped() {
        let tree = build(CatalogFormat::Hfs, |v| {
            v.add_file(ROOT_FOLDER_ID, 16, "plain", FileSpec::with_data("x"))
                .unwrap();
        });
        let dest = MemoryDestination::new();
        let report = RehydrationEngine::new(&dest)
            .rehydrate(&tree, tree.find(16).unwrap(), Path::new("/plain"))
            .unwrap();

        let outcome = report.outcome(16).unwrap();
        assert!(outcome.field(MetadataField::ResourceFork).is_none());
        for field in [
            MetadataField::FileType,
            MetadataField::Creator,
            MetadataField::CreationDate,
        ] {
            assert_eq!(outcome.field(field), Some(&FieldStatus::Skipped));
        }
        assert_eq!(dest.get(Path::new("/plain")).unwrap().created(), None);
    }

    #[test]
    fn test_resource_fork_modes() {
        let tree = build(CatalogFormat::HfsPlus, |v| {
            let spec = FileSpec {
                resource: vec![1, 2, 3],
                ..FileSpec::with_data("x")
            };
            v.add_file(ROOT_FOLDER_ID, 16, "app", spec).unwrap();
        });
        let id = tree.find(16).unwrap();

        let dest = MemoryDestination::new();
        let report = RehydrationEngine::new(&dest)
            .rehydrate(&tree, id, Path::new("/app"))
            .unwrap();
        assert_eq!(
            report.outcome(16).unwrap().field(MetadataField::ResourceFork),
            Some(&FieldStatus::Applied)
        );
        match dest.get(Path::new("/app")).unwrap() {
            MemoryNode::File { resource_fork, .. } => assert_eq!(resource_fork, vec![1, 2, 3]),
            other => panic!("expected file, got {:?}", other),
        }

        let skipping = MemoryDestination::new();
        let options = RehydrationOptions {
            resource_forks: ResourceForkMode::Skip,
            apply_metadata: false,
        };
        let report = RehydrationEngine::with_options(&skipping, options)
            .rehydrate(&tree, id, Path::new("/app"))
            .unwrap();
        let outcome = report.outcome(16).unwrap();
        assert_eq!(
            outcome.field(MetadataField::ResourceFork),
            Some(&FieldStatus::Skipped)
        );
        assert!(outcome.field(MetadataField::FileType).is_none());
    }

    #[test]
    fn test_sanitized_name_collisions_are_disambiguated() {
        let tree = build(CatalogFormat::HfsPlus, |v| {
            v.add_file(ROOT_FOLDER_ID, 16, "a/b", FileSpec::with_data("1"))
                .unwrap();
            v.add_file(ROOT_FOLDER_ID, 17, "a:b", FileSpec::with_data("2"))
                .unwrap();
        });
        let dest = MemoryDestination::new();
        RehydrationEngine::new(&dest)
            .rehydrate(&tree, tree.root(), Path::new("/vol"))
            .unwrap();

        assert!(dest.contains(Path::new("/vol/a:b")));
        assert!(dest.contains(Path::new("/vol/a:b (17)")));
    }

    #[test]
    fn test_disambiguated_name_never_reuses_a_sibling_name() {
        // "x\0" sanitizes to "x" and its first fallback, "x (18)", is also taken.
        let tree = build(CatalogFormat::HfsPlus, |v| {
            v.add_file(ROOT_FOLDER_ID, 16, "x", FileSpec::with_data("plain"))
                .unwrap();
            v.add_file(ROOT_FOLDER_ID, 17, "x (18)", FileSpec::with_data("literal"))
                .unwrap();
            v.add_file(ROOT_FOLDER_ID, 18, "x\0", FileSpec::with_data("nul"))
                .unwrap();
        });
        let dest = MemoryDestination::new();
        let report = RehydrationEngine::new(&dest)
            .rehydrate(&tree, tree.root(), Path::new("/vol"))
            .unwrap();

        assert_eq!(report.attempted(), 4);
        let mut contents: Vec<Vec<u8>> = dest
            .paths()
            .iter()
            .filter_map(|path| dest.get(path).and_then(|node| node.data().map(<[u8]>::to_vec)))
            .collect();
        contents.sort();
        assert_eq!(
            contents,
            vec![b"literal".to_vec(), b"nul".to_vec(), b"plain".to_vec()]
        );
        assert_eq!(dest.len(), 4);
    }

    #[test]
    fn test_failed_directory_skips_its_children() {
        let tree = build(CatalogFormat::Hfs, three_files);
        let dest = MemoryDestination::new();
        dest.fail_at("/vol/Docs");

        let err = RehydrationEngine::new(&dest)
            .rehydrate(&tree, tree.root(), Path::new("/vol"))
            .unwrap_err();
        let report = err.report();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].node_id, 16);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].node_id, ROOT_FOLDER_ID);
    }

    #[test]
    fn test_rehydrating_twice_gives_the_same_result() {
        let tree = build(CatalogFormat::HfsPlus, three_files);
        let dest = MemoryDestination::new();
        let engine = RehydrationEngine::new(&dest);
        let first = engine.rehydrate(&tree, tree.root(), Path::new("/vol")).unwrap();
        let paths = dest.paths();
        let second = engine.rehydrate(&tree, tree.root(), Path::new("/vol")).unwrap();
        assert_eq!(first, second);
        assert_eq!(paths, dest.paths());
    }
}
