//! TreeBuilder: one pass over the catalog into an arena, then parent links by node ID.

use super::{ItemId, ItemTree};
use crate::error::{IntegrityFault, SkippedEntry, TreeBuildError};
use crate::item::{DehydratedItem, ItemType};
use crate::types::CatalogNodeId;
use crate::volume::SourceVolume;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A built tree plus everything that could not be placed in it.
///
/// The tree holds exactly the items reachable from the root. Every other catalog entry
/// appears in `skipped` or `faults`.
#[derive(Debug)]
pub struct BuiltTree {
    pub tree: ItemTree,
    /// Entries that failed to decode.
    pub skipped: Vec<SkippedEntry>,
    /// Decoded items that could not be attached under the root.
    pub faults: Vec<IntegrityFault>,
}

impl BuiltTree {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty() && self.faults.is_empty()
    }

    /// The tree, or an error if any entry was skipped or left unattached.
    pub fn into_strict(self) -> Result<ItemTree, TreeBuildError> {
        if !self.skipped.is_empty() {
            return Err(TreeBuildError::Undecodable(self.skipped));
        }
        if !self.faults.is_empty() {
            return Err(TreeBuildError::Integrity(self.faults));
        }
        Ok(self.tree)
    }

    /// The lenient tree when `allow_partial`, otherwise [`BuiltTree::into_strict`].
    pub fn into_tree(self, allow_partial: bool) -> Result<ItemTree, TreeBuildError> {
        if !allow_partial {
            return self.into_strict();
        }
        if !self.is_complete() {
            warn!(
                skipped = self.skipped.len(),
                faults = self.faults.len(),
                "Continuing with a partial tree"
            );
        }
        Ok(self.tree)
    }
}

pub struct TreeBuilder;

impl TreeBuilder {
    /// Enumerate the volume's catalog once and assemble it under the root folder.
    ///
    /// Undecodable entries and unattachable items are reported, not fatal. Only a failed
    /// enumeration or a missing root folder aborts the build.
    pub fn build(volume: &Arc<dyn SourceVolume>) -> Result<BuiltTree, TreeBuildError> {
        let entries = volume.catalog_entries()?;
        let root_id = volume.root_folder_id();
        debug!(
            volume = volume.volume_name_hint().as_deref().unwrap_or("unnamed"),
            entries = entries.len(),
            "Building item tree"
        );

        let mut skipped = Vec::new();
        let mut faults = Vec::new();
        let mut items: Vec<DehydratedItem> = Vec::with_capacity(entries.len());
        let mut index: HashMap<CatalogNodeId, usize> = HashMap::with_capacity(entries.len());

        for entry in entries {
            let node_id = entry.node_id;
            match DehydratedItem::from_catalog(volume, entry) {
                Ok(item) => {
                    if index.contains_key(&item.node_id()) {
                        warn!(node_id, "Duplicate catalog node ID; keeping the first entry");
                        faults.push(IntegrityFault::DuplicateNodeId { node_id });
                        continue;
                    }
                    index.insert(item.node_id(), items.len());
                    items.push(item);
                }
                Err(fault) => {
                    warn!(node_id, error = %fault, "Skipping undecodable catalog entry");
                    skipped.push(SkippedEntry { node_id, fault });
                }
            }
        }

        let root = match index.get(&root_id) {
            Some(&root) if items[root].item_type() == ItemType::Folder => root,
            _ => return Err(TreeBuildError::MissingRoot(root_id)),
        };
        items[root].promote_to_volume();

        // Attach every item to its parent, in catalog order.
        let mut parents: Vec<Option<usize>> = vec![None; items.len()];
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); items.len()];
        let mut faulted = vec![false; items.len()];
        for (position, item) in items.iter().enumerate() {
            if position == root {
                continue;
            }
            let node_id = item.node_id();
            let parent_id = item.parent_id();
            match index.get(&parent_id) {
                Some(&parent) if items[parent].is_directory() => {
                    parents[position] = Some(parent);
                    children[parent].push(position);
                }
                Some(_) => {
                    warn!(node_id, parent_id, "Parent is not a folder");
                    faults.push(IntegrityFault::ParentNotFolder { node_id, parent_id });
                    faulted[position] = true;
                }
                None => {
                    warn!(node_id, parent_id, "Parent not found in catalog");
                    faults.push(IntegrityFault::ParentMissing { node_id, parent_id });
                    faulted[position] = true;
                }
            }
        }

        let mut reachable = vec![false; items.len()];
        let mut queue = VecDeque::from([root]);
        reachable[root] = true;
        while let Some(position) = queue.pop_front() {
            for &child in &children[position] {
                if !reachable[child] {
                    reachable[child] = true;
                    queue.push_back(child);
                }
            }
        }
        for (position, item) in items.iter().enumerate() {
            if !reachable[position] && !faulted[position] {
                warn!(node_id = item.node_id(), "Item is not reachable from the root");
                faults.push(IntegrityFault::Unreachable {
                    node_id: item.node_id(),
                });
            }
        }

        let tree = Self::compact(items, &parents, &children, &reachable, root);
        info!(
            items = tree.len(),
            skipped = skipped.len(),
            faults = faults.len(),
            "Built item tree"
        );
        Ok(BuiltTree {
            tree,
            skipped,
            faults,
        })
    }

    /// Drop unreachable items and renumber the rest, keeping catalog order.
    fn compact(
        items: Vec<DehydratedItem>,
        parents: &[Option<usize>],
        children: &[Vec<usize>],
        reachable: &[bool],
        root: usize,
    ) -> ItemTree {
        let mut renumbered: Vec<Option<ItemId>> = vec![None; items.len()];
        let mut next = 0;
        for (position, &keep) in reachable.iter().enumerate() {
            if keep {
                renumbered[position] = Some(ItemId(next));
                next += 1;
            }
        }

        let mut kept = Vec::with_capacity(next);
        let mut kept_parents = Vec::with_capacity(next);
        for (position, mut item) in items.into_iter().enumerate() {
            if !reachable[position] {
                continue;
            }
            if item.is_directory() {
                let ids = children[position]
                    .iter()
                    .filter_map(|&child| renumbered[child])
                    .collect();
                item.set_children(ids);
            }
            kept_parents.push(parents[position].and_then(|parent| renumbered[parent]));
            kept.push(item);
        }

        let root = renumbered[root].unwrap_or(ItemId(0));
        ItemTree::from_parts(kept, kept_parents, root)
    }
}
