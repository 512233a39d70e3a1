//! Breadth-first traversal, as a lazy iterator or a callback.

use super::{ItemId, ItemTree};
use crate::item::DehydratedItem;
use std::collections::VecDeque;

/// Level-order iterator yielding `(depth, id)`, starting with the start item at depth 0.
///
/// Starting from a file yields nothing.
pub struct BreadthFirst<'a> {
    tree: &'a ItemTree,
    queue: VecDeque<(usize, ItemId)>,
}

impl Iterator for BreadthFirst<'_> {
    type Item = (usize, ItemId);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, id) = self.queue.pop_front()?;
        self.queue
            .extend(self.tree.children(id).iter().map(|&child| (depth + 1, child)));
        Some((depth, id))
    }
}

impl ItemTree {
    pub fn breadth_first(&self, start: ItemId) -> BreadthFirst<'_> {
        let mut queue = VecDeque::new();
        if self.get(start).is_some_and(DehydratedItem::is_directory) {
            queue.push_back((0, start));
        }
        BreadthFirst { tree: self, queue }
    }

    /// Call `visit(depth, item)` once per item in level order. A no-op when `start` is a
    /// file.
    pub fn walk_breadth_first(&self, start: ItemId, mut visit: impl FnMut(usize, &DehydratedItem)) {
        for (depth, id) in self.breadth_first(start) {
            visit(depth, &self[id]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogFormat;
    use crate::encoding::TextEncoding;
    use crate::tree::TreeBuilder;
    use crate::types::ROOT_FOLDER_ID;
    use crate::volume::{FileSpec, FolderSpec, MemorySourceVolume, SourceVolume};
    use std::sync::Arc;

    fn tree() -> ItemTree {
        let mut volume =
            MemorySourceVolume::with_root(CatalogFormat::HfsPlus, TextEncoding::MacRoman, "Disk")
                .unwrap();
        volume
            .add_folder(ROOT_FOLDER_ID, 16, "A", FolderSpec::default())
            .unwrap();
        volume.add_file(ROOT_FOLDER_ID, 17, "B", FileSpec::default()).unwrap();
        volume.add_folder(16, 18, "A1", FolderSpec::default()).unwrap();
        volume.add_file(18, 19, "A1a", FileSpec::default()).unwrap();
        volume.add_file(16, 20, "A2", FileSpec::default()).unwrap();
        let volume: Arc<dyn SourceVolume> = Arc::new(volume);
        TreeBuilder::build(&volume).unwrap().tree
    }

    #[test]
    fn test_level_order_with_depths() {
        let tree = tree();
        let mut visited = Vec::new();
        tree.walk_breadth_first(tree.root(), |depth, item| visited.push((depth, item.name())));
        let expected: Vec<(usize, String)> = [
            (0, "Disk"),
            (1, "A"),
            (1, "B"),
            (2, "A1"),
            (2, "A2"),
            (3, "A1a"),
        ]
        .into_iter()
        .map(|(depth, name)| (depth, name.to_string()))
        .collect();
        assert_eq!(visited, expected);
    }

    #[test]
    fn test_iterator_is_restartable() {
        let tree = tree();
        let first: Vec<_> = tree.breadth_first(tree.root()).collect();
        let second: Vec<_> = tree.breadth_first(tree.root()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), tree.len());
    }

    #[test]
    fn test_walk_from_file_is_a_no_op() {
        let tree = tree();
        let file = tree.find(17).unwrap();
        let mut calls = 0;
        tree.walk_breadth_first(file, |_, _| calls += 1);
        assert_eq!(calls, 0);
        assert_eq!(tree.breadth_first(file).count(), 0);
    }

    #[test]
    fn test_walk_from_subfolder() {
        let tree = tree();
        let a = tree.find(16).unwrap();
        let depths: Vec<usize> = tree.breadth_first(a).map(|(depth, _)| depth).collect();
        assert_eq!(depths, vec![0, 1, 1, 2]);
    }
}
