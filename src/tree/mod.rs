//! Item tree
//!
//! Items live in a flat arena and refer to each other by `ItemId`. Parent links and child
//! lists are fixed once the tree is built.

pub mod builder;
pub mod walk;

pub use builder::{BuiltTree, TreeBuilder};
pub use walk::BreadthFirst;

use crate::error::IntegrityFault;
use crate::item::{DehydratedItem, ItemType};
use crate::types::CatalogNodeId;
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Index;

/// Index of an item within its `ItemTree`. Only meaningful for the tree that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(usize);

impl ItemId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Arena of dehydrated items rooted at one volume or standalone item.
#[derive(Debug)]
pub struct ItemTree {
    items: Vec<DehydratedItem>,
    parents: Vec<Option<ItemId>>,
    by_node_id: HashMap<CatalogNodeId, ItemId>,
    root: ItemId,
}

impl ItemTree {
    /// Wrap a single item looked up on its own. Its children stay unpopulated.
    pub fn standalone(item: DehydratedItem) -> Self {
        let mut by_node_id = HashMap::new();
        by_node_id.insert(item.node_id(), ItemId(0));
        Self {
            items: vec![item],
            parents: vec![None],
            by_node_id,
            root: ItemId(0),
        }
    }

    pub(crate) fn from_parts(
        items: Vec<DehydratedItem>,
        parents: Vec<Option<ItemId>>,
        root: ItemId,
    ) -> Self {
        let by_node_id = items
            .iter()
            .enumerate()
            .map(|(index, item)| (item.node_id(), ItemId(index)))
            .collect();
        Self {
            items,
            parents,
            by_node_id,
            root,
        }
    }

    pub fn root(&self) -> ItemId {
        self.root
    }

    pub fn root_item(&self) -> &DehydratedItem {
        &self[self.root]
    }

    pub fn get(&self, id: ItemId) -> Option<&DehydratedItem> {
        self.items.get(id.0)
    }

    pub fn find(&self, node_id: CatalogNodeId) -> Option<ItemId> {
        self.by_node_id.get(&node_id).copied()
    }

    pub fn parent(&self, id: ItemId) -> Option<ItemId> {
        self.parents.get(id.0).copied().flatten()
    }

    /// Children in catalog discovery order. Empty for files and unpopulated items.
    pub fn children(&self, id: ItemId) -> &[ItemId] {
        self.get(id)
            .and_then(DehydratedItem::children)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &DehydratedItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (ItemId(index), item))
    }

    /// Names from the volume root down to `id`, inclusive.
    ///
    /// Fails when the chain of parents ends anywhere other than the volume root, which can
    /// only happen for standalone items.
    pub fn path(&self, id: ItemId) -> Result<Vec<String>, IntegrityFault> {
        let mut names = Vec::new();
        let mut current = id;
        loop {
            let item = &self[current];
            names.push(item.name());
            match self.parent(current) {
                Some(parent) => current = parent,
                None if item.item_type() == ItemType::Volume || item.is_root_folder() => break,
                None => {
                    return Err(IntegrityFault::ParentMissing {
                        node_id: item.node_id(),
                        parent_id: item.parent_id(),
                    })
                }
            }
        }
        names.reverse();
        Ok(names)
    }
}

impl Index<ItemId> for ItemTree {
    type Output = DehydratedItem;

    fn index(&self, id: ItemId) -> &DehydratedItem {
        &self.items[id.0]
    }
}
