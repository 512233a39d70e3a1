//! Dehydrated items
//!
//! A `DehydratedItem` is one catalog entry (file, folder, or the volume root) held in memory
//! independent of the catalog format that produced it. Names and dates are derived on every
//! call from the stored bytes, so a change to the volume's text encoding shows up the next
//! time `name()` is asked.

use crate::catalog::{
    AdaptedRecord, CatalogFields, CatalogFormat, CatalogRecord, CatalogRecordAdapter,
    RawCatalogEntry, RecordKind,
};
use crate::dates::from_legacy_timestamp;
use crate::encoding::TextEncoding;
use crate::error::{DecodeFault, ForkError};
use crate::fork::{ForkReader, VersionResource, VersionResourceParser};
use crate::tree::ItemId;
use crate::types::{CatalogNodeId, FourCharCode, ForkType, ROOT_PARENT_ID};
use crate::volume::SourceVolume;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

/// What an item represents. `Volume` is reserved for the root folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    File,
    Folder,
    Volume,
}

impl ItemType {
    pub fn is_directory(self) -> bool {
        matches!(self, ItemType::Folder | ItemType::Volume)
    }
}

/// One catalog entry, decoded but not yet materialized.
pub struct DehydratedItem {
    volume: Weak<dyn SourceVolume>,
    entry: RawCatalogEntry,
    record: CatalogRecord,
    fields: CatalogFields,
    item_type: ItemType,
    children: Option<Vec<ItemId>>,
}

impl DehydratedItem {
    /// Decode a single catalog entry.
    ///
    /// Folders, the root folder included, come out as `ItemType::Folder`; only a tree build
    /// promotes its root to `ItemType::Volume`. Items built here have no children until a
    /// tree build assigns them.
    pub fn from_catalog(
        volume: &Arc<dyn SourceVolume>,
        entry: RawCatalogEntry,
    ) -> Result<Self, DecodeFault> {
        let AdaptedRecord { record, fields } = CatalogRecordAdapter::adapt(&entry)?;
        let item_type = match fields.kind {
            RecordKind::File => ItemType::File,
            RecordKind::Folder => ItemType::Folder,
        };
        Ok(Self {
            volume: Arc::downgrade(volume),
            entry,
            record,
            fields,
            item_type,
            children: None,
        })
    }

    pub fn node_id(&self) -> CatalogNodeId {
        self.fields.node_id
    }

    pub fn parent_id(&self) -> CatalogNodeId {
        self.fields.parent_id
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    pub fn is_directory(&self) -> bool {
        self.item_type.is_directory()
    }

    pub fn is_file(&self) -> bool {
        self.item_type == ItemType::File
    }

    /// The owning volume, if it is still alive.
    pub fn source_volume(&self) -> Option<Arc<dyn SourceVolume>> {
        self.volume.upgrade()
    }

    /// Encoding used for legacy names right now. Falls back to Mac Roman once the volume is
    /// gone.
    pub fn text_encoding(&self) -> TextEncoding {
        self.source_volume()
            .map(|volume| volume.text_encoding())
            .unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.fields.name.decode(self.text_encoding())
    }

    pub fn creation_date(&self) -> DateTime<Utc> {
        from_legacy_timestamp(self.fields.create_date)
    }

    pub fn modification_date(&self) -> DateTime<Utc> {
        from_legacy_timestamp(self.fields.modify_date)
    }

    /// Zero for folders and volumes.
    pub fn file_type_code(&self) -> FourCharCode {
        self.fields.file_type
    }

    /// Zero for folders and volumes.
    pub fn creator_code(&self) -> FourCharCode {
        self.fields.creator
    }

    pub fn data_fork_logical_length(&self) -> u64 {
        self.fields.data_fork_length
    }

    pub fn resource_fork_logical_length(&self) -> u64 {
        self.fields.resource_fork_length
    }

    pub fn fork_logical_length(&self, fork: ForkType) -> u64 {
        match fork {
            ForkType::Data => self.data_fork_logical_length(),
            ForkType::Resource => self.resource_fork_logical_length(),
        }
    }

    pub fn format(&self) -> CatalogFormat {
        self.entry.format
    }

    /// Catalog key exactly as read.
    pub fn raw_key(&self) -> &[u8] {
        &self.entry.key
    }

    /// File or folder record exactly as read.
    pub fn raw_record(&self) -> &[u8] {
        &self.entry.record
    }

    /// Typed view of the key and record, for format-specific fields.
    pub fn record(&self) -> &CatalogRecord {
        &self.record
    }

    pub fn fields(&self) -> &CatalogFields {
        &self.fields
    }

    /// `None` when the item was not built as part of a tree, or is a file.
    pub fn children(&self) -> Option<&[ItemId]> {
        self.children.as_deref()
    }

    /// Whether this is the volume's root folder record, whatever its current type.
    pub fn is_root_folder(&self) -> bool {
        self.fields.kind == RecordKind::Folder && self.parent_id() == ROOT_PARENT_ID
    }

    pub(crate) fn promote_to_volume(&mut self) {
        self.item_type = ItemType::Volume;
    }

    pub(crate) fn set_children(&mut self, children: Vec<ItemId>) {
        self.children = Some(children);
    }

    /// Version resource from the resource fork, if there is one and it parses.
    pub fn version_resource(&self) -> Result<Option<VersionResource>, ForkError> {
        if self.resource_fork_logical_length() == 0 {
            return Ok(None);
        }
        Ok(ForkReader::read(self, ForkType::Resource)?
            .and_then(|fork| VersionResourceParser::version_resource(&fork)))
    }

    pub fn short_version_string(&self) -> Result<Option<String>, ForkError> {
        Ok(self.version_resource()?.map(|vers| vers.short_version))
    }

    pub fn version_string_from_version_number(&self) -> Result<Option<String>, ForkError> {
        Ok(self.version_resource()?.map(|vers| vers.number.to_string()))
    }

    pub fn long_version_string(&self) -> Result<Option<String>, ForkError> {
        Ok(self.version_resource()?.map(|vers| vers.long_version))
    }
}

impl fmt::Debug for DehydratedItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DehydratedItem")
            .field("node_id", &self.fields.node_id)
            .field("parent_id", &self.fields.parent_id)
            .field("item_type", &self.item_type)
            .field("format", &self.entry.format)
            .field("name", &self.name())
            .field("children", &self.children)
            .finish()
    }
}
