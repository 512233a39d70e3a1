//! Per-item and per-field results of a rehydration pass.

use crate::destination::MetadataField;
use crate::item::ItemType;
use crate::types::CatalogNodeId;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FieldStatus {
    Applied,
    /// Not attempted: disabled by options, or nothing to apply.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldResult {
    pub field: MetadataField,
    #[serde(flatten)]
    pub status: FieldStatus,
}

impl FieldResult {
    pub fn is_failed(&self) -> bool {
        matches!(self.status, FieldStatus::Failed(_))
    }
}

/// An item that was written, with how each piece of metadata fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    pub node_id: CatalogNodeId,
    pub destination: PathBuf,
    pub kind: ItemType,
    pub fields: Vec<FieldResult>,
}

impl ItemOutcome {
    /// Written, but at least one metadata field could not be applied.
    pub fn is_degraded(&self) -> bool {
        self.fields.iter().any(FieldResult::is_failed)
    }

    pub fn field(&self, field: MetadataField) -> Option<&FieldStatus> {
        self.fields
            .iter()
            .find(|result| result.field == field)
            .map(|result| &result.status)
    }
}

/// An item whose data fork or directory could not be created at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub node_id: CatalogNodeId,
    pub destination: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RehydrationReport {
    pub outcomes: Vec<ItemOutcome>,
    pub failures: Vec<ItemFailure>,
}

impl RehydrationReport {
    pub fn attempted(&self) -> usize {
        self.outcomes.len() + self.failures.len()
    }

    /// No item failed. Metadata may still be degraded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn degraded(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.is_degraded())
    }

    /// Every item written and every metadata field applied or deliberately skipped.
    pub fn is_fully_rehydrated(&self) -> bool {
        self.is_complete() && self.degraded().next().is_none()
    }

    pub fn outcome(&self, node_id: CatalogNodeId) -> Option<&ItemOutcome> {
        self.outcomes.iter().find(|outcome| outcome.node_id == node_id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
