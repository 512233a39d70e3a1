//! Error types for catalog decoding, tree construction, fork access, and rehydration.

use crate::rehydrate::RehydrationReport;
use crate::types::{CatalogNodeId, ForkType};
use serde::Serialize;
use thiserror::Error;

/// A single catalog entry could not be decoded.
///
/// Fatal to that entry only; the tree builder records it and keeps going.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum DecodeFault {
    #[error("catalog key truncated: need {needed} bytes, have {actual}")]
    TruncatedKey { needed: usize, actual: usize },

    #[error("catalog record truncated: need {needed} bytes, have {actual}")]
    TruncatedRecord { needed: usize, actual: usize },

    #[error("record length {actual} does not match the {format} {kind} layout ({expected} bytes)")]
    LengthMismatch {
        format: &'static str,
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("record stores node ID {stored} but was looked up as {expected}")]
    NodeIdMismatch {
        expected: CatalogNodeId,
        stored: CatalogNodeId,
    },

    #[error("record type {0:#06x} is not a file or folder record")]
    UnsupportedRecordType(u16),

    #[error("name length {length} exceeds the key's maximum of {max}")]
    NameTooLong { length: usize, max: usize },
}

/// A catalog entry the tree builder skipped because it did not decode.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("catalog entry {node_id} skipped: {fault}")]
pub struct SkippedEntry {
    pub node_id: CatalogNodeId,
    pub fault: DecodeFault,
}

/// A decoded item could not be placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum IntegrityFault {
    #[error("node {node_id} refers to parent {parent_id}, which is not in the catalog")]
    ParentMissing {
        node_id: CatalogNodeId,
        parent_id: CatalogNodeId,
    },

    #[error("node {node_id} refers to parent {parent_id}, which is a file")]
    ParentNotFolder {
        node_id: CatalogNodeId,
        parent_id: CatalogNodeId,
    },

    #[error("node ID {node_id} appears more than once in the catalog")]
    DuplicateNodeId { node_id: CatalogNodeId },

    #[error("node {node_id} is not reachable from the root folder")]
    Unreachable { node_id: CatalogNodeId },
}

impl IntegrityFault {
    pub fn node_id(&self) -> CatalogNodeId {
        match self {
            IntegrityFault::ParentMissing { node_id, .. }
            | IntegrityFault::ParentNotFolder { node_id, .. }
            | IntegrityFault::DuplicateNodeId { node_id }
            | IntegrityFault::Unreachable { node_id } => *node_id,
        }
    }
}

/// Errors reported by a source volume collaborator.
#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("volume I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no {fork:?} fork stored for node {node_id}")]
    ForkUnavailable {
        node_id: CatalogNodeId,
        fork: ForkType,
    },

    #[error("volume error: {0}")]
    Other(String),
}

/// Tree construction could not produce a root at all.
#[derive(Debug, Error)]
pub enum TreeBuildError {
    #[error("failed to enumerate catalog: {0}")]
    Enumeration(#[from] VolumeError),

    #[error("catalog has no folder record for root folder ID {0}")]
    MissingRoot(CatalogNodeId),

    #[error("{} catalog entries could not be decoded", .0.len())]
    Undecodable(Vec<SkippedEntry>),

    #[error("tree has {} integrity faults", .0.len())]
    Integrity(Vec<IntegrityFault>),
}

/// Errors raised while reading a fork through the owning volume.
#[derive(Debug, Error)]
pub enum ForkError {
    #[error("source volume for node {0} is no longer available")]
    VolumeUnavailable(CatalogNodeId),

    #[error("failed to read {fork:?} fork of node {node_id}: {source}")]
    Read {
        node_id: CatalogNodeId,
        fork: ForkType,
        #[source]
        source: VolumeError,
    },

    #[error("{fork:?} fork of node {node_id} returned {actual} bytes, expected {expected}")]
    LengthMismatch {
        node_id: CatalogNodeId,
        fork: ForkType,
        expected: u64,
        actual: u64,
    },
}

/// Malformed resource fork structures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceForkError {
    #[error("resource fork too short for its header ({0} bytes)")]
    TruncatedHeader(usize),

    #[error("resource {what} at offset {offset} runs past the end of the fork")]
    OutOfBounds { what: &'static str, offset: usize },

    #[error("version resource too short ({0} bytes)")]
    TruncatedVersion(usize),
}

/// Failure reported by a destination filesystem.
#[derive(Debug, Error)]
pub enum DestinationError {
    #[error("destination I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not supported by this destination: {0}")]
    Unsupported(&'static str),
}

/// A rehydration pass finished with at least one failed item.
#[derive(Debug, Error)]
pub enum RehydrationError {
    #[error("rehydration incomplete: {} of {} items failed", .0.failures.len(), .0.attempted())]
    Incomplete(Box<RehydrationReport>),
}

impl RehydrationError {
    pub fn report(&self) -> &RehydrationReport {
        match self {
            RehydrationError::Incomplete(report) => report,
        }
    }
}

/// A character cannot be represented in the requested legacy encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("character {character:?} at index {index} is not representable in {encoding}")]
    Unrepresentable {
        character: char,
        index: usize,
        encoding: String,
    },

    #[error("name is {length} bytes after encoding; at most {max} fit")]
    TooLong { length: usize, max: usize },
}

/// Configuration and logging set-up errors.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    ConfigError(String),
}
