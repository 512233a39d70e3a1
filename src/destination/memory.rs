//! In-memory destination for dry runs and tests.
//!
//! Paths are kept verbatim in a flat map; directories are explicit nodes. Failures can be
//! injected per path (every operation on that path fails) or per metadata field.

use super::{Destination, MetadataField};
use crate::error::DestinationError;
use crate::types::FourCharCode;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// A materialized file or directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryNode {
    File {
        data: Vec<u8>,
        resource_fork: Vec<u8>,
        file_type: FourCharCode,
        creator: FourCharCode,
        created: Option<DateTime<Utc>>,
        modified: Option<DateTime<Utc>>,
    },
    Directory {
        created: Option<DateTime<Utc>>,
        modified: Option<DateTime<Utc>>,
    },
}

impl MemoryNode {
    fn new_file(data: &[u8]) -> Self {
        MemoryNode::File {
            data: data.to_vec(),
            resource_fork: Vec::new(),
            file_type: FourCharCode::ZERO,
            creator: FourCharCode::ZERO,
            created: None,
            modified: None,
        }
    }

    fn new_dir() -> Self {
        MemoryNode::Directory {
            created: None,
            modified: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, MemoryNode::Directory { .. })
    }

    /// Data fork contents; `None` for directories.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            MemoryNode::File { data, .. } => Some(data.as_slice()),
            MemoryNode::Directory { .. } => None,
        }
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        match self {
            MemoryNode::File { created, .. } | MemoryNode::Directory { created, .. } => *created,
        }
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        match self {
            MemoryNode::File { modified, .. } | MemoryNode::Directory { modified, .. } => *modified,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryDestination {
    nodes: RwLock<BTreeMap<PathBuf, MemoryNode>>,
    failing_paths: RwLock<HashSet<PathBuf>>,
    failing_fields: RwLock<HashSet<MetadataField>>,
}

impl MemoryDestination {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation on `path` fail.
    pub fn fail_at(&self, path: impl Into<PathBuf>) {
        self.failing_paths.write().insert(path.into());
    }

    /// Make every attempt to apply `field` fail, on any path.
    pub fn fail_field(&self, field: MetadataField) {
        self.failing_fields.write().insert(field);
    }

    pub fn get(&self, path: &Path) -> Option<MemoryNode> {
        self.nodes.read().get(path).cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.nodes.read().contains_key(path)
    }

    /// Every materialized path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.nodes.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    fn check_path(&self, path: &Path) -> Result<(), DestinationError> {
        if self.failing_paths.read().contains(path) {
            return Err(injected(path));
        }
        Ok(())
    }

    fn check_field(&self, path: &Path, field: MetadataField) -> Result<(), DestinationError> {
        self.check_path(path)?;
        if self.failing_fields.read().contains(&field) {
            return Err(DestinationError::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected {} failure at {}", field, path.display()),
            )));
        }
        Ok(())
    }

    fn with_node<R>(
        &self,
        path: &Path,
        update: impl FnOnce(&mut MemoryNode) -> R,
    ) -> Result<R, DestinationError> {
        let mut nodes = self.nodes.write();
        let node = nodes.get_mut(path).ok_or_else(|| {
            DestinationError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file or directory: {}", path.display()),
            ))
        })?;
        Ok(update(node))
    }

    fn with_file(
        &self,
        path: &Path,
        update: impl FnOnce(&mut Vec<u8>, &mut FourCharCode, &mut FourCharCode),
    ) -> Result<(), DestinationError> {
        self.with_node(path, |node| match node {
            MemoryNode::File {
                resource_fork,
                file_type,
                creator,
                ..
            } => {
                update(resource_fork, file_type, creator);
                Ok(())
            }
            MemoryNode::Directory { .. } => Err(DestinationError::Unsupported(
                "Finder info and resource forks on directories",
            )),
        })?
    }
}

fn injected(path: &Path) -> DestinationError {
    DestinationError::Io(io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!("injected failure at {}", path.display()),
    ))
}

impl Destination for MemoryDestination {
    fn create_directory(&self, path: &Path) -> Result<(), DestinationError> {
        self.check_path(path)?;
        let mut nodes = self.nodes.write();
        for ancestor in path.ancestors().filter(|p| !p.as_os_str().is_empty()) {
            match nodes.get(ancestor) {
                Some(node) if node.is_dir() => {}
                Some(_) => {
                    return Err(DestinationError::Io(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("file exists at {}", ancestor.display()),
                    )))
                }
                None => {
                    nodes.insert(ancestor.to_path_buf(), MemoryNode::new_dir());
                }
            }
        }
        Ok(())
    }

    fn write_data_fork(&self, path: &Path, data: &[u8]) -> Result<(), DestinationError> {
        self.check_path(path)?;
        let mut nodes = self.nodes.write();
        if nodes.get(path).is_some_and(MemoryNode::is_dir) {
            return Err(DestinationError::Io(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("directory exists at {}", path.display()),
            )));
        }
        nodes.insert(path.to_path_buf(), MemoryNode::new_file(data));
        Ok(())
    }

    fn write_resource_fork(&self, path: &Path, data: &[u8]) -> Result<(), DestinationError> {
        self.check_field(path, MetadataField::ResourceFork)?;
        self.with_file(path, |resource_fork, _, _| *resource_fork = data.to_vec())
    }

    fn set_creation_date(&self, path: &Path, date: DateTime<Utc>) -> Result<(), DestinationError> {
        self.check_field(path, MetadataField::CreationDate)?;
        self.with_node(path, |node| match node {
            MemoryNode::File { created, .. } | MemoryNode::Directory { created, .. } => {
                *created = Some(date)
            }
        })
    }

    fn set_modification_date(
        &self,
        path: &Path,
        date: DateTime<Utc>,
    ) -> Result<(), DestinationError> {
        self.check_field(path, MetadataField::ModificationDate)?;
        self.with_node(path, |node| match node {
            MemoryNode::File { modified, .. } | MemoryNode::Directory { modified, .. } => {
                *modified = Some(date)
            }
        })
    }

    fn set_type_code(&self, path: &Path, code: FourCharCode) -> Result<(), DestinationError> {
        self.check_field(path, MetadataField::FileType)?;
        self.with_file(path, |_, file_type, _| *file_type = code)
    }

    fn set_creator_code(&self, path: &Path, code: FourCharCode) -> Result<(), DestinationError> {
        self.check_field(path, MetadataField::Creator)?;
        self.with_file(path, |_, _, creator| *creator = code)
    }
}
