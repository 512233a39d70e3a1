//! HFS Rehydrate: Dehydrated Catalog Items and Rehydration
//!
//! Decodes HFS and HFS+ catalog records into dehydrated items, links them into a tree
//! rooted at the volume's root folder, and materializes items, folders or whole volumes on
//! a modern filesystem with their forks, type and creator codes, and dates.

pub mod catalog;
pub mod config;
pub mod dates;
pub mod destination;
pub mod encoding;
pub mod error;
pub mod fork;
pub mod item;
pub mod logging;
pub mod rehydrate;
pub mod tree;
pub mod types;
pub mod volume;

pub use catalog::adapter::CatalogRecordAdapter;
pub use catalog::{CatalogFormat, RawCatalogEntry};
pub use destination::{Destination, LocalFilesystem, MemoryDestination, MetadataField};
pub use encoding::{NameCodec, TextEncoding};
pub use fork::{ForkReader, VersionResource, VersionResourceParser};
pub use item::{DehydratedItem, ItemType};
pub use rehydrate::{RehydrationEngine, RehydrationOptions, RehydrationReport, ResourceForkMode};
pub use tree::builder::{BuiltTree, TreeBuilder};
pub use tree::{ItemId, ItemTree};
pub use volume::{MemorySourceVolume, SourceVolume};
