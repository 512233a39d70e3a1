//! Integration tests for catalog decoding, tree building and rehydration

mod config_loading;
mod local_rehydration;
mod partial_failure;
mod support;
mod tree_building;
mod version_strings;
