//! Storage abstraction for document libraries
//!
//! The creation logic only talks to the host through [`LibraryStore`].
//! Two backends ship with the crate: [`MemoryStore`] for tests and
//! embedding, and a directory-backed `FsStore` behind the `fs` feature.

#[cfg(feature = "fs")]
mod fs;
mod memory;

#[cfg(feature = "fs")]
pub use fs::{FsStore, FsStoreConfig};
pub use memory::{MemoryStore, OperationKind, StoreOperation};

use thiserror::Error;

use crate::collection::{Collection, CollectionId};
use crate::item::{ItemKind, ListItem};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// An entry with the same name already exists at the target location
    #[error("An item with the same name already exists: {path}")]
    DuplicateName { path: String },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid configuration: {setting} - {reason}")]
    InvalidConfig { setting: String, reason: String },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, StoreError::DuplicateName { .. })
    }
}

/// Operations the host must provide for item creation
///
/// All paths are absolute, `/`-separated and carry no trailing separator.
pub trait LibraryStore {
    /// Fetch a collection descriptor
    fn collection(&self, id: &CollectionId) -> Result<Collection, StoreError>;

    /// Check whether a folder exists at `path`
    fn folder_exists(&self, path: &str) -> Result<bool, StoreError>;

    /// Add a document named `name` to an existing folder.
    ///
    /// Fails with [`StoreError::DuplicateName`] when the folder already holds
    /// an entry with that name.
    fn add_file(
        &self,
        collection: &CollectionId,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> Result<ListItem, StoreError>;

    /// Add an item of `kind` named `name` under `containing_path`
    fn add_item(
        &self,
        collection: &CollectionId,
        containing_path: &str,
        kind: ItemKind,
        name: &str,
    ) -> Result<ListItem, StoreError>;

    /// Read the full binary content of the file at `path`
    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, StoreError>;

    /// Persist the item's field values, returning the stored record
    fn commit(&self, item: &ListItem) -> Result<ListItem, StoreError>;
}

/// Join a folder path and an entry name
pub(crate) fn join_path(folder: &str, name: &str) -> String {
    format!("{}/{}", folder.trim_end_matches('/'), name)
}
