//! In-memory library store for testing and embedding

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use time::OffsetDateTime;

use super::{LibraryStore, StoreError, join_path};
use crate::collection::{Collection, CollectionId};
use crate::item::{ItemKind, ListItem};

/// Which store operation a recorded call or injected failure refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Collection,
    FolderExists,
    AddFile,
    AddItem,
    FetchBytes,
    Commit,
}

/// A call served by the store, recorded for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOperation {
    Collection(CollectionId),
    FolderExists(String),
    AddFile { folder: String, name: String },
    AddItem { containing_path: String, kind: ItemKind, name: String },
    FetchBytes(String),
    Commit(String),
}

impl StoreOperation {
    pub fn kind(&self) -> OperationKind {
        match self {
            StoreOperation::Collection(_) => OperationKind::Collection,
            StoreOperation::FolderExists(_) => OperationKind::FolderExists,
            StoreOperation::AddFile { .. } => OperationKind::AddFile,
            StoreOperation::AddItem { .. } => OperationKind::AddItem,
            StoreOperation::FetchBytes(_) => OperationKind::FetchBytes,
            StoreOperation::Commit(_) => OperationKind::Commit,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    collections: HashMap<CollectionId, Collection>,
    folders: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    items: BTreeMap<String, ListItem>,
    failures: VecDeque<(OperationKind, StoreError)>,
    operations: Vec<StoreOperation>,
}

impl MemoryState {
    /// Record the call and hand back an injected failure for it, if any
    fn begin(&mut self, operation: StoreOperation) -> Result<(), StoreError> {
        let kind = operation.kind();
        self.operations.push(operation);
        match self.failures.iter().position(|(k, _)| *k == kind) {
            Some(index) => match self.failures.remove(index) {
                Some((_, error)) => Err(error),
                None => Ok(()),
            },
            None => Ok(()),
        }
    }

    fn entry_exists(&self, path: &str) -> bool {
        self.folders.contains(path) || self.files.contains_key(path)
    }
}

/// In-memory [`LibraryStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("Lock poisoned".into()))
    }

    /// Register a collection and create its root folder
    pub fn add_collection(&self, collection: Collection) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.folders.insert(collection.root_path.clone());
        state.collections.insert(collection.id, collection);
        Ok(())
    }

    /// Create a folder and any missing ancestors, without recording an item
    pub fn seed_folder(&self, path: &str) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = join_path(&current, segment);
            state.folders.insert(current.clone());
        }
        Ok(())
    }

    /// Place raw bytes at `path`, such as a template file
    pub fn seed_file(&self, path: &str, content: impl Into<Vec<u8>>) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.files.insert(path.to_string(), content.into());
        Ok(())
    }

    /// Make the next call of `kind` fail with `error`
    pub fn fail_next(&self, kind: OperationKind, error: StoreError) -> Result<(), StoreError> {
        let mut state = self.lock()?;
        state.failures.push_back((kind, error));
        Ok(())
    }

    /// All calls served so far, in order
    pub fn operations(&self) -> Vec<StoreOperation> {
        self.lock()
            .map(|state| state.operations.clone())
            .unwrap_or_default()
    }

    /// Number of calls of `kind` served so far
    pub fn count(&self, kind: OperationKind) -> usize {
        self.operations()
            .iter()
            .filter(|op| op.kind() == kind)
            .count()
    }

    /// The committed or freshly added item at `path`
    pub fn item(&self, path: &str) -> Option<ListItem> {
        self.lock().ok()?.items.get(path).cloned()
    }

    /// Content of the file at `path`
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.lock().ok()?.files.get(path).cloned()
    }

    /// Paths of every item added to the store, sorted
    pub fn item_paths(&self) -> Vec<String> {
        self.lock()
            .map(|state| state.items.keys().cloned().collect())
            .unwrap_or_default()
    }
}

impl LibraryStore for MemoryStore {
    fn collection(&self, id: &CollectionId) -> Result<Collection, StoreError> {
        let mut state = self.lock()?;
        state.begin(StoreOperation::Collection(*id))?;
        state
            .collections
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: format!("collection {}", id),
            })
    }

    fn folder_exists(&self, path: &str) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        state.begin(StoreOperation::FolderExists(path.to_string()))?;
        Ok(state.folders.contains(path))
    }

    fn add_file(
        &self,
        collection: &CollectionId,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> Result<ListItem, StoreError> {
        let mut state = self.lock()?;
        state.begin(StoreOperation::AddFile {
            folder: folder.to_string(),
            name: name.to_string(),
        })?;

        if !state.folders.contains(folder) {
            return Err(StoreError::NotFound {
                path: folder.to_string(),
            });
        }
        let path = join_path(folder, name);
        if state.entry_exists(&path) {
            return Err(StoreError::DuplicateName { path });
        }

        let item = ListItem::new(*collection, ItemKind::File, path.clone());
        state.files.insert(path.clone(), content.to_vec());
        state.items.insert(path, item.clone());
        Ok(item)
    }

    fn add_item(
        &self,
        collection: &CollectionId,
        containing_path: &str,
        kind: ItemKind,
        name: &str,
    ) -> Result<ListItem, StoreError> {
        let mut state = self.lock()?;
        state.begin(StoreOperation::AddItem {
            containing_path: containing_path.to_string(),
            kind,
            name: name.to_string(),
        })?;

        if !state.folders.contains(containing_path) {
            return Err(StoreError::NotFound {
                path: containing_path.to_string(),
            });
        }
        let path = join_path(containing_path, name);
        if state.entry_exists(&path) {
            return Err(StoreError::DuplicateName { path });
        }

        let item = ListItem::new(*collection, kind, path.clone());
        match kind {
            ItemKind::Folder => {
                state.folders.insert(path.clone());
            }
            ItemKind::File => {
                state.files.insert(path.clone(), Vec::new());
            }
        }
        state.items.insert(path, item.clone());
        Ok(item)
    }

    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        let mut state = self.lock()?;
        state.begin(StoreOperation::FetchBytes(path.to_string()))?;
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                path: path.to_string(),
            })
    }

    fn commit(&self, item: &ListItem) -> Result<ListItem, StoreError> {
        let mut state = self.lock()?;
        state.begin(StoreOperation::Commit(item.path.clone()))?;

        let stored = state
            .items
            .get_mut(&item.path)
            .ok_or_else(|| StoreError::NotFound {
                path: item.path.clone(),
            })?;
        *stored = item.clone();
        stored.modified_at = OffsetDateTime::now_utc();
        Ok(stored.clone())
    }
}
