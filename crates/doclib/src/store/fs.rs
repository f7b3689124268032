use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::{LibraryStore, StoreError, join_path};
use crate::collection::{Collection, CollectionId};
use crate::item::{ItemKind, ListItem};

/// Configuration for a directory-backed store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsStoreConfig {
    /// Directory holding collections, content and item records
    pub root: PathBuf,

    /// Create the root directory when it does not exist
    pub create_missing: bool,
}

impl FsStoreConfig {
    /// Load configuration from `DOCLIB_STORE_ROOT` and `DOCLIB_STORE_CREATE`
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let defaults = Self::default();
        let root = lookup("DOCLIB_STORE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.root);
        let create_missing = match lookup("DOCLIB_STORE_CREATE") {
            None => defaults.create_missing,
            Some(value) => match value.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(StoreError::InvalidConfig {
                        setting: "DOCLIB_STORE_CREATE".to_string(),
                        reason: format!("expected true or false, got '{}'", value),
                    });
                }
            },
        };
        Ok(Self {
            root,
            create_missing,
        })
    }
}

impl Default for FsStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("doclib-data"),
            create_missing: true,
        }
    }
}

/// Directory-backed [`LibraryStore`]
///
/// Layout under the root:
/// - `collections/<id>.json` collection descriptors
/// - `data/<path>` folders and document bytes
/// - `items/<path>.json` item records
#[derive(Debug, Clone)]
pub struct FsStore {
    base_path: PathBuf,
}

impl FsStore {
    /// Open a store, creating its layout if needed
    pub fn open(config: &FsStoreConfig) -> Result<Self, StoreError> {
        if !config.root.exists() && !config.create_missing {
            return Err(StoreError::InvalidConfig {
                setting: "root".to_string(),
                reason: format!("{} does not exist", config.root.display()),
            });
        }

        let store = Self {
            base_path: config.root.clone(),
        };
        for dir in ["collections", "data", "items"] {
            fs::create_dir_all(store.base_path.join(dir))?;
        }
        debug!(root = %store.base_path.display(), "opened fs store");
        Ok(store)
    }

    /// Open a store at `root`, creating it if needed
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open(&FsStoreConfig {
            root: root.as_ref().to_path_buf(),
            create_missing: true,
        })
    }

    /// Save a collection descriptor and create its root folder
    pub fn register_collection(&self, collection: &Collection) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(collection)?;
        fs::write(self.collection_file(&collection.id), json)?;
        fs::create_dir_all(self.data_path(&collection.root_path)?)?;
        Ok(())
    }

    /// Create a folder and its ancestors without recording an item
    pub fn seed_folder(&self, path: &str) -> Result<(), StoreError> {
        fs::create_dir_all(self.data_path(path)?)?;
        Ok(())
    }

    /// Write raw bytes at `path`, such as a template file
    pub fn seed_file(&self, path: &str, content: &[u8]) -> Result<(), StoreError> {
        let target = self.data_path(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, content)?;
        Ok(())
    }

    /// Read the stored record of the item at `path`
    pub fn item(&self, path: &str) -> Result<ListItem, StoreError> {
        let record = self.item_file(path)?;
        let json = fs::read_to_string(&record).map_err(|e| map_io(e, path))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn collection_file(&self, id: &CollectionId) -> PathBuf {
        self.base_path.join("collections").join(format!("{}.json", id))
    }

    fn data_path(&self, path: &str) -> Result<PathBuf, StoreError> {
        Ok(self.base_path.join("data").join(relative(path)?))
    }

    fn item_file(&self, path: &str) -> Result<PathBuf, StoreError> {
        let mut file = self.base_path.join("items").join(relative(path)?).into_os_string();
        file.push(".json");
        Ok(PathBuf::from(file))
    }

    fn write_item(&self, item: &ListItem) -> Result<(), StoreError> {
        let record = self.item_file(&item.path)?;
        if let Some(parent) = record.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(record, serde_json::to_string_pretty(item)?)?;
        Ok(())
    }

    fn require_folder(&self, path: &str) -> Result<PathBuf, StoreError> {
        let dir = self.data_path(path)?;
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(StoreError::NotFound {
                path: path.to_string(),
            })
        }
    }
}

impl LibraryStore for FsStore {
    fn collection(&self, id: &CollectionId) -> Result<Collection, StoreError> {
        let json = fs::read_to_string(self.collection_file(id))
            .map_err(|e| map_io(e, &format!("collection {}", id)))?;
        Ok(serde_json::from_str(&json)?)
    }

    fn folder_exists(&self, path: &str) -> Result<bool, StoreError> {
        Ok(self.data_path(path)?.is_dir())
    }

    fn add_file(
        &self,
        collection: &CollectionId,
        folder: &str,
        name: &str,
        content: &[u8],
    ) -> Result<ListItem, StoreError> {
        validate_name(name)?;
        let dir = self.require_folder(folder)?;
        let path = join_path(folder, name);

        let target = dir.join(name);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
            .map_err(|e| map_io(e, &path))?;

        let item = ListItem::new(*collection, ItemKind::File, path);
        let written = file
            .write_all(content)
            .map_err(StoreError::from)
            .and_then(|()| self.write_item(&item));
        drop(file);
        if let Err(err) = written {
            discard(&target, ItemKind::File);
            return Err(err);
        }
        Ok(item)
    }

    fn add_item(
        &self,
        collection: &CollectionId,
        containing_path: &str,
        kind: ItemKind,
        name: &str,
    ) -> Result<ListItem, StoreError> {
        validate_name(name)?;
        let dir = self.require_folder(containing_path)?;
        let path = join_path(containing_path, name);
        let target = dir.join(name);

        match kind {
            ItemKind::Folder => {
                fs::create_dir(&target).map_err(|e| map_io(e, &path))?;
            }
            ItemKind::File => {
                fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&target)
                    .map_err(|e| map_io(e, &path))?;
            }
        }

        let item = ListItem::new(*collection, kind, path);
        if let Err(err) = self.write_item(&item) {
            discard(&target, kind);
            return Err(err);
        }
        Ok(item)
    }

    fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, StoreError> {
        fs::read(self.data_path(path)?).map_err(|e| map_io(e, path))
    }

    fn commit(&self, item: &ListItem) -> Result<ListItem, StoreError> {
        let record = self.item_file(&item.path)?;
        if !record.is_file() {
            return Err(StoreError::NotFound {
                path: item.path.clone(),
            });
        }

        let mut stored = item.clone();
        stored.modified_at = OffsetDateTime::now_utc();
        self.write_item(&stored)?;
        Ok(stored)
    }
}

/// Turn an absolute library path into a relative filesystem path
fn relative(path: &str) -> Result<PathBuf, StoreError> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let mut relative = PathBuf::new();
    if trimmed.is_empty() {
        return Ok(relative);
    }
    for segment in trimmed.split('/') {
        validate_name(segment).map_err(|_| StoreError::InvalidPath(path.to_string()))?;
        relative.push(segment);
    }
    Ok(relative)
}

/// Remove an entry whose item record could not be written
fn discard(target: &Path, kind: ItemKind) {
    let removed = match kind {
        ItemKind::Folder => fs::remove_dir(target),
        ItemKind::File => fs::remove_file(target),
    };
    if let Err(err) = removed {
        warn!(path = %target.display(), error = %err, "failed to remove partial entry");
    }
}

fn validate_name(name: &str) -> Result<(), StoreError> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(StoreError::InvalidPath(name.to_string()));
    }
    Ok(())
}

fn map_io(error: io::Error, path: &str) -> StoreError {
    match error.kind() {
        io::ErrorKind::NotFound => StoreError::NotFound {
            path: path.to_string(),
        },
        io::ErrorKind::AlreadyExists => StoreError::DuplicateName {
            path: path.to_string(),
        },
        io::ErrorKind::PermissionDenied => StoreError::AccessDenied(path.to_string()),
        _ => StoreError::Io(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_from_vars() {
        let config = FsStoreConfig::from_vars(|key| match key {
            "DOCLIB_STORE_ROOT" => Some("/var/lib/doclib".to_string()),
            "DOCLIB_STORE_CREATE" => Some("no".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.root, PathBuf::from("/var/lib/doclib"));
        assert!(!config.create_missing);

        let defaults = FsStoreConfig::from_vars(|_| None).unwrap();
        assert_eq!(defaults.root, PathBuf::from("doclib-data"));
        assert!(defaults.create_missing);

        let err = FsStoreConfig::from_vars(|key| {
            (key == "DOCLIB_STORE_CREATE").then(|| "maybe".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, StoreError::InvalidConfig { .. }));
    }

    #[test]
    fn test_open_refuses_missing_root_without_create() {
        let temp_dir = tempdir().unwrap();
        let config = FsStoreConfig {
            root: temp_dir.path().join("absent"),
            create_missing: false,
        };
        assert!(matches!(
            FsStore::open(&config),
            Err(StoreError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_relative_rejects_traversal() {
        assert!(relative("/Docs/../etc").is_err());
        assert!(relative("/Docs//a").is_err());
        assert_eq!(relative("/Docs/a").unwrap(), PathBuf::from("Docs").join("a"));
        assert_eq!(relative("/").unwrap(), PathBuf::new());
    }

    #[test]
    fn test_file_lifecycle() {
        let temp_dir = tempdir().unwrap();
        let store = FsStore::new(temp_dir.path()).unwrap();
        let library = Collection::document_library("Docs", "/Docs");
        store.register_collection(&library).unwrap();

        assert_eq!(store.collection(&library.id).unwrap(), library);
        assert!(store.folder_exists("/Docs").unwrap());

        let mut item = store
            .add_file(&library.id, "/Docs", "notes.txt", b"hello")
            .unwrap();
        assert_eq!(store.fetch_bytes("/Docs/notes.txt").unwrap(), b"hello");

        let err = store
            .add_file(&library.id, "/Docs", "notes.txt", b"again")
            .unwrap_err();
        assert!(err.is_duplicate_name());

        item.set("Title", "Notes");
        store.commit(&item).unwrap();
        let stored = store.item("/Docs/notes.txt").unwrap();
        assert_eq!(stored.fields, item.fields);
        assert_eq!(stored.id, item.id);
    }

    #[test]
    fn test_failed_record_write_leaves_no_entry() {
        let temp_dir = tempdir().unwrap();
        let store = FsStore::new(temp_dir.path()).unwrap();
        let library = Collection::document_library("Docs", "/Docs");
        store.register_collection(&library).unwrap();

        // A directory where the record file belongs makes the record write fail
        let items = temp_dir.path().join("items").join("Docs");
        fs::create_dir_all(items.join("notes.txt.json")).unwrap();
        fs::create_dir_all(items.join("Mike.json")).unwrap();

        assert!(
            store
                .add_file(&library.id, "/Docs", "notes.txt", b"hello")
                .is_err()
        );
        assert!(!temp_dir.path().join("data/Docs/notes.txt").exists());

        assert!(
            store
                .add_item(&library.id, "/Docs", ItemKind::Folder, "Mike")
                .is_err()
        );
        assert!(!store.folder_exists("/Docs/Mike").unwrap());

        fs::remove_dir(items.join("notes.txt.json")).unwrap();
        let item = store
            .add_file(&library.id, "/Docs", "notes.txt", b"hello")
            .unwrap();
        assert_eq!(item.path, "/Docs/notes.txt");
        assert_eq!(store.fetch_bytes("/Docs/notes.txt").unwrap(), b"hello");
    }

    #[test]
    fn test_add_folder_item() {
        let temp_dir = tempdir().unwrap();
        let store = FsStore::new(temp_dir.path()).unwrap();
        let library = Collection::document_library("Docs", "/Docs");
        store.register_collection(&library).unwrap();

        let folder = store
            .add_item(&library.id, "/Docs", ItemKind::Folder, "Mike")
            .unwrap();
        assert!(folder.is_folder());
        assert!(store.folder_exists("/Docs/Mike").unwrap());

        let err = store
            .add_item(&library.id, "/Docs", ItemKind::Folder, "Mike")
            .unwrap_err();
        assert!(err.is_duplicate_name());

        let err = store
            .add_item(&library.id, "/Nowhere", ItemKind::Folder, "x")
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
