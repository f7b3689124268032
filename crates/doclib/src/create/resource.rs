//! Adding the document or folder entry to the store

use tracing::{debug, warn};

use super::path::{create_unique_name, create_unique_path, split_path};
use crate::clock::Clock;
use crate::collection::Collection;
use crate::error::{DocLibError, Result};
use crate::item::{ItemKind, ListItem};
use crate::store::LibraryStore;

/// Add a document at `path`.
///
/// The parent folder must already exist. When the name is taken, the add is
/// retried exactly once under a timestamped name; any other failure, or a
/// second collision, is returned as is.
pub fn create_file_item(
    store: &dyn LibraryStore,
    collection: &Collection,
    path: &str,
    content: &[u8],
    clock: &dyn Clock,
) -> Result<ListItem> {
    let (folder, name) = split_path(path, &collection.root_path);
    if !store.folder_exists(folder)? {
        return Err(DocLibError::ParentFolderNotFound {
            path: folder.to_string(),
        });
    }

    debug!(folder, name, bytes = content.len(), "adding file");
    match store.add_file(&collection.id, folder, name, content) {
        Ok(item) => Ok(item),
        Err(err) if err.is_duplicate_name() => {
            let unique = create_unique_name(name, clock.now())?;
            warn!(%path, %unique, "file name already taken, retrying under a unique name");
            Ok(store.add_file(&collection.id, folder, &unique, content)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Add a folder at `path`, renaming ahead when a folder already exists there
pub fn create_folder_item(
    store: &dyn LibraryStore,
    collection: &Collection,
    path: &str,
    clock: &dyn Clock,
) -> Result<ListItem> {
    let path = if store.folder_exists(path)? {
        let unique = create_unique_path(path, clock.now())?;
        warn!(%path, %unique, "folder already exists, creating under a unique name");
        unique
    } else {
        path.to_string()
    };

    let (containing, name) = split_path(&path, &collection.root_path);
    debug!(containing, name, "adding folder");
    Ok(store.add_item(&collection.id, containing, ItemKind::Folder, name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::store::{MemoryStore, OperationKind, StoreError};
    use time::macros::datetime;

    const CLOCK: FixedClock = FixedClock(datetime!(2024-03-05 7:08:09 UTC));

    fn setup() -> (MemoryStore, Collection) {
        let store = MemoryStore::new();
        let library = Collection::document_library("Docs", "/Docs");
        store.add_collection(library.clone()).unwrap();
        (store, library)
    }

    #[test]
    fn test_file_created_in_existing_folder() {
        let (store, library) = setup();
        let item = create_file_item(&store, &library, "/Docs/a.docx", b"abc", &CLOCK).unwrap();

        assert_eq!(item.path, "/Docs/a.docx");
        assert_eq!(store.file("/Docs/a.docx").unwrap(), b"abc");
    }

    #[test]
    fn test_file_requires_parent_folder() {
        let (store, library) = setup();
        let err = create_file_item(&store, &library, "/Docs/missing/a.docx", b"abc", &CLOCK)
            .unwrap_err();

        match err {
            DocLibError::ParentFolderNotFound { path } => assert_eq!(path, "/Docs/missing"),
            other => panic!("Expected ParentFolderNotFound, got {:?}", other),
        }
        assert_eq!(store.count(OperationKind::AddFile), 0);
    }

    #[test]
    fn test_file_collision_retries_once() {
        let (store, library) = setup();
        create_file_item(&store, &library, "/Docs/a.docx", b"1", &CLOCK).unwrap();

        let item = create_file_item(&store, &library, "/Docs/a.docx", b"2", &CLOCK).unwrap();
        assert_eq!(item.path, "/Docs/a(2024-03-05_7-08-09).docx");
        assert_eq!(store.file("/Docs/a.docx").unwrap(), b"1");
        assert_eq!(store.count(OperationKind::AddFile), 3);
    }

    #[test]
    fn test_second_collision_propagates() {
        let (store, library) = setup();
        create_file_item(&store, &library, "/Docs/a.docx", b"1", &CLOCK).unwrap();
        create_file_item(&store, &library, "/Docs/a.docx", b"2", &CLOCK).unwrap();

        let err = create_file_item(&store, &library, "/Docs/a.docx", b"3", &CLOCK).unwrap_err();
        assert!(err.is_duplicate_name());
        assert_eq!(store.count(OperationKind::AddFile), 5);
    }

    #[test]
    fn test_other_failures_are_not_retried() {
        let (store, library) = setup();
        store
            .fail_next(OperationKind::AddFile, StoreError::AccessDenied("/Docs".into()))
            .unwrap();

        let err = create_file_item(&store, &library, "/Docs/a.docx", b"1", &CLOCK).unwrap_err();
        assert!(matches!(err, DocLibError::Store(StoreError::AccessDenied(_))));
        assert_eq!(store.count(OperationKind::AddFile), 1);
    }

    #[test]
    fn test_folder_created_and_renamed_ahead() {
        let (store, library) = setup();
        let first = create_folder_item(&store, &library, "/Docs/Mike", &CLOCK).unwrap();
        assert_eq!(first.path, "/Docs/Mike");
        assert!(first.is_folder());

        let second = create_folder_item(&store, &library, "/Docs/Mike", &CLOCK).unwrap();
        assert_eq!(second.path, "/Docs/Mike(2024-03-05_7-08-09)");
        assert_eq!(store.count(OperationKind::AddItem), 2);
    }

    #[test]
    fn test_folder_without_separator_goes_under_root() {
        let (store, library) = setup();
        let item = create_folder_item(&store, &library, "Mike", &CLOCK).unwrap();
        assert_eq!(item.path, "/Docs/Mike");
    }
}
