//! Doclib creates documents and folders in hierarchical document libraries.
//!
//! Callers hand over a loosely typed property bag; doclib resolves the
//! content type, picks the template, normalizes the path, adds the entry
//! with collision-safe naming and applies the remaining properties.
//!
//! ```rust
//! use doclib::{Collection, ContentType, ContentTypeId, ItemProperties, MemoryStore, create_document, keys};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let library = Collection::document_library("Shared Documents", "/Shared Documents")
//!     .with_content_type(ContentType::new(ContentTypeId::document(), "Document"))
//!     .with_content_type(ContentType::new(ContentTypeId::folder(), "Folder"));
//! store.add_collection(library.clone())?;
//!
//! let mut properties = ItemProperties::new()
//!     .with(keys::CONTENT_TYPE_ID_NAME, "0x0120")
//!     .with(keys::LEAF_NAME, "Mike");
//! let folder = create_document(&store, &library.id, &mut properties, None)?;
//! assert_eq!(folder.path, "/Shared Documents/Mike");
//! # Ok(())
//! # }
//! ```

pub mod clock;
pub mod collection;
pub mod content_type;
pub mod create;
pub mod error;
pub mod item;
pub mod properties;
pub mod store;

// Re-export core types
pub use clock::{Clock, FixedClock, LocalClock};
pub use collection::{Collection, CollectionId, CollectionKind};
pub use content_type::{ContentType, ContentTypeCollection, ContentTypeId, ContentTypeKind};
pub use create::{create_document, create_document_with_clock};
pub use error::{DocLibError, Result};
pub use item::{ItemId, ItemKind, ListItem};
pub use properties::{FieldId, ItemProperties, PropertyKey, PropertyValue, keys};
pub use store::{LibraryStore, MemoryStore, StoreError};

#[cfg(feature = "fs")]
pub use store::{FsStore, FsStoreConfig};

/// Get the library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
