//! Creating a single document or folder in a library
//!
//! A call runs these steps in order against the store:
//!
//! 1. resolve the requested content type to one the library knows
//! 2. determine the template that seeds new documents
//! 3. turn the leaf name into an absolute path
//! 4. add the file or folder, recovering once from a name collision
//! 5. apply the remaining properties and commit

mod metadata;
mod path;
mod resolve;
mod resource;

pub use metadata::{apply_metadata, apply_metadata_optional};
pub use path::{
    NormalizedPath, create_unique_name, create_unique_path, normalize_path, split_path,
    strip_extension,
};
pub use resolve::{determine_template_path, resolve_content_type, template_bytes};
pub use resource::{create_file_item, create_folder_item};

use std::borrow::Cow;

use tracing::{info, info_span};

use crate::clock::{Clock, LocalClock};
use crate::collection::CollectionId;
use crate::error::Result;
use crate::item::ListItem;
use crate::properties::ItemProperties;
use crate::store::LibraryStore;

/// Create a document or folder in the collection `collection_id`.
///
/// `properties` must hold the leaf name under [`keys::LEAF_NAME`]; it is
/// consumed from the bag, and a content type entry is rewritten to the
/// resolved id. Everything left in the bag ends up on the item.
///
/// When `content` is absent or empty, new documents are seeded from the
/// library or content type template.
///
/// [`keys::LEAF_NAME`]: crate::properties::keys::LEAF_NAME
pub fn create_document(
    store: &dyn LibraryStore,
    collection_id: &CollectionId,
    properties: &mut ItemProperties,
    content: Option<&[u8]>,
) -> Result<ListItem> {
    create_document_with_clock(store, collection_id, properties, content, &LocalClock)
}

/// [`create_document`] with an explicit time source for unique names
pub fn create_document_with_clock(
    store: &dyn LibraryStore,
    collection_id: &CollectionId,
    properties: &mut ItemProperties,
    content: Option<&[u8]>,
    clock: &dyn Clock,
) -> Result<ListItem> {
    let _span = info_span!("create_document", collection = %collection_id).entered();

    let collection = store.collection(collection_id)?;
    let content_type = resolve_content_type(&collection, properties)?;
    let template_path = determine_template_path(&collection, properties)?;
    let target = normalize_path(&collection, properties, content_type.as_ref())?;

    let item = if target.is_folder {
        create_folder_item(store, &collection, &target.path, clock)?
    } else {
        let body = match content {
            Some(bytes) if !bytes.is_empty() => Cow::Borrowed(bytes),
            _ => Cow::Owned(template_bytes(store, &template_path)?),
        };
        create_file_item(store, &collection, &target.path, &body, clock)?
    };

    let item = apply_metadata(store, item, properties)?;
    info!(path = %item.path, kind = ?item.kind, "created item");
    Ok(item)
}
