//! Content type resolution and template lookup

use tracing::debug;

use crate::collection::Collection;
use crate::content_type::ContentTypeId;
use crate::error::{DocLibError, Result};
use crate::properties::{FieldId, ItemProperties, PropertyKey, keys};
use crate::store::LibraryStore;

/// Body used for new documents when no template is configured
const PLACEHOLDER_CONTENT: [u8; 1] = [0];

/// The key carrying the content type id, canonical field id first
fn content_type_key(properties: &ItemProperties) -> Option<PropertyKey> {
    [
        PropertyKey::Field(FieldId::CONTENT_TYPE_ID),
        PropertyKey::from(keys::CONTENT_TYPE_ID_NAME),
    ]
    .into_iter()
    .find(|key| properties.contains_key(key))
}

/// Resolve the requested content type against the collection.
///
/// Returns `None` when the properties name no content type. Otherwise the
/// entry is overwritten with the best registered match, which is returned.
pub fn resolve_content_type(
    collection: &Collection,
    properties: &mut ItemProperties,
) -> Result<Option<ContentTypeId>> {
    let Some(key) = content_type_key(properties) else {
        debug!("no content type requested");
        return Ok(None);
    };
    let requested = match properties.get(&key) {
        Some(value) => value.to_content_type_id(&key)?,
        None => return Ok(None),
    };

    let resolved = collection.content_types.best_match(&requested);
    debug!(%requested, %resolved, "resolved content type");
    properties.insert(key, resolved.clone());
    Ok(Some(resolved))
}

/// Pick the template that seeds a new document.
///
/// Starts from the library default; a content type with its own template
/// overrides it when the library allows content types.
pub fn determine_template_path(
    collection: &Collection,
    properties: &ItemProperties,
) -> Result<String> {
    if !collection.is_document_library() {
        return Err(DocLibError::InvalidCollectionKind {
            collection: collection.title.clone(),
        });
    }

    let mut template = collection.default_template_path.clone();
    if !collection.allow_content_types {
        return Ok(template);
    }

    if let Some(key) = content_type_key(properties) {
        if let Some(value) = properties.get(&key) {
            let id = value.to_content_type_id(&key)?;
            let override_path = collection
                .content_types
                .get(&id)
                .and_then(|ct| ct.template_path.as_deref())
                .filter(|path| !path.is_empty());
            if let Some(path) = override_path {
                template = path.to_string();
            }
        }
    }

    Ok(template)
}

/// Read the template bytes, or a single zero byte when there is no template
pub fn template_bytes(store: &dyn LibraryStore, template_path: &str) -> Result<Vec<u8>> {
    if template_path.is_empty() {
        return Ok(PLACEHOLDER_CONTENT.to_vec());
    }
    debug!(template = template_path, "fetching template");
    Ok(store.fetch_bytes(template_path)?)
}
