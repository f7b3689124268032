//! Path normalization and collision-safe naming

use time::OffsetDateTime;
use time::macros::format_description;
use tracing::debug;

use crate::collection::Collection;
use crate::content_type::ContentTypeId;
use crate::error::{DocLibError, Result};
use crate::properties::{ItemProperties, PropertyKey, keys};

/// Where an item goes and whether it is a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath {
    pub path: String,
    pub is_folder: bool,
}

/// Take the leaf name out of `properties` and turn it into an absolute path.
///
/// Relative leaf names are placed under the collection root. Folder-typed
/// items lose any extension on their last segment.
pub fn normalize_path(
    collection: &Collection,
    properties: &mut ItemProperties,
    content_type: Option<&ContentTypeId>,
) -> Result<NormalizedPath> {
    let key = PropertyKey::from(keys::LEAF_NAME);
    let value = properties
        .remove(&key)
        .ok_or_else(|| DocLibError::MissingRequiredProperty {
            key: keys::LEAF_NAME.to_string(),
        })?;
    let leaf = value.as_text().ok_or_else(|| DocLibError::InvalidPropertyValue {
        key: keys::LEAF_NAME.to_string(),
        expected: "text".to_string(),
    })?;
    if leaf.trim().is_empty() {
        return Err(DocLibError::MissingRequiredProperty {
            key: keys::LEAF_NAME.to_string(),
        });
    }
    if leaf.rsplit('/').next().is_none_or(|name| name.trim().is_empty()) {
        return Err(DocLibError::InvalidPropertyValue {
            key: keys::LEAF_NAME.to_string(),
            expected: "a path ending in a name".to_string(),
        });
    }

    let mut path = collection.resolve_path(leaf);
    let is_folder = content_type.is_some_and(ContentTypeId::is_folder);
    if is_folder {
        path = strip_extension(&path).to_string();
    }

    debug!(%path, is_folder, "normalized item path");
    Ok(NormalizedPath { path, is_folder })
}

/// Drop a trailing `.ext` from the last path segment
pub fn strip_extension(path: &str) -> &str {
    let leaf_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    match path[leaf_start..].rfind('.') {
        Some(dot) if dot > 0 => &path[..leaf_start + dot],
        _ => path,
    }
}

/// Split a path into its containing folder and last segment.
///
/// A path without a separator lives directly under `root`.
pub fn split_path<'a>(path: &'a str, root: &'a str) -> (&'a str, &'a str) {
    match path.rsplit_once('/') {
        Some(("", leaf)) => ("/", leaf),
        Some((parent, leaf)) => (parent, leaf),
        None => (root, path),
    }
}

/// Insert a `(timestamp)` token before the extension of `original`
pub fn create_unique_name(original: &str, now: OffsetDateTime) -> Result<String> {
    // e.g. 2024-03-05_7-08-09
    let stamp_format = format_description!("[year]-[month]-[day]_[hour padding:none]-[minute]-[second]");
    let stamp = now.format(stamp_format)?;
    Ok(match original.rfind('.') {
        Some(dot) => format!("{}({}){}", &original[..dot], stamp, &original[dot..]),
        None => format!("{}({})", original, stamp),
    })
}

/// Apply [`create_unique_name`] to the last segment of `path`
pub fn create_unique_path(path: &str, now: OffsetDateTime) -> Result<String> {
    match path.rsplit_once('/') {
        Some((parent, leaf)) => Ok(format!("{}/{}", parent, create_unique_name(leaf, now)?)),
        None => create_unique_name(path, now),
    }
}
