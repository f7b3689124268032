//! Items created in a collection

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::collection::CollectionId;
use crate::content_type::ContentTypeId;
use crate::properties::{ItemProperties, PropertyKey, PropertyValue};

/// Unique identifier for an item
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        ItemId(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether an item is a document or a folder
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    File,
    Folder,
}

/// A folder or document entry together with its field values
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListItem {
    pub id: ItemId,

    pub collection: CollectionId,

    pub kind: ItemKind,

    /// Absolute path of the entry
    pub path: String,

    pub content_type: Option<ContentTypeId>,

    pub fields: ItemProperties,

    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    #[serde(with = "time::serde::rfc3339")]
    pub modified_at: OffsetDateTime,
}

impl ListItem {
    /// Create an uncommitted item at `path`
    pub fn new(collection: CollectionId, kind: ItemKind, path: impl Into<String>) -> Self {
        let now = OffsetDateTime::now_utc();
        ListItem {
            id: ItemId::new(),
            collection,
            kind,
            path: path.into(),
            content_type: None,
            fields: ItemProperties::new(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Path of the containing folder
    pub fn parent_path(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map(|(parent, _)| parent)
            .unwrap_or("")
    }

    pub fn is_folder(&self) -> bool {
        self.kind == ItemKind::Folder
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        self.fields.get(key)
    }

    /// Assign a field value. Content type keys also update `content_type`
    /// when the value is a well-formed id.
    pub fn set(&mut self, key: impl Into<PropertyKey>, value: impl Into<PropertyValue>) {
        let key = key.into();
        let value = value.into();
        if key.is_content_type_key() {
            if let Ok(id) = value.to_content_type_id(&key) {
                self.content_type = Some(id);
            }
        }
        self.fields.insert(key, value);
    }
}
