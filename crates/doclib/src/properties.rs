//! Property bags passed in by callers and applied onto created items
//!
//! Keys come in two shapes: display names (`"Title"`) and opaque field
//! identifiers. Both live in one bag so callers can mix them freely.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::{Uuid, uuid};

use crate::content_type::ContentTypeId;
use crate::error::{DocLibError, Result};

/// Well-known display-name keys
pub mod keys {
    /// Leaf name or path of the item to create
    pub const LEAF_NAME: &str = "FileLeafRef";

    /// Display-name key for the content type id
    pub const CONTENT_TYPE_ID_NAME: &str = "Content Type ID";
}

/// Opaque identifier of a field on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FieldId(pub Uuid);

impl FieldId {
    /// Built-in field holding an item's content type id
    pub const CONTENT_TYPE_ID: FieldId = FieldId(uuid!("03e45e84-1992-4d42-9116-26f756012634"));
}

impl From<Uuid> for FieldId {
    fn from(id: Uuid) -> Self {
        FieldId(id)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.0)
    }
}

/// A key in an [`ItemProperties`] bag
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyKey {
    Name(String),
    Field(FieldId),
}

impl PropertyKey {
    /// True for either of the keys that carry a content type id
    pub fn is_content_type_key(&self) -> bool {
        match self {
            PropertyKey::Name(name) => name == keys::CONTENT_TYPE_ID_NAME,
            PropertyKey::Field(field) => *field == FieldId::CONTENT_TYPE_ID,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => write!(f, "{}", name),
            PropertyKey::Field(field) => write!(f, "{}", field),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Name(name)
    }
}

impl From<FieldId> for PropertyKey {
    fn from(field: FieldId) -> Self {
        PropertyKey::Field(field)
    }
}

/// A scalar property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Guid(Uuid),
    ContentType(ContentTypeId),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Interpret the value as a content type id, parsing text if needed
    pub fn to_content_type_id(&self, key: &PropertyKey) -> Result<ContentTypeId> {
        match self {
            PropertyValue::ContentType(id) => Ok(id.clone()),
            PropertyValue::Text(text) => ContentTypeId::parse(text),
            _ => Err(DocLibError::InvalidPropertyValue {
                key: key.to_string(),
                expected: "a content type id".to_string(),
            }),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(text: &str) -> Self {
        PropertyValue::Text(text.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(text: String) -> Self {
        PropertyValue::Text(text)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

impl From<Uuid> for PropertyValue {
    fn from(value: Uuid) -> Self {
        PropertyValue::Guid(value)
    }
}

impl From<ContentTypeId> for PropertyValue {
    fn from(value: ContentTypeId) -> Self {
        PropertyValue::ContentType(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(text) => write!(f, "{}", text),
            PropertyValue::Integer(value) => write!(f, "{}", value),
            PropertyValue::Number(value) => write!(f, "{}", value),
            PropertyValue::Boolean(value) => write!(f, "{}", value),
            PropertyValue::Guid(value) => write!(f, "{}", value),
            PropertyValue::ContentType(value) => write!(f, "{}", value),
        }
    }
}

/// Mutable bag of item properties keyed by name or field id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemProperties {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    names: BTreeMap<String, PropertyValue>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<FieldId, PropertyValue>,
}

impl ItemProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(
        &mut self,
        key: impl Into<PropertyKey>,
        value: impl Into<PropertyValue>,
    ) -> Option<PropertyValue> {
        match key.into() {
            PropertyKey::Name(name) => self.names.insert(name, value.into()),
            PropertyKey::Field(field) => self.fields.insert(field, value.into()),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<PropertyKey>, value: impl Into<PropertyValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &PropertyKey) -> Option<&PropertyValue> {
        match key {
            PropertyKey::Name(name) => self.names.get(name),
            PropertyKey::Field(field) => self.fields.get(field),
        }
    }

    pub fn remove(&mut self, key: &PropertyKey) -> Option<PropertyValue> {
        match key {
            PropertyKey::Name(name) => self.names.remove(name),
            PropertyKey::Field(field) => self.fields.remove(field),
        }
    }

    pub fn contains_key(&self, key: &PropertyKey) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entries, name keys first
    pub fn iter(&self) -> impl Iterator<Item = (PropertyKey, &PropertyValue)> {
        self.names
            .iter()
            .map(|(name, value)| (PropertyKey::Name(name.clone()), value))
            .chain(
                self.fields
                    .iter()
                    .map(|(field, value)| (PropertyKey::Field(*field), value)),
            )
    }

    pub fn len(&self) -> usize {
        self.names.len() + self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ItemProperties
where
    K: Into<PropertyKey>,
    V: Into<PropertyValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut properties = Self::new();
        for (key, value) in iter {
            properties.insert(key, value);
        }
        properties
    }
}
