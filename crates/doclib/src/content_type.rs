//! Content type identifiers and the content types registered on a collection
//!
//! Identifiers use the host's hierarchical `0x…` notation: every identifier
//! extends its parent by either a two-hex-digit step or a `00`-prefixed GUID.
//! Ancestry is therefore a prefix relationship over parsed segments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DocLibError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Segment {
    Step(u8),
    Guid(Uuid),
}

/// Hierarchical content type identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentTypeId {
    segments: Vec<Segment>,
}

/// Closed classification of a content type by its built-in ancestor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTypeKind {
    /// Descends from the built-in folder type
    Folder,
    /// Descends from the built-in document type
    Document(ContentTypeId),
    /// Anything else, such as plain list items
    Item,
}

impl ContentTypeId {
    /// The root of every content type (`0x`)
    pub fn system() -> Self {
        Self { segments: Vec::new() }
    }

    /// Built-in list item type (`0x01`)
    pub fn item() -> Self {
        Self {
            segments: vec![Segment::Step(0x01)],
        }
    }

    /// Built-in document type (`0x0101`)
    pub fn document() -> Self {
        Self::item().child(0x01)
    }

    /// Built-in folder type (`0x0120`)
    pub fn folder() -> Self {
        Self::item().child(0x20)
    }

    /// Parse an identifier such as `0x0120` or `0x0101009189AB…`
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: &str| DocLibError::InvalidContentTypeId {
            value: value.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = value.trim();
        let hex = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| invalid("expected a 0x prefix"))?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid("contains non-hex characters"));
        }

        let mut segments = Vec::new();
        let mut rest = hex;
        while !rest.is_empty() {
            if rest.len() < 2 {
                return Err(invalid("odd number of hex digits"));
            }
            let (step, tail) = rest.split_at(2);
            if step == "00" {
                if tail.len() < 32 {
                    return Err(invalid("truncated GUID segment"));
                }
                let (guid, tail) = tail.split_at(32);
                let guid = Uuid::try_parse(guid).map_err(|e| invalid(&e.to_string()))?;
                segments.push(Segment::Guid(guid));
                rest = tail;
            } else {
                let step = u8::from_str_radix(step, 16).map_err(|e| invalid(&e.to_string()))?;
                segments.push(Segment::Step(step));
                rest = tail;
            }
        }

        Ok(Self { segments })
    }

    /// Derive a child by appending a two-digit step
    pub fn child(&self, step: u8) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Step(step));
        Self { segments }
    }

    /// Derive a child by appending a GUID segment
    pub fn child_with_guid(&self, guid: Uuid) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Guid(guid));
        Self { segments }
    }

    /// The direct parent, or `None` for the system root
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// True when `self` is `ancestor` or descends from it
    pub fn is_child_of(&self, ancestor: &ContentTypeId) -> bool {
        self.segments.starts_with(&ancestor.segments)
    }

    /// Number of segments below the system root
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn kind(&self) -> ContentTypeKind {
        if self.is_child_of(&Self::folder()) {
            ContentTypeKind::Folder
        } else if self.is_child_of(&Self::document()) {
            ContentTypeKind::Document(self.clone())
        } else {
            ContentTypeKind::Item
        }
    }

    pub fn is_folder(&self) -> bool {
        self.kind() == ContentTypeKind::Folder
    }
}

impl fmt::Display for ContentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for segment in &self.segments {
            match segment {
                Segment::Step(step) => write!(f, "{:02X}", step)?,
                Segment::Guid(guid) => write!(f, "00{:032X}", guid.as_u128())?,
            }
        }
        Ok(())
    }
}

impl FromStr for ContentTypeId {
    type Err = DocLibError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentTypeId {
    type Error = DocLibError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ContentTypeId> for String {
    fn from(id: ContentTypeId) -> Self {
        id.to_string()
    }
}

/// A content type registered on a collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentType {
    pub id: ContentTypeId,

    pub name: String,

    /// Template seeded into new documents of this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_path: Option<String>,
}

impl ContentType {
    pub fn new(id: ContentTypeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            template_path: None,
        }
    }

    /// Set the document template for this content type
    pub fn with_template(mut self, path: impl Into<String>) -> Self {
        self.template_path = Some(path.into());
        self
    }
}

/// Ordered set of content types registered on a collection
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ContentTypeCollection {
    types: Vec<ContentType>,
}

impl ContentTypeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a content type, replacing any entry with the same id
    pub fn add(&mut self, content_type: ContentType) -> &mut Self {
        match self.types.iter_mut().find(|ct| ct.id == content_type.id) {
            Some(existing) => *existing = content_type,
            None => self.types.push(content_type),
        }
        self
    }

    /// Exact lookup by id
    pub fn get(&self, id: &ContentTypeId) -> Option<&ContentType> {
        self.types.iter().find(|ct| &ct.id == id)
    }

    /// Resolve `requested` to the closest registered content type.
    ///
    /// Preference order: the exact id, then a collection-scoped copy whose
    /// parent is `requested`, then the deepest registered ancestor. When
    /// nothing matches, `requested` comes back unchanged.
    ///
    /// The second step returns a child rather than an ancestor. Hosts attach
    /// a type to a library by registering a copy derived from it, so a
    /// site-level id must resolve to that copy.
    pub fn best_match(&self, requested: &ContentTypeId) -> ContentTypeId {
        if self.get(requested).is_some() {
            return requested.clone();
        }

        if let Some(copy) = self
            .types
            .iter()
            .find(|ct| ct.id.parent().as_ref() == Some(requested))
        {
            return copy.id.clone();
        }

        self.types
            .iter()
            .filter(|ct| requested.is_child_of(&ct.id))
            .max_by_key(|ct| ct.id.depth())
            .map(|ct| ct.id.clone())
            .unwrap_or_else(|| requested.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<ContentType> for ContentTypeCollection {
    fn from_iter<I: IntoIterator<Item = ContentType>>(iter: I) -> Self {
        let mut collection = Self::new();
        for content_type in iter {
            collection.add(content_type);
        }
        collection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOLDER_TYPE: &str = "0x012000AE42FBBCB4E27944B1C558B2E5602B6D";
    const DOCUMENT_TYPE: &str =
        "0x010100D00ADB6ED139F44195A971E927767D7300945F742540F8C8438445F85E2918E2B5";

    #[test]
    fn test_parse_and_display_round_trip() {
        let id = ContentTypeId::parse(DOCUMENT_TYPE).unwrap();
        assert_eq!(id.to_string(), DOCUMENT_TYPE);
        assert_eq!(id.depth(), 4);

        let lower = ContentTypeId::parse(&FOLDER_TYPE.to_lowercase()).unwrap();
        assert_eq!(lower.to_string(), FOLDER_TYPE);

        assert_eq!(ContentTypeId::folder().to_string(), "0x0120");
        assert_eq!(ContentTypeId::system().to_string(), "0x");
    }

    #[test]
    fn test_parse_rejects_malformed_ids() {
        assert!(ContentTypeId::parse("0120").is_err());
        assert!(ContentTypeId::parse("0x012").is_err());
        assert!(ContentTypeId::parse("0x01ZZ").is_err());
        assert!(ContentTypeId::parse("0x010100ABCD").is_err());
    }

    #[test]
    fn test_ancestry() {
        let folder = ContentTypeId::parse(FOLDER_TYPE).unwrap();
        assert!(folder.is_child_of(&ContentTypeId::folder()));
        assert!(folder.is_child_of(&ContentTypeId::item()));
        assert!(folder.is_child_of(&folder));
        assert!(!folder.is_child_of(&ContentTypeId::document()));
        assert_eq!(folder.parent(), Some(ContentTypeId::folder()));
        assert_eq!(ContentTypeId::system().parent(), None);
    }

    #[test]
    fn test_kind_classification() {
        let folder = ContentTypeId::parse(FOLDER_TYPE).unwrap();
        let document = ContentTypeId::parse(DOCUMENT_TYPE).unwrap();

        assert_eq!(folder.kind(), ContentTypeKind::Folder);
        assert_eq!(document.kind(), ContentTypeKind::Document(document.clone()));
        assert_eq!(ContentTypeId::item().kind(), ContentTypeKind::Item);
        assert!(folder.is_folder());
        assert!(!document.is_folder());
    }

    #[test]
    fn test_best_match_prefers_exact_then_copy_then_ancestor() {
        let site_type = ContentTypeId::document().child_with_guid(Uuid::new_v4());
        let list_copy = site_type.child_with_guid(Uuid::new_v4());

        let types: ContentTypeCollection = [
            ContentType::new(ContentTypeId::document(), "Document"),
            ContentType::new(list_copy.clone(), "Contract"),
            ContentType::new(ContentTypeId::folder(), "Folder"),
        ]
        .into_iter()
        .collect();

        assert_eq!(types.best_match(&ContentTypeId::folder()), ContentTypeId::folder());
        assert_eq!(types.best_match(&site_type), list_copy);

        let unregistered = ContentTypeId::document().child_with_guid(Uuid::new_v4());
        assert_eq!(types.best_match(&unregistered), ContentTypeId::document());

        let foreign = ContentTypeId::parse("0x0108").unwrap();
        assert_eq!(types.best_match(&foreign), foreign);
    }

    #[test]
    fn test_best_match_is_idempotent() {
        let types: ContentTypeCollection = [
            ContentType::new(ContentTypeId::document(), "Document"),
            ContentType::new(ContentTypeId::folder(), "Folder"),
        ]
        .into_iter()
        .collect();

        let requested = ContentTypeId::parse(DOCUMENT_TYPE).unwrap();
        let once = types.best_match(&requested);
        assert_eq!(types.best_match(&once), once);
    }

    #[test]
    fn test_serializes_as_string() {
        let id = ContentTypeId::parse(FOLDER_TYPE).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", FOLDER_TYPE));
        let back: ContentTypeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
