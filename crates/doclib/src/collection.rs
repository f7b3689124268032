//! Collection descriptors as reported by the backing store

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content_type::{ContentType, ContentTypeCollection};

/// Unique identifier for a collection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionId(pub Uuid);

impl CollectionId {
    pub fn new() -> Self {
        CollectionId(Uuid::new_v4())
    }
}

impl Default for CollectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for CollectionId {
    fn from(id: Uuid) -> Self {
        CollectionId(id)
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a collection holds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Holds folders and documents with binary content
    DocumentLibrary,
    /// Holds plain items without content
    List,
}

/// A hierarchical collection of folders and items
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub id: CollectionId,

    pub title: String,

    pub kind: CollectionKind,

    /// Absolute path of the root folder, without a trailing separator unless
    /// the root is `/` itself
    pub root_path: String,

    pub content_types: ContentTypeCollection,

    /// Whether per-content-type templates are honoured
    pub allow_content_types: bool,

    /// Template seeded into new documents, empty when none is configured
    #[serde(default)]
    pub default_template_path: String,
}

impl Collection {
    /// Create a document library rooted at `root_path`
    pub fn document_library(title: impl Into<String>, root_path: impl Into<String>) -> Self {
        Self::new(CollectionKind::DocumentLibrary, title, root_path)
    }

    /// Create a plain list rooted at `root_path`
    pub fn list(title: impl Into<String>, root_path: impl Into<String>) -> Self {
        Self::new(CollectionKind::List, title, root_path)
    }

    fn new(kind: CollectionKind, title: impl Into<String>, root_path: impl Into<String>) -> Self {
        let root_path: String = root_path.into();
        let root_path = match root_path.trim_end_matches('/') {
            "" => "/".to_string(),
            trimmed => trimmed.to_string(),
        };
        Collection {
            id: CollectionId::new(),
            title: title.into(),
            kind,
            root_path,
            content_types: ContentTypeCollection::new(),
            allow_content_types: false,
            default_template_path: String::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<CollectionId>) -> Self {
        self.id = id.into();
        self
    }

    /// Register a content type and enable content type management
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_types.add(content_type);
        self.allow_content_types = true;
        self
    }

    pub fn with_content_types_allowed(mut self, allowed: bool) -> Self {
        self.allow_content_types = allowed;
        self
    }

    pub fn with_default_template(mut self, path: impl Into<String>) -> Self {
        self.default_template_path = path.into();
        self
    }

    pub fn is_document_library(&self) -> bool {
        self.kind == CollectionKind::DocumentLibrary
    }

    /// Join a relative leaf under the root folder; absolute paths pass through
    pub fn resolve_path(&self, leaf: &str) -> String {
        if leaf.starts_with('/') {
            leaf.to_string()
        } else {
            format!("{}/{}", self.root_path.trim_end_matches('/'), leaf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content_type::ContentTypeId;

    #[test]
    fn test_resolve_path() {
        let library = Collection::document_library("Shared Documents", "/sites/team/Shared Documents/");
        assert_eq!(library.root_path, "/sites/team/Shared Documents");
        assert_eq!(
            library.resolve_path("Mike"),
            "/sites/team/Shared Documents/Mike"
        );
        assert_eq!(library.resolve_path("/elsewhere/a.docx"), "/elsewhere/a.docx");
    }

    #[test]
    fn test_root_library_keeps_separator() {
        let library = Collection::document_library("Root", "/");
        assert_eq!(library.root_path, "/");
        assert_eq!(library.resolve_path("a.docx"), "/a.docx");

        let library = Collection::document_library("Root", "//");
        assert_eq!(library.root_path, "/");
    }

    #[test]
    fn test_builder() {
        let library = Collection::document_library("Docs", "/Docs")
            .with_default_template("/Docs/Forms/template.dotx")
            .with_content_type(ContentType::new(ContentTypeId::folder(), "Folder"));

        assert!(library.is_document_library());
        assert!(library.allow_content_types);
        assert_eq!(library.content_types.len(), 1);
        assert_eq!(library.default_template_path, "/Docs/Forms/template.dotx");

        let list = Collection::list("Tasks", "/Lists/Tasks");
        assert!(!list.is_document_library());
    }
}
