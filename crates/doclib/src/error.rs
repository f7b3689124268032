//! Error types for the doclib library
//!
//! Item creation fails with one of a small set of error kinds. Failures
//! reported by the backing store are carried unchanged inside
//! [`DocLibError::Store`] so callers can still inspect the original cause.

use thiserror::Error;

use crate::store::StoreError;

/// Main error type for item creation
#[derive(Error, Debug)]
pub enum DocLibError {
    /// The target collection does not hold documents
    #[error("Collection is not a document library: {collection}")]
    InvalidCollectionKind { collection: String },

    /// A property the creation cannot proceed without is absent
    #[error("Missing required property: {key}")]
    MissingRequiredProperty { key: String },

    /// The folder a document should be added to does not exist
    #[error("Folder does not exist ({path})")]
    ParentFolderNotFound { path: String },

    /// A content type identifier could not be parsed
    #[error("Invalid content type id '{value}': {reason}")]
    InvalidContentTypeId { value: String, reason: String },

    /// A property holds a value of the wrong shape
    #[error("Invalid value for property {key}: expected {expected}")]
    InvalidPropertyValue { key: String, expected: String },

    /// Any failure reported by the backing store
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

/// Shorthand result type for doclib operations
pub type Result<T> = std::result::Result<T, DocLibError>;

impl DocLibError {
    /// Whether the store rejected an add because the name is taken
    pub fn is_duplicate_name(&self) -> bool {
        matches!(self, DocLibError::Store(e) if e.is_duplicate_name())
    }

    /// Check if retrying the same call could succeed without caller changes
    pub fn is_recoverable(&self) -> bool {
        match self {
            DocLibError::InvalidCollectionKind { .. } => false,
            DocLibError::MissingRequiredProperty { .. } => false,
            DocLibError::ParentFolderNotFound { .. } => false,
            DocLibError::InvalidContentTypeId { .. } => false,
            DocLibError::InvalidPropertyValue { .. } => false,
            DocLibError::TimeFormat(_) => false,
            DocLibError::Store(StoreError::DuplicateName { .. }) => true,
            DocLibError::Store(StoreError::Backend(_)) => true,
            DocLibError::Store(StoreError::Io(_)) => true,
            DocLibError::Store(_) => false,
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            DocLibError::InvalidCollectionKind { collection } => {
                format!("'{}' is not a document library", collection)
            }
            DocLibError::MissingRequiredProperty { key } => {
                format!("The item is missing the required '{}' property", key)
            }
            DocLibError::ParentFolderNotFound { path } => {
                format!("Create the folder '{}' before adding documents to it", path)
            }
            DocLibError::Store(StoreError::NotFound { path }) => {
                format!("Not found in the library: {}", path)
            }
            DocLibError::Store(StoreError::AccessDenied(path)) => {
                format!("Permission denied accessing: {}", path)
            }
            _ => self.to_string(),
        }
    }
}
