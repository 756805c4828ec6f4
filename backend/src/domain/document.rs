//! Stored documents and their identifiers.
//!
//! Every collection holds JSON objects keyed by field name. The identity of a
//! document lives under [`ID_FIELD`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::Error;

/// Field holding the document identity.
pub const ID_FIELD: &str = "_id";

/// A stored JSON object.
pub type Document = Map<String, Value>;

/// Read the identity of `document`, if it carries a well-formed one.
#[must_use]
pub fn document_id(document: &Document) -> Option<DocumentId> {
    document
        .get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .map(DocumentId)
}

/// Identity of a stored document, serialised as a hyphenated UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Generate a fresh identifier for a new document.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier supplied by a client.
    ///
    /// # Errors
    /// Returns an [`crate::domain::ErrorCode::InvalidId`] error when `raw` is
    /// not a UUID; the message reads as a missing resource.
    ///
    /// # Examples
    /// ```
    /// use devcamper::domain::{DocumentId, ErrorCode};
    ///
    /// let err = DocumentId::parse("5d713995b721c3bb38c1f5d0").expect_err("not a uuid");
    /// assert_eq!(err.code(), ErrorCode::InvalidId);
    /// ```
    pub fn parse(raw: &str) -> Result<Self, Error> {
        if raw.trim() != raw {
            return Err(Error::invalid_id(raw));
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| Error::invalid_id(raw))
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for DocumentId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for DocumentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<DocumentId> for Value {
    fn from(value: DocumentId) -> Self {
        Self::String(value.to_string())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
