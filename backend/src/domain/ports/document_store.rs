//! Driven port for the document database.
//!
//! The store is consumed as an opaque engine: it evaluates filters,
//! projections, sorts, joins, averages, and spherical containment. Domain
//! code only builds the requests.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::geo::GeoPoint;
use crate::domain::query::{Filter, Join, Projection, SortKey};
use crate::domain::{Collection, Document, DocumentId};

/// A find request: which documents, which fields, in what order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FindQuery {
    /// Documents to return.
    pub filter: Filter,
    /// Fields to return.
    pub projection: Projection,
    /// Sort keys, primary first. Ties keep insertion order.
    pub sort: Vec<SortKey>,
    /// Matching documents to skip.
    pub skip: usize,
    /// Maximum documents to return.
    pub limit: Option<usize>,
    /// Related documents to attach.
    pub join: Option<Join>,
}

impl FindQuery {
    /// Every document matching `filter`, unshaped.
    #[must_use]
    pub fn matching(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Attach related documents.
    #[must_use]
    pub const fn with_join(mut self, join: Join) -> Self {
        self.join = Some(join);
        self
    }
}

/// Errors raised by document store adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentStoreError {
    /// Store could not be reached.
    #[error("document store connection failed: {message}")]
    Connection {
        /// Adapter detail.
        message: String,
    },
    /// A query or write failed during execution.
    #[error("document store query failed: {message}")]
    Query {
        /// Adapter detail.
        message: String,
    },
    /// A write collided with a unique index.
    #[error("duplicate value {value} for unique field {field}")]
    DuplicateKey {
        /// Indexed field.
        field: String,
        /// Conflicting value.
        value: String,
    },
}

impl DocumentStoreError {
    /// Connection failure.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Execution failure.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Unique index collision.
    pub fn duplicate_key(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::DuplicateKey {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl From<DocumentStoreError> for crate::domain::Error {
    fn from(error: DocumentStoreError) -> Self {
        match error {
            DocumentStoreError::Connection { message } => {
                Self::service_unavailable(format!("document store unavailable: {message}"))
            }
            DocumentStoreError::Query { message } => {
                Self::internal(format!("document store error: {message}"))
            }
            DocumentStoreError::DuplicateKey { field, value } => Self::duplicate_key(&field, &value),
        }
    }
}

/// Port for reading and writing JSON documents.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Find documents, shaped and paged per `query`.
    async fn find(
        &self,
        collection: Collection,
        query: &FindQuery,
    ) -> Result<Vec<Document>, DocumentStoreError>;

    /// Count documents matching `filter`.
    async fn count(&self, collection: Collection, filter: &Filter)
    -> Result<usize, DocumentStoreError>;

    /// Fetch one document, attaching related documents when `join` is set.
    async fn find_by_id(
        &self,
        collection: Collection,
        id: DocumentId,
        join: Option<Join>,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Insert a document carrying its own identity.
    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, DocumentStoreError>;

    /// Replace a document, returning the stored value or `None` when absent.
    async fn replace(
        &self,
        collection: Collection,
        id: DocumentId,
        document: Document,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Remove a document, returning it or `None` when absent.
    async fn delete(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, DocumentStoreError>;

    /// Overwrite one top-level field; returns `false` when the document is
    /// absent.
    async fn set_field(
        &self,
        collection: Collection,
        id: DocumentId,
        field: &str,
        value: Value,
    ) -> Result<bool, DocumentStoreError>;

    /// Mean of the numeric `field` across documents matching `filter`, or
    /// `None` when nothing matches.
    async fn average(
        &self,
        collection: Collection,
        filter: &Filter,
        field: &str,
    ) -> Result<Option<f64>, DocumentStoreError>;

    /// Documents whose GeoJSON point at `field` lies within `radius`
    /// radians of `centre`.
    async fn within_sphere(
        &self,
        collection: Collection,
        field: &str,
        centre: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Document>, DocumentStoreError>;
}
