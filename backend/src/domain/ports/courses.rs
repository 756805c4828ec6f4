//! Driving ports for course use cases.

use async_trait::async_trait;

use crate::domain::query::{ListEnvelope, QueryParams};
use crate::domain::{Course, Document, DocumentId, Error};

/// Read-side course use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoursesQuery: Send + Sync {
    /// Filtered, shaped, paginated listing with bootcamp summaries attached.
    async fn list(&self, params: &QueryParams) -> Result<ListEnvelope, Error>;

    /// Every course of one bootcamp, unpaginated.
    async fn list_for_bootcamp(&self, bootcamp_id: DocumentId) -> Result<Vec<Course>, Error>;

    /// Fetch one course with its bootcamp summary.
    async fn get(&self, id: DocumentId) -> Result<Course, Error>;
}

/// Write-side course use cases. Each write refreshes the parent's average
/// cost.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoursesCommand: Send + Sync {
    /// Validate and store a course under an existing bootcamp.
    async fn create(&self, bootcamp_id: DocumentId, body: Document) -> Result<Course, Error>;

    /// Merge `body` into an existing course and store the result.
    async fn update(&self, id: DocumentId, body: Document) -> Result<Course, Error>;

    /// Remove a course, returning it.
    async fn delete(&self, id: DocumentId) -> Result<Course, Error>;
}
