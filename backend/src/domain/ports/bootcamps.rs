//! Driving ports for bootcamp use cases.
//!
//! Inbound adapters call these ports; they never touch the document store or
//! the geocoder directly.

use async_trait::async_trait;

use crate::domain::query::{ListEnvelope, QueryParams};
use crate::domain::{Bootcamp, Document, DocumentId, Error};

/// Read-side bootcamp use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BootcampsQuery: Send + Sync {
    /// Filtered, shaped, paginated listing with courses attached.
    async fn list(&self, params: &QueryParams) -> Result<ListEnvelope, Error>;

    /// Fetch one bootcamp.
    async fn get(&self, id: DocumentId) -> Result<Bootcamp, Error>;

    /// Bootcamps within `distance_miles` of `zipcode`.
    async fn within_radius(&self, zipcode: &str, distance_miles: f64)
    -> Result<Vec<Bootcamp>, Error>;
}

/// Write-side bootcamp use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BootcampsCommand: Send + Sync {
    /// Validate, geocode, and store a new bootcamp.
    async fn create(&self, body: Document) -> Result<Bootcamp, Error>;

    /// Merge `body` into an existing bootcamp and store the result.
    async fn update(&self, id: DocumentId, body: Document) -> Result<Bootcamp, Error>;

    /// Remove a bootcamp, returning it. Its courses are left in place.
    async fn delete(&self, id: DocumentId) -> Result<Bootcamp, Error>;
}
