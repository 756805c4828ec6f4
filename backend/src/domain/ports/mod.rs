//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports ([`DocumentStore`], [`Geocoder`]) describe the collaborators
//! the domain consumes, each with a typed error enum that services map into
//! [`crate::domain::Error`]. Driving ports ([`BootcampsQuery`],
//! [`BootcampsCommand`], [`CoursesQuery`], [`CoursesCommand`]) are what the
//! HTTP adapter calls.

mod bootcamps;
mod courses;
mod document_store;
mod geocoder;

#[cfg(test)]
pub use bootcamps::{MockBootcampsCommand, MockBootcampsQuery};
pub use bootcamps::{BootcampsCommand, BootcampsQuery};
#[cfg(test)]
pub use courses::{MockCoursesCommand, MockCoursesQuery};
pub use courses::{CoursesCommand, CoursesQuery};
#[cfg(test)]
pub use document_store::MockDocumentStore;
pub use document_store::{DocumentStore, DocumentStoreError, FindQuery};
#[cfg(test)]
pub use geocoder::MockGeocoder;
pub use geocoder::{FixtureGeocoder, GeocodedLocation, Geocoder, GeocoderError};
