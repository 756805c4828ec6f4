//! Domain primitives, the query core, and the services behind the API.
//!
//! Purpose: hold everything that decides behaviour independently of HTTP and
//! of the document store in use. Adapters reach the domain only through the
//! traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Bootcamp, Course: stored entity shapes.
//! - BootcampService, CourseService: implementations of the driving ports.
//! - AverageCostMaintainer: keeps `averageCost` in step with courses.
//! - GeoLocator: postal-code radius search.

pub mod average_cost;
pub mod bootcamp;
pub mod bootcamp_service;
pub mod collection;
pub mod course;
pub mod course_service;
pub mod document;
pub mod error;
pub mod geo;
pub mod ports;
pub mod query;
pub mod slug;
pub mod trace_id;
pub mod validation;

pub use self::average_cost::{AverageCostMaintainer, round_up_to_ten};
pub use self::bootcamp::{Bootcamp, Career, Location};
pub use self::bootcamp_service::BootcampService;
pub use self::collection::{Collection, FieldKind};
pub use self::course::{BootcampRef, BootcampSummary, Course, MinimumSkill};
pub use self::course_service::CourseService;
pub use self::document::{Document, DocumentId, ID_FIELD, document_id};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{GeoLocator, GeoPoint};
pub use self::slug::slugify;
pub use self::trace_id::TraceId;

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use devcamper::domain::{ApiResult, Error};
///
/// fn lookup() -> ApiResult<u32> {
///     Err(Error::not_found("Bootcamp not found with id of 42"))
/// }
/// # assert!(lookup().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
