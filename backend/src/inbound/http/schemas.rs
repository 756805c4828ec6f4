//! OpenAPI schemas for request payloads.
//!
//! Create and update handlers accept raw JSON objects so unknown keys can be
//! reported by name; these types only describe the accepted keys.

use utoipa::ToSchema;

/// Writable bootcamp fields.
#[derive(ToSchema)]
#[schema(as = BootcampPayload, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct BootcampPayloadSchema {
    #[schema(example = "Devworks Bootcamp", max_length = 50)]
    name: String,
    #[schema(max_length = 500)]
    description: String,
    #[schema(example = "https://devworks.com")]
    website: Option<String>,
    #[schema(max_length = 20)]
    phone: Option<String>,
    email: Option<String>,
    #[schema(example = "233 Bay State Rd Boston MA 02215")]
    address: String,
    careers: Vec<String>,
    #[schema(minimum = 1, maximum = 10)]
    average_rating: Option<f64>,
    housing: Option<bool>,
    job_assistance: Option<bool>,
    job_guarantee: Option<bool>,
    accept_gi: Option<bool>,
}

/// Writable course fields.
#[derive(ToSchema)]
#[schema(as = CoursePayload, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct CoursePayloadSchema {
    #[schema(example = "Front End Web Development")]
    title: String,
    description: String,
    #[schema(example = "8")]
    weeks: String,
    #[schema(example = 8000)]
    tuition: f64,
    #[schema(example = "beginner")]
    minimum_skill: String,
    scholarship_available: Option<bool>,
}
