//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint of the inbound layer with its
//! request and response schemas. Swagger UI serves it in debug builds.

use utoipa::OpenApi;

use crate::domain::query::ListEnvelope;
use crate::domain::{Bootcamp, BootcampSummary, Career, Course, Location, MinimumSkill};
use crate::inbound::http::bootcamps::{BootcampResponseBody, BootcampsResponseBody};
use crate::inbound::http::courses::{CourseResponseBody, CoursesResponseBody};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::schemas::{BootcampPayloadSchema, CoursePayloadSchema};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "DevCamper API",
        description = "Directory of coding bootcamps and the courses they offer."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::bootcamps::list_bootcamps,
        crate::inbound::http::bootcamps::get_bootcamp,
        crate::inbound::http::bootcamps::create_bootcamp,
        crate::inbound::http::bootcamps::update_bootcamp,
        crate::inbound::http::bootcamps::delete_bootcamp,
        crate::inbound::http::bootcamps::bootcamps_in_radius,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::list_bootcamp_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Bootcamp,
        BootcampSummary,
        Career,
        Course,
        Location,
        MinimumSkill,
        ListEnvelope,
        BootcampResponseBody,
        BootcampsResponseBody,
        CourseResponseBody,
        CoursesResponseBody,
        ErrorBody,
        BootcampPayloadSchema,
        CoursePayloadSchema,
    )),
    tags(
        (name = "bootcamps", description = "Bootcamp listings and radius search"),
        (name = "courses", description = "Courses offered by bootcamps"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
