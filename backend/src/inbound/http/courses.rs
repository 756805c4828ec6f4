//! Course endpoints.
//!
//! ```text
//! GET    /api/v1/courses
//! GET    /api/v1/courses/{id}
//! PUT    /api/v1/courses/{id}
//! DELETE /api/v1/courses/{id}
//! GET    /api/v1/bootcamps/{bootcampId}/courses
//! POST   /api/v1/bootcamps/{bootcampId}/courses
//! ```
//!
//! Every write refreshes the parent bootcamp's average cost before the
//! response is sent.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::query::ListEnvelope;
use crate::domain::{Course, Document, DocumentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::query_string::ListQuery;
use crate::inbound::http::schemas::CoursePayloadSchema;
use crate::inbound::http::state::HttpState;

/// Single-course response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseResponseBody {
    /// Always `true`.
    pub success: bool,
    /// The course.
    pub data: Course,
}

impl From<Course> for CourseResponseBody {
    fn from(data: Course) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Courses of one bootcamp, unpaginated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CoursesResponseBody {
    /// Always `true`.
    pub success: bool,
    /// Number of courses in `data`.
    pub count: usize,
    /// The courses.
    pub data: Vec<Course>,
}

impl From<Vec<Course>> for CoursesResponseBody {
    fn from(data: Vec<Course>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// List courses with filtering, field selection, sorting, and paging.
///
/// Each course carries the name and description of its bootcamp.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys; prefix `-` for descending"),
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 25")
    ),
    responses(
        (status = 200, description = "One page of courses", body = ListEnvelope),
        (status = 400, description = "Invalid query", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "listCourses"
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    query: ListQuery,
) -> ApiResult<web::Json<ListEnvelope>> {
    let envelope = state.courses.list(&query.into_inner()).await?;
    Ok(web::Json(envelope))
}

/// Every course of one bootcamp.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{bootcampId}/courses",
    params(("bootcampId" = String, Path, description = "Bootcamp identifier")),
    responses(
        (status = 200, description = "Courses of the bootcamp", body = CoursesResponseBody),
        (status = 404, description = "Unknown or malformed bootcamp identifier", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "listBootcampCourses"
)]
#[get("/bootcamps/{bootcampId}/courses")]
pub async fn list_bootcamp_courses(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CoursesResponseBody>> {
    let bootcamp_id = DocumentId::parse(&path)?;
    let courses = state.courses.list_for_bootcamp(bootcamp_id).await?;
    Ok(web::Json(courses.into()))
}

/// Fetch one course with its bootcamp summary.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "The course", body = CourseResponseBody),
        (status = 404, description = "Unknown or malformed identifier", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "getCourse"
)]
#[get("/courses/{id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseResponseBody>> {
    let id = DocumentId::parse(&path)?;
    let course = state.courses.get(id).await?;
    Ok(web::Json(course.into()))
}

/// Add a course to an existing bootcamp.
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps/{bootcampId}/courses",
    params(("bootcampId" = String, Path, description = "Bootcamp identifier")),
    request_body = CoursePayloadSchema,
    responses(
        (status = 201, description = "Course created", body = CourseResponseBody),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Unknown or malformed bootcamp identifier", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/bootcamps/{bootcampId}/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> ApiResult<HttpResponse> {
    let bootcamp_id = DocumentId::parse(&path)?;
    let course = state
        .courses_command
        .create(bootcamp_id, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(CourseResponseBody::from(course)))
}

/// Update a course. `null` values remove optional fields.
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    request_body = CoursePayloadSchema,
    responses(
        (status = 200, description = "Course updated", body = CourseResponseBody),
        (status = 400, description = "Validation failed", body = ErrorBody),
        (status = 404, description = "Unknown or malformed identifier", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[put("/courses/{id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> ApiResult<web::Json<CourseResponseBody>> {
    let id = DocumentId::parse(&path)?;
    let course = state
        .courses_command
        .update(id, payload.into_inner())
        .await?;
    Ok(web::Json(course.into()))
}

/// Delete a course and return it.
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    params(("id" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course deleted", body = CourseResponseBody),
        (status = 404, description = "Unknown or malformed identifier", body = ErrorBody)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<CourseResponseBody>> {
    let id = DocumentId::parse(&path)?;
    let course = state.courses_command.delete(id).await?;
    Ok(web::Json(course.into()))
}

#[cfg(test)]
#[path = "courses_tests.rs"]
mod tests;
