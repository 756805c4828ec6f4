//! Bootcamp endpoints.
//!
//! ```text
//! GET    /api/v1/bootcamps
//! POST   /api/v1/bootcamps
//! GET    /api/v1/bootcamps/{id}
//! PUT    /api/v1/bootcamps/{id}
//! DELETE /api/v1/bootcamps/{id}
//! GET    /api/v1/bootcamps/radius/{zipcode}/{distance}
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::geo::parse_distance;
use crate::domain::query::ListEnvelope;
use crate::domain::{Bootcamp, Document, DocumentId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::query_string::ListQuery;
use crate::inbound::http::schemas::BootcampPayloadSchema;
use crate::inbound::http::state::HttpState;

/// Single-bootcamp response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BootcampResponseBody {
    /// Always `true`.
    pub success: bool,
    /// The bootcamp.
    pub data: Bootcamp,
}

impl From<Bootcamp> for BootcampResponseBody {
    fn from(data: Bootcamp) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Unpaginated bootcamp listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BootcampsResponseBody {
    /// Always `true`.
    pub success: bool,
    /// Number of bootcamps in `data`.
    pub count: usize,
    /// The bootcamps.
    pub data: Vec<Bootcamp>,
}

impl From<Vec<Bootcamp>> for BootcampsResponseBody {
    fn from(data: Vec<Bootcamp>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// List bootcamps with filtering, field selection, sorting, and paging.
///
/// Each bootcamp carries its courses unless `select` leaves them out.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps",
    params(
        ("select" = Option<String>, Query, description = "Comma-separated fields to return"),
        ("sort" = Option<String>, Query, description = "Comma-separated sort keys; prefix `-` for descending"),
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("limit" = Option<u32>, Query, description = "Page size, default 25")
    ),
    responses(
        (status = 200, description = "One page of bootcamps", body = ListEnvelope),
        (status = 400, description = "Invalid query", body = ErrorBody)
    ),
    tags = ["bootcamps"],
    operation_id = "listBootcamps"
)]
#[get("/bootcamps")]
pub async fn list_bootcamps(
    state: web::Data<HttpState>,
    query: ListQuery,
) -> ApiResult<web::Json<ListEnvelope>> {
    let envelope = state.bootcamps.list(&query.into_inner()).await?;
    Ok(web::Json(envelope))
}

/// Fetch one bootcamp.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp identifier")),
    responses(
        (status = 200, description = "The bootcamp", body = BootcampResponseBody),
        (status = 404, description = "Unknown or malformed identifier", body = ErrorBody)
    ),
    tags = ["bootcamps"],
    operation_id = "getBootcamp"
)]
#[get("/bootcamps/{id}")]
pub async fn get_bootcamp(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BootcampResponseBody>> {
    let id = DocumentId::parse(&path)?;
    let bootcamp = state.bootcamps.get(id).await?;
    Ok(web::Json(bootcamp.into()))
}

/// Create a bootcamp; its location is geocoded from the address.
#[utoipa::path(
    post,
    path = "/api/v1/bootcamps",
    request_body = BootcampPayloadSchema,
    responses(
        (status = 201, description = "Bootcamp created", body = BootcampResponseBody),
        (status = 400, description = "Validation failed or duplicate name", body = ErrorBody),
        (status = 503, description = "Geocoder unavailable", body = ErrorBody)
    ),
    tags = ["bootcamps"],
    operation_id = "createBootcamp"
)]
#[post("/bootcamps")]
pub async fn create_bootcamp(
    state: web::Data<HttpState>,
    payload: web::Json<Document>,
) -> ApiResult<HttpResponse> {
    let bootcamp = state
        .bootcamps_command
        .create(payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(BootcampResponseBody::from(bootcamp)))
}

/// Update a bootcamp. `null` values remove optional fields.
#[utoipa::path(
    put,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp identifier")),
    request_body = BootcampPayloadSchema,
    responses(
        (status = 200, description = "Bootcamp updated", body = BootcampResponseBody),
        (status = 400, description = "Validation failed or duplicate name", body = ErrorBody),
        (status = 404, description = "Unknown or malformed identifier", body = ErrorBody)
    ),
    tags = ["bootcamps"],
    operation_id = "updateBootcamp"
)]
#[put("/bootcamps/{id}")]
pub async fn update_bootcamp(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<Document>,
) -> ApiResult<web::Json<BootcampResponseBody>> {
    let id = DocumentId::parse(&path)?;
    let bootcamp = state
        .bootcamps_command
        .update(id, payload.into_inner())
        .await?;
    Ok(web::Json(bootcamp.into()))
}

/// Delete a bootcamp and return it. Its courses are kept.
#[utoipa::path(
    delete,
    path = "/api/v1/bootcamps/{id}",
    params(("id" = String, Path, description = "Bootcamp identifier")),
    responses(
        (status = 200, description = "Bootcamp deleted", body = BootcampResponseBody),
        (status = 404, description = "Unknown or malformed identifier", body = ErrorBody)
    ),
    tags = ["bootcamps"],
    operation_id = "deleteBootcamp"
)]
#[delete("/bootcamps/{id}")]
pub async fn delete_bootcamp(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<BootcampResponseBody>> {
    let id = DocumentId::parse(&path)?;
    let bootcamp = state.bootcamps_command.delete(id).await?;
    Ok(web::Json(bootcamp.into()))
}

/// Bootcamps within `distance` miles of the centre of `zipcode`.
#[utoipa::path(
    get,
    path = "/api/v1/bootcamps/radius/{zipcode}/{distance}",
    params(
        ("zipcode" = String, Path, description = "Postal code to search around"),
        ("distance" = f64, Path, description = "Radius in miles")
    ),
    responses(
        (status = 200, description = "Bootcamps in range", body = BootcampsResponseBody),
        (status = 400, description = "Distance is not a non-negative number", body = ErrorBody),
        (status = 404, description = "Postal code could not be located", body = ErrorBody),
        (status = 503, description = "Geocoder unavailable", body = ErrorBody)
    ),
    tags = ["bootcamps"],
    operation_id = "getBootcampsInRadius"
)]
#[get("/bootcamps/radius/{zipcode}/{distance}")]
pub async fn bootcamps_in_radius(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<web::Json<BootcampsResponseBody>> {
    let (zipcode, distance) = path.into_inner();
    let distance = parse_distance(&distance)?;
    let bootcamps = state.bootcamps.within_radius(&zipcode, distance).await?;
    Ok(web::Json(bootcamps.into()))
}

#[cfg(test)]
#[path = "bootcamps_tests.rs"]
mod tests;
