//! HTTP adapter mapping for domain errors.
//!
//! The domain error type stays HTTP-agnostic; this module turns it into the
//! `{"success": false, "error": ...}` body and a status derived from its code.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::TRACE_ID_HEADER;

pub use crate::domain::ApiResult;

/// Message returned in place of internal error details.
pub const REDACTED_MESSAGE: &str = "Server Error";

/// Body of every failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable failure message.
    #[schema(example = "Bootcamp not found with id of 5d725a1b7b292f5f8ceff788")]
    pub error: String,
}

impl ErrorBody {
    fn from_error(error: &Error) -> Self {
        let message = match error.code() {
            ErrorCode::InternalError => REDACTED_MESSAGE.to_owned(),
            _ => error.message().to_owned(),
        };
        Self {
            success: false,
            error: message,
        }
    }
}

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound | ErrorCode::InvalidId => StatusCode::NOT_FOUND,
        ErrorCode::ValidationFailed | ErrorCode::DuplicateKey | ErrorCode::InvalidQuery => {
            StatusCode::BAD_REQUEST
        }
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            error!(
                message = self.message(),
                trace_id = self.trace_id().unwrap_or_default(),
                "internal error redacted from response"
            );
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(ErrorBody::from_error(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("actix error")
    }
}
