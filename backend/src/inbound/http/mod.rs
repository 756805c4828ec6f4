//! HTTP inbound adapter exposing the REST endpoints under `/api/v1`.

pub mod bootcamps;
pub mod courses;
pub mod error;
pub mod health;
pub mod query_string;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub(crate) mod test_utils;

use actix_web::web;

use crate::domain::Error;

pub use error::ApiResult;

/// Register every resource route on `cfg`.
///
/// Mount inside the `/api/v1` scope.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(bootcamps::list_bootcamps)
        .service(bootcamps::create_bootcamp)
        .service(bootcamps::bootcamps_in_radius)
        .service(bootcamps::get_bootcamp)
        .service(bootcamps::update_bootcamp)
        .service(bootcamps::delete_bootcamp)
        .service(courses::list_bootcamp_courses)
        .service(courses::create_course)
        .service(courses::list_courses)
        .service(courses::get_course)
        .service(courses::update_course)
        .service(courses::delete_course);
}

/// JSON body configuration reporting unreadable bodies as validation
/// failures.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::validation_failed(format!("Request body must be a JSON object: {err}")).into()
    })
}
