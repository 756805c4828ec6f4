//! Shared helpers for HTTP handler tests.

use std::sync::Arc;

use actix_web::{App, web};

use crate::domain::ports::{
    MockBootcampsCommand, MockBootcampsQuery, MockCoursesCommand, MockCoursesQuery,
};
use crate::domain::{Bootcamp, DocumentId};
use crate::inbound::http::state::HttpState;
use crate::test_support::stored_bootcamp;

/// Port mocks with no expectations; tests set the ones they need.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub bootcamps: MockBootcampsQuery,
    pub bootcamps_command: MockBootcampsCommand,
    pub courses: MockCoursesQuery,
    pub courses_command: MockCoursesCommand,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.bootcamps),
            Arc::new(self.bootcamps_command),
            Arc::new(self.courses),
            Arc::new(self.courses_command),
        )
    }
}

/// The `/api/v1` routes over `state`.
pub(crate) fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(super::json_config())
        .service(web::scope("/api/v1").configure(super::configure))
}

pub(crate) fn sample_bootcamp(id: DocumentId, name: &str) -> Bootcamp {
    Bootcamp::from_document(stored_bootcamp(id, name)).expect("fixture bootcamp decodes")
}
