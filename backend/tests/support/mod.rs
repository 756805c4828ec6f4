//! Shared harness for backend integration tests.
//!
//! Drives the full `/api/v1` surface against the in-memory document store
//! and a fixture geocoder that knows two addresses and their postal codes.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use mockable::{Clock, DefaultClock};
use serde_json::{Value, json};

use devcamper::Trace;
use devcamper::domain::ports::{FixtureGeocoder, GeocodedLocation};
use devcamper::domain::{BootcampService, CourseService};
use devcamper::inbound::http::state::HttpState;
use devcamper::inbound::http::{configure, json_config};
use devcamper::outbound::persistence::InMemoryDocumentStore;

/// Street address the fixture geocoder places in Boston, 02215.
pub const BOSTON_ADDRESS: &str = "233 Bay State Rd Boston MA 02215";
/// Street address the fixture geocoder places in Lowell, 01854.
pub const LOWELL_ADDRESS: &str = "1 University Ave Lowell MA 01854";

fn location(latitude: f64, longitude: f64, city: &str, zipcode: &str) -> GeocodedLocation {
    GeocodedLocation {
        latitude,
        longitude,
        city: Some(city.to_owned()),
        state_code: Some("MA".to_owned()),
        zipcode: Some(zipcode.to_owned()),
        country_code: Some("US".to_owned()),
        ..GeocodedLocation::default()
    }
}

fn geocoder() -> FixtureGeocoder {
    let boston = location(42.350_846, -71.103_12, "Boston", "02215");
    let lowell = location(42.655_34, -71.324_84, "Lowell", "01854");
    FixtureGeocoder::default()
        .with_location(BOSTON_ADDRESS, boston.clone())
        .with_location("02215", boston)
        .with_location(LOWELL_ADDRESS, lowell.clone())
        .with_location("01854", lowell)
}

/// The production route table over a fresh store.
pub fn app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let store = Arc::new(InMemoryDocumentStore::new());
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let bootcamps = Arc::new(BootcampService::new(
        store.clone(),
        Arc::new(geocoder()),
        clock.clone(),
    ));
    let courses = Arc::new(CourseService::new(store, clock));
    let state = HttpState::new(bootcamps.clone(), bootcamps, courses.clone(), courses);
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure))
}

/// A bootcamp payload that passes validation.
pub fn bootcamp_body(name: &str, address: &str, careers: &[&str]) -> Value {
    json!({
        "name": name,
        "description": format!("{name} teaches full stack development"),
        "website": "https://example.com",
        "email": "enroll@example.com",
        "address": address,
        "careers": careers,
    })
}

/// A course payload that passes validation.
pub fn course_body(title: &str, tuition: u32) -> Value {
    json!({
        "title": title,
        "description": format!("{title} from first principles"),
        "weeks": "8",
        "tuition": tuition,
        "minimumSkill": "beginner",
    })
}

/// Send `request` and decode the JSON body.
pub async fn send<S>(app: &S, request: test::TestRequest) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let response = test::call_service(app, request.to_request()).await;
    let status = response.status();
    let body: Value = test::read_body_json(response).await;
    (status, body)
}

/// Create a bootcamp and return its identifier.
pub async fn create_bootcamp<S>(app: &S, body: Value) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, created) = send(
        app,
        test::TestRequest::post()
            .uri("/api/v1/bootcamps")
            .set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    created["data"]["_id"]
        .as_str()
        .expect("created bootcamp has an id")
        .to_owned()
}

/// Create a course under `bootcamp_id` and return its identifier.
pub async fn create_course<S>(app: &S, bootcamp_id: &str, body: Value) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, created) = send(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/v1/bootcamps/{bootcamp_id}/courses"))
            .set_json(body),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    created["data"]["_id"]
        .as_str()
        .expect("created course has an id")
        .to_owned()
}

/// Current `averageCost` of a bootcamp as returned on the wire.
pub async fn average_cost<S>(app: &S, bootcamp_id: &str) -> Option<Value>
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let (status, body) = send(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/bootcamps/{bootcamp_id}")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "fetch failed: {body}");
    body["data"].get("averageCost").cloned()
}
