//! Builders wiring the configured document store and geocoder into the HTTP
//! state.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};
use reqwest::Url;
use tracing::{info, warn};

use devcamper::domain::ports::{DocumentStore, Geocoder};
use devcamper::domain::{BootcampService, CourseService};
use devcamper::inbound::http::state::HttpState;
use devcamper::outbound::geocoding::{MapQuestGeocoder, UnconfiguredGeocoder};
use devcamper::outbound::persistence::{InMemoryDocumentStore, MongoDocumentStore};

use super::ServerSettings;

const MAPQUEST: &str = "mapquest";

/// Build the geocoder named by `settings`.
///
/// A missing API key yields a geocoder that fails every call as
/// unavailable, so the server still starts.
///
/// # Errors
/// Returns [`std::io::Error`] for an unsupported provider, an invalid
/// endpoint, or an HTTP client that cannot be built.
pub(super) fn build_geocoder(settings: &ServerSettings) -> std::io::Result<Arc<dyn Geocoder>> {
    let provider = settings.geocoder_provider();
    if provider != MAPQUEST {
        return Err(std::io::Error::other(format!(
            "unsupported geocoder provider {provider}"
        )));
    }
    let Some(api_key) = settings.geocoder_api_key() else {
        warn!(provider = %provider, "geocoder API key not set; geocoding is disabled");
        return Ok(Arc::new(UnconfiguredGeocoder::new(
            "DEVCAMPER_GEOCODER_API_KEY is not set",
        )));
    };
    let endpoint = Url::parse(settings.geocoder_endpoint()).map_err(|error| {
        std::io::Error::other(format!(
            "invalid geocoder endpoint {}: {error}",
            settings.geocoder_endpoint()
        ))
    })?;
    let timeout = settings.geocoder_timeout();
    let geocoder = MapQuestGeocoder::new(endpoint.clone(), api_key, timeout)
        .map_err(|error| std::io::Error::other(format!("geocoder client: {error}")))?;
    info!(provider = %provider, %endpoint, timeout_secs = timeout.as_secs(), "geocoder configured");
    Ok(Arc::new(geocoder))
}

/// Build the document store named by `settings`.
///
/// Without a connection string documents live in process memory and are
/// lost on restart.
///
/// # Errors
/// Returns [`std::io::Error`] when the database cannot be reached or its
/// indexes cannot be created.
pub(super) async fn build_document_store(
    settings: &ServerSettings,
) -> std::io::Result<Arc<dyn DocumentStore>> {
    let Some(uri) = settings.mongo_uri() else {
        warn!("DEVCAMPER_MONGO_URI not set; documents are kept in memory");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    };
    let store = MongoDocumentStore::connect(uri, settings.mongo_database())
        .await
        .map_err(|error| std::io::Error::other(format!("document store: {error}")))?;
    Ok(Arc::new(store))
}

/// Assemble the HTTP state over `store`.
pub(super) fn build_http_state(
    store: Arc<dyn DocumentStore>,
    geocoder: Arc<dyn Geocoder>,
) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let bootcamps = Arc::new(BootcampService::new(store.clone(), geocoder, clock.clone()));
    let courses = Arc::new(CourseService::new(store, clock));
    web::Data::new(HttpState::new(
        bootcamps.clone(),
        bootcamps,
        courses.clone(),
        courses,
    ))
}
