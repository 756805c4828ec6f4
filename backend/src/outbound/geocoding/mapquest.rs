//! Reqwest-backed MapQuest geocoder adapter.
//!
//! This adapter owns transport details only: request construction, timeout and
//! HTTP error mapping, and JSON decoding into geocoder matches.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::GeocodeResponseDto;
use crate::domain::ports::{GeocodedLocation, Geocoder, GeocoderError};

/// Default MapQuest geocoding endpoint.
pub const DEFAULT_MAPQUEST_ENDPOINT: &str = "https://www.mapquestapi.com/geocoding/v1/address";

const USER_AGENT: &str = "devcamper-backend/0.1";

/// Geocoder calling the MapQuest `address` endpoint.
pub struct MapQuestGeocoder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl MapQuestGeocoder {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        endpoint: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedLocation>, GeocoderError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[("key", self.api_key.as_str()), ("location", query)])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        let locations = parse_locations(body.as_ref())?;
        tracing::debug!(query, matches = locations.len(), "geocoded");
        Ok(locations)
    }
}

fn parse_locations(body: &[u8]) -> Result<Vec<GeocodedLocation>, GeocoderError> {
    let decoded: GeocodeResponseDto = serde_json::from_slice(body).map_err(|error| {
        GeocoderError::decode(format!("invalid MapQuest JSON payload: {error}"))
    })?;
    if let Some(info) = decoded.info.as_ref().filter(|info| info.statuscode != 0) {
        return Err(GeocoderError::rejected(
            info.statuscode,
            info.messages.join("; "),
        ));
    }
    decoded.into_locations().map_err(GeocoderError::decode)
}

fn map_transport_error(error: reqwest::Error) -> GeocoderError {
    if error.is_timeout() {
        GeocoderError::timeout(error.to_string())
    } else {
        GeocoderError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> GeocoderError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            GeocoderError::timeout(message)
        }
        _ if status.is_client_error() => GeocoderError::rejected(status.as_u16(), message),
        _ => GeocoderError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
