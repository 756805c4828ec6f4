//! Geocoder outbound adapters.
//!
//! [`MapQuestGeocoder`] is the HTTP implementation of the `Geocoder` port;
//! [`UnconfiguredGeocoder`] stands in when no API key is configured.

mod dto;
mod mapquest;

use async_trait::async_trait;

use crate::domain::ports::{GeocodedLocation, Geocoder, GeocoderError};

pub use mapquest::{DEFAULT_MAPQUEST_ENDPOINT, MapQuestGeocoder};

/// Geocoder that fails every call as not configured.
#[derive(Debug, Clone, Default)]
pub struct UnconfiguredGeocoder {
    reason: String,
}

impl UnconfiguredGeocoder {
    /// Fail every call with `reason`.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Geocoder for UnconfiguredGeocoder {
    async fn geocode(&self, _query: &str) -> Result<Vec<GeocodedLocation>, GeocoderError> {
        Err(GeocoderError::not_configured(self.reason.clone()))
    }
}
