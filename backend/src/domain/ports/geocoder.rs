//! Driven port for address geocoding.
//!
//! The domain owns the response contract so the bootcamp workflow and the
//! radius search stay provider-agnostic.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// One geocoder match.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeocodedLocation {
    /// Latitude in WGS84.
    pub latitude: f64,
    /// Longitude in WGS84.
    pub longitude: f64,
    /// Address as formatted by the provider.
    pub formatted_address: Option<String>,
    /// Street name.
    pub street_name: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State code.
    pub state_code: Option<String>,
    /// Postal code.
    pub zipcode: Option<String>,
    /// Country code.
    pub country_code: Option<String>,
}

/// Errors surfaced while geocoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocoderError {
    /// Network transport failed before a response arrived.
    #[error("geocoder transport failed: {message}")]
    Transport {
        /// Adapter detail.
        message: String,
    },
    /// The call exceeded its timeout.
    #[error("geocoder timeout: {message}")]
    Timeout {
        /// Adapter detail.
        message: String,
    },
    /// The provider refused the request.
    #[error("geocoder rejected request with status {status}: {message}")]
    Rejected {
        /// HTTP status returned.
        status: u16,
        /// Response excerpt.
        message: String,
    },
    /// The response could not be decoded.
    #[error("geocoder response decode failed: {message}")]
    Decode {
        /// Adapter detail.
        message: String,
    },
    /// No provider is configured.
    #[error("geocoder not configured: {message}")]
    NotConfigured {
        /// Configuration detail.
        message: String,
    },
}

impl GeocoderError {
    /// Transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Timeout.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Provider refusal.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Undecodable response.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Missing configuration.
    pub fn not_configured(message: impl Into<String>) -> Self {
        Self::NotConfigured {
            message: message.into(),
        }
    }
}

impl From<GeocoderError> for crate::domain::Error {
    fn from(error: GeocoderError) -> Self {
        match error {
            GeocoderError::Decode { .. } => Self::internal(error.to_string()),
            GeocoderError::Transport { .. }
            | GeocoderError::Timeout { .. }
            | GeocoderError::Rejected { .. }
            | GeocoderError::NotConfigured { .. } => {
                tracing::warn!(error = %error, "geocoder unavailable");
                Self::service_unavailable("Geocoding service unavailable")
            }
        }
    }
}

/// Port resolving addresses and postal codes to coordinates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `query`, best match first. An empty list means no match.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use devcamper::domain::ports::{FixtureGeocoder, Geocoder, GeocodedLocation};
    ///
    /// let geocoder = FixtureGeocoder::default().with_location(
    ///     "02215",
    ///     GeocodedLocation { latitude: 42.35, longitude: -71.1, ..Default::default() },
    /// );
    /// let found = geocoder.geocode("02215").await?;
    /// assert_eq!(found.len(), 1);
    /// # Ok::<(), devcamper::domain::ports::GeocoderError>(())
    /// ```
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedLocation>, GeocoderError>;
}

/// Fixture geocoder answering from an in-memory table.
///
/// Unknown queries resolve to no matches.
#[derive(Debug, Clone, Default)]
pub struct FixtureGeocoder {
    locations: HashMap<String, Vec<GeocodedLocation>>,
}

impl FixtureGeocoder {
    /// Register a match for `query`.
    #[must_use]
    pub fn with_location(mut self, query: impl Into<String>, location: GeocodedLocation) -> Self {
        self.locations.entry(query.into()).or_default().push(location);
        self
    }
}

#[async_trait]
impl Geocoder for FixtureGeocoder {
    async fn geocode(&self, query: &str) -> Result<Vec<GeocodedLocation>, GeocoderError> {
        Ok(self.locations.get(query).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn fixture_geocoder_answers_registered_queries() {
        let geocoder = FixtureGeocoder::default().with_location(
            "02215",
            GeocodedLocation {
                latitude: 42.35,
                longitude: -71.1,
                ..GeocodedLocation::default()
            },
        );
        let found = geocoder.geocode("02215").await.expect("fixture lookup");
        assert_eq!(found.len(), 1);
        assert!(geocoder.geocode("99999").await.expect("lookup").is_empty());
    }

    #[rstest]
    #[case(GeocoderError::transport("reset"), ErrorCode::ServiceUnavailable)]
    #[case(GeocoderError::timeout("10s"), ErrorCode::ServiceUnavailable)]
    #[case(GeocoderError::rejected(403, "bad key"), ErrorCode::ServiceUnavailable)]
    #[case(GeocoderError::not_configured("no key"), ErrorCode::ServiceUnavailable)]
    #[case(GeocoderError::decode("eof"), ErrorCode::InternalError)]
    fn geocoder_errors_map_to_domain_codes(
        #[case] error: GeocoderError,
        #[case] expected: ErrorCode,
    ) {
        let mapped: crate::domain::Error = error.into();
        assert_eq!(mapped.code(), expected);
    }
}
