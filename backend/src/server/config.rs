//! Server settings loaded via OrthoConfig.
//!
//! Values come from `DEVCAMPER_*` environment variables, a configuration
//! file, or command-line flags. Unset values fall back to the defaults below.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use devcamper::outbound::geocoding::DEFAULT_MAPQUEST_ENDPOINT;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_GEOCODER_PROVIDER: &str = "mapquest";
const DEFAULT_GEOCODER_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MONGO_DATABASE: &str = "devcamper";

/// Bind address, document database, and geocoder settings for the HTTP
/// server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DEVCAMPER")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<IpAddr>,
    /// Port to bind.
    pub port: Option<u16>,
    /// Geocoding provider name.
    pub geocoder_provider: Option<String>,
    /// Provider API key; without one every geocode fails as unavailable.
    pub geocoder_api_key: Option<String>,
    /// Provider endpoint override.
    pub geocoder_endpoint: Option<String>,
    /// Per-request geocoder timeout in seconds.
    pub geocoder_timeout_secs: Option<u64>,
    /// MongoDB connection string; without one documents are kept in memory.
    pub mongo_uri: Option<String>,
    /// Database name, used when the connection string does not pick one.
    pub mongo_database: Option<String>,
}

impl ServerSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:5000`.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(
            self.host.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            self.port.unwrap_or(DEFAULT_PORT),
        )
    }

    /// Configured provider, lower-cased.
    pub fn geocoder_provider(&self) -> String {
        self.geocoder_provider
            .as_deref()
            .unwrap_or(DEFAULT_GEOCODER_PROVIDER)
            .trim()
            .to_ascii_lowercase()
    }

    /// API key, ignoring blank values.
    pub fn geocoder_api_key(&self) -> Option<&str> {
        self.geocoder_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Endpoint to call, defaulting to the MapQuest address endpoint.
    pub fn geocoder_endpoint(&self) -> &str {
        self.geocoder_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_MAPQUEST_ENDPOINT)
    }

    /// MongoDB connection string, ignoring blank values.
    pub fn mongo_uri(&self) -> Option<&str> {
        self.mongo_uri
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }

    /// Database holding the collections.
    pub fn mongo_database(&self) -> &str {
        self.mongo_database
            .as_deref()
            .unwrap_or(DEFAULT_MONGO_DATABASE)
    }

    /// Request timeout for geocoder calls.
    pub fn geocoder_timeout(&self) -> Duration {
        Duration::from_secs(
            self.geocoder_timeout_secs
                .unwrap_or(DEFAULT_GEOCODER_TIMEOUT_SECS),
        )
    }
}
