//! Geo Locator Adapter: postal code plus distance to a spherical search.
//!
//! Distances are converted to angular radii by dividing by
//! [`EARTH_RADIUS_MILES`]; the store performs the containment test.

use std::sync::Arc;

use super::ports::{DocumentStore, GeocodedLocation, Geocoder};
use super::{Collection, Document, Error};

/// Mean radius of the Earth in miles used for every distance conversion.
pub const EARTH_RADIUS_MILES: f64 = 3_963.0;

/// Field holding a bootcamp's GeoJSON point.
pub const LOCATION_FIELD: &str = "location";

/// A position in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Longitude in degrees.
    pub longitude: f64,
    /// Latitude in degrees.
    pub latitude: f64,
}

impl GeoPoint {
    /// Build a point from longitude and latitude, in GeoJSON order.
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Great-circle angle to `other` in radians (haversine formula).
    #[must_use]
    #[expect(clippy::float_arithmetic, reason = "spherical trigonometry")]
    pub fn central_angle(self, other: Self) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lng = (other.longitude - self.longitude).to_radians();
        let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * h.sqrt().min(1.0).asin()
    }
}

/// Convert a distance in miles into an angular radius in radians.
///
/// # Errors
/// Returns an invalid-query error for negative or non-finite distances.
///
/// # Examples
/// ```
/// use devcamper::domain::geo::{EARTH_RADIUS_MILES, angular_radius};
///
/// let radius = angular_radius(10.0).expect("valid distance");
/// assert_eq!(radius, 10.0 / EARTH_RADIUS_MILES);
/// ```
#[expect(clippy::float_arithmetic, reason = "miles to radians is a division")]
pub fn angular_radius(distance_miles: f64) -> Result<f64, Error> {
    if !distance_miles.is_finite() || distance_miles < 0.0 {
        return Err(Error::invalid_query(
            "Distance must be a non-negative number of miles",
        ));
    }
    Ok(distance_miles / EARTH_RADIUS_MILES)
}

/// Parse a distance path segment.
///
/// # Errors
/// Returns an invalid-query error when `raw` is not a non-negative number.
pub fn parse_distance(raw: &str) -> Result<f64, Error> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| Error::invalid_query(format!("Invalid distance {raw}")))
}

/// Resolves places through the geocoder and searches the store around them.
pub struct GeoLocator<G: ?Sized, S: ?Sized> {
    geocoder: Arc<G>,
    store: Arc<S>,
}

impl<G: ?Sized, S: ?Sized> Clone for GeoLocator<G, S> {
    fn clone(&self) -> Self {
        Self {
            geocoder: Arc::clone(&self.geocoder),
            store: Arc::clone(&self.store),
        }
    }
}

impl<G, S> GeoLocator<G, S>
where
    G: Geocoder + ?Sized,
    S: DocumentStore + ?Sized,
{
    /// Create a locator.
    pub fn new(geocoder: Arc<G>, store: Arc<S>) -> Self {
        Self { geocoder, store }
    }

    /// First geocoder match for `query`, or `None` when nothing matched.
    ///
    /// # Errors
    /// Maps geocoder failures to service-unavailable or internal errors.
    pub async fn first_match(&self, query: &str) -> Result<Option<GeocodedLocation>, Error> {
        let found = self.geocoder.geocode(query).await?;
        Ok(found.into_iter().next())
    }

    /// Bootcamps within `distance_miles` of `postal_code`, unpaginated.
    ///
    /// # Errors
    /// Fails with not-found when the postal code does not resolve, and with
    /// invalid-query for unusable distances.
    pub async fn bootcamps_near(
        &self,
        postal_code: &str,
        distance_miles: f64,
    ) -> Result<Vec<Document>, Error> {
        let radius = angular_radius(distance_miles)?;
        let Some(found) = self.first_match(postal_code).await? else {
            return Err(Error::not_found(format!(
                "No location found for {postal_code}"
            )));
        };
        let centre = GeoPoint::new(found.longitude, found.latitude);
        tracing::debug!(postal_code, distance_miles, radius, "radius search");
        Ok(self
            .store
            .within_sphere(Collection::Bootcamps, LOCATION_FIELD, centre, radius)
            .await?)
    }
}
