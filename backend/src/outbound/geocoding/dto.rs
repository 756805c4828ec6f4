//! DTOs for decoding MapQuest geocoding responses.
//!
//! Only `results[0]` is read: the adapter sends one location per request.

use serde::Deserialize;

use crate::domain::ports::GeocodedLocation;

#[derive(Debug, Deserialize)]
pub(super) struct GeocodeResponseDto {
    #[serde(default)]
    pub(super) info: Option<InfoDto>,
    #[serde(default)]
    pub(super) results: Vec<ResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct InfoDto {
    #[serde(default)]
    pub(super) statuscode: u16,
    #[serde(default)]
    pub(super) messages: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ResultDto {
    #[serde(default)]
    pub(super) locations: Vec<LocationDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct LocationDto {
    pub(super) lat_lng: Option<LatLngDto>,
    #[serde(default)]
    pub(super) street: Option<String>,
    #[serde(default)]
    pub(super) admin_area5: Option<String>,
    #[serde(default)]
    pub(super) admin_area3: Option<String>,
    #[serde(default)]
    pub(super) postal_code: Option<String>,
    #[serde(default)]
    pub(super) admin_area1: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct LatLngDto {
    pub(super) lat: f64,
    pub(super) lng: f64,
}

impl GeocodeResponseDto {
    pub(super) fn into_locations(self) -> Result<Vec<GeocodedLocation>, String> {
        self.results
            .into_iter()
            .next()
            .map(|result| {
                result
                    .locations
                    .into_iter()
                    .map(LocationDto::into_domain)
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl LocationDto {
    fn into_domain(self) -> Result<GeocodedLocation, String> {
        let Some(LatLngDto { lat, lng }) = self.lat_lng else {
            return Err("location missing latLng".to_owned());
        };
        if !lat.is_finite() || !lng.is_finite() {
            return Err("location includes non-finite coordinates".to_owned());
        }
        let formatted_address = self.formatted_address();
        Ok(GeocodedLocation {
            latitude: lat,
            longitude: lng,
            formatted_address,
            street_name: non_blank(self.street),
            city: non_blank(self.admin_area5),
            state_code: non_blank(self.admin_area3),
            zipcode: non_blank(self.postal_code),
            country_code: non_blank(self.admin_area1),
        })
    }

    /// `street, city, state postcode, country`, skipping blank parts.
    fn formatted_address(&self) -> Option<String> {
        let state_line = [&self.admin_area3, &self.postal_code]
            .into_iter()
            .filter_map(|part| part.as_deref().map(str::trim))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let parts: Vec<&str> = [
            self.street.as_deref(),
            self.admin_area5.as_deref(),
            Some(state_line.as_str()),
            self.admin_area1.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}
