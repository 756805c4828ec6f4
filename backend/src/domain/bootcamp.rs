//! Bootcamp listings: the primary aggregate root.
//!
//! Bootcamps travel through the system as JSON documents. The typed
//! [`Bootcamp`] struct fixes the stored shape and documents it for OpenAPI;
//! [`bootcamp_validator`] holds the write rules.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::geo::GeoPoint;
use super::ports::GeocodedLocation;
use super::validation::{FieldRule, Validator, ValueKind};
use super::{Document, DocumentId, Error};

/// Fields a client may set on create or update.
pub const BOOTCAMP_MUTABLE_FIELDS: &[&str] = &[
    "name",
    "description",
    "website",
    "phone",
    "email",
    "address",
    "careers",
    "averageRating",
    "housing",
    "jobAssistance",
    "jobGuarantee",
    "acceptGi",
];

const BOOLEAN_FIELDS: &[&str] = &["housing", "jobAssistance", "jobGuarantee", "acceptGi"];

/// Career tracks a bootcamp may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Career {
    /// Web development.
    #[serde(rename = "Web Development")]
    WebDevelopment,
    /// Mobile development.
    #[serde(rename = "Mobile Development")]
    MobileDevelopment,
    /// Interface and experience design.
    #[serde(rename = "UI/UX")]
    UiUx,
    /// Data science.
    #[serde(rename = "Data Science")]
    DataScience,
    /// Business.
    #[serde(rename = "Business")]
    Business,
    /// Anything else.
    #[serde(rename = "Other")]
    Other,
}

impl Career {
    /// Stored labels, in declaration order.
    pub const LABELS: &'static [&'static str] = &[
        "Web Development",
        "Mobile Development",
        "UI/UX",
        "Data Science",
        "Business",
        "Other",
    ];
}

/// GeoJSON point enriched with the geocoder's address breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Always `"Point"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[longitude, latitude]`.
    #[schema(value_type = Vec<f64>)]
    pub coordinates: [f64; 2],
    /// Address as formatted by the geocoder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,
    /// Street name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    /// City.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// State code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    /// Country code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl Location {
    /// Build the stored location from the first geocoder match.
    #[must_use]
    pub fn from_geocoded(found: &GeocodedLocation) -> Self {
        Self {
            kind: "Point".to_owned(),
            coordinates: [found.longitude, found.latitude],
            formatted_address: found.formatted_address.clone(),
            street: found.street_name.clone(),
            city: found.city.clone(),
            state: found.state_code.clone(),
            zipcode: found.zipcode.clone(),
            country: found.country_code.clone(),
        }
    }

    /// Position of the point.
    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        GeoPoint::new(self.coordinates[0], self.coordinates[1])
    }
}

/// A training-provider listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Bootcamp {
    /// Identity.
    #[serde(rename = "_id")]
    #[schema(value_type = String, format = Uuid)]
    pub id: DocumentId,
    /// Unique display name.
    pub name: String,
    /// Slug derived from the name.
    pub slug: String,
    /// Free-text description.
    pub description: String,
    /// Public website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Postal address as supplied by the client.
    pub address: String,
    /// Geocoded position; never written by clients.
    pub location: Location,
    /// Career tracks offered.
    pub careers: Vec<Career>,
    /// Average rating between 1 and 10.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_rating: Option<f64>,
    /// Mean course tuition rounded up to a multiple of ten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost: Option<i64>,
    /// Housing offered.
    #[serde(default)]
    pub housing: bool,
    /// Job assistance offered.
    #[serde(default)]
    pub job_assistance: bool,
    /// Job guarantee offered.
    #[serde(default)]
    pub job_guarantee: bool,
    /// Accepts the GI Bill.
    #[serde(default)]
    pub accept_gi: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Bootcamp {
    /// Decode a stored document.
    ///
    /// # Errors
    /// Returns an internal error when the document does not have the stored
    /// bootcamp shape.
    pub fn from_document(document: Document) -> Result<Self, Error> {
        serde_json::from_value(Value::Object(document))
            .map_err(|err| Error::internal(format!("malformed bootcamp document: {err}")))
    }

    /// Encode as a stored document.
    ///
    /// # Errors
    /// Returns an internal error if serialisation fails.
    pub fn into_document(self) -> Result<Document, Error> {
        match serde_json::to_value(self) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(other) => Err(Error::internal(format!(
                "bootcamp serialised to a non-object: {other}"
            ))),
            Err(err) => Err(Error::internal(format!(
                "failed to serialise bootcamp: {err}"
            ))),
        }
    }
}

/// Trim text fields and fill boolean defaults on a client body.
pub fn normalise_bootcamp_body(body: &mut Document) {
    if let Some(Value::String(name)) = body.get_mut("name") {
        *name = name.trim().to_owned();
    }
    for field in BOOLEAN_FIELDS {
        if matches!(body.get(*field), None | Some(Value::Null)) {
            body.insert((*field).to_owned(), Value::Bool(false));
        }
    }
}

static WEBSITE_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn website_regex() -> &'static Regex {
    WEBSITE_RE.get_or_init(|| {
        let pattern = r"https?://(www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b([-a-zA-Z0-9()@:%_+.~#?&/=]*)";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("website regex failed to compile: {error}"))
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        let pattern = r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Write rules for bootcamp documents.
#[must_use]
pub fn bootcamp_validator() -> Validator {
    let mut validator = Validator::new()
        .field(
            "name",
            vec![
                FieldRule::Required("Add a name"),
                FieldRule::Kind(ValueKind::Text),
                FieldRule::MaxLength {
                    max: 50,
                    message: "Name cannot exceed 50 characters",
                },
            ],
        )
        .field(
            "description",
            vec![
                FieldRule::Required("Path `description` is required."),
                FieldRule::Kind(ValueKind::Text),
                FieldRule::MaxLength {
                    max: 500,
                    message: "Description cannot exceed 500 characters",
                },
            ],
        )
        .field(
            "website",
            vec![
                FieldRule::Kind(ValueKind::Text),
                FieldRule::Pattern {
                    regex: website_regex(),
                    message: "Please use a valid URL with HTTP or HTTPS",
                },
            ],
        )
        .field(
            "phone",
            vec![
                FieldRule::Kind(ValueKind::Text),
                FieldRule::MaxLength {
                    max: 20,
                    message: "Phone number cannot exceed 20 characters",
                },
            ],
        )
        .field(
            "email",
            vec![
                FieldRule::Kind(ValueKind::Text),
                FieldRule::Pattern {
                    regex: email_regex(),
                    message: "Please add a valid email",
                },
            ],
        )
        .field(
            "address",
            vec![
                FieldRule::Required("Add an address"),
                FieldRule::Kind(ValueKind::Text),
            ],
        )
        .field(
            "careers",
            vec![
                FieldRule::Required("Path `careers` is required."),
                FieldRule::Kind(ValueKind::TextList),
                FieldRule::NonEmpty("Path `careers` is required."),
                FieldRule::EachOneOf {
                    allowed: Career::LABELS,
                    message: "Careers must be drawn from the supported list",
                },
            ],
        )
        .field(
            "averageRating",
            vec![
                FieldRule::Kind(ValueKind::Number),
                FieldRule::Range {
                    min: 1.0,
                    max: 10.0,
                    below: "Rating must be at least 1",
                    above: "Rating cannot exceed 10",
                },
            ],
        );
    for field in BOOLEAN_FIELDS {
        validator = validator.field(*field, vec![FieldRule::Kind(ValueKind::Boolean)]);
    }
    validator
}
