//! Courses offered by a bootcamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use utoipa::ToSchema;

use super::validation::{FieldRule, Validator, ValueKind};
use super::{Document, DocumentId, Error};

/// Fields a client may set on create or update.
pub const COURSE_MUTABLE_FIELDS: &[&str] = &[
    "title",
    "description",
    "weeks",
    "tuition",
    "minimumSkill",
    "scholarshipAvailable",
];

/// Field linking a course to its bootcamp.
pub const BOOTCAMP_FIELD: &str = "bootcamp";

/// Entry level expected of students.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MinimumSkill {
    /// No prior experience.
    Beginner,
    /// Some experience.
    Intermediate,
    /// Working knowledge.
    Advanced,
}

impl MinimumSkill {
    /// Stored labels.
    pub const LABELS: &'static [&'static str] = &["beginner", "intermediate", "advanced"];
}

/// Parent bootcamp as stored (identifier) or joined (summary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BootcampRef {
    /// Joined summary of the parent.
    Summary(BootcampSummary),
    /// Identifier of the parent.
    Id(DocumentId),
}

impl BootcampRef {
    /// Identifier of the referenced bootcamp.
    #[must_use]
    pub const fn id(&self) -> DocumentId {
        match self {
            Self::Summary(summary) => summary.id,
            Self::Id(id) => *id,
        }
    }
}

/// Bootcamp fields attached to a course when joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BootcampSummary {
    /// Identity.
    #[serde(rename = "_id")]
    #[schema(value_type = String, format = Uuid)]
    pub id: DocumentId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A course offered by a bootcamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Identity.
    #[serde(rename = "_id")]
    #[schema(value_type = String, format = Uuid)]
    pub id: DocumentId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Duration, as entered.
    pub weeks: String,
    /// Tuition cost.
    pub tuition: f64,
    /// Entry level.
    pub minimum_skill: MinimumSkill,
    /// Whether a scholarship is offered.
    #[serde(default)]
    pub scholarship_available: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Parent bootcamp: an identifier, or a summary when joined.
    #[schema(value_type = Object)]
    pub bootcamp: BootcampRef,
}

impl Course {
    /// Decode a stored or joined document.
    ///
    /// # Errors
    /// Returns an internal error when the document does not have the course
    /// shape.
    pub fn from_document(document: Document) -> Result<Self, Error> {
        serde_json::from_value(Value::Object(document))
            .map_err(|err| Error::internal(format!("malformed course document: {err}")))
    }

    /// Encode as a document.
    ///
    /// # Errors
    /// Returns an internal error if serialisation fails.
    pub fn into_document(self) -> Result<Document, Error> {
        match serde_json::to_value(self) {
            Ok(Value::Object(document)) => Ok(document),
            Ok(other) => Err(Error::internal(format!(
                "course serialised to a non-object: {other}"
            ))),
            Err(err) => Err(Error::internal(format!("failed to serialise course: {err}"))),
        }
    }
}

/// Trim and cast client input the way the stored schema expects.
///
/// Titles are trimmed, numeric week counts become text, numeric tuition
/// strings become numbers, and `scholarshipAvailable` defaults to `false`.
pub fn normalise_course_body(body: &mut Document) {
    if let Some(Value::String(title)) = body.get_mut("title") {
        *title = title.trim().to_owned();
    }
    if let Some(Value::Number(weeks)) = body.get("weeks") {
        let text = weeks.to_string();
        body.insert("weeks".to_owned(), Value::String(text));
    }
    if let Some(Value::String(raw)) = body.get("tuition") {
        let cast = raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number);
        if let Some(number) = cast {
            body.insert("tuition".to_owned(), number);
        }
    }
    if matches!(body.get("scholarshipAvailable"), None | Some(Value::Null)) {
        body.insert("scholarshipAvailable".to_owned(), Value::Bool(false));
    }
}

/// Write rules for course documents.
#[must_use]
pub fn course_validator() -> Validator {
    Validator::new()
        .field(
            "title",
            vec![
                FieldRule::Required("Add a course title"),
                FieldRule::Kind(ValueKind::Text),
            ],
        )
        .field(
            "description",
            vec![
                FieldRule::Required("Add a course desciption"),
                FieldRule::Kind(ValueKind::Text),
            ],
        )
        .field(
            "weeks",
            vec![
                FieldRule::Required("Add number of weeks"),
                FieldRule::Kind(ValueKind::Text),
            ],
        )
        .field(
            "tuition",
            vec![
                FieldRule::Required("Add tuition cost"),
                FieldRule::Kind(ValueKind::Number),
            ],
        )
        .field(
            "minimumSkill",
            vec![
                FieldRule::Required("Add minimum skill level"),
                FieldRule::Kind(ValueKind::Text),
                FieldRule::OneOf {
                    allowed: MinimumSkill::LABELS,
                    message: "Minimum skill must be beginner, intermediate, or advanced",
                },
            ],
        )
        .field(
            "scholarshipAvailable",
            vec![FieldRule::Kind(ValueKind::Boolean)],
        )
}
