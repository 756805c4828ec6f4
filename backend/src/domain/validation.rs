//! Explicit per-entity field rules evaluated before every write.
//!
//! A [`Validator`] walks its declared fields in order and reports every
//! offending field at once, joined with `", "`, as a single
//! [`ErrorCode::ValidationFailed`](crate::domain::ErrorCode::ValidationFailed)
//! error. Each field reports at most one failure: the first rule it breaks.

use std::fmt;

use regex::Regex;
use serde_json::Value;

use super::{Document, Error};

/// JSON shape a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A JSON string.
    Text,
    /// A JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
    /// A JSON array of strings.
    TextList,
}

impl ValueKind {
    fn admits(self, value: &Value) -> bool {
        match self {
            Self::Text => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::TextList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Number => "a number",
            Self::Boolean => "true or false",
            Self::TextList => "a list of text values",
        })
    }
}

/// One constraint on a document field.
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Field must be present, non-null, and not blank text.
    Required(&'static str),
    /// Value must have the given JSON shape.
    Kind(ValueKind),
    /// Text must not exceed `max` characters.
    MaxLength {
        /// Inclusive character limit.
        max: usize,
        /// Failure message.
        message: &'static str,
    },
    /// Number must lie within `min..=max`.
    Range {
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
        /// Message when below `min`.
        below: &'static str,
        /// Message when above `max`.
        above: &'static str,
    },
    /// Text must equal one of the allowed values.
    OneOf {
        /// Permitted values.
        allowed: &'static [&'static str],
        /// Failure message.
        message: &'static str,
    },
    /// Every list member must equal one of the allowed values.
    EachOneOf {
        /// Permitted values.
        allowed: &'static [&'static str],
        /// Failure message.
        message: &'static str,
    },
    /// List must hold at least one member.
    NonEmpty(&'static str),
    /// Text must match the pattern.
    Pattern {
        /// Compiled pattern.
        regex: &'static Regex,
        /// Failure message.
        message: &'static str,
    },
}

impl FieldRule {
    /// Check `value`, returning the failure message when the rule is broken.
    ///
    /// `Required` is handled by [`Validator`] because it concerns absence;
    /// every other rule only runs against present, non-null values.
    fn check(&self, field: &str, value: &Value) -> Option<String> {
        match self {
            Self::Required(_) => None,
            Self::Kind(kind) => (!kind.admits(value)).then(|| format!("{field} must be {kind}")),
            Self::MaxLength { max, message } => value
                .as_str()
                .filter(|text| text.chars().count() > *max)
                .map(|_| (*message).to_owned()),
            Self::Range {
                min,
                max,
                below,
                above,
            } => value.as_f64().and_then(|number| {
                if number < *min {
                    Some((*below).to_owned())
                } else if number > *max {
                    Some((*above).to_owned())
                } else {
                    None
                }
            }),
            Self::OneOf { allowed, message } => value
                .as_str()
                .filter(|text| !allowed.contains(text))
                .map(|_| (*message).to_owned()),
            Self::EachOneOf { allowed, message } => value
                .as_array()
                .filter(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .any(|item| !allowed.contains(&item))
                })
                .map(|_| (*message).to_owned()),
            Self::NonEmpty(message) => value
                .as_array()
                .filter(|items| items.is_empty())
                .map(|_| (*message).to_owned()),
            Self::Pattern { regex, message } => value
                .as_str()
                .filter(|text| !regex.is_match(text))
                .map(|_| (*message).to_owned()),
        }
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

/// Ordered rule set for one entity.
///
/// # Examples
/// ```
/// use devcamper::domain::validation::{FieldRule, Validator, ValueKind};
/// use serde_json::json;
///
/// let validator = Validator::new()
///     .field("title", vec![FieldRule::Required("Add a course title"), FieldRule::Kind(ValueKind::Text)]);
/// let body = json!({ "title": "  " });
/// let error = validator.validate(body.as_object().expect("object")).expect_err("blank title");
/// assert_eq!(error.message(), "Add a course title");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Validator {
    fields: Vec<(&'static str, Vec<FieldRule>)>,
}

impl Validator {
    /// Create an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for `field`.
    #[must_use]
    pub fn field(mut self, field: &'static str, rules: Vec<FieldRule>) -> Self {
        self.fields.push((field, rules));
        self
    }

    /// Collect the failure message of every offending field.
    #[must_use]
    pub fn failures(&self, document: &Document) -> Vec<String> {
        self.fields
            .iter()
            .filter_map(|(field, rules)| {
                let value = document.get(*field);
                if is_absent(value) {
                    return rules.iter().find_map(|rule| match rule {
                        FieldRule::Required(message) => Some((*message).to_owned()),
                        _ => None,
                    });
                }
                let present = value?;
                rules.iter().find_map(|rule| rule.check(field, present))
            })
            .collect()
    }

    /// Validate `document`.
    ///
    /// # Errors
    /// Returns a validation error listing every offending field.
    pub fn validate(&self, document: &Document) -> Result<(), Error> {
        let failures = self.failures(document);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(Error::validation_failed(failures.join(", ")))
        }
    }
}

/// Reject body keys outside the entity's mutable-field allow-list.
///
/// # Errors
/// Returns a validation error naming every unknown key.
pub fn reject_unknown_fields(body: &Document, allowed: &[&str]) -> Result<(), Error> {
    let unknown: Vec<&str> = body
        .keys()
        .map(String::as_str)
        .filter(|key| !allowed.contains(key))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    tracing::warn!(fields = ?unknown, "rejected write with unknown fields");
    Err(Error::validation_failed(format!(
        "Unknown fields: {}",
        unknown.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::sync::OnceLock;

    static DIGITS: OnceLock<Regex> = OnceLock::new();

    fn digits() -> &'static Regex {
        DIGITS.get_or_init(|| Regex::new("^[0-9]+$").expect("digits regex"))
    }

    #[fixture]
    fn validator() -> Validator {
        Validator::new()
            .field(
                "name",
                vec![
                    FieldRule::Required("Add a name"),
                    FieldRule::Kind(ValueKind::Text),
                    FieldRule::MaxLength {
                        max: 5,
                        message: "Name too long",
                    },
                ],
            )
            .field(
                "rating",
                vec![
                    FieldRule::Kind(ValueKind::Number),
                    FieldRule::Range {
                        min: 1.0,
                        max: 10.0,
                        below: "Rating must be at least 1",
                        above: "Rating cannot exceed 10",
                    },
                ],
            )
            .field(
                "tags",
                vec![
                    FieldRule::Kind(ValueKind::TextList),
                    FieldRule::NonEmpty("Add a tag"),
                    FieldRule::EachOneOf {
                        allowed: &["a", "b"],
                        message: "Unknown tag",
                    },
                ],
            )
            .field(
                "level",
                vec![FieldRule::OneOf {
                    allowed: &["low", "high"],
                    message: "Unknown level",
                }],
            )
            .field(
                "code",
                vec![FieldRule::Pattern {
                    regex: digits(),
                    message: "Code must be digits",
                }],
            )
    }

    fn object(value: serde_json::Value) -> Document {
        value.as_object().cloned().expect("object literal")
    }

    #[rstest]
    fn valid_document_passes(validator: Validator) {
        let document = object(json!({
            "name": "Ada",
            "rating": 7,
            "tags": ["a"],
            "level": "low",
            "code": "123",
        }));
        assert!(validator.validate(&document).is_ok());
    }

    #[rstest]
    fn optional_fields_may_be_absent(validator: Validator) {
        let document = object(json!({ "name": "Ada", "rating": null }));
        assert!(validator.validate(&document).is_ok());
    }

    #[rstest]
    fn every_offending_field_is_reported_in_order(validator: Validator) {
        let document = object(json!({
            "rating": 11,
            "tags": [],
            "level": "mid",
            "code": "x1",
        }));
        let error = validator.validate(&document).expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::ValidationFailed);
        assert_eq!(
            error.message(),
            "Add a name, Rating cannot exceed 10, Add a tag, Unknown level, Code must be digits"
        );
    }

    #[rstest]
    #[case(json!({ "name": "Adalovelace" }), "Name too long")]
    #[case(json!({ "name": 42 }), "name must be text")]
    #[case(json!({ "name": "Ada", "rating": 0 }), "Rating must be at least 1")]
    #[case(json!({ "name": "Ada", "rating": "9" }), "rating must be a number")]
    #[case(json!({ "name": "Ada", "tags": ["a", "z"] }), "Unknown tag")]
    #[case(json!({ "name": "Ada", "tags": [1] }), "tags must be a list of text values")]
    fn single_failures_report_first_broken_rule(
        validator: Validator,
        #[case] body: serde_json::Value,
        #[case] expected: &str,
    ) {
        let error = validator.validate(&object(body)).expect_err("invalid");
        assert_eq!(error.message(), expected);
    }

    #[rstest]
    fn unknown_fields_are_listed() {
        let body = object(json!({ "name": "x", "location": {}, "slug": "y" }));
        let error = reject_unknown_fields(&body, &["name"]).expect_err("unknown keys");
        assert_eq!(error.code(), ErrorCode::ValidationFailed);
        assert_eq!(error.message(), "Unknown fields: location, slug");
    }

    #[rstest]
    fn allowed_fields_pass() {
        let body = object(json!({ "name": "x" }));
        assert!(reject_unknown_fields(&body, &["name", "description"]).is_ok());
    }
}
