//! Filter Translator: query parameters to a structured store filter.
//!
//! Each non-control parameter becomes one or more [`Condition`]s, combined
//! by conjunction:
//!
//! - `field=value` is equality, `field=a&field=b` is membership;
//! - `field[op]=value` applies one of `gt`, `gte`, `lt`, `lte`, `in`; `in`
//!   takes a repeated or comma-separated value;
//! - `parent[child]=value` with no operator keys is equality on the dotted
//!   path `parent.child`.
//!
//! Values are coerced per the collection's field catalogue. Anything that
//! cannot be interpreted fails with
//! [`ErrorCode::InvalidQuery`](crate::domain::ErrorCode::InvalidQuery).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use regex::Regex;
use serde_json::{Number, Value};

use super::params::{QueryParams, QueryValue};
use crate::domain::{Collection, DocumentId, Error, FieldKind};

/// Comparison operator tokens accepted in `field[op]` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,
    /// Membership.
    In,
}

impl Operator {
    /// Parse an operator token.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// Test applied to the value at a condition's path.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Equal to the value.
    Eq(Value),
    /// Greater than the value.
    Gt(Value),
    /// Greater than or equal to the value.
    Gte(Value),
    /// Less than the value.
    Lt(Value),
    /// Less than or equal to the value.
    Lte(Value),
    /// Equal to any of the values.
    In(Vec<Value>),
}

/// A predicate applied at a dotted field path.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// Dotted path into the document.
    pub path: String,
    /// Test to apply.
    pub predicate: Predicate,
}

impl Condition {
    /// Build a condition.
    pub fn new(path: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            path: path.into(),
            predicate,
        }
    }
}

/// Conjunction of conditions; empty matches every document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Filter matching every document.
    #[must_use]
    pub fn match_all() -> Self {
        Self::default()
    }

    /// Equality on a single path.
    pub fn field_equals(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::match_all().and(Condition::new(path, Predicate::Eq(value.into())))
    }

    /// Add a condition.
    #[must_use]
    pub fn and(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Conditions in translation order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True when the filter matches every document.
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Translate the non-control parameters of a list request.
    ///
    /// # Errors
    /// Returns an invalid-query error for malformed keys, mixed or nested
    /// operator mappings, and values that cannot be coerced to the field's
    /// type. Malformed identifiers yield an invalid-id error.
    ///
    /// # Examples
    /// ```
    /// use devcamper::domain::query::{Filter, Predicate, QueryParams, QueryValue};
    /// use devcamper::domain::Collection;
    /// use std::collections::BTreeMap;
    ///
    /// let rating = BTreeMap::from([("gt".to_owned(), QueryValue::text("8"))]);
    /// let params = QueryParams::from_iter([("averageRating".to_owned(), QueryValue::Nested(rating))]);
    /// let filter = Filter::translate(Collection::Bootcamps, &params).expect("valid filter");
    /// assert_eq!(filter.conditions()[0].predicate, Predicate::Gt(serde_json::json!(8.0)));
    /// ```
    pub fn translate(collection: Collection, params: &QueryParams) -> Result<Self, Error> {
        let mut filter = Self::match_all();
        for (key, value) in params.filters() {
            check_path(key)?;
            match value {
                QueryValue::Text(_) | QueryValue::List(_) => {
                    filter
                        .conditions
                        .push(equality(collection, key.to_owned(), value)?);
                }
                QueryValue::Nested(entries) => {
                    translate_nested(collection, key, entries, &mut filter.conditions)?;
                }
            }
        }
        Ok(filter)
    }
}

fn translate_nested(
    collection: Collection,
    key: &str,
    entries: &BTreeMap<String, QueryValue>,
    conditions: &mut Vec<Condition>,
) -> Result<(), Error> {
    let operators = entries
        .keys()
        .filter(|sub| Operator::from_token(sub).is_some())
        .count();
    if operators > 0 && operators < entries.len() {
        return Err(Error::invalid_query(format!(
            "Filter on {key} mixes comparison operators with nested fields"
        )));
    }
    for (sub, value) in entries {
        if let QueryValue::Nested(_) = value {
            return Err(Error::invalid_query(format!(
                "Filter on {key}[{sub}] is nested too deeply"
            )));
        }
        match Operator::from_token(sub) {
            Some(operator) => conditions.push(comparison(collection, key, operator, value)?),
            None => {
                let path = format!("{key}.{sub}");
                check_path(&path)?;
                let condition = equality(collection, path, value)?;
                conditions.push(condition);
            }
        }
    }
    Ok(())
}

fn equality(collection: Collection, path: String, value: &QueryValue) -> Result<Condition, Error> {
    let kind = collection.field_kind(&path);
    let predicate = match value {
        QueryValue::Text(raw) => Predicate::Eq(coerce(&path, kind, raw)?),
        QueryValue::List(items) => Predicate::In(coerce_all(&path, kind, items)?),
        QueryValue::Nested(_) => {
            return Err(Error::invalid_query(format!(
                "Filter on {path} is nested too deeply"
            )));
        }
    };
    Ok(Condition::new(path, predicate))
}

fn comparison(
    collection: Collection,
    path: &str,
    operator: Operator,
    value: &QueryValue,
) -> Result<Condition, Error> {
    let kind = collection.field_kind(path);
    let predicate = match (operator, value) {
        (Operator::In, QueryValue::Text(raw)) => {
            let items: Vec<String> = raw.split(',').map(str::to_owned).collect();
            Predicate::In(coerce_all(path, kind, &items)?)
        }
        (Operator::In, QueryValue::List(items)) => Predicate::In(coerce_all(path, kind, items)?),
        (Operator::Gt, QueryValue::Text(raw)) => Predicate::Gt(coerce(path, kind, raw)?),
        (Operator::Gte, QueryValue::Text(raw)) => Predicate::Gte(coerce(path, kind, raw)?),
        (Operator::Lt, QueryValue::Text(raw)) => Predicate::Lt(coerce(path, kind, raw)?),
        (Operator::Lte, QueryValue::Text(raw)) => Predicate::Lte(coerce(path, kind, raw)?),
        _ => {
            return Err(Error::invalid_query(format!(
                "Comparison on {path} needs a single value"
            )));
        }
    };
    Ok(Condition::new(path, predicate))
}

fn coerce_all(path: &str, kind: FieldKind, items: &[String]) -> Result<Vec<Value>, Error> {
    items.iter().map(|raw| coerce(path, kind, raw)).collect()
}

fn coerce(path: &str, kind: FieldKind, raw: &str) -> Result<Value, Error> {
    match kind {
        FieldKind::Text => Ok(Value::String(raw.to_owned())),
        FieldKind::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| mismatch(path, raw, "a number")),
        FieldKind::Boolean => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(mismatch(path, raw, "true or false")),
        },
        FieldKind::Identifier => DocumentId::parse(raw).map(Value::from),
        FieldKind::Date => parse_date(raw)
            .map(|instant| Value::String(instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
            .ok_or_else(|| mismatch(path, raw, "a date")),
    }
}

fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn mismatch(path: &str, raw: &str, expected: &str) -> Error {
    Error::invalid_query(format!("Filter value {raw} for {path} must be {expected}"))
}

static PATH_RE: OnceLock<Regex> = OnceLock::new();

pub(crate) fn field_path_regex() -> &'static Regex {
    PATH_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$")
            .unwrap_or_else(|error| panic!("field path regex failed to compile: {error}"))
    })
}

fn check_path(path: &str) -> Result<(), Error> {
    if field_path_regex().is_match(path) {
        Ok(())
    } else {
        Err(Error::invalid_query(format!("Invalid filter field {path}")))
    }
}

#[cfg(test)]
#[path = "filter_tests.rs"]
mod tests;
