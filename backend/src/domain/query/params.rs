//! Decoded query-string parameters.

use std::collections::BTreeMap;

use crate::domain::Error;

/// Keys that steer the pipeline rather than filter documents.
pub const CONTROL_KEYS: [&str; 4] = ["select", "sort", "limit", "page"];

/// One decoded query-string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// `key=value`.
    Text(String),
    /// `key=a&key=b`.
    List(Vec<String>),
    /// `key[sub]=value`.
    Nested(BTreeMap<String, QueryValue>),
}

impl QueryValue {
    /// Convenience constructor for text values.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// Query parameters of a list request, keyed by name.
///
/// # Examples
/// ```
/// use devcamper::domain::query::{QueryParams, QueryValue};
///
/// let params = QueryParams::from_iter([
///     ("careers".to_owned(), QueryValue::text("Business")),
///     ("page".to_owned(), QueryValue::text("2")),
/// ]);
/// assert_eq!(params.filters().count(), 1);
/// assert_eq!(params.lenient_text("page"), Some("2"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: BTreeMap<String, QueryValue>,
}

impl QueryParams {
    /// Parameters with no entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.get(key)
    }

    /// Read a control parameter that must be a single text value.
    ///
    /// # Errors
    /// Returns [`crate::domain::ErrorCode::InvalidQuery`] when the parameter
    /// was repeated or nested.
    pub fn text(&self, key: &str) -> Result<Option<&str>, Error> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(QueryValue::Text(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(Error::invalid_query(format!(
                "Query parameter {key} must be given once as plain text"
            ))),
        }
    }

    /// Read a control parameter, ignoring values that are not plain text.
    #[must_use]
    pub fn lenient_text(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(QueryValue::Text(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Entries that are not control keys, in key order.
    pub fn filters(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries
            .iter()
            .filter(|(key, _)| !CONTROL_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value))
    }

    /// True when there are no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, QueryValue)> for QueryParams {
    fn from_iter<T: IntoIterator<Item = (String, QueryValue)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, QueryValue>> for QueryParams {
    fn from(entries: BTreeMap<String, QueryValue>) -> Self {
        Self { entries }
    }
}
