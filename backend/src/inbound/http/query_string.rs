//! Query-string extraction for list endpoints.
//!
//! Keys decode in the bracket style clients of the API already use:
//! `key=value` is text, repeated keys (or `key[]`) collect into a list, and
//! `key[op]=value` nests one level. Anything deeper, or brackets that do not
//! pair up, is rejected with an invalid-query error.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};

use crate::domain::Error;
use crate::domain::query::{QueryParams, QueryValue};

/// Extractor yielding the decoded [`QueryParams`] of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery(pub QueryParams);

impl ListQuery {
    /// Unwrap the decoded parameters.
    #[must_use]
    pub fn into_inner(self) -> QueryParams {
        self.0
    }
}

impl FromRequest for ListQuery {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(decode(req.query_string()).map(Self))
    }
}

enum KeyPath<'a> {
    Plain(&'a str),
    Nested(&'a str, &'a str),
}

fn malformed(raw: &str) -> Error {
    Error::invalid_query(format!("Malformed query parameter {raw}"))
}

fn split_key(raw: &str) -> Result<KeyPath<'_>, Error> {
    let Some(open) = raw.find('[') else {
        return if raw.contains(']') {
            Err(malformed(raw))
        } else {
            Ok(KeyPath::Plain(raw))
        };
    };
    let (name, rest) = raw.split_at(open);
    let inner = rest
        .strip_prefix('[')
        .and_then(|tail| tail.strip_suffix(']'))
        .filter(|segment| !segment.contains(['[', ']']))
        .ok_or_else(|| malformed(raw))?;
    if name.is_empty() || name.contains(']') {
        return Err(malformed(raw));
    }
    if inner.is_empty() {
        Ok(KeyPath::Plain(name))
    } else {
        Ok(KeyPath::Nested(name, inner))
    }
}

/// Append `value` to a text or list slot; `false` when the slot is nested.
fn append(slot: &mut QueryValue, value: String) -> bool {
    match slot {
        QueryValue::Text(first) => {
            *slot = QueryValue::List(vec![std::mem::take(first), value]);
            true
        }
        QueryValue::List(items) => {
            items.push(value);
            true
        }
        QueryValue::Nested(_) => false,
    }
}

fn mixed(name: &str) -> Error {
    Error::invalid_query(format!(
        "Query parameter {name} mixes plain and bracketed values"
    ))
}

/// Decode a raw query string.
///
/// # Errors
/// Returns an invalid-query error for malformed bracket keys or for a key
/// used both plainly and with brackets.
///
/// # Examples
/// ```
/// use devcamper::domain::query::QueryValue;
/// use devcamper::inbound::http::query_string::decode;
///
/// let params = decode("averageCost[lte]=10000&careers=Business&careers=UI%2FUX").expect("decodes");
/// assert!(matches!(params.get("averageCost"), Some(QueryValue::Nested(_))));
/// assert!(matches!(params.get("careers"), Some(QueryValue::List(items)) if items.len() == 2));
/// ```
pub fn decode(query: &str) -> Result<QueryParams, Error> {
    let mut entries: BTreeMap<String, QueryValue> = BTreeMap::new();
    for (raw_key, raw_value) in url::form_urlencoded::parse(query.as_bytes()) {
        if raw_key.is_empty() {
            continue;
        }
        let value = raw_value.into_owned();
        match split_key(&raw_key)? {
            KeyPath::Plain(name) => match entries.entry(name.to_owned()) {
                Entry::Vacant(slot) => {
                    slot.insert(QueryValue::Text(value));
                }
                Entry::Occupied(mut slot) => {
                    if !append(slot.get_mut(), value) {
                        return Err(mixed(name));
                    }
                }
            },
            KeyPath::Nested(name, operator) => {
                let slot = entries
                    .entry(name.to_owned())
                    .or_insert_with(|| QueryValue::Nested(BTreeMap::new()));
                let QueryValue::Nested(operators) = slot else {
                    return Err(mixed(name));
                };
                match operators.entry(operator.to_owned()) {
                    Entry::Vacant(inner) => {
                        inner.insert(QueryValue::Text(value));
                    }
                    Entry::Occupied(mut inner) => {
                        append(inner.get_mut(), value);
                    }
                }
            }
        }
    }
    Ok(QueryParams::from(entries))
}
