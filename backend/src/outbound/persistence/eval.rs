//! Filter evaluation, ordering, and projection over JSON documents.
//!
//! Array fields match a predicate when any element does. Values of different
//! types never satisfy a range comparison; for sorting they are ordered by a
//! fixed type rank with missing values first.

use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::domain::query::{Condition, Filter, Predicate, Projection, SortDirection, SortKey};
use crate::domain::{Document, ID_FIELD};

/// Value at a dotted `path`, or `None` when any segment is missing.
pub(super) fn get_path<'a>(document: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = document.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// True when `document` satisfies every condition of `filter`.
pub(super) fn matches(document: &Document, filter: &Filter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|condition| condition_matches(document, condition))
}

fn condition_matches(document: &Document, condition: &Condition) -> bool {
    let Some(value) = get_path(document, &condition.path) else {
        return false;
    };
    match value {
        Value::Array(items) => {
            items.iter().any(|item| predicate_holds(item, &condition.predicate))
                || predicate_holds(value, &condition.predicate)
        }
        _ => predicate_holds(value, &condition.predicate),
    }
}

fn predicate_holds(value: &Value, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::Eq(expected) => values_equal(value, expected),
        Predicate::In(candidates) => candidates
            .iter()
            .any(|candidate| values_equal(value, candidate)),
        Predicate::Gt(bound) => range_cmp(value, bound) == Some(Ordering::Greater),
        Predicate::Gte(bound) => matches!(
            range_cmp(value, bound),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Predicate::Lt(bound) => range_cmp(value, bound) == Some(Ordering::Less),
        Predicate::Lte(bound) => matches!(
            range_cmp(value, bound),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// Equality with numbers compared by value, so `1` equals `1.0`.
pub(super) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => left == right,
    }
}

/// Comparison within one type class; `None` across classes.
fn range_cmp(value: &Value, bound: &Value) -> Option<Ordering> {
    match (value, bound) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(compare_text(a, b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Timestamps compare as instants; other text compares by code point.
fn compare_text(left: &str, right: &str) -> Ordering {
    match (parse_instant(left), parse_instant(right)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => left.cmp(right),
    }
}

fn parse_instant(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text).ok()
}

const fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(a), Some(b)) => range_cmp(a, b).unwrap_or_else(|| type_rank(left).cmp(&type_rank(right))),
        _ => type_rank(left).cmp(&type_rank(right)),
    }
}

/// Order two documents by `keys`, earlier keys first.
pub(super) fn compare_documents(left: &Document, right: &Document, keys: &[SortKey]) -> Ordering {
    keys.iter()
        .map(|key| {
            let ascending = compare_values(get_path(left, &key.path), get_path(right, &key.path));
            match key.direction {
                SortDirection::Ascending => ascending,
                SortDirection::Descending => ascending.reverse(),
            }
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Apply `projection` to a document.
///
/// Dotted paths reach through arrays of embedded documents, so
/// `courses.title` keeps the title of every attached course.
pub(super) fn project(document: Document, projection: &Projection) -> Document {
    match projection {
        Projection::All => document,
        Projection::Include { fields, keep_id } => {
            let mut shaped = Map::new();
            if let Some(id) = document.get(ID_FIELD).filter(|_| *keep_id) {
                shaped.insert(ID_FIELD.to_owned(), id.clone());
            }
            for path in fields {
                if let Some(picked) = pick_object(&document, path) {
                    merge_object(&mut shaped, picked);
                }
            }
            shaped
        }
        Projection::Exclude(fields) => {
            let mut shaped = document;
            for path in fields {
                remove_path(&mut shaped, path);
            }
            shaped
        }
    }
}

fn split_path(path: &str) -> (&str, Option<&str>) {
    path.split_once('.')
        .map_or((path, None), |(head, tail)| (head, Some(tail)))
}

/// The part of `fields` reached by `path`, keeping the enclosing structure.
fn pick_object(fields: &Map<String, Value>, path: &str) -> Option<Map<String, Value>> {
    let (head, tail) = split_path(path);
    let child = fields.get(head)?;
    let picked = match tail {
        Some(rest) => pick(child, rest)?,
        None => child.clone(),
    };
    let mut wrapper = Map::new();
    wrapper.insert(head.to_owned(), picked);
    Some(wrapper)
}

fn pick(value: &Value, path: &str) -> Option<Value> {
    match value {
        Value::Object(fields) => pick_object(fields, path).map(Value::Object),
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|item| Value::Object(pick_object(item, path).unwrap_or_default()))
                .collect(),
        )),
        _ => None,
    }
}

fn merge_object(target: &mut Map<String, Value>, addition: Map<String, Value>) {
    for (key, value) in addition {
        match target.get_mut(&key) {
            Some(existing) => merge(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn merge(target: &mut Value, addition: Value) {
    match (target, addition) {
        (Value::Object(existing), Value::Object(more)) => merge_object(existing, more),
        (Value::Array(existing), Value::Array(more)) => {
            for (slot, value) in existing.iter_mut().zip(more) {
                merge(slot, value);
            }
        }
        (slot, other) => *slot = other,
    }
}

fn remove_path(target: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            target.remove(path);
        }
        Some((head, rest)) => match target.get_mut(head) {
            Some(Value::Object(child)) => remove_path(child, rest),
            Some(Value::Array(items)) => {
                for child in items.iter_mut().filter_map(Value::as_object_mut) {
                    remove_path(child, rest);
                }
            }
            _ => {}
        },
    }
}
