//! In-process document store.
//!
//! Collections are insertion-ordered vectors behind one async `RwLock`, so a
//! write is atomic with respect to every read. Unique indexes come from
//! [`Collection::unique_fields`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::display_value;
use super::eval::{compare_documents, get_path, matches, project, values_equal};
use crate::domain::geo::GeoPoint;
use crate::domain::ports::{DocumentStore, DocumentStoreError, FindQuery};
use crate::domain::query::{Filter, Join};
use crate::domain::{Collection, Document, DocumentId, ID_FIELD, document_id};

type Collections = HashMap<Collection, Vec<Document>>;

/// Document store holding every collection in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
}

impl InMemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn documents(collections: &Collections, collection: Collection) -> &[Document] {
    collections.get(&collection).map_or(&[], Vec::as_slice)
}

fn position(documents: &[Document], id: DocumentId) -> Option<usize> {
    documents
        .iter()
        .position(|document| document_id(document) == Some(id))
}

fn require_id(document: &Document) -> Result<DocumentId, DocumentStoreError> {
    document_id(document).ok_or_else(|| {
        DocumentStoreError::query(format!("document is missing a valid {ID_FIELD}"))
    })
}

/// Reject `document` when it repeats a unique field of another document.
fn check_unique(
    existing: &[Document],
    collection: Collection,
    document: &Document,
    own_id: DocumentId,
) -> Result<(), DocumentStoreError> {
    for field in collection.unique_fields() {
        let Some(value) = document.get(*field).filter(|value| !value.is_null()) else {
            continue;
        };
        let collides = existing.iter().any(|other| {
            document_id(other) != Some(own_id)
                && other
                    .get(*field)
                    .is_some_and(|candidate| values_equal(candidate, value))
        });
        if collides {
            return Err(DocumentStoreError::duplicate_key(
                *field,
                display_value(value),
            ));
        }
    }
    Ok(())
}

fn apply_join(collections: &Collections, mut document: Document, join: Join) -> Document {
    match join {
        Join::Reference {
            from,
            local_field,
            fields,
        } => {
            let referenced = document
                .get(local_field)
                .and_then(Value::as_str)
                .and_then(|raw| raw.parse::<DocumentId>().ok())
                .and_then(|id| {
                    let candidates = documents(collections, from);
                    position(candidates, id).and_then(|index| candidates.get(index))
                });
            if let Some(found) = referenced {
                let mut summary = Document::new();
                for field in std::iter::once(ID_FIELD).chain(fields.iter().copied()) {
                    if let Some(value) = found.get(field) {
                        summary.insert(field.to_owned(), value.clone());
                    }
                }
                document.insert(local_field.to_owned(), Value::Object(summary));
            }
            document
        }
        Join::Referencing {
            from,
            foreign_field,
            as_field,
        } => {
            let related: Vec<Value> = match document.get(ID_FIELD) {
                Some(id) => documents(collections, from)
                    .iter()
                    .filter(|candidate| {
                        candidate
                            .get(foreign_field)
                            .is_some_and(|value| values_equal(value, id))
                    })
                    .cloned()
                    .map(Value::Object)
                    .collect(),
                None => Vec::new(),
            };
            document.insert(as_field.to_owned(), Value::Array(related));
            document
        }
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        query: &FindQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let collections = self.collections.read().await;
        let mut found: Vec<&Document> = documents(&collections, collection)
            .iter()
            .filter(|document| matches(document, &query.filter))
            .collect();
        // `sort_by` is stable: ties keep insertion order.
        found.sort_by(|left, right| compare_documents(left, right, &query.sort));

        let page = found
            .into_iter()
            .skip(query.skip)
            .take(query.limit.unwrap_or(usize::MAX))
            .cloned();
        Ok(page
            .map(|document| match query.join {
                Some(join) => apply_join(&collections, document, join),
                None => document,
            })
            .map(|document| project(document, &query.projection))
            .collect())
    }

    async fn count(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<usize, DocumentStoreError> {
        let collections = self.collections.read().await;
        Ok(documents(&collections, collection)
            .iter()
            .filter(|document| matches(document, filter))
            .count())
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: DocumentId,
        join: Option<Join>,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let collections = self.collections.read().await;
        let stored = documents(&collections, collection);
        Ok(position(stored, id)
            .and_then(|index| stored.get(index))
            .cloned()
            .map(|document| match join {
                Some(related) => apply_join(&collections, document, related),
                None => document,
            }))
    }

    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, DocumentStoreError> {
        let id = require_id(&document)?;
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        if position(stored, id).is_some() {
            return Err(DocumentStoreError::duplicate_key(ID_FIELD, id.to_string()));
        }
        check_unique(stored, collection, &document, id)?;
        stored.push(document.clone());
        Ok(document)
    }

    async fn replace(
        &self,
        collection: Collection,
        id: DocumentId,
        mut document: Document,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        let Some(index) = position(stored, id) else {
            return Ok(None);
        };
        check_unique(stored, collection, &document, id)?;
        document.insert(ID_FIELD.to_owned(), Value::from(id));
        match stored.get_mut(index) {
            Some(slot) => {
                *slot = document.clone();
                Ok(Some(document))
            }
            None => Ok(None),
        }
    }

    async fn delete(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        Ok(position(stored, id).map(|index| stored.remove(index)))
    }

    async fn set_field(
        &self,
        collection: Collection,
        id: DocumentId,
        field: &str,
        value: Value,
    ) -> Result<bool, DocumentStoreError> {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        let Some(document) = stored
            .iter_mut()
            .find(|document| document_id(document) == Some(id))
        else {
            return Ok(false);
        };
        document.insert(field.to_owned(), value);
        Ok(true)
    }

    async fn average(
        &self,
        collection: Collection,
        filter: &Filter,
        field: &str,
    ) -> Result<Option<f64>, DocumentStoreError> {
        let collections = self.collections.read().await;
        let values: Vec<f64> = documents(&collections, collection)
            .iter()
            .filter(|document| matches(document, filter))
            .filter_map(|document| get_path(document, field).and_then(Value::as_f64))
            .collect();
        if values.is_empty() {
            return Ok(None);
        }
        let len = f64::from(u32::try_from(values.len()).unwrap_or(u32::MAX));
        #[expect(clippy::float_arithmetic, reason = "the mean of stored numbers")]
        let mean = values.iter().sum::<f64>() / len;
        Ok(Some(mean))
    }

    async fn within_sphere(
        &self,
        collection: Collection,
        field: &str,
        centre: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let collections = self.collections.read().await;
        Ok(documents(&collections, collection)
            .iter()
            .filter(|document| {
                point_at(document, field).is_some_and(|point| point.central_angle(centre) <= radius)
            })
            .cloned()
            .collect())
    }
}

/// GeoJSON point stored at `field`, as `[longitude, latitude]`.
fn point_at(document: &Document, field: &str) -> Option<GeoPoint> {
    let coordinates = get_path(document, field)?.get("coordinates")?.as_array()?;
    match coordinates.as_slice() {
        [longitude, latitude] => Some(GeoPoint::new(longitude.as_f64()?, latitude.as_f64()?)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "in_memory_tests.rs"]
mod tests;
