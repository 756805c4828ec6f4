//! MongoDB document store.
//!
//! Every read is one aggregation pipeline so filters, sorts, joins, and
//! projections are evaluated by the server. Identities are stored as UUID
//! strings under `_id`. Unique fields from [`Collection::unique_fields`] are
//! backed by unique indexes; a write that trips one fails with server error
//! 11000, which surfaces as [`DocumentStoreError::DuplicateKey`].

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, Bson, Document as BsonDocument, doc};
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Client, Database, IndexModel};
use serde_json::Value;
use tracing::{debug, info};

use super::display_value;
use crate::domain::geo::GeoPoint;
use crate::domain::ports::{DocumentStore, DocumentStoreError, FindQuery};
use crate::domain::query::{
    Condition, Filter, Join, Predicate, Projection, SortDirection, SortKey,
};
use crate::domain::{Collection, Document, DocumentId, ID_FIELD};

/// Server error code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Scratch field holding `$lookup` output before it is folded back.
const JOINED_FIELD: &str = "__joined";

/// Document store backed by a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    database: Database,
}

impl MongoDocumentStore {
    /// Connect to `uri`, check the server answers, and ensure the indexes
    /// every collection relies on.
    ///
    /// # Errors
    /// Returns [`DocumentStoreError::Connection`] when the URI is invalid or
    /// the server cannot be reached, and [`DocumentStoreError::Query`] when
    /// an index cannot be built.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self, DocumentStoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|error| DocumentStoreError::connection(error.to_string()))?;
        let database = client.database(database_name);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|error| DocumentStoreError::connection(error.to_string()))?;
        let store = Self { database };
        store.ensure_indexes().await?;
        info!(database = database_name, "connected to document database");
        Ok(store)
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<BsonDocument> {
        self.database.collection(collection.name())
    }

    async fn ensure_indexes(&self) -> Result<(), DocumentStoreError> {
        for collection in [Collection::Bootcamps, Collection::Courses] {
            for model in index_models(collection) {
                self.collection(collection)
                    .create_index(model)
                    .await
                    .map_err(|error| store_error(&error))?;
            }
        }
        Ok(())
    }

    async fn aggregate(
        &self,
        collection: Collection,
        pipeline: Vec<BsonDocument>,
    ) -> Result<Vec<BsonDocument>, DocumentStoreError> {
        debug!(%collection, stages = pipeline.len(), "running aggregation");
        self.collection(collection)
            .aggregate(pipeline)
            .await
            .map_err(|error| store_error(&error))?
            .try_collect()
            .await
            .map_err(|error| store_error(&error))
    }
}

/// Indexes a collection needs: one unique index per unique field, a
/// `2dsphere` index for radius searches, and the course back-reference.
fn index_models(collection: Collection) -> Vec<IndexModel> {
    let mut models: Vec<IndexModel> = collection
        .unique_fields()
        .iter()
        .map(|field| {
            let mut keys = BsonDocument::new();
            keys.insert(*field, 1_i32);
            IndexModel::builder()
                .keys(keys)
                .options(IndexOptions::builder().unique(true).build())
                .build()
        })
        .collect();
    match collection {
        Collection::Bootcamps => models.push(
            IndexModel::builder()
                .keys(doc! { "location": "2dsphere" })
                .build(),
        ),
        Collection::Courses => {
            models.push(IndexModel::builder().keys(doc! { "bootcamp": 1_i32 }).build());
        }
    }
    models
}

fn to_bson(value: &Value) -> Result<Bson, DocumentStoreError> {
    bson::to_bson(value)
        .map_err(|error| DocumentStoreError::query(format!("value is not representable: {error}")))
}

fn to_bson_document(document: &Document) -> Result<BsonDocument, DocumentStoreError> {
    bson::to_document(document).map_err(|error| {
        DocumentStoreError::query(format!("document is not representable: {error}"))
    })
}

fn from_bson_document(document: BsonDocument) -> Result<Document, DocumentStoreError> {
    bson::from_document(document)
        .map_err(|error| DocumentStoreError::query(format!("stored document is unreadable: {error}")))
}

fn id_filter(id: DocumentId) -> BsonDocument {
    doc! { "_id": id.to_string() }
}

fn operator(name: &str, bound: &Value) -> Result<Bson, DocumentStoreError> {
    let mut criterion = BsonDocument::new();
    criterion.insert(name, to_bson(bound)?);
    Ok(Bson::Document(criterion))
}

fn condition_document(condition: &Condition) -> Result<BsonDocument, DocumentStoreError> {
    let criterion = match &condition.predicate {
        Predicate::Eq(value) => to_bson(value)?,
        Predicate::In(values) => {
            let candidates = values.iter().map(to_bson).collect::<Result<Vec<_>, _>>()?;
            Bson::Document(doc! { "$in": candidates })
        }
        Predicate::Gt(bound) => operator("$gt", bound)?,
        Predicate::Gte(bound) => operator("$gte", bound)?,
        Predicate::Lt(bound) => operator("$lt", bound)?,
        Predicate::Lte(bound) => operator("$lte", bound)?,
    };
    let mut clause = BsonDocument::new();
    clause.insert(condition.path.clone(), criterion);
    Ok(clause)
}

/// Translate a filter into a `$match` document; several conditions are
/// joined with `$and` so two bounds on one path both apply.
fn filter_document(filter: &Filter) -> Result<BsonDocument, DocumentStoreError> {
    let mut clauses = filter
        .conditions()
        .iter()
        .map(condition_document)
        .collect::<Result<Vec<_>, _>>()?;
    if clauses.len() > 1 {
        return Ok(doc! { "$and": clauses });
    }
    Ok(clauses.pop().unwrap_or_default())
}

fn sort_document(keys: &[SortKey]) -> BsonDocument {
    keys.iter()
        .map(|key| {
            let order = match key.direction {
                SortDirection::Ascending => 1_i32,
                SortDirection::Descending => -1_i32,
            };
            (key.path.clone(), Bson::Int32(order))
        })
        .collect()
}

fn projection_document(projection: &Projection) -> Option<BsonDocument> {
    match projection {
        Projection::All => None,
        Projection::Include { fields, keep_id } => {
            let mut kept: BsonDocument = fields
                .iter()
                .map(|field| (field.clone(), Bson::Int32(1)))
                .collect();
            if !keep_id {
                kept.insert(ID_FIELD, 0_i32);
            }
            Some(kept)
        }
        Projection::Exclude(fields) => Some(
            fields
                .iter()
                .map(|field| (field.clone(), Bson::Int32(0)))
                .collect(),
        ),
    }
}

/// Stages attaching related documents.
fn join_stages(join: Join) -> Vec<BsonDocument> {
    match join {
        Join::Referencing {
            from,
            foreign_field,
            as_field,
        } => vec![doc! {
            "$lookup": {
                "from": from.name(),
                "localField": ID_FIELD,
                "foreignField": foreign_field,
                "as": as_field,
            }
        }],
        Join::Reference {
            from,
            local_field,
            fields,
        } => {
            let kept: BsonDocument = fields
                .iter()
                .map(|field| ((*field).to_owned(), Bson::Int32(1)))
                .collect();
            let joined = format!("${JOINED_FIELD}");
            let unresolved = format!("${local_field}");
            let mut folded = BsonDocument::new();
            folded.insert(
                local_field,
                doc! { "$ifNull": [{ "$arrayElemAt": [joined, 0_i32] }, unresolved] },
            );
            vec![
                doc! {
                    "$lookup": {
                        "from": from.name(),
                        "localField": local_field,
                        "foreignField": ID_FIELD,
                        "pipeline": [{ "$project": kept }],
                        "as": JOINED_FIELD,
                    }
                },
                doc! { "$set": folded },
                doc! { "$unset": JOINED_FIELD },
            ]
        }
    }
}

fn clamp_count(count: usize) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Pipeline for a find: match, order, page, join, then shape. Paging comes
/// before the join so only the returned page is joined.
fn find_pipeline(query: &FindQuery) -> Result<Vec<BsonDocument>, DocumentStoreError> {
    let matched = filter_document(&query.filter)?;
    let mut pipeline = vec![doc! { "$match": matched }];
    if !query.sort.is_empty() {
        pipeline.push(doc! { "$sort": sort_document(&query.sort) });
    }
    if query.skip > 0 {
        pipeline.push(doc! { "$skip": clamp_count(query.skip) });
    }
    if let Some(limit) = query.limit {
        pipeline.push(doc! { "$limit": clamp_count(limit) });
    }
    if let Some(join) = query.join {
        pipeline.extend(join_stages(join));
    }
    if let Some(projection) = projection_document(&query.projection) {
        pipeline.push(doc! { "$project": projection });
    }
    Ok(pipeline)
}

fn average_pipeline(filter: &Filter, field: &str) -> Result<Vec<BsonDocument>, DocumentStoreError> {
    let matched = filter_document(filter)?;
    let operand = format!("${field}");
    Ok(vec![
        doc! { "$match": matched },
        doc! { "$group": { "_id": Bson::Null, "average": { "$avg": operand } } },
    ])
}

/// `$geoWithin` filter for points at `field` within `radius` radians.
fn sphere_filter(field: &str, centre: GeoPoint, radius: f64) -> BsonDocument {
    let point = Bson::Array(vec![
        Bson::Double(centre.longitude),
        Bson::Double(centre.latitude),
    ]);
    let mut filter = BsonDocument::new();
    filter.insert(
        field,
        doc! { "$geoWithin": { "$centerSphere": [point, radius] } },
    );
    filter
}

fn is_duplicate_key(error: &MongoError) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(failure)) => failure.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(failure) => failure.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

fn store_error(error: &MongoError) -> DocumentStoreError {
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => {
            DocumentStoreError::connection(error.to_string())
        }
        _ => DocumentStoreError::query(error.to_string()),
    }
}

/// The unique field `document` most plausibly collided on: the first unique
/// field it carries, else its identity.
fn colliding_field(collection: Collection, document: &Document) -> (&'static str, String) {
    collection
        .unique_fields()
        .iter()
        .find_map(|field| {
            document
                .get(*field)
                .filter(|value| !value.is_null())
                .map(|value| (*field, display_value(value)))
        })
        .unwrap_or_else(|| {
            let id = document.get(ID_FIELD).map(display_value).unwrap_or_default();
            (ID_FIELD, id)
        })
}

fn write_error(collection: Collection, document: &Document, error: &MongoError) -> DocumentStoreError {
    if is_duplicate_key(error) {
        let (field, value) = colliding_field(collection, document);
        return DocumentStoreError::duplicate_key(field, value);
    }
    store_error(error)
}

fn require_id(document: &Document) -> Result<DocumentId, DocumentStoreError> {
    crate::domain::document_id(document).ok_or_else(|| {
        DocumentStoreError::query(format!("document is missing a valid {ID_FIELD}"))
    })
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn find(
        &self,
        collection: Collection,
        query: &FindQuery,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        if query.limit == Some(0) {
            return Ok(Vec::new());
        }
        let pipeline = find_pipeline(query)?;
        self.aggregate(collection, pipeline)
            .await?
            .into_iter()
            .map(from_bson_document)
            .collect()
    }

    async fn count(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<usize, DocumentStoreError> {
        let matched = filter_document(filter)?;
        let total = self
            .collection(collection)
            .count_documents(matched)
            .await
            .map_err(|error| store_error(&error))?;
        Ok(usize::try_from(total).unwrap_or(usize::MAX))
    }

    async fn find_by_id(
        &self,
        collection: Collection,
        id: DocumentId,
        join: Option<Join>,
    ) -> Result<Option<Document>, DocumentStoreError> {
        let mut pipeline = vec![doc! { "$match": id_filter(id) }, doc! { "$limit": 1_i64 }];
        if let Some(related) = join {
            pipeline.extend(join_stages(related));
        }
        self.aggregate(collection, pipeline)
            .await?
            .into_iter()
            .next()
            .map(from_bson_document)
            .transpose()
    }

    async fn insert(
        &self,
        collection: Collection,
        document: Document,
    ) -> Result<Document, DocumentStoreError> {
        require_id(&document)?;
        let stored = to_bson_document(&document)?;
        self.collection(collection)
            .insert_one(stored)
            .await
            .map_err(|error| write_error(collection, &document, &error))?;
        Ok(document)
    }

    async fn replace(
        &self,
        collection: Collection,
        id: DocumentId,
        mut document: Document,
    ) -> Result<Option<Document>, DocumentStoreError> {
        document.insert(ID_FIELD.to_owned(), Value::from(id));
        let replacement = to_bson_document(&document)?;
        self.collection(collection)
            .find_one_and_replace(id_filter(id), replacement)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|error| write_error(collection, &document, &error))?
            .map(from_bson_document)
            .transpose()
    }

    async fn delete(
        &self,
        collection: Collection,
        id: DocumentId,
    ) -> Result<Option<Document>, DocumentStoreError> {
        self.collection(collection)
            .find_one_and_delete(id_filter(id))
            .await
            .map_err(|error| store_error(&error))?
            .map(from_bson_document)
            .transpose()
    }

    async fn set_field(
        &self,
        collection: Collection,
        id: DocumentId,
        field: &str,
        value: Value,
    ) -> Result<bool, DocumentStoreError> {
        let mut assignment = BsonDocument::new();
        assignment.insert(field, to_bson(&value)?);
        let outcome = self
            .collection(collection)
            .update_one(id_filter(id), doc! { "$set": assignment })
            .await
            .map_err(|error| store_error(&error))?;
        Ok(outcome.matched_count > 0)
    }

    async fn average(
        &self,
        collection: Collection,
        filter: &Filter,
        field: &str,
    ) -> Result<Option<f64>, DocumentStoreError> {
        let pipeline = average_pipeline(filter, field)?;
        let grouped = self.aggregate(collection, pipeline).await?;
        Ok(grouped
            .first()
            .and_then(|group| group.get("average"))
            .and_then(Bson::as_f64))
    }

    async fn within_sphere(
        &self,
        collection: Collection,
        field: &str,
        centre: GeoPoint,
        radius: f64,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let filter = sphere_filter(field, centre, radius);
        self.collection(collection)
            .find(filter)
            .await
            .map_err(|error| store_error(&error))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|error| store_error(&error))?
            .into_iter()
            .map(from_bson_document)
            .collect()
    }
}

#[cfg(test)]
#[path = "mongo_tests.rs"]
mod tests;
