//! Bootcamp domain service implementing the bootcamp driving ports.
//!
//! Writes follow one path: reject keys outside the allow-list, normalise,
//! validate the whole document, derive the slug and location, then store.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;

use crate::domain::bootcamp::{
    BOOTCAMP_MUTABLE_FIELDS, Location, bootcamp_validator, normalise_bootcamp_body,
};
use crate::domain::geo::GeoLocator;
use crate::domain::ports::{BootcampsCommand, BootcampsQuery, DocumentStore, Geocoder};
use crate::domain::query::{Join, ListEnvelope, QueryParams, list};
use crate::domain::slug::is_valid_slug;
use crate::domain::validation::reject_unknown_fields;
use crate::domain::{Bootcamp, Collection, Document, DocumentId, Error, ID_FIELD, slugify};

/// Bootcamp service over a document store and a geocoder.
pub struct BootcampService<S: ?Sized, G: ?Sized> {
    store: Arc<S>,
    locator: GeoLocator<G, S>,
    clock: Arc<dyn Clock>,
}

impl<S, G> BootcampService<S, G>
where
    S: DocumentStore + ?Sized,
    G: Geocoder + ?Sized,
{
    /// Create a new service.
    ///
    /// # Examples
    /// ```
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// use devcamper::domain::BootcampService;
    /// use devcamper::domain::ports::FixtureGeocoder;
    /// use devcamper::outbound::persistence::InMemoryDocumentStore;
    ///
    /// let service = BootcampService::new(
    ///     Arc::new(InMemoryDocumentStore::default()),
    ///     Arc::new(FixtureGeocoder::default()),
    ///     Arc::new(DefaultClock),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(store: Arc<S>, geocoder: Arc<G>, clock: Arc<dyn Clock>) -> Self {
        Self {
            locator: GeoLocator::new(geocoder, Arc::clone(&store)),
            store,
            clock,
        }
    }

    fn not_found(id: DocumentId) -> Error {
        Error::not_found(format!("Bootcamp not found with id of {id}"))
    }

    async fn load(&self, id: DocumentId) -> Result<Document, Error> {
        self.store
            .find_by_id(Collection::Bootcamps, id, None)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }

    async fn locate(&self, address: &str) -> Result<Value, Error> {
        let Some(found) = self.locator.first_match(address).await? else {
            return Err(Error::validation_failed("Address could not be located"));
        };
        serde_json::to_value(Location::from_geocoded(&found))
            .map_err(|err| Error::internal(format!("failed to encode location: {err}")))
    }

    fn derive_slug(document: &mut Document) -> Result<(), Error> {
        let name = text_field(document, "name");
        let slug = slugify(name);
        if !is_valid_slug(&slug) {
            return Err(Error::validation_failed(
                "Name must contain at least one letter or digit",
            ));
        }
        document.insert("slug".to_owned(), Value::String(slug));
        Ok(())
    }
}

fn text_field<'a>(document: &'a Document, field: &str) -> &'a str {
    document
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
}

#[async_trait]
impl<S, G> BootcampsQuery for BootcampService<S, G>
where
    S: DocumentStore + ?Sized,
    G: Geocoder + ?Sized,
{
    async fn list(&self, params: &QueryParams) -> Result<ListEnvelope, Error> {
        list(
            self.store.as_ref(),
            Collection::Bootcamps,
            params,
            Some(Join::BOOTCAMP_COURSES),
        )
        .await
    }

    async fn get(&self, id: DocumentId) -> Result<Bootcamp, Error> {
        Bootcamp::from_document(self.load(id).await?)
    }

    async fn within_radius(
        &self,
        zipcode: &str,
        distance_miles: f64,
    ) -> Result<Vec<Bootcamp>, Error> {
        self.locator
            .bootcamps_near(zipcode, distance_miles)
            .await?
            .into_iter()
            .map(Bootcamp::from_document)
            .collect()
    }
}

#[async_trait]
impl<S, G> BootcampsCommand for BootcampService<S, G>
where
    S: DocumentStore + ?Sized,
    G: Geocoder + ?Sized,
{
    async fn create(&self, body: Document) -> Result<Bootcamp, Error> {
        reject_unknown_fields(&body, BOOTCAMP_MUTABLE_FIELDS)?;
        let mut document = body;
        normalise_bootcamp_body(&mut document);
        bootcamp_validator().validate(&document)?;
        Self::derive_slug(&mut document)?;

        let location = self.locate(text_field(&document, "address")).await?;
        let id = DocumentId::random();
        document.insert(ID_FIELD.to_owned(), Value::from(id));
        document.insert("location".to_owned(), location);
        let created_at = serde_json::to_value(self.clock.utc())
            .map_err(|err| Error::internal(format!("failed to encode timestamp: {err}")))?;
        document.insert("createdAt".to_owned(), created_at);

        let bootcamp = Bootcamp::from_document(document)?;
        let stored = self
            .store
            .insert(Collection::Bootcamps, bootcamp.into_document()?)
            .await?;
        tracing::info!(bootcamp_id = %id, "bootcamp created");
        Bootcamp::from_document(stored)
    }

    async fn update(&self, id: DocumentId, body: Document) -> Result<Bootcamp, Error> {
        reject_unknown_fields(&body, BOOTCAMP_MUTABLE_FIELDS)?;
        let existing = self.load(id).await?;

        let mut merged = existing.clone();
        for (field, value) in body {
            if value.is_null() {
                merged.remove(&field);
            } else {
                merged.insert(field, value);
            }
        }
        normalise_bootcamp_body(&mut merged);
        bootcamp_validator().validate(&merged)?;

        if existing.get("name") != merged.get("name") {
            Self::derive_slug(&mut merged)?;
        }
        if existing.get("address") != merged.get("address") {
            let location = self.locate(text_field(&merged, "address")).await?;
            merged.insert("location".to_owned(), location);
        }

        let bootcamp = Bootcamp::from_document(merged)?;
        let stored = self
            .store
            .replace(Collection::Bootcamps, id, bootcamp.into_document()?)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        Bootcamp::from_document(stored)
    }

    async fn delete(&self, id: DocumentId) -> Result<Bootcamp, Error> {
        let removed = self
            .store
            .delete(Collection::Bootcamps, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        tracing::info!(bootcamp_id = %id, "bootcamp deleted; courses retained");
        Bootcamp::from_document(removed)
    }
}

#[cfg(test)]
#[path = "bootcamp_service_tests.rs"]
mod tests;
