//! Course domain service implementing the course driving ports.
//!
//! Every successful write hands the parent bootcamp to the
//! [`AverageCostMaintainer`]; its outcome never changes the response.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::Value;

use crate::domain::average_cost::AverageCostMaintainer;
use crate::domain::course::{
    BOOTCAMP_FIELD, COURSE_MUTABLE_FIELDS, course_validator, normalise_course_body,
};
use crate::domain::ports::{CoursesCommand, CoursesQuery, DocumentStore, FindQuery};
use crate::domain::query::{Filter, Join, ListEnvelope, QueryParams, list};
use crate::domain::validation::reject_unknown_fields;
use crate::domain::{Collection, Course, Document, DocumentId, Error, ID_FIELD};

/// Course service over a document store.
pub struct CourseService<S: ?Sized> {
    store: Arc<S>,
    maintainer: AverageCostMaintainer<S>,
    clock: Arc<dyn Clock>,
}

impl<S> CourseService<S>
where
    S: DocumentStore + ?Sized,
{
    /// Create a new service.
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            maintainer: AverageCostMaintainer::new(Arc::clone(&store)),
            store,
            clock,
        }
    }

    fn not_found(id: DocumentId) -> Error {
        Error::not_found(format!("No course found with the id of {id}"))
    }

    async fn bootcamp_exists(&self, id: DocumentId) -> Result<bool, Error> {
        Ok(self
            .store
            .find_by_id(Collection::Bootcamps, id, None)
            .await?
            .is_some())
    }

    async fn load(&self, id: DocumentId) -> Result<Document, Error> {
        self.store
            .find_by_id(Collection::Courses, id, None)
            .await?
            .ok_or_else(|| Self::not_found(id))
    }
}

#[async_trait]
impl<S> CoursesQuery for CourseService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn list(&self, params: &QueryParams) -> Result<ListEnvelope, Error> {
        list(
            self.store.as_ref(),
            Collection::Courses,
            params,
            Some(Join::COURSE_BOOTCAMP),
        )
        .await
    }

    async fn list_for_bootcamp(&self, bootcamp_id: DocumentId) -> Result<Vec<Course>, Error> {
        if !self.bootcamp_exists(bootcamp_id).await? {
            return Err(Error::not_found(format!(
                "Bootcamp not found with id of {bootcamp_id}"
            )));
        }
        let query = FindQuery::matching(Filter::field_equals(BOOTCAMP_FIELD, bootcamp_id));
        self.store
            .find(Collection::Courses, &query)
            .await?
            .into_iter()
            .map(Course::from_document)
            .collect()
    }

    async fn get(&self, id: DocumentId) -> Result<Course, Error> {
        let document = self
            .store
            .find_by_id(Collection::Courses, id, Some(Join::COURSE_BOOTCAMP))
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        Course::from_document(document)
    }
}

#[async_trait]
impl<S> CoursesCommand for CourseService<S>
where
    S: DocumentStore + ?Sized,
{
    async fn create(&self, bootcamp_id: DocumentId, body: Document) -> Result<Course, Error> {
        reject_unknown_fields(&body, COURSE_MUTABLE_FIELDS)?;
        if !self.bootcamp_exists(bootcamp_id).await? {
            return Err(Error::not_found(format!(
                "No bootcamp with the id of {bootcamp_id}"
            )));
        }

        let mut document = body;
        normalise_course_body(&mut document);
        course_validator().validate(&document)?;

        let id = DocumentId::random();
        document.insert(ID_FIELD.to_owned(), Value::from(id));
        document.insert(BOOTCAMP_FIELD.to_owned(), Value::from(bootcamp_id));
        let created_at = serde_json::to_value(self.clock.utc())
            .map_err(|err| Error::internal(format!("failed to encode timestamp: {err}")))?;
        document.insert("createdAt".to_owned(), created_at);

        let course = Course::from_document(document)?;
        let stored = self
            .store
            .insert(Collection::Courses, course.into_document()?)
            .await?;
        tracing::info!(course_id = %id, %bootcamp_id, "course created");
        self.maintainer.recompute(bootcamp_id).await;
        Course::from_document(stored)
    }

    async fn update(&self, id: DocumentId, body: Document) -> Result<Course, Error> {
        reject_unknown_fields(&body, COURSE_MUTABLE_FIELDS)?;
        let mut merged = self.load(id).await?;
        for (field, value) in body {
            if value.is_null() {
                merged.remove(&field);
            } else {
                merged.insert(field, value);
            }
        }
        normalise_course_body(&mut merged);
        course_validator().validate(&merged)?;

        let course = Course::from_document(merged)?;
        let bootcamp_id = course.bootcamp.id();
        let stored = self
            .store
            .replace(Collection::Courses, id, course.into_document()?)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        self.maintainer.recompute(bootcamp_id).await;
        Course::from_document(stored)
    }

    async fn delete(&self, id: DocumentId) -> Result<Course, Error> {
        let removed = self
            .store
            .delete(Collection::Courses, id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;
        let course = Course::from_document(removed)?;
        tracing::info!(course_id = %id, bootcamp_id = %course.bootcamp.id(), "course deleted");
        self.maintainer.recompute(course.bootcamp.id()).await;
        Ok(course)
    }
}

#[cfg(test)]
#[path = "course_service_tests.rs"]
mod tests;
