//! Query Pipeline: the generic "list resources" operation.
//!
//! Translates the filter, shapes the result, counts the filtered set, and
//! fetches one page. The envelope is returned to the caller directly.

use pagination::{PageRequest, Pagination};
use serde::Serialize;
use utoipa::ToSchema;

use super::filter::Filter;
use super::params::QueryParams;
use super::shape::{Join, Projection, SortKey};
use crate::domain::ports::{DocumentStore, FindQuery};
use crate::domain::{Collection, Document, Error};

/// A list request after translation and shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
    /// Documents to list.
    pub filter: Filter,
    /// Fields to return.
    pub projection: Projection,
    /// Sort keys.
    pub sort: Vec<SortKey>,
    /// Page to fetch.
    pub page: PageRequest,
}

impl ListRequest {
    /// Interpret the query parameters of a list request.
    ///
    /// # Errors
    /// Fails with an invalid-query error when the filter, `select`, or
    /// `sort` cannot be interpreted. `page` and `limit` never fail.
    pub fn from_params(collection: Collection, params: &QueryParams) -> Result<Self, Error> {
        let filter = Filter::translate(collection, params)?;
        let projection = Projection::parse(params.text("select")?)?;
        let sort = SortKey::parse_list(params.text("sort")?)?;
        let page = PageRequest::from_query(params.lenient_text("page"), params.lenient_text("limit"));
        Ok(Self {
            filter,
            projection,
            sort,
            page,
        })
    }
}

/// Uniform list response.
///
/// `count` is the number of documents on this page, not the filtered total.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ListEnvelope {
    /// Always `true`.
    pub success: bool,
    /// Documents on this page.
    pub count: usize,
    /// Links to adjacent pages.
    #[schema(value_type = Object)]
    pub pagination: Pagination,
    /// The page of documents.
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Document>,
}

/// List one page of `collection`.
///
/// `join` is applied only when the projection keeps the field it writes.
///
/// # Errors
/// Propagates translation errors and store failures.
pub async fn list<S>(
    store: &S,
    collection: Collection,
    params: &QueryParams,
    join: Option<Join>,
) -> Result<ListEnvelope, Error>
where
    S: DocumentStore + ?Sized,
{
    let ListRequest {
        filter,
        projection,
        sort,
        page,
    } = ListRequest::from_params(collection, params)?;

    let total = store.count(collection, &filter).await?;
    let window = page.window();
    let shown_join = join.filter(|related| projection.admits(related.target_field()));
    let query = FindQuery {
        filter,
        projection,
        sort,
        skip: usize::try_from(window.skip()).unwrap_or(usize::MAX),
        limit: Some(usize::try_from(page.limit()).unwrap_or(usize::MAX)),
        join: shown_join,
    };
    let data = store.find(collection, &query).await?;

    let pagination = Pagination::build(page, u64::try_from(total).unwrap_or(u64::MAX));
    Ok(ListEnvelope {
        success: true,
        count: data.len(),
        pagination,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockDocumentStore;
    use crate::domain::query::{Predicate, QueryValue};
    use rstest::rstest;
    use serde_json::json;

    fn params(entries: &[(&str, &str)]) -> QueryParams {
        entries
            .iter()
            .map(|(key, value)| ((*key).to_owned(), QueryValue::text(*value)))
            .collect()
    }

    fn document(name: &str) -> Document {
        json!({ "_id": "3fa85f64-5717-4562-b3fc-2c963f66afa6", "name": name })
            .as_object()
            .cloned()
            .expect("object literal")
    }

    #[rstest]
    fn request_defaults_when_only_filters_given() {
        let request =
            ListRequest::from_params(Collection::Bootcamps, &params(&[("housing", "true")]))
                .expect("valid request");
        assert_eq!(request.projection, Projection::All);
        assert_eq!(request.sort, vec![SortKey::ascending("name")]);
        assert_eq!((request.page.page(), request.page.limit()), (1, 25));
        assert_eq!(
            request.filter.conditions()[0].predicate,
            Predicate::Eq(json!(true))
        );
    }

    #[rstest]
    fn garbage_paging_falls_back_to_defaults() {
        let request = ListRequest::from_params(
            Collection::Courses,
            &params(&[("page", "last"), ("limit", "-4")]),
        )
        .expect("paging never fails");
        assert_eq!((request.page.page(), request.page.limit()), (1, 25));
    }

    #[rstest]
    #[tokio::test]
    async fn list_counts_filtered_set_and_pages_through_it() {
        let mut store = MockDocumentStore::new();
        store
            .expect_count()
            .withf(|collection, filter| {
                *collection == Collection::Bootcamps && filter.conditions().len() == 1
            })
            .times(1)
            .return_once(|_, _| Ok(5));
        store
            .expect_find()
            .withf(|_, query| {
                query.skip == 2
                    && query.limit == Some(2)
                    && query.sort == vec![SortKey::descending("name")]
                    && query.join.is_none()
            })
            .times(1)
            .return_once(|_, _| Ok(vec![document("C"), document("B")]));

        let envelope = list(
            &store,
            Collection::Bootcamps,
            &params(&[
                ("careers", "Data Science"),
                ("select", "name,careers"),
                ("sort", "-name"),
                ("page", "2"),
                ("limit", "2"),
            ]),
            Some(Join::BOOTCAMP_COURSES),
        )
        .await
        .expect("list succeeds");

        assert!(envelope.success);
        assert_eq!(envelope.count, 2);
        let pagination = serde_json::to_value(envelope.pagination).expect("serialise");
        assert_eq!(
            pagination,
            json!({ "next": { "page": 3, "limit": 2 }, "prev": { "page": 1, "limit": 2 } })
        );
    }

    #[rstest]
    #[tokio::test]
    async fn join_survives_when_projection_keeps_its_field() {
        let mut store = MockDocumentStore::new();
        store.expect_count().return_once(|_, _| Ok(1));
        store
            .expect_find()
            .withf(|collection, query| {
                *collection == Collection::Courses && query.join == Some(Join::COURSE_BOOTCAMP)
            })
            .return_once(|_, _| Ok(vec![document("A")]));

        let envelope = list(
            &store,
            Collection::Courses,
            &QueryParams::new(),
            Some(Join::COURSE_BOOTCAMP),
        )
        .await
        .expect("list succeeds");
        assert_eq!(envelope.count, 1);
        assert_eq!(envelope.pagination, Pagination::default());
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_query_never_reaches_the_store() {
        let store = MockDocumentStore::new();
        let error = list(
            &store,
            Collection::Bootcamps,
            &params(&[("sort", "name desc")]),
            None,
        )
        .await
        .expect_err("invalid sort");
        assert_eq!(error.code(), ErrorCode::InvalidQuery);
    }
}
