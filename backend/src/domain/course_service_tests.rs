//! Tests for the course service and its average-cost hand-off.

use std::sync::Arc;

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::average_cost::AVERAGE_COST_FIELD;
use crate::domain::ports::MockDocumentStore;
use crate::test_support::{document, fixture_clock, fixture_timestamp, stored_bootcamp};

fn service(store: MockDocumentStore) -> CourseService<MockDocumentStore> {
    CourseService::new(Arc::new(store), fixture_clock())
}

#[fixture]
fn course_body() -> Document {
    document(json!({
        "title": "  Front End Web Development ",
        "description": "HTML, CSS and modern JavaScript",
        "weeks": 8,
        "tuition": "8000",
        "minimumSkill": "beginner",
    }))
}

fn stored_course(id: DocumentId, bootcamp_id: DocumentId, tuition: f64) -> Document {
    document(json!({
        "_id": id,
        "title": "Full Stack Web Development",
        "description": "Node, React and a database",
        "weeks": "12",
        "tuition": tuition,
        "minimumSkill": "intermediate",
        "scholarshipAvailable": false,
        "createdAt": "2026-03-01T08:00:00Z",
        "bootcamp": bootcamp_id,
    }))
}

fn expect_bootcamp(store: &mut MockDocumentStore, bootcamp_id: DocumentId, exists: bool) {
    let stored = exists.then(|| stored_bootcamp(bootcamp_id, "Devworks Bootcamp"));
    store
        .expect_find_by_id()
        .withf(move |collection, id, join| {
            *collection == Collection::Bootcamps && *id == bootcamp_id && join.is_none()
        })
        .times(1)
        .return_once(move |_, _, _| Ok(stored));
}

fn expect_recompute(store: &mut MockDocumentStore, bootcamp_id: DocumentId, mean: Option<f64>) {
    store
        .expect_average()
        .withf(move |collection, filter, field| {
            *collection == Collection::Courses
                && *filter == Filter::field_equals(BOOTCAMP_FIELD, bootcamp_id)
                && field == "tuition"
        })
        .times(1)
        .return_once(move |_, _, _| Ok(mean));
}

#[rstest]
#[tokio::test]
async fn create_attaches_bootcamp_and_refreshes_average(course_body: Document) {
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    expect_bootcamp(&mut store, bootcamp_id, true);
    store
        .expect_insert()
        .withf(move |collection, document| {
            *collection == Collection::Courses
                && document.get("bootcamp") == Some(&json!(bootcamp_id))
                && document.get("weeks") == Some(&json!("8"))
                && document.get("tuition") == Some(&json!(8000.0))
        })
        .times(1)
        .return_once(|_, document| Ok(document));
    expect_recompute(&mut store, bootcamp_id, Some(8000.0));
    store
        .expect_set_field()
        .withf(move |collection, id, field, value| {
            *collection == Collection::Bootcamps
                && *id == bootcamp_id
                && field == AVERAGE_COST_FIELD
                && *value == json!(8000)
        })
        .times(1)
        .return_once(|_, _, _, _| Ok(true));

    let created = service(store)
        .create(bootcamp_id, course_body)
        .await
        .expect("course created");

    assert_eq!(created.title, "Front End Web Development");
    assert_eq!(created.bootcamp.id(), bootcamp_id);
    assert!(!created.scholarship_available);
    assert_eq!(created.created_at, fixture_timestamp());
}

#[rstest]
#[tokio::test]
async fn create_requires_existing_bootcamp(course_body: Document) {
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    expect_bootcamp(&mut store, bootcamp_id, false);

    let err = service(store)
        .create(bootcamp_id, course_body)
        .await
        .expect_err("orphan course rejected");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(
        err.message(),
        format!("No bootcamp with the id of {bootcamp_id}")
    );
}

#[rstest]
#[tokio::test]
async fn create_reports_missing_fields_in_order() {
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    expect_bootcamp(&mut store, bootcamp_id, true);

    let err = service(store)
        .create(bootcamp_id, document(json!({ "minimumSkill": "expert" })))
        .await
        .expect_err("validation fails");

    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    assert_eq!(
        err.message(),
        "Add a course title, Add a course desciption, Add number of weeks, \
         Add tuition cost, Minimum skill must be beginner, intermediate, or advanced"
    );
}

#[rstest]
#[tokio::test]
async fn create_rejects_bootcamp_in_body(mut course_body: Document) {
    course_body.insert("bootcamp".to_owned(), json!(DocumentId::random()));

    let err = service(MockDocumentStore::new())
        .create(DocumentId::random(), course_body)
        .await
        .expect_err("unknown field rejected");

    assert_eq!(err.message(), "Unknown fields: bootcamp");
}

#[rstest]
#[tokio::test]
async fn failed_recompute_does_not_fail_the_write(course_body: Document) {
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    expect_bootcamp(&mut store, bootcamp_id, true);
    store
        .expect_insert()
        .return_once(|_, document| Ok(document));
    expect_recompute(&mut store, bootcamp_id, Some(8000.0));
    store
        .expect_set_field()
        .return_once(|_, _, _, _| Ok(false));

    service(store)
        .create(bootcamp_id, course_body)
        .await
        .expect("course still created");
}

#[rstest]
#[tokio::test]
async fn update_merges_and_refreshes_average() {
    let id = DocumentId::random();
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    let stored = stored_course(id, bootcamp_id, 1500.0);
    store
        .expect_find_by_id()
        .withf(move |collection, found, _| *collection == Collection::Courses && *found == id)
        .return_once(move |_, _, _| Ok(Some(stored)));
    store
        .expect_replace()
        .withf(|_, _, document| document.get("tuition") == Some(&json!(2000.0)))
        .times(1)
        .return_once(|_, _, document| Ok(Some(document)));
    expect_recompute(&mut store, bootcamp_id, None);

    let updated = service(store)
        .update(id, document(json!({ "tuition": 2000 })))
        .await
        .expect("course updated");

    assert_eq!(updated.tuition, 2000.0);
    assert_eq!(updated.title, "Full Stack Web Development");
}

#[rstest]
#[tokio::test]
async fn delete_recomputes_after_removal() {
    let id = DocumentId::random();
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    let mut sequence = mockall::Sequence::new();
    let stored = stored_course(id, bootcamp_id, 2200.0);
    store
        .expect_delete()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(move |_, _| Ok(Some(stored)));
    store
        .expect_average()
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _, _| Ok(Some(1250.0)));
    store
        .expect_set_field()
        .withf(|_, _, _, value| *value == json!(1250.0))
        .times(1)
        .in_sequence(&mut sequence)
        .return_once(|_, _, _, _| Ok(true));

    let removed = service(store).delete(id).await.expect("course deleted");

    assert_eq!(removed.id, id);
    assert_eq!(removed.bootcamp.id(), bootcamp_id);
}

#[rstest]
#[tokio::test]
async fn missing_courses_are_not_found() {
    let id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    store.expect_find_by_id().returning(|_, _, _| Ok(None));
    store.expect_delete().returning(|_, _| Ok(None));
    store.expect_average().never();
    let service = service(store);
    let expected = format!("No course found with the id of {id}");

    let get = service.get(id).await.expect_err("get misses");
    let update = service
        .update(id, Document::new())
        .await
        .expect_err("update misses");
    let delete = service.delete(id).await.expect_err("delete misses");

    for err in [get, update, delete] {
        assert_eq!(err.code(), ErrorCode::NotFound);
        assert_eq!(err.message(), expected);
    }
}

#[rstest]
#[tokio::test]
async fn get_joins_bootcamp_summary() {
    let id = DocumentId::random();
    let bootcamp_id = DocumentId::random();
    let mut joined = stored_course(id, bootcamp_id, 1000.0);
    joined.insert(
        "bootcamp".to_owned(),
        json!({ "_id": bootcamp_id, "name": "Devworks Bootcamp", "description": "Full stack" }),
    );
    let mut store = MockDocumentStore::new();
    store
        .expect_find_by_id()
        .withf(|collection, _, join| {
            *collection == Collection::Courses && *join == Some(Join::COURSE_BOOTCAMP)
        })
        .return_once(move |_, _, _| Ok(Some(joined)));

    let course = service(store).get(id).await.expect("course found");

    match course.bootcamp {
        crate::domain::BootcampRef::Summary(summary) => {
            assert_eq!(summary.id, bootcamp_id);
            assert_eq!(summary.name.as_deref(), Some("Devworks Bootcamp"));
        }
        other => panic!("expected a joined summary, got {other:?}"),
    }
}

#[rstest]
#[tokio::test]
async fn list_for_bootcamp_requires_the_bootcamp() {
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    expect_bootcamp(&mut store, bootcamp_id, false);
    store.expect_find().never();

    let err = service(store)
        .list_for_bootcamp(bootcamp_id)
        .await
        .expect_err("bootcamp missing");

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(
        err.message(),
        format!("Bootcamp not found with id of {bootcamp_id}")
    );
}

#[rstest]
#[tokio::test]
async fn list_for_bootcamp_filters_on_parent() {
    let bootcamp_id = DocumentId::random();
    let mut store = MockDocumentStore::new();
    expect_bootcamp(&mut store, bootcamp_id, true);
    let stored = vec![
        stored_course(DocumentId::random(), bootcamp_id, 1000.0),
        stored_course(DocumentId::random(), bootcamp_id, 1500.0),
    ];
    store
        .expect_find()
        .withf(move |collection, query| {
            *collection == Collection::Courses
                && query.filter == Filter::field_equals(BOOTCAMP_FIELD, bootcamp_id)
                && query.limit.is_none()
        })
        .times(1)
        .return_once(move |_, _| Ok(stored));

    let courses = service(store)
        .list_for_bootcamp(bootcamp_id)
        .await
        .expect("courses listed");

    assert_eq!(courses.len(), 2);
}
