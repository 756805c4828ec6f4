//! Behavioural coverage for the in-memory document store.

use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::geo::angular_radius;
use crate::domain::query::{Projection, SortKey};

fn doc(value: Value) -> Document {
    value.as_object().cloned().expect("object literal")
}

fn bootcamp(id: DocumentId, name: &str, coordinates: [f64; 2]) -> Document {
    doc(json!({
        "_id": id,
        "name": name,
        "location": { "type": "Point", "coordinates": coordinates },
    }))
}

fn course(bootcamp_id: DocumentId, title: &str, tuition: f64) -> Document {
    doc(json!({
        "_id": DocumentId::random(),
        "title": title,
        "tuition": tuition,
        "bootcamp": bootcamp_id,
    }))
}

struct Seeded {
    store: InMemoryDocumentStore,
    boston: DocumentId,
    lowell: DocumentId,
}

#[fixture]
async fn seeded() -> Seeded {
    let store = InMemoryDocumentStore::new();
    let boston = DocumentId::random();
    let lowell = DocumentId::random();
    for document in [
        bootcamp(boston, "Devworks Bootcamp", [-71.104_08, 42.350_846]),
        bootcamp(lowell, "Codemasters", [-71.316_17, 42.633_42]),
    ] {
        store
            .insert(Collection::Bootcamps, document)
            .await
            .expect("seed bootcamp");
    }
    for (title, tuition) in [("Front End", 1000.0), ("Full Stack", 1500.0), ("Data", 2200.0)] {
        store
            .insert(Collection::Courses, course(boston, title, tuition))
            .await
            .expect("seed course");
    }
    Seeded {
        store,
        boston,
        lowell,
    }
}

#[rstest]
#[tokio::test]
async fn insert_enforces_unique_name(#[future(awt)] seeded: Seeded) {
    let error = seeded
        .store
        .insert(
            Collection::Bootcamps,
            bootcamp(DocumentId::random(), "Codemasters", [0.0, 0.0]),
        )
        .await
        .expect_err("duplicate name");
    assert_eq!(
        error,
        DocumentStoreError::duplicate_key("name", "Codemasters")
    );
}

#[rstest]
#[tokio::test]
async fn replace_checks_uniqueness_against_others_only(#[future(awt)] seeded: Seeded) {
    let mut renamed = bootcamp(seeded.boston, "Devworks Bootcamp", [-71.1, 42.35]);
    let kept = seeded
        .store
        .replace(Collection::Bootcamps, seeded.boston, renamed.clone())
        .await
        .expect("same name on same document");
    assert!(kept.is_some());

    renamed.insert("name".to_owned(), json!("Codemasters"));
    let error = seeded
        .store
        .replace(Collection::Bootcamps, seeded.boston, renamed)
        .await
        .expect_err("name held by another bootcamp");
    assert!(matches!(error, DocumentStoreError::DuplicateKey { .. }));
}

#[rstest]
#[tokio::test]
async fn insert_requires_identity() {
    let store = InMemoryDocumentStore::new();
    let error = store
        .insert(Collection::Courses, doc(json!({ "title": "No id" })))
        .await
        .expect_err("missing id");
    assert!(matches!(error, DocumentStoreError::Query { .. }));
}

#[rstest]
#[tokio::test]
async fn find_filters_sorts_and_pages(#[future(awt)] seeded: Seeded) {
    let query = FindQuery {
        filter: Filter::field_equals("bootcamp", seeded.boston),
        sort: vec![SortKey::descending("tuition")],
        skip: 1,
        limit: Some(1),
        ..FindQuery::default()
    };
    let found = seeded
        .store
        .find(Collection::Courses, &query)
        .await
        .expect("find");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("title"), Some(&json!("Full Stack")));

    let total = seeded
        .store
        .count(Collection::Courses, &query.filter)
        .await
        .expect("count");
    assert_eq!(total, 3);
}

#[rstest]
#[tokio::test]
async fn referencing_join_attaches_children(#[future(awt)] seeded: Seeded) {
    let query = FindQuery {
        projection: Projection::Include {
            fields: vec!["name".to_owned(), "courses".to_owned()],
            keep_id: true,
        },
        sort: vec![SortKey::ascending("name")],
        ..FindQuery::default()
    }
    .with_join(Join::BOOTCAMP_COURSES);
    let found = seeded
        .store
        .find(Collection::Bootcamps, &query)
        .await
        .expect("find");

    let counts: Vec<(Option<&Value>, usize)> = found
        .iter()
        .map(|bootcamp| {
            let courses = bootcamp
                .get("courses")
                .and_then(Value::as_array)
                .map_or(0, Vec::len);
            (bootcamp.get("name"), courses)
        })
        .collect();
    assert_eq!(
        counts,
        vec![
            (Some(&json!("Codemasters")), 0),
            (Some(&json!("Devworks Bootcamp")), 3),
        ]
    );
    assert!(found.iter().all(|bootcamp| !bootcamp.contains_key("location")));
}

#[rstest]
#[tokio::test]
async fn reference_join_replaces_identifier_with_summary(#[future(awt)] seeded: Seeded) {
    let query = FindQuery::default().with_join(Join::COURSE_BOOTCAMP);
    let found = seeded
        .store
        .find(Collection::Courses, &query)
        .await
        .expect("find");

    let summary = found[0].get("bootcamp").expect("bootcamp present");
    assert_eq!(
        summary,
        &json!({ "_id": seeded.boston, "name": "Devworks Bootcamp" })
    );
}

#[rstest]
#[tokio::test]
#[expect(clippy::float_arithmetic, reason = "mean compared within a tolerance")]
async fn average_and_set_field(#[future(awt)] seeded: Seeded) {
    let filter = Filter::field_equals("bootcamp", seeded.boston);
    let mean = seeded
        .store
        .average(Collection::Courses, &filter, "tuition")
        .await
        .expect("average")
        .expect("courses exist");
    assert!((mean - 4700.0 / 3.0).abs() < 1e-9);

    let none = seeded
        .store
        .average(
            Collection::Courses,
            &Filter::field_equals("bootcamp", seeded.lowell),
            "tuition",
        )
        .await
        .expect("average");
    assert_eq!(none, None);

    let written = seeded
        .store
        .set_field(Collection::Bootcamps, seeded.boston, "averageCost", json!(1570))
        .await
        .expect("set field");
    assert!(written);
    let missing = seeded
        .store
        .set_field(Collection::Bootcamps, DocumentId::random(), "averageCost", json!(1))
        .await
        .expect("set field");
    assert!(!missing);
}

#[rstest]
#[tokio::test]
async fn within_sphere_uses_great_circle_distance(#[future(awt)] seeded: Seeded) {
    let centre = GeoPoint::new(-71.0589, 42.3601);

    let near = seeded
        .store
        .within_sphere(
            Collection::Bootcamps,
            "location",
            centre,
            angular_radius(5.0).expect("radius"),
        )
        .await
        .expect("radius search");
    assert_eq!(near.len(), 1);
    assert_eq!(document_id(&near[0]), Some(seeded.boston));

    let wide = seeded
        .store
        .within_sphere(
            Collection::Bootcamps,
            "location",
            centre,
            angular_radius(30.0).expect("radius"),
        )
        .await
        .expect("radius search");
    assert_eq!(wide.len(), 2);
}

#[rstest]
#[tokio::test]
async fn delete_returns_the_removed_document(#[future(awt)] seeded: Seeded) {
    let removed = seeded
        .store
        .delete(Collection::Bootcamps, seeded.lowell)
        .await
        .expect("delete");
    assert_eq!(removed.as_ref().and_then(document_id), Some(seeded.lowell));

    let again = seeded
        .store
        .delete(Collection::Bootcamps, seeded.lowell)
        .await
        .expect("delete");
    assert!(again.is_none());
    assert!(
        seeded
            .store
            .find_by_id(Collection::Bootcamps, seeded.lowell, None)
            .await
            .expect("lookup")
            .is_none()
    );
}
