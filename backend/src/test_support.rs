//! Shared fixtures for unit tests inside the crate.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::domain::ports::GeocodedLocation;
use crate::domain::{Document, DocumentId};

/// Instant every fixture clock reports.
pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

pub(crate) fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

pub(crate) const BOSTON_ADDRESS: &str = "233 Bay State Rd Boston MA 02215";

pub(crate) fn boston() -> GeocodedLocation {
    GeocodedLocation {
        latitude: 42.350_846,
        longitude: -71.103_12,
        formatted_address: Some("233 Bay State Rd, Boston, MA 02215-1405, US".to_owned()),
        street_name: Some("233 Bay State Rd".to_owned()),
        city: Some("Boston".to_owned()),
        state_code: Some("MA".to_owned()),
        zipcode: Some("02215-1405".to_owned()),
        country_code: Some("US".to_owned()),
    }
}

/// Convert a `json!` object literal into a document.
pub(crate) fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A client body that passes bootcamp validation.
pub(crate) fn bootcamp_body(name: &str) -> Document {
    document(json!({
        "name": name,
        "description": "Full stack web development from first principles",
        "website": "https://devworks.com",
        "phone": "(111) 111-1111",
        "email": "enroll@devworks.com",
        "address": BOSTON_ADDRESS,
        "careers": ["Web Development", "UI/UX", "Business"],
        "housing": true,
        "jobAssistance": true,
    }))
}

/// A stored bootcamp document as the store would return it.
pub(crate) fn stored_bootcamp(id: DocumentId, name: &str) -> Document {
    let mut stored = bootcamp_body(name);
    stored.insert("_id".to_owned(), Value::from(id));
    stored.insert("slug".to_owned(), json!(crate::domain::slugify(name)));
    stored.insert(
        "location".to_owned(),
        json!({
            "type": "Point",
            "coordinates": [-71.103_12, 42.350_846],
            "formattedAddress": "233 Bay State Rd, Boston, MA 02215-1405, US",
            "city": "Boston",
        }),
    );
    stored.insert("jobGuarantee".to_owned(), json!(false));
    stored.insert("acceptGi".to_owned(), json!(false));
    stored.insert("createdAt".to_owned(), json!("2026-03-01T08:00:00Z"));
    stored
}
