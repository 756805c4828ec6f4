//! Document store adapters.
//!
//! [`MongoDocumentStore`] implements the `DocumentStore` port over a MongoDB
//! database and is what the server runs against. [`InMemoryDocumentStore`]
//! keeps everything in process memory for tests and for running without a
//! database; its filter evaluation, ordering, and projection live in the
//! private `eval` module.

use serde_json::Value;

mod eval;
mod in_memory;
mod mongo;

pub use in_memory::InMemoryDocumentStore;
pub use mongo::MongoDocumentStore;

/// Render a unique-field value for a duplicate-key message.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
