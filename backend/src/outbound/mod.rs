//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: MongoDB and in-memory document stores
//! - **geocoding**: reqwest-backed MapQuest geocoder
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod geocoding;
pub mod persistence;
