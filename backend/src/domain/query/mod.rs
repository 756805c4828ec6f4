//! Generic list querying: filter translation, result shaping, and paging.
//!
//! Inbound adapters decode the query string into [`QueryParams`]; [`list`]
//! composes the [`Filter`] translator, the [`Projection`] and [`SortKey`]
//! shaper, and the `pagination` crate into one store round trip.

mod filter;
mod params;
mod pipeline;
mod shape;

pub use filter::{Condition, Filter, Operator, Predicate};
pub use params::{CONTROL_KEYS, QueryParams, QueryValue};
pub use pipeline::{ListEnvelope, ListRequest, list};
pub use shape::{DEFAULT_SORT_FIELD, Join, Projection, SortDirection, SortKey};
