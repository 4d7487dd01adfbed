//! Search criteria query building
//!
//! Encodes AND-of-OR filter predicates, sort orders and paging into the flat
//! `searchCriteria[...]` key-value wire format. Pure data; no I/O. Follows
//! the same pattern as batching, with a reusable value ([`SearchQuery`]) and
//! a fluent builder ([`SearchQueryBuilder`]).

pub mod builder;
pub mod filters;
pub mod query;
pub mod sort;

pub use builder::SearchQueryBuilder;
pub use filters::{Filter, FilterGroup, FilterValue};
pub use query::SearchQuery;
pub use sort::SortOrder;
