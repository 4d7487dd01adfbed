//! Fluent construction of search queries

use super::filters::{Filter, FilterGroup, FilterValue};
use super::query::SearchQuery;
use super::sort::SortOrder;

/// Builds a [`SearchQuery`] step by step.
///
/// Each `filter` call adds its own AND clause; use [`filter_group`] to put
/// several OR alternatives in one clause.
///
/// [`filter_group`]: SearchQueryBuilder::filter_group
#[derive(Debug, Clone, Default)]
pub struct SearchQueryBuilder {
    query: SearchQuery,
}

impl SearchQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// AND a single-filter clause.
    pub fn filter(self, filter: Filter) -> Self {
        self.filter_group(filter)
    }

    /// AND a clause of OR-combined filters.
    pub fn filter_group(mut self, group: impl Into<FilterGroup>) -> Self {
        self.query.filter_groups.push(group.into());
        self
    }

    /// AND a `field = value` clause.
    pub fn field_eq(self, field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filter(Filter::new(field, value))
    }

    pub fn sort_order(mut self, sort_order: SortOrder) -> Self {
        self.query.sort_orders.push(sort_order);
        self
    }

    pub fn sort_asc(self, field: impl Into<String>) -> Self {
        self.sort_order(SortOrder::asc(field))
    }

    pub fn sort_desc(self, field: impl Into<String>) -> Self {
        self.sort_order(SortOrder::desc(field))
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.query.page_size = Some(page_size);
        self
    }

    pub fn current_page(mut self, current_page: u32) -> Self {
        self.query.current_page = Some(current_page);
        self
    }

    pub fn build(self) -> SearchQuery {
        self.query
    }
}
