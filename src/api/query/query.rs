//! Reusable search query values
//!
//! A [`SearchQuery`] is an immutable description of a search: AND-combined
//! filter groups, sort orders, and optional paging. [`to_query_params`]
//! flattens it into the `searchCriteria[...]` bracketed wire mapping, which
//! must be reproduced bit-exact for the API to accept it.
//!
//! [`to_query_params`]: SearchQuery::to_query_params

use super::filters::{FilterGroup, FilterValue};
use super::sort::SortOrder;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchQuery {
    pub filter_groups: Vec<FilterGroup>,
    pub sort_orders: Vec<SortOrder>,
    pub page_size: Option<u32>,
    pub current_page: Option<u32>,
}

impl SearchQuery {
    /// Query matching all entities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Query for a single `field = value` condition.
    pub fn by_field(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::by_field_condition(field, value, None::<String>)
    }

    /// Query for a single field condition with an explicit condition type
    /// (`"gt"`, `"in"`, ...). `None` means the server-default `"eq"`.
    pub fn by_field_condition(
        field: impl Into<String>,
        value: impl Into<FilterValue>,
        condition_type: Option<impl Into<String>>,
    ) -> Self {
        let filter = super::filters::Filter {
            field: field.into(),
            value: value.into(),
            condition_type: condition_type.map(Into::into),
        };
        Self { filter_groups: vec![FilterGroup::of(filter)], ..Self::default() }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_current_page(mut self, current_page: u32) -> Self {
        self.current_page = Some(current_page);
        self
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_orders.push(sort_order);
        self
    }

    /// Flatten into the ordered `searchCriteria[...]` wire mapping.
    ///
    /// Key order is deterministic: paging first, then filters in group/filter
    /// order, then sort orders. The `condition_type` key is omitted when the
    /// filter carries none; it is never emitted empty.
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(page_size) = self.page_size {
            params.push(("searchCriteria[pageSize]".to_string(), page_size.to_string()));
        }
        if let Some(current_page) = self.current_page {
            params.push(("searchCriteria[currentPage]".to_string(), current_page.to_string()));
        }

        for (g, group) in self.filter_groups.iter().enumerate() {
            for (f, filter) in group.filters.iter().enumerate() {
                let prefix = format!("searchCriteria[filter_groups][{}][filters][{}]", g, f);
                params.push((format!("{}[field]", prefix), filter.field.clone()));
                params.push((format!("{}[value]", prefix), filter.value.to_param_string()));
                if let Some(condition_type) = &filter.condition_type {
                    params.push((format!("{}[condition_type]", prefix), condition_type.clone()));
                }
            }
        }

        for (i, sort_order) in self.sort_orders.iter().enumerate() {
            params.push((
                format!("searchCriteria[sortOrders][{}][field]", i),
                sort_order.field().to_string(),
            ));
            params.push((
                format!("searchCriteria[sortOrders][{}][direction]", i),
                sort_order.direction().to_string(),
            ));
        }

        params
    }
}
