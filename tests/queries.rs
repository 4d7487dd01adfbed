//! Integration tests for search query building
//!
//! The `searchCriteria[...]` wire format is a hard compatibility requirement,
//! so these compare full parameter lists, not just fragments.

use magento2_client::{Filter, FilterGroup, SearchQuery, SearchQueryBuilder, SortOrder};

fn expected(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_search_query_wire_format() {
    let query = SearchQueryBuilder::new()
        .filter_group(
            FilterGroup::of(Filter::with_condition("a", 1, "gt"))
                .or(Filter::with_condition("b", 2, "eq")),
        )
        .filter(Filter::new("c", 3))
        .page_size(12)
        .current_page(4)
        .build();

    assert_eq!(
        query.to_query_params(),
        expected(&[
            ("searchCriteria[pageSize]", "12"),
            ("searchCriteria[currentPage]", "4"),
            ("searchCriteria[filter_groups][0][filters][0][field]", "a"),
            ("searchCriteria[filter_groups][0][filters][0][value]", "1"),
            ("searchCriteria[filter_groups][0][filters][0][condition_type]", "gt"),
            ("searchCriteria[filter_groups][0][filters][1][field]", "b"),
            ("searchCriteria[filter_groups][0][filters][1][value]", "2"),
            ("searchCriteria[filter_groups][0][filters][1][condition_type]", "eq"),
            ("searchCriteria[filter_groups][1][filters][0][field]", "c"),
            ("searchCriteria[filter_groups][1][filters][0][value]", "3"),
        ])
    );
}

#[test]
fn test_field_value_query_wire_format() {
    let query = SearchQuery::by_field("status", "awaiting_shipping").with_page_size(100);
    assert_eq!(
        query.to_query_params(),
        expected(&[
            ("searchCriteria[pageSize]", "100"),
            ("searchCriteria[filter_groups][0][filters][0][field]", "status"),
            ("searchCriteria[filter_groups][0][filters][0][value]", "awaiting_shipping"),
        ])
    );

    let query = SearchQuery::by_field("source_code", "default")
        .with_page_size(1)
        .with_current_page(1);
    assert_eq!(
        query.to_query_params(),
        expected(&[
            ("searchCriteria[pageSize]", "1"),
            ("searchCriteria[currentPage]", "1"),
            ("searchCriteria[filter_groups][0][filters][0][field]", "source_code"),
            ("searchCriteria[filter_groups][0][filters][0][value]", "default"),
        ])
    );
}

#[test]
fn test_field_value_query_with_condition_and_sort() {
    let query = SearchQuery::by_field_condition("source_code", "default", Some("eq"))
        .with_page_size(34)
        .with_current_page(42)
        .with_sort_order(SortOrder::desc("sku"));

    assert_eq!(
        query.to_query_params(),
        expected(&[
            ("searchCriteria[pageSize]", "34"),
            ("searchCriteria[currentPage]", "42"),
            ("searchCriteria[filter_groups][0][filters][0][field]", "source_code"),
            ("searchCriteria[filter_groups][0][filters][0][value]", "default"),
            ("searchCriteria[filter_groups][0][filters][0][condition_type]", "eq"),
            ("searchCriteria[sortOrders][0][field]", "sku"),
            ("searchCriteria[sortOrders][0][direction]", "desc"),
        ])
    );
}

#[test]
fn test_single_filter_equivalence() {
    // the by_field shortcut and a one-group/one-filter general build are the
    // same query, for any condition type
    for condition in [None, Some("eq"), Some("in"), Some("gt")] {
        let shortcut = SearchQuery::by_field_condition("f", "v", condition);
        let general = SearchQueryBuilder::new()
            .filter_group(FilterGroup::new(vec![Filter {
                field: "f".to_string(),
                value: "v".into(),
                condition_type: condition.map(String::from),
            }]))
            .build();
        assert_eq!(shortcut, general);
        assert_eq!(shortcut.to_query_params(), general.to_query_params());
    }
}

#[test]
fn test_empty_query_matches_all() {
    assert!(SearchQuery::new().to_query_params().is_empty());
    // paging appears even with no filter groups
    let query = SearchQuery::new().with_page_size(5);
    assert_eq!(query.to_query_params(), expected(&[("searchCriteria[pageSize]", "5")]));
}

#[test]
fn test_queries_do_not_mutate_inputs() {
    let base = SearchQuery::by_field("status", "processing");
    let with_paging = base.clone().with_page_size(10).with_current_page(2);
    assert_eq!(base.page_size, None);
    assert_eq!(base.current_page, None);
    assert_eq!(with_paging.page_size, Some(10));
    // same filters in both
    assert_eq!(base.filter_groups, with_paging.filter_groups);
}
