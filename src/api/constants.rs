//! Constants and path helpers for the Magento 2 REST API

use serde_json::{Value, json};

/// Prefix every API path must carry.
pub const API_PREFIX: &str = "/V1/";

/// Default API scope when none is configured.
pub const DEFAULT_SCOPE: &str = "all";

/// User agent sent when the configuration doesn't override it.
pub const USER_AGENT: &str = concat!("magento2-client/", env!("CARGO_PKG_VERSION"));

/// Default page size for paginated requests.
///
/// Note increasing it doesn't create a significant time improvement: in one
/// production test, fetching 2k products with a page size of 1k took 28s
/// while the same query with a page size of 2k still took 26s.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Id of the root category every store tree hangs off.
pub const ROOT_CATEGORY_ID: u64 = 1;

/// Product visibility options
pub mod visibility {
    pub const NOT_VISIBLE: u64 = 1;
    pub const IN_CATALOG: u64 = 2;
    pub const IN_SEARCH: u64 = 3;
    pub const IN_CATALOG_AND_SEARCH: u64 = 4;
}

/// Product status options
pub mod product_status {
    pub const ENABLED: u64 = 1;
    pub const DISABLED: u64 = 2;
}

/// MIME types Magento accepts for gallery images.
pub const IMAGE_MIME_TYPES: [&str; 5] =
    ["image/gif", "image/jpeg", "image/png", "image/xbm", "image/wbmp"];

/// Build the scoped REST path for an API path, optionally routed through the
/// asynchronous bulk endpoint.
pub fn rest_path(scope: &str, path: &str, async_bulk: bool) -> String {
    if async_bulk {
        format!("/rest/{}/async/bulk{}", scope, path)
    } else {
        format!("/rest/{}{}", scope, path)
    }
}

/// Default payload merged under a product attribute before saving it.
///
/// The "global" scope is required for configurable products.
pub fn default_attribute_payload() -> Value {
    json!({
        "apply_to": [],
        "backend_type": "int",
        "custom_attributes": [],
        "entity_type_id": "4",
        "extension_attributes": {},
        "frontend_input": "select",
        "is_comparable": false,
        "is_filterable": false,
        "is_filterable_in_grid": false,
        "is_filterable_in_search": false,
        "is_html_allowed_on_front": false,
        "is_required": false,
        "is_searchable": false,
        "is_unique": false,
        "is_used_for_promo_rules": false,
        "is_used_in_grid": false,
        "is_user_defined": true,
        "is_visible": true,
        "is_visible_in_advanced_search": false,
        "is_visible_in_grid": false,
        "is_visible_on_front": true,
        "is_wysiwyg_enabled": false,
        "note": "",
        "position": 0,
        "scope": "global",
        "used_for_sort_by": false,
        "used_in_product_listing": false,
        "validation_rules": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rest_path() {
        assert_eq!(rest_path("all", "/V1/orders", false), "/rest/all/V1/orders");
        assert_eq!(rest_path("toto", "/V1/test/url", false), "/rest/toto/V1/test/url");
        assert_eq!(
            rest_path("toto", "/V1/test/url", true),
            "/rest/toto/async/bulk/V1/test/url"
        );
    }

    #[test]
    fn test_default_attribute_payload() {
        let payload = default_attribute_payload();
        assert_eq!(payload["scope"], "global");
        assert_eq!(payload["is_user_defined"], true);
    }
}
