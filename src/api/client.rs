//! Client for the Magento 2 REST API
//!
//! [`Magento`] owns a pooled HTTP client and the connection settings, and
//! exposes one thin wrapper per REST resource on top of four primitives:
//! [`request_api`](Magento::request_api) (single request with retry and
//! error conversion), [`get_json_api`](Magento::get_json_api) (optional
//! resources), [`get_paginated`](Magento::get_paginated) (entity streams)
//! and the batch module.
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use magento2_client::{ListOptions, Magento, SearchQuery};
//!
//! # async fn demo() -> magento2_client::Result<()> {
//! let client = Magento::from_env()?;
//! let query = SearchQuery::by_field("status", "awaiting_shipping");
//! let orders: Vec<_> = client
//!     .get_orders(ListOptions::new().with_query(query).with_limit(100))
//!     .try_collect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::time::Duration;

use futures::{Stream, TryStreamExt, pin_mut};
use log::debug;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::api::config::{ClientConfig, ListOptions, RequestOptions};
use crate::api::constants::{API_PREFIX, default_attribute_payload, rest_path};
use crate::api::error::{Error, Result, check_response, error_for_status};
use crate::api::models::{BasePrice, Category, Entity, MediaEntry, Order, Page, Product, SourceItem};
use crate::api::pagination::{paginate, paginate_by_id};
use crate::api::query::{Filter, SearchQuery, SearchQueryBuilder};
use crate::api::resilience::RetryPolicy;

/// Magento 2 REST API client.
///
/// Cheap to clone; the underlying connection pool is shared. All mutable
/// state (pagination cursors, batch buffers) lives in the values the methods
/// return, so one client can serve many concurrent walks.
#[derive(Clone)]
pub struct Magento {
    config: ClientConfig,
    http: reqwest::Client,
}

impl Magento {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, http })
    }

    /// Client configured from the `MAGENTO_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Client with a caller-built `reqwest` client (custom pool, proxy, ...).
    pub fn with_custom_client(config: ClientConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // Internals
    // =========

    fn api_url(&self, path: &str, async_bulk: bool) -> Result<String> {
        if !path.starts_with(API_PREFIX) {
            return Err(Error::Assertion(format!(
                "API path must start with {:?}: {:?}",
                API_PREFIX, path
            )));
        }
        Ok(format!(
            "{}{}",
            self.config.base_url.trim_end_matches('/'),
            rest_path(&self.config.scope, path, async_bulk)
        ))
    }

    /// Issue one API request.
    ///
    /// The path is prefixed with `/rest/{scope}` (and `/async/bulk` when the
    /// options say so). A failing response is re-issued `options.retry` times
    /// with a fixed sleep in between; the final response is returned as-is
    /// unless `options.throw` converts it into an error.
    pub async fn request_api(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(String, String)]>,
        json: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        if self.config.read_only && !options.bypass_read_only && method != Method::GET {
            return Err(Error::ReadOnly { method: method.to_string(), path: path.to_string() });
        }

        let url = self.api_url(path, options.async_bulk)?;
        debug!("{} {}", method, url);

        let policy = RetryPolicy::with_backoff(options.retry, options.backoff);
        let response = policy
            .execute(|| {
                let mut request = self
                    .http
                    .request(method.clone(), url.as_str())
                    .bearer_auth(&self.config.token);
                if let Some(query) = query {
                    request = request.query(query);
                }
                if let Some(json) = json {
                    request = request.json(json);
                }
                request.send()
            })
            .await?;

        if options.throw { check_response(response).await } else { Ok(response) }
    }

    pub async fn get_api(
        &self,
        path: &str,
        query: Option<&[(String, String)]>,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.request_api(Method::GET, path, query, None, options).await
    }

    pub async fn post_api(
        &self,
        path: &str,
        json: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.request_api(Method::POST, path, None, json, options).await
    }

    pub async fn put_api(
        &self,
        path: &str,
        json: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.request_api(Method::PUT, path, None, json, options).await
    }

    pub async fn delete_api(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.request_api(Method::DELETE, path, None, None, options).await
    }

    /// GET a resource that may legitimately not exist: `Ok(None)` on 404,
    /// decoded body on success, error otherwise.
    pub async fn get_json_api<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&[(String, String)]>,
        options: &RequestOptions,
    ) -> Result<Option<T>> {
        let unthrown = RequestOptions { throw: false, ..options.clone() };
        let response = self.request_api(Method::GET, path, query, None, &unthrown).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_response(response).await?;
        Ok(Some(response.json().await?))
    }

    async fn fetch_page(&self, path: &str, params: Vec<(String, String)>, retry: u32) -> Result<Page> {
        let options = RequestOptions { retry, throw: true, ..RequestOptions::default() };
        let response = self.get_api(path, Some(&params), &options).await?;
        Ok(response.json().await?)
    }

    /// Walk a paginated API path, yielding entities lazily.
    pub fn get_paginated(
        &self,
        path: impl Into<String>,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        let path: String = path.into();
        let ListOptions { query, limit, retry } = options;
        let fetch = move |params: Vec<(String, String)>| {
            let path = path.clone();
            async move { self.fetch_page(&path, params, retry).await }
        };
        paginate(fetch, query.unwrap_or_default(), limit, self.config.page_size)
    }

    /// Walk a paginated API path with keyset paging on a unique id field.
    pub fn get_paginated_by_id(
        &self,
        path: impl Into<String>,
        id_field: impl Into<String>,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        let path: String = path.into();
        let ListOptions { query, limit, retry } = options;
        let fetch = move |params: Vec<(String, String)>| {
            let path = path.clone();
            async move { self.fetch_page(&path, params, retry).await }
        };
        paginate_by_id(fetch, query.unwrap_or_default(), id_field, limit, self.config.page_size)
    }

    async fn first_entity(
        &self,
        path: &str,
        query: SearchQuery,
    ) -> Result<Option<Entity>> {
        let stream = self.get_paginated(path, ListOptions::new().with_query(query).with_limit(1));
        pin_mut!(stream);
        stream.try_next().await
    }

    // Attributes
    // ==========

    /// Save a product attribute. With `with_defaults`, the attribute is
    /// merged over the standard creation payload.
    pub async fn save_attribute(&self, attribute: &Entity, with_defaults: bool) -> Result<Entity> {
        let attribute = if with_defaults {
            let mut base = default_attribute_payload();
            if let Some(base_map) = base.as_object_mut() {
                for (key, value) in attribute {
                    base_map.insert(key.clone(), value.clone());
                }
            }
            base
        } else {
            Value::Object(attribute.clone())
        };
        let response = self
            .post_api(
                "/V1/products/attributes",
                Some(&json!({ "attribute": attribute })),
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_attribute(
        &self,
        attribute_code: &str,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.delete_api(&format!("/V1/products/attributes/{}", attribute_code), options).await
    }

    // Attribute Sets
    // ==============

    /// Get all attribute sets.
    pub fn get_attribute_sets(
        &self,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/eav/attribute-sets/list", options)
    }

    /// Get all attributes of an attribute set.
    pub async fn get_attribute_set_attributes(
        &self,
        attribute_set_id: u64,
    ) -> Result<Option<Vec<Entity>>> {
        self.get_json_api(
            &format!("/V1/products/attribute-sets/{}/attributes", attribute_set_id),
            None,
            &RequestOptions::default(),
        )
        .await
    }

    /// Assign an attribute to an attribute group of an attribute set.
    pub async fn assign_attribute_set_attribute(
        &self,
        attribute_set_id: u64,
        attribute_group_id: u64,
        attribute_code: &str,
        sort_order: u64,
    ) -> Result<reqwest::Response> {
        let payload = json!({
            "attributeCode": attribute_code,
            "attributeGroupId": attribute_group_id,
            "attributeSetId": attribute_set_id,
            "sortOrder": sort_order,
        });
        self.post_api(
            "/V1/products/attribute-sets/attributes",
            Some(&payload),
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn remove_attribute_set_attribute(
        &self,
        attribute_set_id: u64,
        attribute_code: &str,
    ) -> Result<reqwest::Response> {
        self.delete_api(
            &format!("/V1/products/attribute-sets/{}/attributes/{}", attribute_set_id, attribute_code),
            &RequestOptions::default(),
        )
        .await
    }

    // Bulk Operations
    // ===============

    /// Get the status of an async/bulk operation.
    pub async fn get_bulk_status(&self, bulk_uuid: &str) -> Result<Entity> {
        let response = self
            .get_api(&format!("/V1/bulk/{}/status", bulk_uuid), None, &RequestOptions::throwing())
            .await?;
        Ok(response.json().await?)
    }

    // Carts
    // =====

    /// Get all carts.
    pub fn get_carts(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/carts/search", options)
    }

    // Categories
    // ==========

    /// Get all categories.
    pub fn get_categories(&self, options: ListOptions) -> impl Stream<Item = Result<Category>> + '_ {
        self.get_paginated("/V1/categories/list", options)
    }

    /// Get a category by id, or `None` if it doesn't exist.
    pub async fn get_category(&self, category_id: impl Display) -> Result<Option<Category>> {
        self.get_json_api(&format!("/V1/categories/{}", category_id), None, &RequestOptions::default())
            .await
    }

    /// Get the first category with this exact name.
    pub async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        self.first_entity("/V1/categories/list", SearchQuery::by_field("name", name)).await
    }

    pub async fn create_category(
        &self,
        category: &Category,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.post_api("/V1/categories", Some(&json!({ "category": category })), options).await
    }

    /// Update a category from (partial) category data.
    pub async fn update_category(
        &self,
        category_id: impl Display,
        category_data: &Category,
    ) -> Result<Category> {
        let response = self
            .put_api(
                &format!("/V1/categories/{}", category_id),
                Some(&json!({ "category": category_data })),
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    // CMS
    // ===

    /// Get all CMS pages.
    pub fn get_cms_pages(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/cmsPage/search", options)
    }

    /// Get all CMS blocks.
    pub fn get_cms_blocks(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/cmsBlock/search", options)
    }

    // Coupons
    // =======

    /// Get all coupons.
    pub fn get_coupons(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/coupons/search", options)
    }

    // Customers
    // =========

    /// Get all customers.
    pub fn get_customers(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/customers/search", options)
    }

    pub async fn get_customer(&self, customer_id: u64) -> Result<Entity> {
        let response = self
            .get_api(&format!("/V1/customers/{}", customer_id), None, &RequestOptions::throwing())
            .await?;
        Ok(response.json().await?)
    }

    /// Get all customer groups.
    pub fn get_customer_groups(
        &self,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/customerGroups/search", options)
    }

    // Invoices
    // ========

    /// Create an invoice for an order. Unless the payload overrides it, the
    /// customer is notified.
    pub async fn create_order_invoice(
        &self,
        order_id: impl Display,
        payload: Option<Value>,
        notify: bool,
    ) -> Result<Value> {
        let mut payload = payload.unwrap_or_else(|| json!({}));
        if let Some(map) = payload.as_object_mut() {
            map.entry("notify").or_insert(Value::Bool(notify));
        }
        let response = self
            .post_api(
                &format!("/V1/order/{}/invoice", order_id),
                Some(&payload),
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    pub async fn get_invoice(&self, invoice_id: u64) -> Result<Entity> {
        let response = self
            .get_api(&format!("/V1/invoices/{}", invoice_id), None, &RequestOptions::throwing())
            .await?;
        Ok(response.json().await?)
    }

    pub async fn get_invoice_by_increment_id(&self, increment_id: &str) -> Result<Option<Entity>> {
        self.first_entity("/V1/invoices", SearchQuery::by_field("increment_id", increment_id)).await
    }

    /// Get all invoices.
    pub fn get_invoices(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/invoices", options)
    }

    /// Get the invoices of an order.
    pub fn get_order_invoices(
        &self,
        order_id: impl Display,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        let query = SearchQuery::by_field("order_id", order_id.to_string());
        self.get_invoices(ListOptions::new().with_query(query))
    }

    // Orders
    // ======

    /// Get all orders.
    pub fn get_orders(&self, options: ListOptions) -> impl Stream<Item = Result<Order>> + '_ {
        self.get_paginated("/V1/orders", options)
    }

    /// Get all orders with this status. The status filter replaces any query
    /// in the options.
    pub fn get_orders_by_status(
        &self,
        status: &str,
        condition_type: Option<&str>,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Order>> + '_ {
        let query = SearchQuery::by_field_condition("status", status, condition_type);
        self.get_orders(options.with_query(query))
    }

    /// Get the most recent orders, newest first.
    pub async fn get_last_orders(&self, limit: i64) -> Result<Vec<Order>> {
        let query = SearchQueryBuilder::new().sort_desc("increment_id").build();
        self.get_orders(ListOptions::new().with_query(query).with_limit(limit))
            .try_collect()
            .await
    }

    /// Get order items, optionally filtered on a SKU. A query in the options
    /// takes precedence over `sku`.
    pub fn get_orders_items(
        &self,
        sku: Option<&str>,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        let options = match (&options.query, sku) {
            (None, Some(sku)) => options.with_query(SearchQuery::by_field("sku", sku)),
            _ => options,
        };
        self.get_paginated("/V1/orders/items", options)
    }

    /// Get an order by its entity id.
    pub async fn get_order(&self, order_id: impl Display) -> Result<Order> {
        let response = self
            .get_api(&format!("/V1/orders/{}", order_id), None, &RequestOptions::throwing())
            .await?;
        Ok(response.json().await?)
    }

    /// Get an order by its increment id, or `None` if it doesn't exist.
    pub async fn get_order_by_increment_id(&self, increment_id: &str) -> Result<Option<Order>> {
        self.first_entity("/V1/orders", SearchQuery::by_field("increment_id", increment_id)).await
    }

    pub async fn hold_order(&self, order_id: impl Display) -> Result<reqwest::Response> {
        self.post_api(&format!("/V1/orders/{}/hold", order_id), None, &RequestOptions::default())
            .await
    }

    pub async fn unhold_order(&self, order_id: impl Display) -> Result<reqwest::Response> {
        self.post_api(&format!("/V1/orders/{}/unhold", order_id), None, &RequestOptions::default())
            .await
    }

    /// Save (partial) order data.
    pub async fn save_order(&self, order: &Order) -> Result<reqwest::Response> {
        self.post_api("/V1/orders", Some(&json!({ "entity": order })), &RequestOptions::default())
            .await
    }

    /// Set the status of an order.
    pub async fn set_order_status(
        &self,
        order: &Order,
        status: &str,
        external_order_id: Option<&str>,
    ) -> Result<reqwest::Response> {
        let entity_id = order
            .get("entity_id")
            .ok_or_else(|| Error::Assertion("order has no entity_id".to_string()))?;
        // increment_id must be repeated, otherwise the server regenerates it
        let increment_id = order
            .get("increment_id")
            .ok_or_else(|| Error::Assertion("order has no increment_id".to_string()))?;

        let mut payload = Order::new();
        payload.insert("entity_id".to_string(), entity_id.clone());
        payload.insert("status".to_string(), Value::String(status.to_string()));
        payload.insert("increment_id".to_string(), increment_id.clone());
        if let Some(external_order_id) = external_order_id {
            payload.insert("ext_order_id".to_string(), Value::String(external_order_id.to_string()));
        }
        self.save_order(&payload).await
    }

    // Prices
    // ======

    /// Get base prices for a sequence of SKUs.
    pub async fn get_base_prices(&self, skus: &[&str]) -> Result<Vec<BasePrice>> {
        let options = RequestOptions::throwing().with_bypass_read_only();
        let response = self
            .post_api("/V1/products/base-prices-information", Some(&json!({ "skus": skus })), &options)
            .await?;
        Ok(response.json().await?)
    }

    /// Save base prices.
    pub async fn save_base_prices(&self, prices: &[BasePrice]) -> Result<reqwest::Response> {
        self.post_api("/V1/products/base-prices", Some(&json!({ "prices": prices })), &RequestOptions::default())
            .await
    }

    /// Get special prices for a sequence of SKUs.
    pub async fn get_special_prices(&self, skus: &[&str]) -> Result<Vec<Entity>> {
        let options = RequestOptions::throwing().with_bypass_read_only();
        let response = self
            .post_api("/V1/products/special-price-information", Some(&json!({ "skus": skus })), &options)
            .await?;
        Ok(response.json().await?)
    }

    /// Save special prices.
    ///
    /// A special price is an entity with `store_id`, `sku`, `price`,
    /// `price_from` and `price_to` fields, the dates in the API datetime
    /// format (see [`crate::dates`]).
    pub async fn save_special_prices(&self, special_prices: &[Entity]) -> Result<reqwest::Response> {
        self.post_api(
            "/V1/products/special-price",
            Some(&json!({ "prices": special_prices })),
            &RequestOptions::default(),
        )
        .await
    }

    /// Delete special prices.
    pub async fn delete_special_prices(&self, special_prices: &[Entity]) -> Result<reqwest::Response> {
        self.post_api(
            "/V1/products/special-price-delete",
            Some(&json!({ "prices": special_prices })),
            &RequestOptions::default(),
        )
        .await
    }

    /// Delete the special prices of a sequence of SKUs.
    pub async fn delete_special_prices_by_sku(&self, skus: &[&str]) -> Result<reqwest::Response> {
        let special_prices = self.get_special_prices(skus).await?;
        self.delete_special_prices(&special_prices).await
    }

    // Products
    // ========

    /// Get all products.
    pub fn get_products(&self, options: ListOptions) -> impl Stream<Item = Result<Product>> + '_ {
        self.get_paginated("/V1/products/", options)
    }

    /// Get available product types.
    pub async fn get_products_types(&self) -> Result<Vec<Entity>> {
        let response = self.get_api("/V1/product/types", None, &RequestOptions::throwing()).await?;
        Ok(response.json().await?)
    }

    /// Get a product by SKU, or `None` if it doesn't exist.
    pub async fn get_product(&self, sku: &str) -> Result<Option<Product>> {
        self.get_json_api(
            &format!("/V1/products/{}", urlencoding::encode(sku)),
            None,
            &RequestOptions::default(),
        )
        .await
    }

    /// Get a product by id, or `None` if it doesn't exist.
    pub async fn get_product_by_id(&self, product_id: u64) -> Result<Option<Product>> {
        self.first_entity("/V1/products/", SearchQuery::by_field("entity_id", product_id)).await
    }

    /// Get the single product matching a query, or `None` if nothing
    /// matches. More than one match is an [`Error::Assertion`]: use
    /// [`get_products`](Magento::get_products) for queries that legitimately
    /// match several products.
    pub async fn get_product_by_query(&self, query: SearchQuery) -> Result<Option<Product>> {
        let products: Vec<Product> = self
            .get_products(ListOptions::new().with_query(query).with_limit(2))
            .try_collect()
            .await?;
        if products.len() > 1 {
            return Err(Error::Assertion(
                "expected at most one product matching the query, got more".to_string(),
            ));
        }
        Ok(products.into_iter().next())
    }

    /// Save a (partial) product.
    pub async fn save_product(&self, product: &Product) -> Result<Product> {
        // no throw, so the response body can be logged before we bail
        let response = self
            .post_api("/V1/products", Some(&json!({ "product": product })), &RequestOptions::default())
            .await?;
        let status = response.status();
        let text = response.text().await?;
        debug!("save product response: {}", text);
        if !status.is_success() {
            return Err(error_for_status(status, text));
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Update a product from (partial) product data.
    pub async fn update_product(&self, sku: &str, product_data: &Product) -> Result<Product> {
        let response = self
            .put_api(
                &format!("/V1/products/{}", urlencoding::encode(sku)),
                Some(&json!({ "product": product_data })),
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Delete a product by SKU. Returns whether the product was deleted;
    /// with `skip_missing`, a missing product is `false` instead of an error.
    pub async fn delete_product(&self, sku: &str, skip_missing: bool) -> Result<bool> {
        let path = format!("/V1/products/{}", urlencoding::encode(sku));
        match self.delete_api(&path, &RequestOptions::throwing()).await {
            Ok(response) => Ok(response.json().await?),
            Err(error) if skip_missing && error.status() == Some(StatusCode::NOT_FOUND) => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Update multiple products through the async bulk API. Every update
    /// must contain an `sku` key.
    pub async fn async_update_products(
        &self,
        product_updates: impl IntoIterator<Item = Product>,
    ) -> Result<Value> {
        let payload: Vec<Value> =
            product_updates.into_iter().map(|product| json!({ "product": product })).collect();
        let response = self
            .put_api(
                "/V1/products/bySku",
                Some(&Value::Array(payload)),
                &RequestOptions::throwing().with_async_bulk(),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Set the stock quantity of a product.
    pub async fn set_product_stock_item(
        &self,
        sku: &str,
        quantity: i64,
        in_stock: bool,
    ) -> Result<reqwest::Response> {
        let payload = json!({
            "stockItem": { "qty": quantity, "is_in_stock": if in_stock { 1 } else { 0 } }
        });
        self.put_api(
            &format!("/V1/products/{}/stockItems/1", urlencoding::encode(sku)),
            Some(&payload),
            &RequestOptions::throwing(),
        )
        .await
    }

    /// Get the stock status of an SKU.
    pub async fn get_product_stock_status(&self, sku: &str) -> Result<Entity> {
        let response = self
            .get_api(
                &format!("/V1/stockStatuses/{}", urlencoding::encode(sku)),
                None,
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Get the stock item of an SKU.
    pub async fn get_product_stock_item(&self, sku: &str) -> Result<Entity> {
        let response = self
            .get_api(
                &format!("/V1/stockItems/{}", urlencoding::encode(sku)),
                None,
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Link a product under a configurable parent product.
    pub async fn link_child_product(
        &self,
        parent_sku: &str,
        child_sku: &str,
    ) -> Result<reqwest::Response> {
        self.post_api(
            &format!("/V1/configurable-products/{}/child", urlencoding::encode(parent_sku)),
            Some(&json!({ "childSku": child_sku })),
            &RequestOptions::default(),
        )
        .await
    }

    /// Opposite of [`link_child_product`](Magento::link_child_product).
    pub async fn unlink_child_product(
        &self,
        parent_sku: &str,
        child_sku: &str,
    ) -> Result<reqwest::Response> {
        self.delete_api(
            &format!(
                "/V1/configurable-products/{}/children/{}",
                urlencoding::encode(parent_sku),
                urlencoding::encode(child_sku)
            ),
            &RequestOptions::default(),
        )
        .await
    }

    /// Save an option of a configurable product.
    pub async fn save_configurable_product_option(
        &self,
        sku: &str,
        option: &Value,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.post_api(
            &format!("/V1/configurable-products/{}/options", urlencoding::encode(sku)),
            Some(&json!({ "option": option })),
            options,
        )
        .await
    }

    // Product Media
    // -------------

    /// Get the gallery entries of a product.
    pub async fn get_product_medias(&self, sku: &str) -> Result<Option<Vec<MediaEntry>>> {
        self.get_json_api(
            &format!("/V1/products/{}/media", urlencoding::encode(sku)),
            None,
            &RequestOptions::default(),
        )
        .await
    }

    /// Get one gallery entry of a product.
    pub async fn get_product_media(
        &self,
        sku: &str,
        entry_id: impl Display,
    ) -> Result<Option<MediaEntry>> {
        self.get_json_api(
            &format!("/V1/products/{}/media/{}", urlencoding::encode(sku), entry_id),
            None,
            &RequestOptions::default(),
        )
        .await
    }

    pub async fn save_product_media(&self, sku: &str, media_entry: &Value) -> Result<Value> {
        let response = self
            .post_api(
                &format!("/V1/products/{}/media", urlencoding::encode(sku)),
                Some(&json!({ "entry": media_entry })),
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    pub async fn delete_product_media(
        &self,
        sku: &str,
        media_id: impl Display,
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        self.delete_api(
            &format!("/V1/products/{}/media/{}", urlencoding::encode(sku), media_id),
            options,
        )
        .await
    }

    // Products Attribute Options
    // --------------------------

    /// Get all options of a products attribute.
    pub async fn get_products_attribute_options(
        &self,
        attribute_code: &str,
    ) -> Result<Vec<Entity>> {
        let response = self
            .get_api(
                &format!("/V1/products/attributes/{}/options", attribute_code),
                None,
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    /// Add an option to a products attribute and return its id. The option
    /// must have `label` and `value` keys.
    pub async fn add_products_attribute_option(
        &self,
        attribute_code: &str,
        option: &Value,
    ) -> Result<String> {
        let response = self
            .post_api(
                &format!("/V1/products/attributes/{}/options", attribute_code),
                Some(&json!({ "option": option })),
                &RequestOptions::throwing(),
            )
            .await?;
        let id: String = response.json().await?;
        // the server prefixes fresh option ids
        Ok(id.strip_prefix("id_").unwrap_or(&id).to_string())
    }

    /// Remove an option from a products attribute.
    pub async fn delete_products_attribute_option(
        &self,
        attribute_code: &str,
        option_id: impl Display,
    ) -> Result<bool> {
        let response = self
            .delete_api(
                &format!("/V1/products/attributes/{}/options/{}", attribute_code, option_id),
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(response.json().await?)
    }

    // Sales Rules
    // ===========

    /// Get all sales rules.
    pub fn get_sales_rules(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/salesRules/search", options)
    }

    // Shipments
    // =========

    /// Get all shipments.
    pub fn get_shipments(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/shipments", options)
    }

    /// Ship an order.
    pub async fn ship_order(
        &self,
        order_id: impl Display,
        payload: &Value,
    ) -> Result<reqwest::Response> {
        self.post_api(&format!("/V1/order/{}/ship", order_id), Some(payload), &RequestOptions::default())
            .await
    }

    /// Get the shipments of an order.
    pub fn get_order_shipments(
        &self,
        order_id: impl Display,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        let query = SearchQuery::by_field("order_id", order_id.to_string());
        self.get_shipments(ListOptions::new().with_query(query))
    }

    // Stock
    // =====

    /// Get all stock source links.
    pub fn get_stock_source_links(
        &self,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/inventory/stock-source-links", options)
    }

    // Source Items
    // ============

    /// Get all source items, optionally filtered on a source code and/or an
    /// SKU. Those filters replace any query in the options.
    pub fn get_source_items(
        &self,
        source_code: Option<&str>,
        sku: Option<&str>,
        options: ListOptions,
    ) -> impl Stream<Item = Result<Entity>> + '_ {
        let options = if source_code.is_some() || sku.is_some() {
            let mut builder = SearchQueryBuilder::new();
            if let Some(source_code) = source_code {
                builder = builder.filter(Filter::with_condition("source_code", source_code, "eq"));
            }
            if let Some(sku) = sku {
                builder = builder.filter(Filter::with_condition("sku", sku, "eq"));
            }
            options.with_query(builder.build())
        } else {
            options
        };
        self.get_paginated("/V1/inventory/source-items", options)
    }

    /// Save source items. Returns `None` without a request when the slice is
    /// empty.
    pub async fn save_source_items(&self, source_items: &[SourceItem]) -> Result<Option<Value>> {
        if source_items.is_empty() {
            return Ok(None);
        }
        let response = self
            .post_api(
                "/V1/inventory/source-items",
                Some(&json!({ "sourceItems": source_items })),
                &RequestOptions::throwing(),
            )
            .await?;
        Ok(Some(response.json().await?))
    }

    /// Delete source items; only the SKU and the source code are used.
    ///
    /// Note the server errors on an empty sequence.
    pub async fn delete_source_items(
        &self,
        source_items: &[SourceItem],
        options: &RequestOptions,
    ) -> Result<reqwest::Response> {
        let payload: Vec<Value> = source_items
            .iter()
            .map(|item| json!({ "sku": item.sku, "source_code": item.source_code }))
            .collect();
        self.post_api(
            "/V1/inventory/source-items-delete",
            Some(&json!({ "sourceItems": payload })),
            options,
        )
        .await
    }

    /// Delete all source items with `source_code=default`, the source set on
    /// new products. Returns `None` when there were none.
    pub async fn delete_default_source_items(&self) -> Result<Option<reqwest::Response>> {
        let entities: Vec<Entity> = self
            .get_source_items(Some("default"), None, ListOptions::new())
            .try_collect()
            .await?;

        let mut source_items = Vec::with_capacity(entities.len());
        for entity in &entities {
            let sku = entity
                .get("sku")
                .and_then(Value::as_str)
                .ok_or_else(|| Error::Assertion("source item has no sku".to_string()))?;
            source_items.push(SourceItem {
                sku: sku.to_string(),
                source_code: "default".to_string(),
                quantity: None,
                status: None,
            });
        }

        if source_items.is_empty() {
            return Ok(None);
        }
        let options = RequestOptions::throwing();
        Ok(Some(self.delete_source_items(&source_items, &options).await?))
    }

    // Taxes
    // =====

    /// Get all tax classes.
    pub fn get_tax_classes(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/taxClasses/search", options)
    }

    /// Get all tax rates.
    pub fn get_tax_rates(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/taxRates/search", options)
    }

    /// Get all tax rules.
    pub fn get_tax_rules(&self, options: ListOptions) -> impl Stream<Item = Result<Entity>> + '_ {
        self.get_paginated("/V1/taxRules/search", options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> Magento {
        Magento::new(ClientConfig::new("secret", "http://test").with_scope("toto")).unwrap()
    }

    #[test]
    fn test_api_url() {
        let client = test_client();
        assert_eq!(
            client.api_url("/V1/test/url", false).unwrap(),
            "http://test/rest/toto/V1/test/url"
        );
        assert_eq!(
            client.api_url("/V1/test/url", true).unwrap(),
            "http://test/rest/toto/async/bulk/V1/test/url"
        );
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        let client =
            Magento::new(ClientConfig::new("secret", "http://test/")).unwrap();
        assert_eq!(
            client.api_url("/V1/orders", false).unwrap(),
            "http://test/rest/all/V1/orders"
        );
    }

    #[test]
    fn test_api_url_rejects_unprefixed_path() {
        let client = test_client();
        assert!(matches!(client.api_url("/V2/orders", false), Err(Error::Assertion(_))));
        assert!(matches!(client.api_url("orders", false), Err(Error::Assertion(_))));
    }

    #[tokio::test]
    async fn test_read_only_rejects_writes() {
        let client =
            Magento::new(ClientConfig::new("secret", "http://test").read_only()).unwrap();

        let err = client
            .post_api("/V1/orders", None, &RequestOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReadOnly { .. }));

        let err = client
            .save_order(&Order::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReadOnly { .. }));
    }
}
