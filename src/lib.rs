//! Client and utilities for the Magento 2 REST API.
//!
//! Entities are dynamic JSON objects; paginated endpoints come back as lazy
//! [`Stream`](futures::Stream)s; bulk writes go through batch accumulators
//! that flush in fixed-size chunks.
//!
//! # Quick start
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use magento2_client::{ListOptions, Magento, SearchQuery};
//!
//! #[tokio::main]
//! async fn main() -> magento2_client::Result<()> {
//!     // reads MAGENTO_TOKEN and MAGENTO_BASE_URL
//!     let client = Magento::from_env()?;
//!
//!     let query = SearchQuery::by_field("status", "awaiting_shipping");
//!     let mut orders = client.get_orders(ListOptions::new().with_query(query));
//!     futures::pin_mut!(orders);
//!     while let Some(order) = orders.try_next().await? {
//!         println!("{:?}", order.get("increment_id"));
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod attributes;
pub mod dates;
pub mod orders;

pub use api::batch::{BatchGetter, BatchSaver, BatchStats, ProductBatchSaver};
pub use api::client::Magento;
pub use api::config::{ClientConfig, ListOptions, RequestOptions, UNLIMITED};
pub use api::constants::ROOT_CATEGORY_ID;
pub use api::error::{Error, Parameters, RemoteError, Result, build_exception_text};
pub use api::models::{
    BasePrice, Category, Customer, Entity, MediaEntry, Order, Page, Product, Sku, SourceItem,
};
pub use api::query::{Filter, FilterGroup, FilterValue, SearchQuery, SearchQueryBuilder, SortOrder};
