//! Magento 2 REST API client
//!
//! The client splits into a handful of layers, leaves first: query building
//! ([`query`]), paginated fetching ([`pagination`]), request retry
//! ([`resilience`]), batched reads and writes ([`batch`]), and the [`client`]
//! tying them to the actual HTTP endpoints.

pub mod batch;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pagination;
pub mod query;
pub mod resilience;

pub use batch::{BatchGetter, BatchSaver, BatchStats, ProductBatchSaver};
pub use client::Magento;
pub use config::{ClientConfig, ListOptions, RequestOptions, UNLIMITED};
pub use error::{Error, Parameters, RemoteError, Result, build_exception_text};
pub use models::{BasePrice, Category, Customer, Entity, MediaEntry, Order, Page, Product, Sku, SourceItem};
pub use pagination::{paginate, paginate_by_id};
pub use query::{Filter, FilterGroup, FilterValue, SearchQuery, SearchQueryBuilder, SortOrder};
pub use resilience::{RetryPolicy, DEFAULT_RETRY_BACKOFF};
