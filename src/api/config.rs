//! Client configuration and per-call options
//!
//! Credentials resolve with a fixed precedence: explicit argument, then
//! environment variable, then error. The pagination/batching/query layers
//! never look at the environment themselves.

use std::env;
use std::time::Duration;

use crate::api::constants::{DEFAULT_PAGE_SIZE, DEFAULT_SCOPE, USER_AGENT};
use crate::api::error::{Error, Result};
use crate::api::query::SearchQuery;
use crate::api::resilience::DEFAULT_RETRY_BACKOFF;

pub const ENV_TOKEN: &str = "MAGENTO_TOKEN";
pub const ENV_BASE_URL: &str = "MAGENTO_BASE_URL";
pub const ENV_SCOPE: &str = "MAGENTO_SCOPE";
pub const ENV_USER_AGENT: &str = "MAGENTO_USER_AGENT";

/// Limit value meaning "walk the whole collection".
pub const UNLIMITED: i64 = -1;

/// Connection settings for a [`Magento`](crate::api::client::Magento) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API integration token, sent as a bearer token.
    pub token: String,
    /// Base URL of the Magento instance, without the `/rest` suffix.
    pub base_url: String,
    /// API scope, `"all"` unless the instance is multi-store.
    pub scope: String,
    pub user_agent: String,
    /// Reject every non-GET request unless explicitly bypassed.
    pub read_only: bool,
    /// Page size used by paginated requests.
    pub page_size: u32,
}

impl ClientConfig {
    pub fn new(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: base_url.into(),
            scope: DEFAULT_SCOPE.to_string(),
            user_agent: USER_AGENT.to_string(),
            read_only: false,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Resolve a configuration from explicit values, falling back on the
    /// `MAGENTO_*` environment variables for anything not given.
    ///
    /// `token` and `base_url` are required one way or the other.
    pub fn resolve(token: Option<String>, base_url: Option<String>) -> Result<Self> {
        let token = token
            .or_else(|| env::var(ENV_TOKEN).ok())
            .ok_or(Error::MissingConfig("token"))?;
        let base_url = base_url
            .or_else(|| env::var(ENV_BASE_URL).ok())
            .ok_or(Error::MissingConfig("base URL"))?;

        let mut config = Self::new(token, base_url);
        if let Ok(scope) = env::var(ENV_SCOPE) {
            config.scope = scope;
        }
        if let Ok(user_agent) = env::var(ENV_USER_AGENT) {
            config.user_agent = user_agent;
        }
        Ok(config)
    }

    /// Resolve a configuration from the environment alone.
    pub fn from_env() -> Result<Self> {
        Self::resolve(None, None)
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// Options for a single API request.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// How many times to re-issue the request after a failing response.
    pub retry: u32,
    /// Sleep between attempts.
    pub backoff: Duration,
    /// Turn a failing final response into an error instead of returning it.
    pub throw: bool,
    /// Route the request through the `/async/bulk` endpoint.
    pub async_bulk: bool,
    /// Let a write through on a read-only client.
    pub bypass_read_only: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            retry: 0,
            backoff: DEFAULT_RETRY_BACKOFF,
            throw: false,
            async_bulk: false,
            bypass_read_only: false,
        }
    }
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with `throw` set, the common case for typed calls.
    pub fn throwing() -> Self {
        Self { throw: true, ..Self::default() }
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_async_bulk(mut self) -> Self {
        self.async_bulk = true;
        self
    }

    pub fn with_bypass_read_only(mut self) -> Self {
        self.bypass_read_only = true;
        self
    }
}

/// Options for paginated listing calls.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub query: Option<SearchQuery>,
    /// Maximum number of entities to yield; [`UNLIMITED`] for all of them,
    /// `0` for none.
    pub limit: i64,
    /// Retry count forwarded to every page fetch.
    pub retry: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self { query: None, limit: UNLIMITED, retry: 0 }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: SearchQuery) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.retry = retry;
        self
    }
}
