//! Request resilience
//!
//! Bounded linear retry for failing API responses. Pagination and batching
//! never retry themselves; they delegate to this layer through the request
//! executor.

pub mod retry;

pub use retry::{DEFAULT_RETRY_BACKOFF, RetryPolicy};
