//! Batched reads and writes
//!
//! Both sides share one discipline: bound the work into fixed-size chunks,
//! flush deterministically, and report totals. [`BatchSaver`] accumulates
//! writes for the asynchronous bulk endpoints; [`BatchGetter`] resolves key
//! sets through chunked `IN (...)` queries.

pub mod getter;
pub mod saver;

pub use getter::{BatchGetter, ChunkGetter, DEFAULT_LOOKUP_BATCH_SIZE};
pub use saver::{BatchSaver, BatchSender, BatchStats, DEFAULT_BATCH_SIZE, ProductBatchSaver};
