//! Write-side batch accumulation
//!
//! A [`BatchSaver`] buffers entities and ships them to an asynchronous bulk
//! endpoint in fixed-size batches, keeping aggregate counters. It is built
//! for single-writer sequential use; nothing here is synchronized.

use futures::FutureExt;
use futures::future::BoxFuture;
use log::warn;
use serde_json::Value;

use crate::api::client::Magento;
use crate::api::config::RequestOptions;
use crate::api::error::Result;
use crate::api::models::{Entity, Product};

/// Default number of items per batch.
pub const DEFAULT_BATCH_SIZE: usize = 500;

const PRODUCTS_BY_SKU_PATH: &str = "/V1/products/bySku";

/// The write collaborator a saver flushes through.
pub type BatchSender<'a> = Box<dyn FnMut(Vec<Entity>) -> BoxFuture<'a, Result<Value>> + Send + 'a>;

/// Aggregate completion counters for one saver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub sent_batches: u64,
    pub sent_items: u64,
}

/// Buffers entities and flushes them in batches.
///
/// Adding an item that fills the buffer flushes before returning, so at most
/// one batch is ever in flight. Call [`finalize`] (or use [`scoped`]) so the
/// last partial batch is not lost.
///
/// [`finalize`]: BatchSaver::finalize
/// [`scoped`]: BatchSaver::scoped
pub struct BatchSaver<'a> {
    send: BatchSender<'a>,
    batch_size: usize,
    buffer: Vec<Entity>,
    stats: BatchStats,
}

impl<'a> BatchSaver<'a> {
    /// Saver flushing to `path` through the client's async bulk endpoint.
    pub fn new(client: &'a Magento, path: impl Into<String>) -> Self {
        Self::with_batch_size(client, path, DEFAULT_BATCH_SIZE)
    }

    pub fn with_batch_size(
        client: &'a Magento,
        path: impl Into<String>,
        batch_size: usize,
    ) -> Self {
        let path: String = path.into();
        let send: BatchSender<'a> = Box::new(move |items: Vec<Entity>| {
            let path = path.clone();
            async move {
                let payload = Value::Array(items.into_iter().map(Value::Object).collect());
                let options = RequestOptions::throwing().with_async_bulk();
                let response = client.put_api(&path, Some(&payload), &options).await?;
                Ok(response.json::<Value>().await?)
            }
            .boxed()
        });
        Self::from_sender(send, batch_size)
    }

    /// Saver flushing through an arbitrary write collaborator.
    pub fn from_sender(send: BatchSender<'a>, batch_size: usize) -> Self {
        Self { send, batch_size, buffer: Vec::new(), stats: BatchStats::default() }
    }

    /// Append an item; flush first if that fills the batch.
    pub async fn add_item(&mut self, item: Entity) -> Result<()> {
        self.buffer.push(item);
        if self.buffer.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    /// Send the pending batch, if any, and return the endpoint's response.
    ///
    /// On error the batch stays buffered and the error propagates unchanged;
    /// there is no retry at this layer.
    pub async fn flush(&mut self) -> Result<Option<Value>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let response = (self.send)(self.buffer.clone()).await?;
        self.stats.sent_items += self.buffer.len() as u64;
        self.stats.sent_batches += 1;
        self.buffer.clear();
        Ok(Some(response))
    }

    /// Flush whatever is pending and return the totals. Safe to call again.
    pub async fn finalize(&mut self) -> Result<BatchStats> {
        self.flush().await?;
        Ok(self.stats)
    }

    /// Counters so far; only [`finalize`](BatchSaver::finalize) covers the
    /// pending tail.
    pub fn stats(&self) -> BatchStats {
        self.stats
    }

    /// Number of buffered, not yet flushed items.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Run `f` with a fresh saver and guarantee a finalize attempt on every
    /// exit path.
    ///
    /// When `f` fails, the flush is still attempted but its own failure is
    /// only logged: the closure's error is the one returned.
    ///
    /// ```no_run
    /// # use magento2_client::api::batch::BatchSaver;
    /// # async fn demo(client: &magento2_client::Magento) -> magento2_client::Result<()> {
    /// let ((), stats) = BatchSaver::scoped(client, "/V1/products/bySku", |saver| {
    ///     Box::pin(async move {
    ///         saver.add_item(serde_json::Map::new()).await?;
    ///         Ok(())
    ///     })
    /// })
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn scoped<T, F>(
        client: &'a Magento,
        path: impl Into<String>,
        f: F,
    ) -> Result<(T, BatchStats)>
    where
        F: for<'b> FnOnce(&'b mut BatchSaver<'a>) -> BoxFuture<'b, Result<T>>,
    {
        let mut saver = BatchSaver::new(client, path);
        saver.run(f).await
    }

    /// Same finalize-on-every-exit-path guarantee as
    /// [`scoped`](BatchSaver::scoped), on an existing saver.
    pub async fn run<T, F>(&mut self, f: F) -> Result<(T, BatchStats)>
    where
        F: for<'b> FnOnce(&'b mut BatchSaver<'a>) -> BoxFuture<'b, Result<T>>,
    {
        match f(self).await {
            Ok(value) => {
                let stats = self.finalize().await?;
                Ok((value, stats))
            }
            Err(error) => {
                if let Err(flush_error) = self.finalize().await {
                    warn!("flush while unwinding a batch scope failed: {}", flush_error);
                }
                Err(error)
            }
        }
    }
}

impl Drop for BatchSaver<'_> {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            warn!(
                "batch saver dropped with {} unflushed items; call finalize() first",
                self.buffer.len()
            );
        }
    }
}

/// [`BatchSaver`] for product updates through the bulk by-SKU endpoint.
///
/// Every product payload must contain an `sku` key.
pub struct ProductBatchSaver<'a> {
    inner: BatchSaver<'a>,
}

impl<'a> ProductBatchSaver<'a> {
    pub fn new(client: &'a Magento) -> Self {
        Self { inner: BatchSaver::new(client, PRODUCTS_BY_SKU_PATH) }
    }

    pub fn with_batch_size(client: &'a Magento, batch_size: usize) -> Self {
        Self { inner: BatchSaver::with_batch_size(client, PRODUCTS_BY_SKU_PATH, batch_size) }
    }

    /// Add a product to the batch.
    pub async fn save_product(&mut self, product: Product) -> Result<()> {
        let mut item = Entity::new();
        item.insert("product".to_string(), Value::Object(product));
        self.inner.add_item(item).await
    }

    pub async fn flush(&mut self) -> Result<Option<Value>> {
        self.inner.flush().await
    }

    pub async fn finalize(&mut self) -> Result<BatchStats> {
        self.inner.finalize().await
    }

    pub fn stats(&self) -> BatchStats {
        self.inner.stats()
    }
}
