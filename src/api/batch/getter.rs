//! Read-side batch resolution
//!
//! A [`BatchGetter`] resolves an iterable of keys into entities by chunking
//! the keys into `key IN (...)` queries. Keys are consumed lazily, one chunk
//! ahead of the results being yielded.

use std::collections::VecDeque;

use futures::future::BoxFuture;
use futures::stream::{self, Stream};
use futures::{FutureExt, TryStreamExt};

use crate::api::client::Magento;
use crate::api::config::ListOptions;
use crate::api::error::Result;
use crate::api::models::Product;
use crate::api::query::SearchQuery;

/// Default number of keys per lookup query.
pub const DEFAULT_LOOKUP_BATCH_SIZE: usize = 50;

/// The read collaborator a getter resolves chunks through: takes the
/// `IN (...)` query and an item limit, returns the matches.
pub type ChunkGetter<'a, T> =
    Box<dyn FnMut(SearchQuery, i64) -> BoxFuture<'a, Result<Vec<T>>> + Send + 'a>;

/// Resolves keys into items in fixed-size chunks.
///
/// Results come back in whatever order the server returns them, not key
/// order, and keys with no match are silently absent. The getter is one-shot:
/// turning it into a stream consumes the keys.
pub struct BatchGetter<'a, T, I> {
    getter: ChunkGetter<'a, T>,
    key_field: String,
    keys: I,
    batch_size: usize,
}

impl<'a, T, I> BatchGetter<'a, T, I>
where
    I: Iterator,
    I::Item: ToString,
{
    pub fn new(
        getter: ChunkGetter<'a, T>,
        key_field: impl Into<String>,
        keys: impl IntoIterator<IntoIter = I>,
    ) -> Self {
        Self::with_batch_size(getter, key_field, keys, DEFAULT_LOOKUP_BATCH_SIZE)
    }

    pub fn with_batch_size(
        getter: ChunkGetter<'a, T>,
        key_field: impl Into<String>,
        keys: impl IntoIterator<IntoIter = I>,
        batch_size: usize,
    ) -> Self {
        Self { getter, key_field: key_field.into(), keys: keys.into_iter(), batch_size }
    }

    /// Stream every resolved item, chunk by chunk.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + 'a
    where
        T: 'a,
        I: 'a,
    {
        struct State<'a, T, I> {
            getter: ChunkGetter<'a, T>,
            key_field: String,
            keys: I,
            batch_size: usize,
            pending: Vec<String>,
            chunk: VecDeque<T>,
            keys_done: bool,
        }

        let state = State {
            getter: self.getter,
            key_field: self.key_field,
            keys: self.keys,
            batch_size: self.batch_size,
            pending: Vec::new(),
            chunk: VecDeque::new(),
            keys_done: false,
        };

        stream::try_unfold(state, |mut state| async move {
            loop {
                if let Some(item) = state.chunk.pop_front() {
                    return Ok(Some((item, state)));
                }

                while !state.keys_done && state.pending.len() < state.batch_size {
                    match state.keys.next() {
                        Some(key) => state.pending.push(key.to_string()),
                        None => state.keys_done = true,
                    }
                }

                if state.pending.is_empty() {
                    return Ok(None);
                }

                let query = SearchQuery::by_field_condition(
                    state.key_field.clone(),
                    state.pending.join(","),
                    Some("in"),
                );
                let limit = state.pending.len() as i64;
                let items = (state.getter)(query, limit).await?;
                state.pending.clear();
                state.chunk = items.into();
            }
        })
    }
}

impl<'a, I> BatchGetter<'a, Product, I>
where
    I: Iterator + Send + 'a,
    I::Item: ToString,
{
    /// Resolve an iterable of SKUs into products.
    ///
    /// ```no_run
    /// # use futures::TryStreamExt;
    /// # use magento2_client::api::batch::BatchGetter;
    /// # async fn demo(client: &magento2_client::Magento) -> magento2_client::Result<()> {
    /// let products = BatchGetter::products(client, ["W1033", "W1034"]).into_stream();
    /// futures::pin_mut!(products);
    /// while let Some(product) = products.try_next().await? {
    ///     println!("{:?}", product.get("sku"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn products(client: &'a Magento, skus: impl IntoIterator<IntoIter = I>) -> Self {
        let getter: ChunkGetter<'a, Product> = Box::new(move |query: SearchQuery, limit: i64| {
            async move {
                client
                    .get_products(ListOptions::new().with_query(query).with_limit(limit))
                    .try_collect()
                    .await
            }
            .boxed()
        });
        Self::new(getter, "sku", skus)
    }
}
