//! Paginated fetching
//!
//! Turns a page-oriented search endpoint into a lazy, finite stream of
//! entities. The engine drives a `fetch_page` collaborator and owns nothing
//! but its cursor: each call to [`paginate`] returns a fresh walk, so the
//! factory is restartable even though a given stream is not.
//!
//! Two cursors are supported: classic offset paging (`currentPage`), and
//! keyset paging over a unique id field for collections where deep offsets
//! get slow or unstable on the server.

use std::collections::VecDeque;
use std::future::Future;

use futures::Stream;
use futures::stream;
use log::info;
use serde_json::Value;

use crate::api::error::{Error, Result};
use crate::api::models::{Entity, Page};
use crate::api::query::{Filter, SearchQuery, SortOrder};

/// Log a progress line every this many yielded items.
pub const PROGRESS_INTERVAL: u64 = 1000;

enum Cursor {
    Offset { current_page: u64 },
    Keyset { id_field: String, last_id: String },
}

struct Walk<F> {
    fetch_page: F,
    query: SearchQuery,
    page_size: u32,
    limit: i64,
    cursor: Cursor,
    total_count: u64,
    count: u64,
    buffer: VecDeque<Entity>,
    done: bool,
}

/// Walk a search endpoint page by page, yielding entities in order.
///
/// * `limit == 0` yields nothing and never calls `fetch_page`;
/// * `limit < 0` walks until the server signals exhaustion;
/// * `limit > 0` yields at most `limit` entities, shrinking the page size
///   when one page would already overshoot.
///
/// The walk stops on the first empty page, and as soon as the yielded count
/// reaches the server's `total_count` or the limit, without fetching further
/// pages. Errors from `fetch_page` end the stream and propagate unchanged.
pub fn paginate<F, Fut>(
    fetch_page: F,
    query: SearchQuery,
    limit: i64,
    page_size: u32,
) -> impl Stream<Item = Result<Entity>>
where
    F: FnMut(Vec<(String, String)>) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    walk(fetch_page, query, limit, page_size, Cursor::Offset { current_page: 1 })
}

/// Like [`paginate`], but pages with a `id_field > last seen id` filter
/// instead of an offset.
///
/// The id field must be unique and totally ordered (entity ids are); results
/// come back sorted by it ascending. The walk stops only on an empty page or
/// on the limit: the server's `total_count` shifts with the moving filter
/// and is not trusted here.
pub fn paginate_by_id<F, Fut>(
    fetch_page: F,
    query: SearchQuery,
    id_field: impl Into<String>,
    limit: i64,
    page_size: u32,
) -> impl Stream<Item = Result<Entity>>
where
    F: FnMut(Vec<(String, String)>) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    let cursor = Cursor::Keyset { id_field: id_field.into(), last_id: "0".to_string() };
    walk(fetch_page, query, limit, page_size, cursor)
}

fn walk<F, Fut>(
    fetch_page: F,
    mut query: SearchQuery,
    limit: i64,
    page_size: u32,
    cursor: Cursor,
) -> impl Stream<Item = Result<Entity>>
where
    F: FnMut(Vec<(String, String)>) -> Fut,
    Fut: Future<Output = Result<Page>>,
{
    // paging is the walk's business, whatever the base query carried
    query.page_size = None;
    query.current_page = None;

    let state = Walk {
        fetch_page,
        query,
        page_size: effective_page_size(page_size, limit),
        limit,
        cursor,
        total_count: 0,
        count: 0,
        buffer: VecDeque::new(),
        done: limit == 0,
    };

    stream::try_unfold(state, |mut walk| async move {
        loop {
            if let Some(item) = walk.buffer.pop_front() {
                walk.count += 1;
                if walk.count % PROGRESS_INTERVAL == 0 {
                    info!("loaded {} items", walk.count);
                }
                if walk.is_exhausted() {
                    walk.buffer.clear();
                    walk.done = true;
                }
                return Ok(Some((item, walk)));
            }

            if walk.done {
                return Ok(None);
            }

            let params = walk.page_params();
            let page = (walk.fetch_page)(params).await?;
            if page.items.is_empty() {
                return Ok(None);
            }
            walk.advance_cursor(&page)?;
            walk.total_count = page.total_count;
            walk.buffer = page.items.into();
        }
    })
}

impl<F> Walk<F> {
    /// Query parameters for the next page fetch.
    fn page_params(&self) -> Vec<(String, String)> {
        let mut params = match &self.cursor {
            Cursor::Offset { .. } => self.query.to_query_params(),
            Cursor::Keyset { id_field, last_id } => {
                let mut query = self.query.clone();
                query.sort_orders.insert(0, SortOrder::asc(id_field.clone()));
                query
                    .filter_groups
                    .push(Filter::with_condition(id_field.clone(), last_id.clone(), "gt").into());
                query.to_query_params()
            }
        };
        params.push(("searchCriteria[pageSize]".to_string(), self.page_size.to_string()));
        let current_page = match &self.cursor {
            Cursor::Offset { current_page } => *current_page,
            Cursor::Keyset { .. } => 1,
        };
        params.push(("searchCriteria[currentPage]".to_string(), current_page.to_string()));
        params
    }

    fn advance_cursor(&mut self, page: &Page) -> Result<()> {
        match &mut self.cursor {
            Cursor::Offset { current_page } => {
                *current_page += 1;
                Ok(())
            }
            Cursor::Keyset { id_field, last_id } => {
                // pages are non-empty here
                let last_item = &page.items[page.items.len() - 1];
                match last_item.get(id_field.as_str()) {
                    Some(Value::String(id)) => *last_id = id.clone(),
                    Some(Value::Number(id)) => *last_id = id.to_string(),
                    _ => {
                        return Err(Error::Assertion(format!(
                            "item is missing the pagination id field {:?}",
                            id_field
                        )));
                    }
                }
                Ok(())
            }
        }
    }

    /// True once the walk must not yield another item.
    fn is_exhausted(&self) -> bool {
        if self.limit > 0 && self.count >= self.limit as u64 {
            return true;
        }
        match self.cursor {
            // the server claims no more entities exist
            Cursor::Offset { .. } => self.count >= self.total_count,
            Cursor::Keyset { .. } => false,
        }
    }
}

fn effective_page_size(page_size: u32, limit: i64) -> u32 {
    if limit > 0 && (limit as u64) < page_size as u64 {
        limit as u32
    } else {
        page_size
    }
}
