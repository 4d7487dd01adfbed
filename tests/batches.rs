//! Integration tests for batched reads and writes
//!
//! Savers are driven through fake senders and getters through fake chunk
//! getters; nothing touches the network.

use std::sync::Arc;
use std::sync::Mutex;

use futures::FutureExt;
use futures::TryStreamExt;
use serde_json::{Value, json};

use magento2_client::api::batch::{BatchGetter, BatchSaver, BatchSender, ChunkGetter};
use magento2_client::{Entity, Error, FilterValue, SearchQuery};

fn entity(id: u64) -> Entity {
    let mut entity = Entity::new();
    entity.insert("id".to_string(), json!(id));
    entity
}

/// Sender recording the size of every batch it is asked to send.
fn recording_sender(sent: Arc<Mutex<Vec<usize>>>) -> BatchSender<'static> {
    Box::new(move |items: Vec<Entity>| {
        let sent = Arc::clone(&sent);
        async move {
            sent.lock().unwrap().push(items.len());
            Ok(json!({"bulk_uuid": "fake"}))
        }
        .boxed()
    })
}

#[tokio::test]
async fn test_saver_flush_boundaries() {
    // k*N + r items with N=2: k automatic flushes, one more on finalize
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut saver = BatchSaver::from_sender(recording_sender(Arc::clone(&sent)), 2);

    for id in 0..5 {
        saver.add_item(entity(id)).await.unwrap();
    }
    assert_eq!(*sent.lock().unwrap(), vec![2, 2]);
    assert_eq!(saver.pending(), 1);

    let stats = saver.finalize().await.unwrap();
    assert_eq!(*sent.lock().unwrap(), vec![2, 2, 1]);
    assert_eq!(stats.sent_items, 5);
    assert_eq!(stats.sent_batches, 3);
    assert_eq!(saver.pending(), 0);
}

#[tokio::test]
async fn test_saver_exact_multiple_needs_no_final_flush() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut saver = BatchSaver::from_sender(recording_sender(Arc::clone(&sent)), 2);

    for id in 0..4 {
        saver.add_item(entity(id)).await.unwrap();
    }
    let stats = saver.finalize().await.unwrap();
    assert_eq!(*sent.lock().unwrap(), vec![2, 2]);
    assert_eq!(stats.sent_items, 4);
    assert_eq!(stats.sent_batches, 2);
}

#[tokio::test]
async fn test_saver_finalize_is_idempotent() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut saver = BatchSaver::from_sender(recording_sender(Arc::clone(&sent)), 10);

    saver.add_item(entity(1)).await.unwrap();
    let first = saver.finalize().await.unwrap();
    let second = saver.finalize().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(*sent.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn test_empty_saver_sends_nothing() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut saver = BatchSaver::from_sender(recording_sender(Arc::clone(&sent)), 10);

    assert!(saver.flush().await.unwrap().is_none());
    let stats = saver.finalize().await.unwrap();
    assert_eq!(stats.sent_items, 0);
    assert_eq!(stats.sent_batches, 0);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_saver_keeps_batch_on_send_error() {
    let attempts = Arc::new(Mutex::new(0usize));
    let sender: BatchSender<'static> = {
        let attempts = Arc::clone(&attempts);
        Box::new(move |items: Vec<Entity>| {
            let attempts = Arc::clone(&attempts);
            async move {
                let mut attempts = attempts.lock().unwrap();
                *attempts += 1;
                if *attempts == 1 {
                    Err(Error::Assertion("endpoint down".to_string()))
                } else {
                    Ok(Value::from(items.len()))
                }
            }
            .boxed()
        })
    };

    let mut saver = BatchSaver::from_sender(sender, 10);
    saver.add_item(entity(1)).await.unwrap();
    saver.add_item(entity(2)).await.unwrap();

    assert!(saver.flush().await.is_err());
    // the failed batch is still buffered, and counters untouched
    assert_eq!(saver.pending(), 2);
    assert_eq!(saver.stats().sent_batches, 0);

    let stats = saver.finalize().await.unwrap();
    assert_eq!(stats.sent_items, 2);
    assert_eq!(stats.sent_batches, 1);
}

#[tokio::test]
async fn test_scoped_saver_flushes_on_error() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut saver = BatchSaver::from_sender(recording_sender(Arc::clone(&sent)), 10);

    let result = saver
        .run(|saver| {
            Box::pin(async move {
                saver.add_item(entity(1)).await?;
                Err::<(), _>(Error::Assertion("caller bug".to_string()))
            })
        })
        .await;

    // the scope's own error wins, but the tail was flushed anyway
    assert!(matches!(result, Err(Error::Assertion(_))));
    assert_eq!(*sent.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn test_scoped_saver_returns_value_and_stats() {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mut saver = BatchSaver::from_sender(recording_sender(Arc::clone(&sent)), 2);

    let (value, stats) = saver
        .run(|saver| {
            Box::pin(async move {
                for id in 0..3 {
                    saver.add_item(entity(id)).await?;
                }
                Ok("done")
            })
        })
        .await
        .unwrap();

    assert_eq!(value, "done");
    assert_eq!(stats.sent_items, 3);
    assert_eq!(stats.sent_batches, 2);
    assert_eq!(*sent.lock().unwrap(), vec![2, 1]);
}

/// Getter doubling every key it is asked for, checking the query shape.
fn doubling_getter(
    calls: Arc<Mutex<Vec<i64>>>,
) -> ChunkGetter<'static, i64> {
    Box::new(move |query: SearchQuery, limit: i64| {
        let calls = Arc::clone(&calls);
        async move {
            calls.lock().unwrap().push(limit);

            assert_eq!(query.filter_groups.len(), 1);
            let filter = &query.filter_groups[0].filters[0];
            assert_eq!(filter.field, "myfield");
            assert_eq!(filter.condition_type.as_deref(), Some("in"));
            let FilterValue::String(csv) = &filter.value else {
                panic!("expected a comma-joined string value");
            };

            let keys: Vec<i64> = csv.split(',').map(|k| k.parse().unwrap()).collect();
            assert_eq!(keys.len() as i64, limit);
            Ok(keys.into_iter().map(|k| k * 2).collect())
        }
        .boxed()
    })
}

#[tokio::test]
async fn test_getter_resolves_in_chunks() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let getter = BatchGetter::with_batch_size(doubling_getter(Arc::clone(&calls)), "myfield", 0..20, 2);

    let results: Vec<i64> = getter.into_stream().try_collect().await.unwrap();
    assert_eq!(results, (0i64..40).step_by(2).collect::<Vec<i64>>());
    assert_eq!(calls.lock().unwrap().len(), 10);
}

#[tokio::test]
async fn test_getter_flushes_partial_final_chunk() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let getter = BatchGetter::with_batch_size(doubling_getter(Arc::clone(&calls)), "myfield", 0..5, 2);

    let results: Vec<i64> = getter.into_stream().try_collect().await.unwrap();
    assert_eq!(results, vec![0, 2, 4, 6, 8]);
    // ceil(5/2) calls, the last with the partial chunk's length as limit
    assert_eq!(*calls.lock().unwrap(), vec![2, 2, 1]);
}

#[tokio::test]
async fn test_getter_empty_keys_never_calls() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let getter =
        BatchGetter::with_batch_size(doubling_getter(Arc::clone(&calls)), "myfield", 0..0, 2);

    let results: Vec<i64> = getter.into_stream().try_collect().await.unwrap();
    assert!(results.is_empty());
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_getter_preserves_getter_order() {
    // the getter decides result order; the stream must not reorder
    let getter: ChunkGetter<'static, i64> = Box::new(move |_query, _limit| {
        async move { Ok(vec![3, 1, 2]) }.boxed()
    });
    let results: Vec<i64> = BatchGetter::with_batch_size(getter, "sku", ["a", "b", "c"], 3)
        .into_stream()
        .try_collect()
        .await
        .unwrap();
    assert_eq!(results, vec![3, 1, 2]);
}

#[tokio::test]
async fn test_getter_errors_propagate() {
    let getter: ChunkGetter<'static, i64> = Box::new(move |_query, _limit| {
        async move { Err(Error::Assertion("boom".to_string())) }.boxed()
    });
    let result: magento2_client::Result<Vec<i64>> =
        BatchGetter::with_batch_size(getter, "sku", ["a"], 3).into_stream().try_collect().await;
    assert!(matches!(result, Err(Error::Assertion(_))));
}
