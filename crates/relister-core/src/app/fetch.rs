//! Ordered parallel fetch of a listing's images.
//!
//! One task per key. Each task's result lands in the slot of its key's
//! index, so the output order is the input order whatever order the
//! downloads finish in.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tokio::task::{JoinError, JoinSet};
use tracing::debug;

use super::first_error::FirstError;
use crate::ports::{BlobError, BlobStore};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetching blob {key:?} failed")]
    Blob {
        key: String,
        #[source]
        source: BlobError,
    },

    #[error("fetch task for blob {key:?} failed")]
    TaskFailed {
        key: String,
        #[source]
        source: JoinError,
    },
}

impl FetchError {
    pub fn key(&self) -> &str {
        match self {
            Self::Blob { key, .. } | Self::TaskFailed { key, .. } => key,
        }
    }
}

/// Fetch every key concurrently and return the blobs in key order.
///
/// All spawned fetches are awaited before returning, including after a
/// failure; siblings are not cancelled. The error of the lowest failing
/// index is returned and the rest are dropped.
///
/// Dropping the returned future aborts the downloads still in flight.
pub async fn fetch_ordered(
    store: &Arc<dyn BlobStore>,
    keys: &[String],
) -> Result<Vec<Bytes>, FetchError> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut tasks = JoinSet::new();
    let mut positions = HashMap::with_capacity(keys.len());
    for (index, key) in keys.iter().enumerate() {
        let store = Arc::clone(store);
        let key = key.clone();
        let task = tasks.spawn(async move {
            debug!(blob_key = %key, "downloading blob");
            (index, store.fetch(&key).await)
        });
        positions.insert(task.id(), index);
    }

    let mut slots: Vec<Option<Result<Bytes, FetchError>>> =
        (0..keys.len()).map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => {
                slots[index] = Some(result.map_err(|source| FetchError::Blob {
                    key: keys[index].clone(),
                    source,
                }));
            }
            Err(source) => {
                if let Some(&index) = positions.get(&source.id()) {
                    slots[index] = Some(Err(FetchError::TaskFailed {
                        key: keys[index].clone(),
                        source,
                    }));
                }
            }
        }
    }

    let first_error = FirstError::new();
    let mut blobs = Vec::with_capacity(keys.len());
    for (key, slot) in keys.iter().zip(slots) {
        match slot {
            Some(Ok(bytes)) => blobs.push(bytes),
            Some(Err(err)) => {
                if !first_error.record(err) {
                    debug!(blob_key = %key, "dropping fetch error, an earlier one is kept");
                }
            }
            None => {}
        }
    }

    first_error.into_result()?;
    Ok(blobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryBlobStore;
    use rand::Rng;
    use std::time::Duration;
    use tokio::time::{Instant, sleep, timeout};

    fn keys(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("img/{i}.jpg")).collect()
    }

    #[tokio::test]
    async fn empty_key_list_returns_empty() {
        let store = Arc::new(InMemoryBlobStore::new());
        let dyn_store: Arc<dyn BlobStore> = store.clone();

        let blobs = fetch_ordered(&dyn_store, &[]).await.unwrap();
        assert!(blobs.is_empty());
        assert_eq!(store.completed_fetches(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn order_survives_completion_jitter() {
        let keys = keys(16);
        let store = {
            let mut rng = rand::thread_rng();
            let mut store = InMemoryBlobStore::new();
            for key in &keys {
                let jitter = Duration::from_millis(rng.gen_range(0..25));
                store = store
                    .with_blob(key, Bytes::from(key.clone()))
                    .with_latency(key, jitter);
            }
            store
        };
        let store: Arc<dyn BlobStore> = Arc::new(store);

        let mut individually = Vec::new();
        for key in &keys {
            individually.push(store.fetch(key).await.unwrap());
        }

        let blobs = fetch_ordered(&store, &keys).await.unwrap();
        assert_eq!(blobs, individually);
    }

    #[tokio::test]
    async fn failure_waits_for_every_sibling() {
        let keys = keys(4);
        let store = Arc::new(
            InMemoryBlobStore::new()
                .with_blob(&keys[0], Bytes::from_static(b"a"))
                .with_failure(&keys[1])
                .with_blob(&keys[2], Bytes::from_static(b"c"))
                .with_latency(&keys[2], Duration::from_millis(30))
                .with_failure(&keys[3]),
        );
        let dyn_store: Arc<dyn BlobStore> = store.clone();

        let err = fetch_ordered(&dyn_store, &keys).await.unwrap_err();
        assert_eq!(err.key(), keys[1]);
        assert!(matches!(err, FetchError::Blob { .. }));
        assert_eq!(store.completed_fetches(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn fetches_overlap() {
        let keys = keys(8);
        let store = keys.iter().fold(InMemoryBlobStore::new(), |store, key| {
            store
                .with_blob(key, Bytes::from(key.clone()))
                .with_latency(key, Duration::from_millis(100))
        });
        let store: Arc<dyn BlobStore> = Arc::new(store);

        let started = Instant::now();
        let blobs = fetch_ordered(&store, &keys).await.unwrap();
        let elapsed = started.elapsed();

        assert_eq!(blobs.len(), 8);
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(200), "took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_fetch_aborts_downloads() {
        let keys = keys(3);
        let store = Arc::new(keys.iter().fold(InMemoryBlobStore::new(), |store, key| {
            store
                .with_blob(key, Bytes::from_static(b"x"))
                .with_latency(key, Duration::from_millis(100))
        }));
        let dyn_store: Arc<dyn BlobStore> = store.clone();

        let fetch = fetch_ordered(&dyn_store, &keys);
        assert!(timeout(Duration::from_millis(50), fetch).await.is_err());

        sleep(Duration::from_millis(500)).await;
        assert_eq!(store.completed_fetches(), 0);
    }

    #[tokio::test]
    async fn missing_blob_is_reported() {
        let store: Arc<dyn BlobStore> = Arc::new(InMemoryBlobStore::new());
        let err = fetch_ordered(&store, &keys(1)).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Blob {
                source: BlobError::NotFound(_),
                ..
            }
        ));
    }
}
