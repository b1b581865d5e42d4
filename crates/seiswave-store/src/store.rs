//! The claim-check sample store.
//!
//! An async map from encoded claim-check id to a shared, immutable `f64`
//! sample buffer. Entries may also hold a pending computation; concurrent
//! retrievers of a pending entry await the same shared future and all
//! observe the same buffer once it resolves.
//!
//! The store has no TTL or eviction. Entries live until the host clears
//! them (per id or in bulk when waveforms are cleared).

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use futures::Future;
use log::debug;
use thiserror::Error;
use tokio::sync::RwLock;

/// A stored buffer: immutable, shared by reference.
pub type SampleBuffer = Arc<Vec<f64>>;

type PendingBuffer = Shared<BoxFuture<'static, Result<SampleBuffer, String>>>;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no sample buffer stored under claim check id {0}")]
    NotFound(String),
    #[error("pending sample buffer for claim check id {0} failed: {1}")]
    PendingFailed(String, String),
}

#[derive(Clone)]
enum Entry {
    Ready(SampleBuffer),
    Pending(PendingBuffer),
}

/// Async key/value store mapping encoded claim-check ids to sample
/// buffers.
///
/// Cloning is cheap and clones share the same underlying map. Readers
/// and writers of disjoint ids never block each other beyond the map
/// lock itself, which is held only to clone or insert an entry, never
/// across an await of a pending buffer.
#[derive(Clone, Default)]
pub struct ClaimCheckStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl ClaimCheckStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff a buffer (ready or pending) is stored under `id`.
    pub async fn has(&self, id: &str) -> bool {
        self.entries.read().await.contains_key(id)
    }

    /// Store a buffer under `id`. A duplicate store overwrites; callers
    /// that want store-if-absent semantics use [`Self::store_if_absent`].
    pub async fn store(&self, id: &str, buffer: Vec<f64>) {
        debug!("storing {} samples under claim check", buffer.len());
        self.entries
            .write()
            .await
            .insert(id.to_string(), Entry::Ready(Arc::new(buffer)));
    }

    /// Store a buffer only if `id` has no entry yet. Returns whether the
    /// buffer was stored.
    pub async fn store_if_absent(&self, id: &str, buffer: Vec<f64>) -> bool {
        let mut entries = self.entries.write().await;
        if entries.contains_key(id) {
            return false;
        }
        entries.insert(id.to_string(), Entry::Ready(Arc::new(buffer)));
        true
    }

    /// Store an in-flight computation under `id`. Retrievers await it;
    /// once it resolves the entry is promoted to a ready buffer.
    pub async fn store_pending<F>(&self, id: &str, computation: F)
    where
        F: Future<Output = Result<Vec<f64>, String>> + Send + 'static,
    {
        let pending: PendingBuffer = computation
            .map(|result| result.map(Arc::new))
            .boxed()
            .shared();
        self.entries
            .write()
            .await
            .insert(id.to_string(), Entry::Pending(pending));
    }

    /// Retrieve the buffer stored under `id`, awaiting a pending entry if
    /// necessary.
    pub async fn retrieve(&self, id: &str) -> Result<SampleBuffer, StoreError> {
        let entry = self
            .entries
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        match entry {
            Entry::Ready(buffer) => Ok(buffer),
            Entry::Pending(pending) => match pending.await {
                Ok(buffer) => {
                    // Promote so later retrieves skip the shared future.
                    let mut entries = self.entries.write().await;
                    if let Some(slot @ Entry::Pending(_)) = entries.get_mut(id) {
                        *slot = Entry::Ready(Arc::clone(&buffer));
                    }
                    Ok(buffer)
                }
                Err(message) => {
                    let mut entries = self.entries.write().await;
                    if matches!(entries.get(id), Some(Entry::Pending(_))) {
                        entries.remove(id);
                    }
                    Err(StoreError::PendingFailed(id.to_string(), message))
                }
            },
        }
    }

    /// Remove the entry under `id`. Returns whether one existed.
    pub async fn delete(&self, id: &str) -> bool {
        self.entries.write().await.remove(id).is_some()
    }

    /// Remove every entry. Called when the host clears waveforms.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        debug!("clearing {} claim check entries", entries.len());
        entries.clear();
    }

    /// Number of stored entries, pending included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_retrieve_bit_exact() {
        let store = ClaimCheckStore::new();
        let samples = vec![1.0, 2.000_000_000_000_1, 3.0, 4.000_000_000_000_1];
        store.store("id-a", samples.clone()).await;

        let retrieved = store.retrieve("id-a").await.unwrap();
        assert_eq!(*retrieved, samples);
        // Concurrent retrieves see the same logical data.
        let again = store.retrieve("id-a").await.unwrap();
        assert!(Arc::ptr_eq(&retrieved, &again));
    }

    #[tokio::test]
    async fn test_retrieve_unknown_id_fails() {
        let store = ClaimCheckStore::new();
        let err = store.retrieve("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_has_and_delete() {
        let store = ClaimCheckStore::new();
        assert!(!store.has("id").await);
        store.store("id", vec![1.0]).await;
        assert!(store.has("id").await);
        assert!(store.delete("id").await);
        assert!(!store.has("id").await);
        assert!(!store.delete("id").await);
    }

    #[tokio::test]
    async fn test_store_if_absent_skips_existing() {
        let store = ClaimCheckStore::new();
        assert!(store.store_if_absent("id", vec![1.0]).await);
        assert!(!store.store_if_absent("id", vec![2.0]).await);
        assert_eq!(*store.retrieve("id").await.unwrap(), vec![1.0]);
    }

    #[tokio::test]
    async fn test_duplicate_store_overwrites() {
        let store = ClaimCheckStore::new();
        store.store("id", vec![1.0]).await;
        store.store("id", vec![2.0]).await;
        assert_eq!(*store.retrieve("id").await.unwrap(), vec![2.0]);
    }

    #[tokio::test]
    async fn test_pending_entry_resolves_for_all_retrievers() {
        let store = ClaimCheckStore::new();
        let (tx, rx) = tokio::sync::oneshot::channel::<Vec<f64>>();
        store
            .store_pending("id", async move { Ok(rx.await.unwrap()) })
            .await;
        assert!(store.has("id").await);

        let a = tokio::spawn({
            let store = store.clone();
            async move { store.retrieve("id").await.unwrap() }
        });
        let b = tokio::spawn({
            let store = store.clone();
            async move { store.retrieve("id").await.unwrap() }
        });

        tx.send(vec![5.0, 6.0]).unwrap();
        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert_eq!(*a, vec![5.0, 6.0]);
        assert_eq!(*a, *b);

        // Entry was promoted; a fresh retrieve still works.
        assert_eq!(*store.retrieve("id").await.unwrap(), vec![5.0, 6.0]);
    }

    #[tokio::test]
    async fn test_failed_pending_entry_is_removed() {
        let store = ClaimCheckStore::new();
        store
            .store_pending("id", async { Err("fetch failed".to_string()) })
            .await;
        let err = store.retrieve("id").await.unwrap_err();
        assert!(matches!(err, StoreError::PendingFailed(_, message) if message == "fetch failed"));
        assert!(!store.has("id").await);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let store = ClaimCheckStore::new();
        store.store("a", vec![1.0]).await;
        store.store("b", vec![2.0]).await;
        assert_eq!(store.len().await, 2);
        store.clear().await;
        assert!(store.is_empty().await);
    }
}
