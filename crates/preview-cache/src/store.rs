//! In-memory artifact store keyed by handle

use crate::error::{CacheError, Result};
use crate::types::{CacheRow, CacheStats, Handle};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Rows {
    by_handle: HashMap<Handle, Arc<CacheRow>>,
    /// Timestamp of the most recent insertion, keeps `created_at` monotonic
    last_created_at: Option<DateTime<Utc>>,
}

/// Process-local table of cached preview rows.
///
/// Every read and write goes through one `RwLock`, so a handle returned by
/// [`ArtifactStore::insert`] is visible to any later [`ArtifactStore::lookup`]
/// and a delete can never race an insert into losing or resurrecting a row.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    rows: RwLock<Rows>,
    /// Lookup hit counter
    hits: AtomicU64,
    /// Lookup miss counter
    misses: AtomicU64,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a row under a freshly generated handle
    pub async fn insert(&self, row: CacheRow) -> Result<Handle> {
        self.insert_with_handle(Handle::generate(), row).await
    }

    pub(crate) async fn insert_with_handle(&self, handle: Handle, row: CacheRow) -> Result<Handle> {
        let mut rows = self.rows.write().await;
        if rows.by_handle.contains_key(&handle) {
            return Err(CacheError::HandleCollision(handle));
        }

        let created_at = match rows.last_created_at {
            Some(last) if last > row.created_at() => last,
            _ => row.created_at(),
        };
        rows.last_created_at = Some(created_at);

        let row = row.with_created_at(created_at);
        debug!(handle = %handle, pdf_size = row.pdf_size(), "Cached preview");
        rows.by_handle.insert(handle.clone(), Arc::new(row));
        Ok(handle)
    }

    /// Exact-match retrieval; `None` when the handle is unknown
    pub async fn lookup(&self, handle: &Handle) -> Option<Arc<CacheRow>> {
        self.lookup_where(handle, |_| true).await
    }

    /// Exact-match retrieval of a row `keep` accepts.
    ///
    /// A row that `keep` refuses counts as a miss, so the hit counter only
    /// tracks rows that were actually served.
    pub async fn lookup_where(
        &self,
        handle: &Handle,
        keep: impl FnOnce(&CacheRow) -> bool,
    ) -> Option<Arc<CacheRow>> {
        let row = {
            let rows = self.rows.read().await;
            rows.by_handle.get(handle).filter(|row| keep(row)).cloned()
        };

        if row.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(handle = %handle, "Cache hit");
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            debug!(handle = %handle, "Cache miss");
        }
        row
    }

    /// Remove every row created strictly before `cutoff`, returning how many went
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut rows = self.rows.write().await;
        let before = rows.by_handle.len();
        rows.by_handle.retain(|_, row| row.created_at() >= cutoff);
        before - rows.by_handle.len()
    }

    /// Sum of the PDF sizes of all live rows, computed at call time
    pub async fn total_artifact_bytes(&self) -> u64 {
        let rows = self.rows.read().await;
        rows.by_handle.values().map(|row| row.pdf_size()).sum()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.by_handle.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let rows = self.rows.read().await;
        CacheStats {
            entries: rows.by_handle.len(),
            total_size: rows.by_handle.values().map(|row| row.pdf_size()).sum(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::HashSet;

    fn row(pdf: Option<&[u8]>, created_at: DateTime<Utc>) -> CacheRow {
        CacheRow::new(
            r#"{"docElements":[]}"#.to_string(),
            r#"{"x":1}"#.to_string(),
            true,
            pdf.map(<[u8]>::to_vec),
            created_at,
        )
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = ArtifactStore::new();
        let now = Utc::now();

        let handle = store.insert(row(Some(b"%PDF-1.4"), now)).await.unwrap();
        assert_eq!(handle.as_str().len(), 36);

        let found = store.lookup(&handle).await.unwrap();
        assert_eq!(found.pdf(), Some(&b"%PDF-1.4"[..]));
        assert_eq!(found.data(), r#"{"x":1}"#);
        assert!(found.is_sample());
        assert_eq!(found.created_at(), now);
    }

    #[tokio::test]
    async fn test_lookup_unknown_handle() {
        let store = ArtifactStore::new();
        let missing = Handle::generate();
        assert!(store.lookup(&missing).await.is_none());
    }

    #[tokio::test]
    async fn test_collision_is_reported() {
        let store = ArtifactStore::new();
        let now = Utc::now();
        let handle = Handle::generate();

        store
            .insert_with_handle(handle.clone(), row(Some(b"first"), now))
            .await
            .unwrap();
        let err = store
            .insert_with_handle(handle.clone(), row(Some(b"second"), now))
            .await
            .unwrap_err();
        assert!(matches!(err, CacheError::HandleCollision(h) if h == handle));

        // The original row is untouched
        let found = store.lookup(&handle).await.unwrap();
        assert_eq!(found.pdf(), Some(&b"first"[..]));
    }

    #[tokio::test]
    async fn test_delete_older_than() {
        let store = ArtifactStore::new();
        let now = Utc::now();

        let old = store
            .insert(row(Some(b"old"), now - Duration::minutes(5)))
            .await
            .unwrap();
        let fresh = store.insert(row(Some(b"fresh"), now)).await.unwrap();

        let removed = store.delete_older_than(now - Duration::minutes(3)).await;
        assert_eq!(removed, 1);
        assert!(store.lookup(&old).await.is_none());
        assert!(store.lookup(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn test_delete_cutoff_is_exclusive() {
        let store = ArtifactStore::new();
        let now = Utc::now();
        let handle = store.insert(row(None, now)).await.unwrap();

        assert_eq!(store.delete_older_than(now).await, 0);
        assert!(store.lookup(&handle).await.is_some());
    }

    #[tokio::test]
    async fn test_total_artifact_bytes() {
        let store = ArtifactStore::new();
        let now = Utc::now();
        assert_eq!(store.total_artifact_bytes().await, 0);

        store.insert(row(Some(&[0u8; 10]), now)).await.unwrap();
        store.insert(row(Some(&[0u8; 32]), now)).await.unwrap();
        store.insert(row(None, now)).await.unwrap();
        assert_eq!(store.total_artifact_bytes().await, 42);

        store.delete_older_than(now + Duration::seconds(1)).await;
        assert_eq!(store.total_artifact_bytes().await, 0);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_created_at_never_moves_backwards() {
        let store = ArtifactStore::new();
        let now = Utc::now();

        store.insert(row(None, now)).await.unwrap();
        let late = store
            .insert(row(None, now - Duration::seconds(30)))
            .await
            .unwrap();

        let found = store.lookup(&late).await.unwrap();
        assert_eq!(found.created_at(), now);
    }

    #[tokio::test]
    async fn test_hit_miss_counters() {
        let store = ArtifactStore::new();
        let handle = store.insert(row(Some(b"data"), Utc::now())).await.unwrap();

        store.lookup(&Handle::generate()).await;
        store.lookup(&handle).await;

        let stats = store.stats().await;
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.total_size, 4);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_refused_lookup_counts_as_miss() {
        let store = ArtifactStore::new();
        let handle = store.insert(row(Some(b"data"), Utc::now())).await.unwrap();

        assert!(store.lookup_where(&handle, |_| false).await.is_none());
        assert!(store
            .lookup_where(&handle, |row| row.is_sample())
            .await
            .is_some());

        let stats = store.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_produce_distinct_handles() {
        let store = Arc::new(ArtifactStore::new());
        let now = Utc::now();

        let tasks: Vec<_> = (0..1000)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(row(Some(b"x"), now)).await })
            })
            .collect();

        let mut handles = HashSet::new();
        for task in tasks {
            let handle = task.await.unwrap().unwrap();
            assert!(store.lookup(&handle).await.is_some());
            handles.insert(handle);
        }

        assert_eq!(handles.len(), 1000);
        assert_eq!(store.len().await, 1000);
    }
}
