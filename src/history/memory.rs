use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StoreError, SummaryStore};
use crate::models::{NewUploadSummary, UploadSummary};

#[derive(Default)]
struct Inner {
    next_id: i64,
    records: Vec<UploadSummary>,
}

impl Inner {
    fn sort_newest_first(&mut self) {
        self.records.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
    }

    fn prune(&mut self, limit: usize) -> u64 {
        self.sort_newest_first();
        let removed = self.records.len().saturating_sub(limit);
        self.records.truncate(limit);
        removed as u64
    }
}

/// Process-local history, used when no database is configured and in tests.
#[derive(Clone, Default)]
pub struct InMemorySummaryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SummaryStore for InMemorySummaryStore {
    async fn record_upload(
        &self,
        summary: NewUploadSummary,
        limit: usize,
    ) -> Result<UploadSummary, StoreError> {
        let mut guard = self.inner.write().await;
        guard.next_id += 1;

        let record = UploadSummary {
            id: guard.next_id,
            row_count: summary.row_count,
            column_count: summary.column_count,
            column_names: summary.column_names,
            uploaded_at: Utc::now(),
        };
        guard.records.push(record.clone());
        guard.prune(limit);

        Ok(record)
    }

    async fn prune_to_retention_limit(&self, limit: usize) -> Result<u64, StoreError> {
        let mut guard = self.inner.write().await;
        Ok(guard.prune(limit))
    }

    async fn list_recent(&self) -> Result<Vec<UploadSummary>, StoreError> {
        let mut guard = self.inner.write().await;
        guard.sort_newest_first();
        Ok(guard.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(rows: usize) -> NewUploadSummary {
        NewUploadSummary {
            row_count: rows,
            column_count: 2,
            column_names: vec!["flowrate".to_string(), "type".to_string()],
        }
    }

    #[tokio::test]
    async fn test_record_assigns_id_and_timestamp() {
        let store = InMemorySummaryStore::new();
        let before = Utc::now();

        let first = store.record_upload(upload(1), 5).await.unwrap();
        let second = store.record_upload(upload(2), 5).await.unwrap();

        assert!(second.id > first.id);
        assert!(first.uploaded_at >= before);
        assert_eq!(first.column_names.len(), first.column_count);
    }

    #[tokio::test]
    async fn test_keeps_only_newest_records() {
        let store = InMemorySummaryStore::new();
        for rows in 1..=8 {
            store.record_upload(upload(rows), 5).await.unwrap();
            assert!(store.len().await <= 5);
        }

        let rows: Vec<usize> = store
            .list_recent()
            .await
            .unwrap()
            .iter()
            .map(|s| s.row_count)
            .collect();
        assert_eq!(rows, vec![8, 7, 6, 5, 4]);
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let store = InMemorySummaryStore::new();
        for rows in 1..=4 {
            store.record_upload(upload(rows), 5).await.unwrap();
        }

        let listed = store.list_recent().await.unwrap();
        for pair in listed.windows(2) {
            assert!(pair[0].uploaded_at >= pair[1].uploaded_at);
        }
    }

    #[tokio::test]
    async fn test_prune_reports_removed_count() {
        let store = InMemorySummaryStore::new();
        for rows in 1..=4 {
            store.record_upload(upload(rows), 10).await.unwrap();
        }

        assert_eq!(store.prune_to_retention_limit(1).await.unwrap(), 3);
        assert_eq!(store.prune_to_retention_limit(1).await.unwrap(), 0);

        let remaining = store.list_recent().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].row_count, 4);
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemorySummaryStore::new();
        assert!(store.is_empty().await);
        assert!(store.list_recent().await.unwrap().is_empty());
    }
}
