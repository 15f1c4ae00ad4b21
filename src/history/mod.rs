//! Upload history
//!
//! Every successful upload leaves one [`UploadSummary`] behind. Stores keep
//! only the newest `limit` records, ordered by `uploaded_at` and then `id`.

use async_trait::async_trait;

use crate::models::{NewUploadSummary, UploadSummary};

pub mod memory;

pub use memory::*;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stored value out of range: {0}")]
    OutOfRange(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Persistence for upload summaries, injected into handlers through `AppState`.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Insert a record stamped with the current time, then prune the history
    /// down to `limit` entries.
    async fn record_upload(
        &self,
        summary: NewUploadSummary,
        limit: usize,
    ) -> Result<UploadSummary, StoreError>;

    /// Delete everything beyond the `limit` newest records. Returns the
    /// number of records removed.
    async fn prune_to_retention_limit(&self, limit: usize) -> Result<u64, StoreError>;

    /// All retained records, newest first.
    async fn list_recent(&self) -> Result<Vec<UploadSummary>, StoreError>;
}
