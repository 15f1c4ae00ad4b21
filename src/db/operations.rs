use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use crate::history::{StoreError, SummaryStore};
use crate::models::{NewUploadSummary, UploadSummary};

// Note: runtime query_as so builds don't need DATABASE_URL at compile time

#[derive(Debug, sqlx::FromRow)]
struct UploadSummaryRow {
    id: i64,
    row_count: i64,
    column_count: i64,
    column_names: Vec<String>,
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<UploadSummaryRow> for UploadSummary {
    type Error = StoreError;

    fn try_from(row: UploadSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            row_count: usize::try_from(row.row_count)
                .map_err(|_| StoreError::OutOfRange(format!("row_count {}", row.row_count)))?,
            column_count: usize::try_from(row.column_count).map_err(|_| {
                StoreError::OutOfRange(format!("column_count {}", row.column_count))
            })?,
            column_names: row.column_names,
            uploaded_at: row.uploaded_at,
        })
    }
}

fn to_db_count(value: usize, field: &str) -> Result<i64, StoreError> {
    i64::try_from(value).map_err(|_| StoreError::OutOfRange(format!("{} {}", field, value)))
}

/// Upload history backed by the `upload_summaries` table.
#[derive(Clone)]
pub struct PgSummaryStore {
    pool: PgPool,
}

impl PgSummaryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn prune(conn: &mut PgConnection, limit: usize) -> Result<u64, StoreError> {
        let keep = to_db_count(limit, "limit")?;
        let result = sqlx::query(
            r#"
            DELETE FROM upload_summaries
            WHERE id IN (
                SELECT id FROM upload_summaries
                ORDER BY uploaded_at DESC, id DESC
                OFFSET $1
            )
            "#,
        )
        .bind(keep)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl SummaryStore for PgSummaryStore {
    async fn record_upload(
        &self,
        summary: NewUploadSummary,
        limit: usize,
    ) -> Result<UploadSummary, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UploadSummaryRow>(
            r#"
            INSERT INTO upload_summaries (row_count, column_count, column_names)
            VALUES ($1, $2, $3)
            RETURNING id, row_count, column_count, column_names, uploaded_at
            "#,
        )
        .bind(to_db_count(summary.row_count, "row_count")?)
        .bind(to_db_count(summary.column_count, "column_count")?)
        .bind(&summary.column_names)
        .fetch_one(&mut *tx)
        .await?;

        let removed = Self::prune(&mut tx, limit).await?;
        tx.commit().await?;

        debug!(id = row.id, removed, "Recorded upload summary");
        row.try_into()
    }

    async fn prune_to_retention_limit(&self, limit: usize) -> Result<u64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Self::prune(&mut conn, limit).await
    }

    async fn list_recent(&self) -> Result<Vec<UploadSummary>, StoreError> {
        let rows = sqlx::query_as::<_, UploadSummaryRow>(
            r#"
            SELECT id, row_count, column_count, column_names, uploaded_at
            FROM upload_summaries
            ORDER BY uploaded_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UploadSummary::try_from).collect()
    }
}
