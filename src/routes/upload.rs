use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, warn};

use crate::analysis::process_upload;
use crate::models::{AppState, NewUploadSummary, UploadResponse};
use crate::types::{AppError, AppResult};

/// Multipart field carrying the CSV.
pub const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/upload/", post(upload_csv))
        .with_state(state)
}

struct UploadedFile {
    filename: String,
    data: Bytes,
}

/// POST /upload/ - parse the CSV, record it in the history and return its summary
async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Upload rejected: {}", e);
        AppError::MissingFile
    })?;

    let file = read_file_field(&mut multipart)
        .await?
        .ok_or(AppError::MissingFile)?;
    info!(filename = %file.filename, size = file.data.len(), "CSV upload received");

    let analysis = process_upload(&file.data, &file.filename).map_err(|e| {
        warn!(filename = %file.filename, error = %e, "CSV upload could not be processed");
        e
    })?;

    let record = state
        .store
        .record_upload(
            NewUploadSummary::from(&analysis),
            state.config.history.retention_limit,
        )
        .await?;
    info!(
        id = record.id,
        rows = analysis.row_count,
        columns = analysis.column_count,
        "Upload summary saved"
    );

    Ok(Json(UploadResponse::from(analysis)))
}

/// Pull the `file` field out of the form, skipping any other fields.
async fn read_file_field(multipart: &mut Multipart) -> AppResult<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field.bytes().await?;
        return Ok(Some(UploadedFile { filename, data }));
    }

    Ok(None)
}
