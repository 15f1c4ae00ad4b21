use axum::{extract::State, routing::get, Json, Router};
use tracing::debug;

use crate::models::{AppState, UploadSummaryView};
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/summaries/", get(get_summaries))
        .with_state(state)
}

/// GET /summaries/ - retained uploads, newest first
async fn get_summaries(State(state): State<AppState>) -> AppResult<Json<Vec<UploadSummaryView>>> {
    let summaries = state.store.list_recent().await?;
    debug!(count = summaries.len(), "Listing upload history");

    Ok(Json(summaries.iter().map(UploadSummaryView::from).collect()))
}
