use axum::{Router, routing::get, Json, response::Json as ResponseJson};
use crate::models::TestSummaryResponse;

pub fn router() -> Router {
    Router::new()
        .route("/summary/test/", get(test_summary))
}

async fn test_summary() -> ResponseJson<TestSummaryResponse> {
    let response = TestSummaryResponse {
        manage: "Backend working!".to_string(),
    };

    Json(response)
}
