use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};

use crate::analysis::UploadAnalysis;
use crate::config::Config;
use crate::history::SummaryStore;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "CSV file processed and saved successfully";
pub const UPLOADED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SummaryStore>,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<dyn SummaryStore>, config: Config) -> Self {
        Self { store, config }
    }
}

/// One persisted upload record. Immutable once stored.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UploadSummary {
    pub id: i64,
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Fields the caller supplies when recording an upload; the store assigns
/// `id` and `uploaded_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUploadSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
}

impl From<&UploadAnalysis> for NewUploadSummary {
    fn from(analysis: &UploadAnalysis) -> Self {
        Self {
            row_count: analysis.row_count,
            column_count: analysis.column_count,
            column_names: analysis.column_names.clone(),
        }
    }
}

// API Request/Response types

#[derive(Debug, serde::Serialize)]
pub struct TestSummaryResponse {
    pub manage: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Averages {
    pub flowrate: Option<f64>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
}

/// Body of a successful `POST /upload/`.
#[derive(Debug, serde::Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    pub message: String,
    pub averages: Averages,
    pub type_distribution: BTreeMap<String, usize>,
}

impl From<UploadAnalysis> for UploadResponse {
    fn from(analysis: UploadAnalysis) -> Self {
        Self {
            success: true,
            rows: analysis.row_count,
            columns: analysis.column_count,
            column_names: analysis.column_names,
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            averages: analysis.averages,
            type_distribution: analysis.type_distribution,
        }
    }
}

/// History entry as returned by `GET /summaries/`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct UploadSummaryView {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// Server local time, `YYYY-MM-DD HH:MM`.
    pub uploaded_at: String,
}

impl From<&UploadSummary> for UploadSummaryView {
    fn from(summary: &UploadSummary) -> Self {
        Self {
            rows: summary.row_count,
            columns: summary.column_count,
            column_names: summary.column_names.clone(),
            uploaded_at: summary
                .uploaded_at
                .with_timezone(&Local)
                .format(UPLOADED_AT_FORMAT)
                .to_string(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
