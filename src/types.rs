// Type definitions and enums

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::analysis::AnalysisError;
use crate::history::StoreError;
use crate::models::ErrorResponse;

/// Tokens read as a missing value rather than text.
const MISSING_MARKERS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A"];

/// A single CSV cell after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Numeric(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Coerce a raw field: blanks and NA-style markers are missing, finite
    /// floats are numeric, everything else stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed) {
            return CellValue::Missing;
        }

        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => CellValue::Numeric(value),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Numeric(value) => Some(*value),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No file uploaded")]
    MissingFile,

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingFile | AppError::Analysis(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Storage(e) => {
                error!(error = %e, "Storage failure while handling request");
                "Failed to access upload history".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_cells() {
        assert_eq!(CellValue::parse("10"), CellValue::Numeric(10.0));
        assert_eq!(CellValue::parse(" 2.5 "), CellValue::Numeric(2.5));
        assert_eq!(CellValue::parse("-1e3"), CellValue::Numeric(-1000.0));
    }

    #[test]
    fn test_missing_cells() {
        for raw in ["", "   ", "NA", "N/A", "NaN", "null", "None", "#N/A"] {
            assert!(CellValue::parse(raw).is_missing(), "{raw:?} should be missing");
        }
    }

    #[test]
    fn test_text_cells() {
        assert_eq!(CellValue::parse("pump"), CellValue::Text("pump".to_string()));
        assert_eq!(CellValue::parse("12kg"), CellValue::Text("12kg".to_string()));
        // Non-finite floats are not usable in a mean
        assert_eq!(CellValue::parse("inf"), CellValue::Text("inf".to_string()));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::MissingFile.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Analysis(AnalysisError::Empty).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Storage(StoreError::Unavailable("down".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
