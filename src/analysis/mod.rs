//! CSV parsing and summary statistics for uploaded files.
//!
//! The whole upload is parsed in memory: the header row gives the column
//! names, every following record is one data row. Cells are coerced through
//! [`CellValue::parse`] so numeric columns tolerate stray text and blanks.

use std::collections::{BTreeMap, HashMap, HashSet};

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::models::Averages;
use crate::types::CellValue;

pub const FLOWRATE_COLUMN: &str = "flowrate";
pub const PRESSURE_COLUMN: &str = "pressure";
pub const TEMPERATURE_COLUMN: &str = "temperature";
pub const TYPE_COLUMN: &str = "type";

/// Columns every upload must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    FLOWRATE_COLUMN,
    PRESSURE_COLUMN,
    TEMPERATURE_COLUMN,
    TYPE_COLUMN,
];

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("No columns to parse from file")]
    Empty,

    #[error("Failed to parse CSV: {0}")]
    Parse(String),

    #[error("Missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

impl From<csv::Error> for AnalysisError {
    fn from(e: csv::Error) -> Self {
        AnalysisError::Parse(e.to_string())
    }
}

/// Result of analysing one uploaded file.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadAnalysis {
    pub row_count: usize,
    pub column_count: usize,
    pub column_names: Vec<String>,
    pub averages: Averages,
    pub type_distribution: BTreeMap<String, usize>,
}

/// In-memory table of coerced cells plus the raw text needed for categories.
struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<(String, CellValue)>>,
}

impl Table {
    fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    fn cells(&self, index: usize) -> impl Iterator<Item = &(String, CellValue)> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }
}

/// Parse an uploaded CSV and compute its summary.
pub fn process_upload(data: &[u8], filename: &str) -> Result<UploadAnalysis, AnalysisError> {
    let table = parse_table(data)?;

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::MissingColumns(missing));
    }

    let averages = Averages {
        flowrate: column_mean(&table, FLOWRATE_COLUMN),
        pressure: column_mean(&table, PRESSURE_COLUMN),
        temperature: column_mean(&table, TEMPERATURE_COLUMN),
    };
    let type_distribution = value_counts(&table, TYPE_COLUMN);

    debug!(
        filename,
        rows = table.rows.len(),
        columns = table.headers.len(),
        "Parsed uploaded table"
    );

    Ok(UploadAnalysis {
        row_count: table.rows.len(),
        column_count: table.headers.len(),
        column_names: table.headers,
        averages,
        type_distribution,
    })
}

fn parse_table(data: &[u8]) -> Result<Table, AnalysisError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let raw_headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if raw_headers.is_empty() || raw_headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AnalysisError::Empty);
    }
    let headers = dedupe_headers(raw_headers);

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr.read_record(&mut record)? {
        // Whitespace-only lines come back as a single blank field
        if record.len() == 1 && record.get(0).is_some_and(|f| f.trim().is_empty()) {
            continue;
        }

        if record.len() > headers.len() {
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            return Err(AnalysisError::Parse(format!(
                "expected {} fields on line {}, found {}",
                headers.len(),
                line,
                record.len()
            )));
        }

        // Short rows are padded with missing cells
        let row = (0..headers.len())
            .map(|idx| {
                let raw = record.get(idx).unwrap_or_default();
                (raw.to_string(), CellValue::parse(raw))
            })
            .collect();
        rows.push(row);
    }

    Ok(Table { headers, rows })
}

/// Rename repeated headers to `name.1`, `name.2`, ... so each column stays addressable.
fn dedupe_headers(raw: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = raw.iter().cloned().collect();
    let mut first_taken: HashSet<String> = HashSet::new();
    let mut suffixes: HashMap<String, usize> = HashMap::new();

    raw.into_iter()
        .map(|name| {
            if first_taken.insert(name.clone()) {
                return name;
            }

            let suffix = suffixes.entry(name.clone()).or_insert(0);
            loop {
                *suffix += 1;
                let candidate = format!("{}.{}", name, suffix);
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
            }
        })
        .collect()
}

fn column_mean(table: &Table, name: &str) -> Option<f64> {
    let index = table.column_index(name)?;
    let (sum, count) = table
        .cells(index)
        .filter_map(|(_, cell)| cell.as_f64())
        .fold((0.0_f64, 0_usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return None;
    }
    Some(round2(sum / count as f64))
}

fn value_counts(table: &Table, name: &str) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    if let Some(index) = table.column_index(name) {
        for (raw, cell) in table.cells(index) {
            if !cell.is_missing() {
                *counts.entry(raw.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Round to two decimals, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
