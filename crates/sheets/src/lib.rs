//! # `vizon-sheets`: Tabular File Acquisition Plugin
//!
//! Parses uploaded CSV and spreadsheet files into a `Table`. Tabular input never
//! goes through the Extraction Service; its header row is the column list.

mod delimited;
mod spreadsheet;

use thiserror::Error;
use tracing::info;
use vizon::{
    errors::AcquisitionError,
    ingest::{RawInput, TabularFormat},
    types::Table,
};

pub use spreadsheet::format_datetime;

type Source<'a> = std::io::Cursor<&'a [u8]>;

// --- Error Definitions ---

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SheetError {
    #[error("File is empty: no header row found")]
    Empty,
    #[error("Malformed CSV: {0}")]
    Csv(String),
    #[error("Failed to read workbook: {0}")]
    Workbook(String),
    #[error("Workbook contains no worksheet")]
    NoWorksheet,
}

impl From<csv::Error> for SheetError {
    fn from(err: csv::Error) -> Self {
        SheetError::Csv(err.to_string())
    }
}

/// A helper to convert the specific `SheetError` into the core `AcquisitionError`.
impl From<SheetError> for AcquisitionError {
    fn from(err: SheetError) -> Self {
        AcquisitionError::Parse(err.to_string())
    }
}

// --- Public Functions ---

/// Wraps an uploaded file as tabular input, detecting the format from its name.
pub fn acquire_file(file_name: &str, bytes: Vec<u8>) -> Result<RawInput, AcquisitionError> {
    let format = TabularFormat::from_file_name(file_name)?;
    info!("Acquired '{file_name}' as {format:?} ({} bytes)", bytes.len());
    Ok(RawInput::TabularBytes { bytes, format })
}

/// Parses file bytes of a known format into a `Table`.
pub fn parse_tabular(bytes: &[u8], format: TabularFormat) -> Result<Table, SheetError> {
    let table = match format {
        TabularFormat::Csv => delimited::parse_csv(bytes)?,
        TabularFormat::Xlsx => spreadsheet::parse_workbook::<calamine::Xlsx<Source<'_>>>(bytes)?,
        TabularFormat::Xls => spreadsheet::parse_workbook::<calamine::Xls<Source<'_>>>(bytes)?,
        TabularFormat::Ods => spreadsheet::parse_workbook::<calamine::Ods<Source<'_>>>(bytes)?,
    };
    info!(
        "Parsed {format:?} file: {} rows, {} columns",
        table.len(),
        table.columns().len()
    );
    Ok(table)
}

/// Builds the `Table` for a tabular `RawInput`.
pub fn table_from_raw(raw: &RawInput) -> Result<Table, AcquisitionError> {
    match raw {
        RawInput::TabularBytes { bytes, format } => Ok(parse_tabular(bytes, *format)?),
        _ => Err(AcquisitionError::UnsupportedFormat(
            "only tabular input can be parsed as a table".to_string(),
        )),
    }
}

/// Makes header names unique: a repeated `Price` becomes `Price.1`, `Price.2`, ...
pub(crate) fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(headers.len());
    for header in headers {
        let mut candidate = header.clone();
        let mut n = 1;
        while seen.contains(&candidate) {
            candidate = format!("{header}.{n}");
            n += 1;
        }
        seen.push(candidate);
    }
    seen
}

/// Replaces blank header cells with `Unnamed: {index}`.
pub(crate) fn fill_blank_headers(headers: Vec<String>) -> Vec<String> {
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            if h.trim().is_empty() {
                format!("Unnamed: {i}")
            } else {
                h
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedupe_headers() {
        assert_eq!(
            dedupe_headers(strings(&["Price", "Item", "Price", "Price"])),
            strings(&["Price", "Item", "Price.1", "Price.2"])
        );
        assert_eq!(
            dedupe_headers(strings(&["A", "A.1", "A"])),
            strings(&["A", "A.1", "A.2"])
        );
    }

    #[test]
    fn test_fill_blank_headers() {
        assert_eq!(
            fill_blank_headers(strings(&["Item", "", " "])),
            strings(&["Item", "Unnamed: 1", "Unnamed: 2"])
        );
    }

    #[test]
    fn test_acquire_file_rejects_unknown_extension() {
        let err = acquire_file("photo.png", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, AcquisitionError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_sheet_error_maps_to_parse_error() {
        let err: AcquisitionError = SheetError::NoWorksheet.into();
        assert_eq!(
            err,
            AcquisitionError::Parse("Workbook contains no worksheet".to_string())
        );
    }
}
