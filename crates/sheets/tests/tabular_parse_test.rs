//! # Tabular Parsing Tests
//!
//! Checks that uploaded CSV and spreadsheet files become tables whose columns
//! match the header row, and that malformed files fail with a parse error.

use vizon::errors::AcquisitionError;
use vizon::ingest::{RawInput, TabularFormat};
use vizon::types::{infer_schema, Cell, ColumnKind};
use vizon_sheets::{acquire_file, parse_tabular, table_from_raw, SheetError};

#[test]
fn test_csv_columns_equal_header_row() {
    // --- 1. Arrange ---
    let csv = b"Date,Region,Sales,Returned\n2024-01-05,North,1200,false\n2024-01-06,South,,TRUE\n";

    // --- 2. Act ---
    let table = parse_tabular(csv, TabularFormat::Csv).unwrap();

    // --- 3. Assert ---
    assert_eq!(
        table.columns(),
        &[
            "Date".to_string(),
            "Region".to_string(),
            "Sales".to_string(),
            "Returned".to_string()
        ]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, "Date"), &Cell::from("2024-01-05"));
    assert_eq!(table.get(0, "Sales"), &Cell::from(1200));
    assert_eq!(table.get(1, "Sales"), &Cell::Null);
    assert_eq!(table.get(1, "Returned"), &Cell::from(true));

    let kinds: Vec<ColumnKind> = infer_schema(&table).into_iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ColumnKind::Categorical,
            ColumnKind::Categorical,
            ColumnKind::Numeric,
            ColumnKind::Boolean
        ]
    );
}

#[test]
fn test_csv_duplicate_headers_are_suffixed() {
    let table = parse_tabular(b"Price,Item,Price\n1,a,2\n", TabularFormat::Csv).unwrap();
    assert_eq!(
        table.columns(),
        &["Price".to_string(), "Item".to_string(), "Price.1".to_string()]
    );
    assert_eq!(table.get(0, "Price.1"), &Cell::from(2));
}

#[test]
fn test_csv_quoted_fields() {
    let csv = b"Item,Note\n\"Coffee, large\",\"said \"\"hi\"\"\"\n";
    let table = parse_tabular(csv, TabularFormat::Csv).unwrap();
    assert_eq!(table.get(0, "Item"), &Cell::from("Coffee, large"));
    assert_eq!(table.get(0, "Note"), &Cell::from("said \"hi\""));
}

#[test]
fn test_header_only_csv_has_columns_and_no_rows() {
    let table = parse_tabular(b"A,B\n", TabularFormat::Csv).unwrap();
    assert_eq!(table.columns().len(), 2);
    assert!(table.is_empty());
}

#[test]
fn test_ragged_csv_is_a_parse_error() {
    let err = parse_tabular(b"A,B\n1,2\n3\n", TabularFormat::Csv).unwrap_err();
    assert!(matches!(err, SheetError::Csv(_)), "got {err:?}");
}

#[test]
fn test_invalid_utf8_is_a_parse_error() {
    let err = parse_tabular(b"A,B\n\xff\xfe,1\n", TabularFormat::Csv).unwrap_err();
    assert!(matches!(err, SheetError::Csv(_)), "got {err:?}");
}

#[test]
fn test_empty_csv_is_a_parse_error() {
    assert_eq!(
        parse_tabular(b"", TabularFormat::Csv).unwrap_err(),
        SheetError::Empty
    );
}

#[test]
fn test_corrupt_workbooks_are_parse_errors() {
    for format in [TabularFormat::Xlsx, TabularFormat::Xls, TabularFormat::Ods] {
        let err = parse_tabular(b"this is not a workbook", format).unwrap_err();
        assert!(
            matches!(err, SheetError::Workbook(_)),
            "Expected workbook error for {format:?}, got {err:?}"
        );
    }
}

#[test]
fn test_acquire_then_parse_file() {
    let raw = acquire_file("Sales.CSV", b"Item,Qty\nTea,3\n".to_vec()).unwrap();
    assert!(matches!(
        raw,
        RawInput::TabularBytes {
            format: TabularFormat::Csv,
            ..
        }
    ));

    let table = table_from_raw(&raw).unwrap();
    assert_eq!(table.get(0, "Qty"), &Cell::from(3));
}

#[test]
fn test_parse_failure_maps_to_acquisition_error() {
    let raw = acquire_file("broken.xlsx", b"garbage".to_vec()).unwrap();
    let err = table_from_raw(&raw).unwrap_err();
    assert!(matches!(err, AcquisitionError::Parse(_)), "got {err:?}");
}

const SALES_XLSX: &[u8] = include_bytes!("fixtures/sales.xlsx");

#[test]
fn test_xlsx_reads_first_sheet_with_typed_cells() {
    // --- 1. Act ---
    let raw = acquire_file("sales.xlsx", SALES_XLSX.to_vec()).unwrap();
    let table = table_from_raw(&raw).unwrap();

    // --- 2. Assert ---
    assert_eq!(
        table.columns(),
        &[
            "Date".to_string(),
            "Region".to_string(),
            "Revenue".to_string(),
            "Units".to_string()
        ]
    );
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(0, "Date"), &Cell::from("2024-03-09"));
    assert_eq!(table.get(1, "Date"), &Cell::from("2024-03-10"));
    assert_eq!(table.get(0, "Region"), &Cell::from("North"));
    assert_eq!(table.get(0, "Revenue"), &Cell::from(1200.5));
    assert_eq!(table.get(1, "Units"), &Cell::from(4.0));

    let kinds: Vec<ColumnKind> = infer_schema(&table).into_iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        [
            ColumnKind::Categorical,
            ColumnKind::Categorical,
            ColumnKind::Numeric,
            ColumnKind::Numeric
        ]
    );
}
