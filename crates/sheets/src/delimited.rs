//! CSV parsing with per-column type inference.

use crate::{dedupe_headers, fill_blank_headers, SheetError};
use vizon::types::{Cell, Table};

/// The type shared by every non-empty value of a CSV column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnParse {
    Integer,
    Float,
    Boolean,
    Text,
}

fn parse_bool(field: &str) -> Option<bool> {
    if field.eq_ignore_ascii_case("true") {
        Some(true)
    } else if field.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_float(field: &str) -> Option<f64> {
    field.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Determines the narrowest type that accepts every non-empty field of a column.
fn sniff_column(fields: &[&str]) -> ColumnParse {
    let values: Vec<&str> = fields
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .collect();
    if values.is_empty() {
        return ColumnParse::Text;
    }
    if values.iter().all(|v| v.parse::<i64>().is_ok()) {
        return ColumnParse::Integer;
    }
    if values.iter().all(|v| parse_float(v).is_some()) {
        return ColumnParse::Float;
    }
    if values.iter().all(|v| parse_bool(v).is_some()) {
        return ColumnParse::Boolean;
    }
    ColumnParse::Text
}

fn to_cell(field: &str, parse: ColumnParse) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Null;
    }
    match parse {
        ColumnParse::Integer => trimmed.parse::<i64>().map_or(Cell::Null, Cell::from),
        ColumnParse::Float => parse_float(trimmed).map_or(Cell::Null, Cell::from),
        ColumnParse::Boolean => parse_bool(trimmed).map_or(Cell::Null, Cell::from),
        ColumnParse::Text => Cell::Text(field.to_string()),
    }
}

pub(crate) fn parse_csv(bytes: &[u8]) -> Result<Table, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() {
        return Err(SheetError::Empty);
    }
    let columns = dedupe_headers(fill_blank_headers(headers));

    let records = reader
        .records()
        .collect::<Result<Vec<csv::StringRecord>, _>>()?;

    let parses: Vec<ColumnParse> = (0..columns.len())
        .map(|i| {
            let fields: Vec<&str> = records.iter().map(|r| r.get(i).unwrap_or("")).collect();
            sniff_column(&fields)
        })
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            record
                .iter()
                .zip(&parses)
                .map(|(field, parse)| to_cell(field, *parse))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}
