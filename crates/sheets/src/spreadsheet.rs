//! Workbook parsing via `calamine`. Only the first worksheet is read.

use crate::{dedupe_headers, fill_blank_headers, SheetError};
use calamine::{Data, DataType, Range, Reader};
use chrono::{NaiveDateTime, Timelike};
use std::fmt::Display;
use std::io::Cursor;
use tracing::debug;
use vizon::types::{Cell, Table};

pub(crate) fn parse_workbook<'a, R>(bytes: &'a [u8]) -> Result<Table, SheetError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: Display,
{
    let mut workbook = R::new(Cursor::new(bytes)).map_err(|e| SheetError::Workbook(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)?
        .map_err(|e| SheetError::Workbook(e.to_string()))?;
    table_from_range(&range)
}

/// Renders a workbook date as `YYYY-MM-DD`, adding ` HH:MM:SS` when the time is not midnight.
pub fn format_datetime(value: NaiveDateTime) -> String {
    let has_time = value.hour() != 0 || value.minute() != 0 || value.second() != 0;
    if has_time {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        value.format("%Y-%m-%d").to_string()
    }
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty | Data::Error(_) => Cell::Null,
        Data::Int(i) => Cell::from(*i),
        Data::Float(f) => Cell::from(*f),
        Data::Bool(b) => Cell::from(*b),
        Data::String(s) => Cell::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(value) => Cell::Text(format_datetime(value)),
            None => Cell::Text(cell.to_string()),
        },
        other => Cell::Text(other.to_string()),
    }
}

/// Converts a worksheet range: first row is the header, fully empty rows are skipped.
pub(crate) fn table_from_range(range: &Range<Data>) -> Result<Table, SheetError> {
    let mut rows = range.rows();
    let header = rows.next().ok_or(SheetError::Empty)?;
    let columns = dedupe_headers(fill_blank_headers(header.iter().map(header_name).collect()));

    let mut skipped = 0;
    let records: Vec<Vec<Cell>> = rows
        .filter(|row| {
            let empty = row.iter().all(|c| matches!(c, Data::Empty));
            if empty {
                skipped += 1;
            }
            !empty
        })
        .map(|row| row.iter().map(to_cell).collect())
        .collect();
    if skipped > 0 {
        debug!("Skipped {skipped} empty rows");
    }

    Ok(Table::new(columns, records))
}
