//! # Table Types
//!
//! The normalized column/record structure consumed by every dashboard feature,
//! plus the pure schema-inference step that classifies its columns.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// A single scalar table cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

static NULL_CELL: Cell = Cell::Null;

impl Cell {
    /// Builds a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Converts a scalar JSON value. Returns `None` for arrays and objects.
    pub fn from_scalar(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Cell::Null),
            Value::Bool(b) => Some(Cell::Bool(*b)),
            Value::Number(n) => Some(Cell::Number(n.clone())),
            Value::String(s) => Some(Cell::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Renders the cell the way it appears in CSV exports. Null is an empty field.
    pub fn render(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(Number::from(value))
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Cell::Null, Cell::Number)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

/// An ordered list of columns and the rows aligned to it.
///
/// Every row has exactly one cell per column. A key that a source record did not
/// carry is stored as `Cell::Null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Builds a table from a header and positional rows. Short rows are padded with nulls.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Cell::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Builds a table from keyed records.
    ///
    /// The column list is the union of keys across all records in first-seen order.
    pub fn from_records(records: Vec<Vec<(String, Cell)>>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in &records {
            for (key, _) in record {
                if !index.contains_key(key) {
                    index.insert(key.clone(), columns.len());
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .into_iter()
            .map(|record| {
                let mut row = vec![Cell::Null; columns.len()];
                for (key, cell) in record {
                    row[index[&key]] = cell;
                }
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// The number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the cell at `row` in `column`, or null when either does not exist.
    pub fn get(&self, row: usize, column: &str) -> &Cell {
        self.column_index(column)
            .and_then(|i| self.rows.get(row).map(|r| &r[i]))
            .unwrap_or(&NULL_CELL)
    }

    /// Iterates the cells of one column top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Cell> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.map(|i| &row[i]))
    }

    /// Serializes the table as CSV with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>, csv::Error> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(Cell::render))?;
        }
        writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))
    }

    /// Renders the table as an aligned plain-text grid with a leading row index.
    pub fn to_text(&self) -> String {
        let rendered: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| match c {
                        Cell::Null => "null".to_string(),
                        other => other.render(),
                    })
                    .collect()
            })
            .collect();

        let index_width = self.rows.len().saturating_sub(1).to_string().len();
        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                rendered
                    .iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        out.push_str(&" ".repeat(index_width));
        for (name, width) in self.columns.iter().zip(widths.iter().copied()) {
            out.push_str(&format!("  {name:>width$}"));
        }
        for (i, row) in rendered.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{i:<index_width$}"));
            for (value, width) in row.iter().zip(widths.iter().copied()) {
                out.push_str(&format!("  {value:>width$}"));
            }
        }
        out
    }
}

/// The inferred kind of a column, used to drive chart selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Every non-null cell is a number.
    Numeric,
    /// At least one text cell, or a mix of numbers and booleans.
    Categorical,
    /// Every non-null cell is a boolean.
    Boolean,
    /// Every cell is null.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

/// Classifies a sequence of cells.
pub fn column_kind<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> ColumnKind {
    let (mut numbers, mut bools, mut texts) = (false, false, false);
    for cell in cells {
        match cell {
            Cell::Null => {}
            Cell::Bool(_) => bools = true,
            Cell::Number(_) => numbers = true,
            Cell::Text(_) => texts = true,
        }
    }
    match (numbers, bools, texts) {
        (false, false, false) => ColumnKind::Empty,
        (true, false, false) => ColumnKind::Numeric,
        (false, true, false) => ColumnKind::Boolean,
        _ => ColumnKind::Categorical,
    }
}

/// Infers the kind of every column, in column order.
pub fn infer_schema(table: &Table) -> Vec<ColumnSchema> {
    table
        .columns()
        .iter()
        .map(|name| ColumnSchema {
            name: name.clone(),
            kind: column_kind(table.column(name)),
        })
        .collect()
}
