//! Reading keyword tables from uploaded files.
//!
//! CSV files are read with the `csv` crate, spreadsheets (`.xlsx`, `.xls`)
//! with `calamine`. In both cases the first row is the header and every cell
//! is kept as text.

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use log::debug;
use serde::Serialize;

use crate::error::{KwcatError, Result};

/// Header names recognised as the keyword column, in priority order.
pub const KEYWORD_COLUMN_CANDIDATES: [&str; 5] = ["keyword", "keywords", "query", "search term", "term"];

const UNSUPPORTED_FILE: &str = "Unsupported file type. Upload .csv or .xlsx";
const NO_KEYWORD_COLUMN: &str = "Could not find keyword column. Please name it 'keyword' or 'query'.";

/// A rectangular table of text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeywordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl KeywordTable {
    /// Build a table, padding or truncating rows to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Single-column table from a list of keywords.
    pub fn from_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: vec!["keyword".to_string()],
            rows: keywords.into_iter().map(|k| vec![k.into()]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order.
    pub fn column(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect()
    }

    /// Whether a column holds text rather than numbers.
    ///
    /// A column is textual when at least one non-empty cell does not parse as
    /// a number.
    fn is_text_column(&self, index: usize) -> bool {
        self.rows.iter().any(|row| {
            row.get(index)
                .map(|cell| {
                    let cell = cell.trim();
                    !cell.is_empty() && cell.parse::<f64>().is_err()
                })
                .unwrap_or(false)
        })
    }
}

/// Locate the keyword column.
///
/// Header names are matched case-insensitively against
/// [`KEYWORD_COLUMN_CANDIDATES`]; failing that, the only textual column is
/// used.
pub fn find_keyword_column(table: &KeywordTable) -> Result<usize> {
    for candidate in KEYWORD_COLUMN_CANDIDATES {
        if let Some(index) = table
            .columns
            .iter()
            .position(|c| c.to_lowercase() == candidate)
        {
            return Ok(index);
        }
    }

    let text_columns: Vec<usize> = (0..table.columns.len())
        .filter(|i| table.is_text_column(*i))
        .collect();
    match text_columns.as_slice() {
        [only] => {
            debug!(
                "Using the only text column '{}' as keyword column",
                table.columns[*only]
            );
            Ok(*only)
        }
        _ => Err(KwcatError::input(NO_KEYWORD_COLUMN)),
    }
}

/// Read a keyword table from disk.
pub fn read_input_file<P: AsRef<Path>>(path: P) -> Result<KeywordTable> {
    let path = path.as_ref();
    let filename = path.to_string_lossy();
    // reject before touching the filesystem
    input_kind(&filename)?;
    let content = fs::read(path)?;
    read_input_bytes(&filename, content)
}

/// Read a keyword table from uploaded bytes, dispatching on the file name.
pub fn read_input_bytes(filename: &str, content: Vec<u8>) -> Result<KeywordTable> {
    match input_kind(filename)? {
        InputKind::Csv => read_csv(Cursor::new(content)),
        InputKind::Workbook => read_workbook(Cursor::new(content)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputKind {
    Csv,
    Workbook,
}

fn input_kind(filename: &str) -> Result<InputKind> {
    let name = filename.to_lowercase();
    if name.ends_with(".csv") {
        Ok(InputKind::Csv)
    } else if name.ends_with(".xlsx") || name.ends_with(".xls") {
        Ok(InputKind::Workbook)
    } else {
        Err(KwcatError::input(UNSUPPORTED_FILE))
    }
}

fn read_csv<R: Read>(reader: R) -> Result<KeywordTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(KeywordTable::new(columns, rows))
}

fn read_workbook(cursor: Cursor<Vec<u8>>) -> Result<KeywordTable> {
    let mut workbook = open_workbook_auto_from_rs(cursor)
        .map_err(|e| KwcatError::workbook(format!("cannot open workbook: {e}")))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| KwcatError::workbook("workbook has no sheets"))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| KwcatError::workbook(format!("cannot read sheet '{sheet_name}': {e}")))?;

    let mut rows_iter = range.rows();
    let columns: Vec<String> = rows_iter
        .next()
        .map(|header| header.iter().map(cell_to_string).collect())
        .unwrap_or_default();
    let rows = rows_iter
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(KeywordTable::new(columns, rows))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(n) => n.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
    }
}
