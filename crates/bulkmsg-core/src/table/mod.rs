//! Row/column view over uploaded recipient files.
//!
//! Files arrive as raw bytes (CSV or a multi-sheet spreadsheet) and are decoded
//! into a [`Workbook`]. One sheet of that workbook is then turned into a
//! [`Table`]: a header row plus one [`RecipientRow`] per data row, with the
//! same header quirks a dataframe loader would apply (`Unnamed: N` for blank
//! header cells, `.1` suffixes for duplicates).

pub(crate) mod delimited;
#[cfg(feature = "xlsx")]
mod spreadsheet;

use crate::error::{CoreError, Result};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub use delimited::CSV_SHEET_NAME;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(value) => value.trim().is_empty(),
            Cell::Number(value) => value.is_nan(),
            Cell::Bool(_) | Cell::DateTime(_) => false,
        }
    }

    /// String form of the cell as it would appear after a dataframe's `str()`.
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.trim().to_string(),
            Cell::Number(value) => format_number(*value),
            Cell::Bool(true) => "TRUE".to_string(),
            Cell::Bool(false) => "FALSE".to_string(),
            Cell::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        return String::new();
    }
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    format!("{value}")
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 0-based cell lookup; `cell(1, 0)` is spreadsheet cell A2.
    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }

    pub fn has_data_rows(&self) -> bool {
        let mut non_empty = self
            .rows
            .iter()
            .filter(|row| row.iter().any(|cell| !cell.is_empty()));
        non_empty.next().is_some() && non_empty.next().is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn single(sheet: Sheet) -> Self {
        Self {
            sheets: vec![sheet],
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Picks the sheet holding recipient rows: the preferred names first,
    /// then the remaining sheets in workbook order, skipping sheets without
    /// data rows. Sheets named in `template_sheets` come last unless they are
    /// also preferred.
    pub fn data_sheet<S: AsRef<str>, T: AsRef<str>>(
        &self,
        preferred: &[S],
        template_sheets: &[T],
    ) -> Result<&Sheet> {
        let mut seen = HashSet::new();
        let mut tried = Vec::new();
        let is_template =
            |name: &str| template_sheets.iter().any(|template| template.as_ref() == name);
        let sheet_names = || self.sheets.iter().map(|sheet| sheet.name.as_str());
        let candidates = preferred
            .iter()
            .map(|name| name.as_ref())
            .chain(sheet_names().filter(|name| !is_template(*name)))
            .chain(sheet_names().filter(|name| is_template(*name)));

        for name in candidates {
            if !seen.insert(name) {
                continue;
            }
            let Some(sheet) = self.sheet(name) else {
                continue;
            };
            tried.push(name.to_string());
            if sheet.has_data_rows() {
                return Ok(sheet);
            }
        }

        Err(CoreError::NoDataSheet { tried })
    }
}

/// One data row keyed by column name, in header order.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientRow {
    /// 1-based row number within the data rows.
    pub index: usize,
    cells: Vec<(String, Cell)>,
}

impl RecipientRow {
    pub fn new(index: usize, cells: Vec<(String, Cell)>) -> Self {
        Self { index, cells }
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, cell)| cell)
    }

    /// Display text of a non-empty cell.
    pub fn value(&self, column: &str) -> Option<String> {
        self.get(column)
            .filter(|cell| !cell.is_empty())
            .map(Cell::display)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<RecipientRow>,
}

impl Table {
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut rows = sheet
            .rows
            .iter()
            .skip_while(|row| row.iter().all(Cell::is_empty));
        let Some(header) = rows.next() else {
            return Self {
                columns: Vec::new(),
                rows: Vec::new(),
            };
        };
        let data: Vec<&Vec<Cell>> = rows
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        let width = data
            .iter()
            .map(|row| row.len())
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        let columns = header_names(header, width);

        let rows = data
            .into_iter()
            .enumerate()
            .map(|(position, row)| {
                let cells = columns
                    .iter()
                    .enumerate()
                    .map(|(column, name)| {
                        let cell = row.get(column).cloned().unwrap_or(Cell::Empty);
                        (name.clone(), cell)
                    })
                    .collect();
                RecipientRow::new(position + 1, cells)
            })
            .collect();

        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn header_names(header: &[Cell], width: usize) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(width);
    for index in 0..width {
        let base = match header.get(index) {
            Some(cell) if !cell.is_empty() => cell.display(),
            _ => format!("Unnamed: {index}"),
        };
        let mut name = base.clone();
        let mut suffix = 1;
        while names.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        names.push(name);
    }
    names
}

/// Raw table bytes already resident in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteContent {
    pub data: Vec<u8>,
    pub filename: Option<String>,
}

impl ByteContent {
    pub fn new(data: Vec<u8>, filename: Option<String>) -> Self {
        Self { data, filename }
    }
}

/// Where the caller's table comes from. Paths are read by the caller before
/// the engine runs.
#[derive(Debug, Clone)]
pub enum TableInput {
    Bytes(ByteContent),
    Path(PathBuf),
}

impl TableInput {
    pub fn resolve(self) -> Result<ByteContent> {
        match self {
            TableInput::Bytes(content) => Ok(content),
            TableInput::Path(path) => read_path(&path),
        }
    }
}

fn read_path(path: &Path) -> Result<ByteContent> {
    let data = fs::read(path).map_err(|source| CoreError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    Ok(ByteContent::new(data, filename))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Spreadsheet,
}

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

impl TableFormat {
    pub fn detect(content: &ByteContent) -> Result<Self> {
        let extension = content
            .filename
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(TableFormat::Csv),
            Some("xlsx" | "xlsm" | "xls" | "xlsb" | "ods") => Ok(TableFormat::Spreadsheet),
            Some(other) => Err(CoreError::UnsupportedFileType(other.to_string())),
            None => {
                if content.data.starts_with(ZIP_MAGIC) || content.data.starts_with(OLE_MAGIC) {
                    Ok(TableFormat::Spreadsheet)
                } else {
                    Ok(TableFormat::Csv)
                }
            }
        }
    }
}

pub fn decode_workbook(content: &ByteContent) -> Result<Workbook> {
    if content.data.is_empty() {
        return Err(CoreError::EmptyInput);
    }
    match TableFormat::detect(content)? {
        TableFormat::Csv => delimited::read_csv(&content.data),
        TableFormat::Spreadsheet => read_spreadsheet(&content.data),
    }
}

#[cfg(feature = "xlsx")]
fn read_spreadsheet(data: &[u8]) -> Result<Workbook> {
    spreadsheet::read_workbook(data)
}

#[cfg(not(feature = "xlsx"))]
fn read_spreadsheet(_data: &[u8]) -> Result<Workbook> {
    Err(CoreError::UnsupportedFileType(
        "spreadsheet support is not enabled".to_string(),
    ))
}
