use super::{Cell, Sheet, Workbook};
use crate::error::{CoreError, Result};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::warn;

pub(crate) fn read_workbook(data: &[u8]) -> Result<Workbook> {
    let mut book = open_workbook_auto_from_rs(Cursor::new(data.to_vec()))
        .map_err(|err| CoreError::Undecodable(err.to_string()))?;

    let names: Vec<String> = book.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = match book.worksheet_range(&name) {
            Ok(range) => range,
            Err(err) => {
                warn!(sheet = %name, error = %err, "skipping unreadable sheet");
                continue;
            }
        };

        // Ranges start at the first used cell; keep absolute positions so A2
        // still means row 1, column 0.
        let (row_offset, column_offset) = range
            .start()
            .map(|(row, column)| (row as usize, column as usize))
            .unwrap_or((0, 0));

        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; column_offset];
            cells.extend(row.iter().map(convert_cell));
            rows.push(cells);
        }
        sheets.push(Sheet::new(name, rows));
    }

    Ok(Workbook::new(sheets))
}

fn convert_cell(value: &Data) -> Cell {
    match value {
        Data::Empty | Data::Error(_) => Cell::Empty,
        Data::String(text) => Cell::text(text.as_str()),
        Data::Int(number) => Cell::Number(*number as f64),
        Data::Float(number) => Cell::Number(*number),
        Data::Bool(flag) => Cell::Bool(*flag),
        Data::DateTime(stamp) => stamp
            .as_datetime()
            .map(Cell::DateTime)
            .unwrap_or_else(|| Cell::Number(stamp.as_f64())),
        Data::DateTimeIso(text) | Data::DurationIso(text) => Cell::text(text.as_str()),
    }
}
