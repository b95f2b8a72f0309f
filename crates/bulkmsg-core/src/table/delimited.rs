use super::{Cell, Sheet, Workbook};
use crate::error::{CoreError, Result};

pub const CSV_SHEET_NAME: &str = "Sheet1";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub(crate) fn read_csv(data: &[u8]) -> Result<Workbook> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    let text = std::str::from_utf8(data)
        .map_err(|err| CoreError::Undecodable(format!("csv is not valid UTF-8: {err}")))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| CoreError::Undecodable(err.to_string()))?;
        rows.push(record.iter().map(Cell::text).collect());
    }

    Ok(Workbook::single(Sheet::new(CSV_SHEET_NAME, rows)))
}
