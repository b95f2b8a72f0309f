use crate::domain::{normalize_phone, Field};
use crate::rules::columns::FieldMap;
use crate::table::{Cell, RecipientRow};
use tracing::debug;

/// Send-flag values that select a row, compared after trim + uppercase.
pub const TRUTHY_FLAGS: [&str; 8] = ["TRUE", "1", "YES", "Y", "O", "V", "T", "OK"];

pub fn is_checked(cell: Option<&Cell>) -> bool {
    let Some(cell) = cell.filter(|cell| !cell.is_empty()) else {
        return false;
    };
    let flag = cell.display().trim().to_uppercase();
    TRUTHY_FLAGS.contains(&flag.as_str())
}

/// A row that passed the send flag and carries a usable phone number.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibleRow<'r> {
    pub row: &'r RecipientRow,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSelection<'r> {
    pub eligible: Vec<EligibleRow<'r>>,
    /// Rows the send flag left unchecked.
    pub filtered_out: usize,
    /// Checked rows whose phone cell was blank or too short.
    pub skipped_invalid_phone: usize,
}

impl RowSelection<'_> {
    /// Rows that survived the send flag, before phone validation.
    pub fn selected(&self) -> usize {
        self.eligible.len() + self.skipped_invalid_phone
    }
}

/// Without a send-flag column every row is selected.
pub fn select_rows<'r>(
    fields: &FieldMap,
    phone_column: &str,
    rows: &'r [RecipientRow],
) -> RowSelection<'r> {
    let flag_column = fields.column(Field::SendFlag);
    let mut selection = RowSelection::default();

    for row in rows {
        if let Some(column) = flag_column {
            if !is_checked(row.get(column)) {
                selection.filtered_out += 1;
                continue;
            }
        }

        let raw = row.value(phone_column).unwrap_or_default();
        match normalize_phone(&raw) {
            Ok(phone) => selection.eligible.push(EligibleRow { row, phone }),
            Err(err) => {
                debug!(row = row.index, "{err}");
                selection.skipped_invalid_phone += 1;
            }
        }
    }
    selection
}
