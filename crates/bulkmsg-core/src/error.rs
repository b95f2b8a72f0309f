use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("table file is empty")]
    EmptyInput,
    #[error("table file could not be decoded: {0}")]
    Undecodable(String),
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),
    #[error("no data sheet found (tried: {})", .tried.join(", "))]
    NoDataSheet { tried: Vec<String> },
    #[error("recipient file has no header row")]
    MissingHeader,
    #[error("no valid phone numbers")]
    NoRecipients,
    #[error("invalid phone number: {0}")]
    InvalidPhone(String),
    #[error("failed to write starter file: {0}")]
    Encode(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] CoreError),
    #[error("no phone number column found; add a column such as 휴대폰번호")]
    MissingPhoneColumn,
    #[error("sender number is required")]
    MissingSender,
    #[error("no eligible rows: {0}")]
    NoEligibleRows(NoEligibleReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoEligibleReason {
    /// The table has a header but no data rows.
    EmptyTable,
    /// A send-flag column exists and no row is checked.
    NoneSelected,
    /// Every selected row had a missing or invalid phone number.
    NoValidPhone,
}

impl std::fmt::Display for NoEligibleReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            NoEligibleReason::EmptyTable => "the table has no data rows",
            NoEligibleReason::NoneSelected => "no row is checked in the send column",
            NoEligibleReason::NoValidPhone => "no row has a valid phone number",
        };
        f.write_str(text)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
