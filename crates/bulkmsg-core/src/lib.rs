pub mod domain;
pub mod dto;
pub mod engine;
pub mod error;
pub mod recipients;
pub mod rules;
pub mod starter;
pub mod table;

pub use domain::*;
pub use dto::*;
pub use engine::{
    EngineOptions, EngineRequest, GeneratedBatch, TemplateEngine, DEFAULT_DATA_SHEETS,
    DEFAULT_LMS_THRESHOLD, DEFAULT_PREVIEW_LIMIT,
};
pub use error::{CoreError, EngineError, NoEligibleReason};
pub use recipients::{
    compose_direct_messages, parse_recipient_csv, parse_recipient_list, DirectMessage,
};
pub use rules::*;
pub use starter::{StarterKind, AUTO_DATA_SHEET};
pub use table::{
    decode_workbook, ByteContent, Cell, RecipientRow, Sheet, Table, TableFormat, TableInput,
    Workbook,
};
