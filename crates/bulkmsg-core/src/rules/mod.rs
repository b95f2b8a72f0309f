pub mod columns;
pub mod filter;
pub mod format;
pub mod substitute;
pub mod template;
pub mod values;

pub use columns::FieldMap;
pub use filter::{is_checked, select_rows, EligibleRow, RowSelection, TRUTHY_FLAGS};
pub use format::format_message;
pub use substitute::{substitute, template_variables, VARIABLE_ALIASES};
pub use template::{
    extract_template, tidy_cell_template, Template, TemplateLookup, TemplateSource,
    DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_SHEETS,
};
pub use values::{format_amount, format_date_cell, format_date_text};
