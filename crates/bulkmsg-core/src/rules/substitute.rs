use crate::domain::Field;
use crate::rules::columns::FieldMap;
use crate::rules::values::{
    format_amount, format_date_cell, is_amount_variable, is_date_variable,
};
use crate::table::{Cell, RecipientRow};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `{{name}}` is tried before `{name}` at every position.
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^{}]+)\}\}|\{([^{}]+)\}").expect("placeholder pattern compiles")
});

/// Alternative column names tried when no column carries the variable's own name.
pub const VARIABLE_ALIASES: [(&str, &[&str]); 3] = [
    ("배송업체", &["택배사", "배송사"]),
    ("송장번호", &["운송장번호", "택배번호"]),
    ("휴대폰번호", &["전화번호", "연락처", "핸드폰", "휴대폰"]),
];

fn aliases_for(name: &str) -> &'static [&'static str] {
    VARIABLE_ALIASES
        .iter()
        .find(|(variable, _)| *variable == name)
        .map(|(_, aliases)| *aliases)
        .unwrap_or(&[])
}

/// Distinct placeholder names in order of first appearance.
pub fn template_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = placeholder_name(&caps).trim().to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Fills every placeholder from the row. A variable with no value is replaced
/// by its bare name, so the result never contains `{{` or `}}`.
pub fn substitute(template: &str, row: &RecipientRow, fields: &FieldMap) -> String {
    let filled = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
        let name = placeholder_name(caps);
        resolve_variable(name.trim(), row, fields).unwrap_or_else(|| name.to_string())
    });
    strip_stray_braces(filled.into_owned())
}

fn placeholder_name<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

fn resolve_variable(name: &str, row: &RecipientRow, fields: &FieldMap) -> Option<String> {
    if let Some(field) = Field::from_variable(name) {
        if let Some(cell) = fields.cell(field, row) {
            return Some(format_field(field, cell));
        }
    }

    std::iter::once(name)
        .chain(aliases_for(name).iter().copied())
        .find_map(|column| row.get(column).filter(|cell| !cell.is_empty()))
        .map(|cell| format_named(name, cell))
}

fn format_field(field: Field, cell: &Cell) -> String {
    match field {
        Field::OrderDate => format_date_cell(cell),
        Field::OrderAmount => format_amount(&cell.display()),
        _ => cell.display(),
    }
}

fn format_named(name: &str, cell: &Cell) -> String {
    if is_date_variable(name) {
        format_date_cell(cell)
    } else if is_amount_variable(name) {
        format_amount(&cell.display())
    } else {
        cell.display()
    }
}

fn strip_stray_braces(mut text: String) -> String {
    while text.contains("{{") || text.contains("}}") {
        text = text.replace("{{", "").replace("}}", "");
    }
    text
}
