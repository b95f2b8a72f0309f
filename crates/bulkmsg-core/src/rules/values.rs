//! Locale formatting for substituted values. Every helper falls back to the
//! raw text when the value does not look like a date or an amount.

use crate::table::Cell;
use chrono::NaiveDate;

const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";
const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
const DATE_PREFIX_LEN: usize = 10;

const CURRENCY_SUFFIX: char = '원';

const DATE_KEYWORDS: [&str; 3] = ["일자", "날짜", "date"];
const AMOUNT_KEYWORDS: [&str; 4] = ["금액", "가격", "price", "amount"];

pub fn is_date_variable(name: &str) -> bool {
    let lower = name.to_lowercase();
    DATE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

pub fn is_amount_variable(name: &str) -> bool {
    let lower = name.to_lowercase();
    AMOUNT_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Date cells keep only their calendar date; text keeps its date prefix when
/// it is followed by a time-of-day suffix.
pub fn format_date_cell(cell: &Cell) -> String {
    match cell {
        Cell::DateTime(value) => value.format(DATE_OUTPUT_FORMAT).to_string(),
        other => format_date_text(&other.display()),
    }
}

pub fn format_date_text(raw: &str) -> String {
    let trimmed = raw.trim();
    match date_prefix(trimmed) {
        Some(prefix) => prefix.to_string(),
        None => trimmed.to_string(),
    }
}

fn date_prefix(value: &str) -> Option<&str> {
    let head = value.get(..DATE_PREFIX_LEN)?;
    let rest = &value[DATE_PREFIX_LEN..];
    if !(rest.is_empty() || rest.starts_with([' ', 'T'])) {
        return None;
    }
    DATE_INPUT_FORMATS
        .iter()
        .any(|format| NaiveDate::parse_from_str(head, format).is_ok())
        .then_some(head)
}

/// `50000` -> `50,000`; a `원` anywhere in the input is kept as a suffix.
pub fn format_amount(raw: &str) -> String {
    let trimmed = raw.trim();
    let integer_part = match trimmed.find('.') {
        Some(pos) if trimmed[pos + 1..].starts_with(|ch: char| ch.is_ascii_digit()) => {
            &trimmed[..pos]
        }
        _ => trimmed,
    };

    let digits: String = integer_part.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return trimmed.to_string();
    }

    let significant = digits.trim_start_matches('0');
    let significant = if significant.is_empty() { "0" } else { significant };

    let mut out = group_thousands(significant);
    if trimmed.contains(CURRENCY_SUFFIX) {
        out.push(CURRENCY_SUFFIX);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
