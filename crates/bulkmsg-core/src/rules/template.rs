use crate::rules::format::{collapse_spaces, space_colons};
use crate::table::Workbook;
use serde::Serialize;

pub const DEFAULT_TEMPLATE: &str =
    "안녕하세요 {{이름}}님, {{주문일자}}에 주문하신 상품의 금액은 {{주문금액}}원입니다.";

pub const DEFAULT_TEMPLATE_SHEETS: [&str; 5] =
    ["자동메시지", "자동메시지템플릿", "sample", "template", "Sheet1"];

/// Zero-based (row, column) of the template cell: A2.
pub const TEMPLATE_CELL: (usize, usize) = (1, 0);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TemplateSource {
    Literal,
    Cell { sheet: String },
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Template {
    pub text: String,
    pub source: TemplateSource,
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateLookup<'a> {
    pub literal: Option<&'a str>,
    pub sheets: &'a [String],
    pub default_text: &'a str,
    /// The sheet rows are read from; it never doubles as a template sheet.
    pub data_sheet: Option<&'a str>,
}

/// A caller-supplied template wins, then the A2 cell of the first configured
/// template sheet that has one, then the default text.
pub fn extract_template(workbook: &Workbook, lookup: &TemplateLookup<'_>) -> Template {
    if let Some(literal) = lookup.literal.filter(|text| !text.trim().is_empty()) {
        return Template {
            text: literal.to_string(),
            source: TemplateSource::Literal,
        };
    }

    let (row, column) = TEMPLATE_CELL;
    for name in lookup.sheets {
        if lookup.data_sheet == Some(name.as_str()) {
            continue;
        }
        let Some(sheet) = workbook.sheet(name) else {
            continue;
        };
        let Some(cell) = sheet.cell(row, column).filter(|cell| !cell.is_empty()) else {
            continue;
        };
        return Template {
            text: tidy_cell_template(&cell.display()),
            source: TemplateSource::Cell {
                sheet: name.clone(),
            },
        };
    }

    Template {
        text: lookup.default_text.to_string(),
        source: TemplateSource::Default,
    }
}

/// Single-line templates typed into a spreadsheet cell get line breaks at the
/// phrases Korean store notices conventionally break on.
pub fn tidy_cell_template(raw: &str) -> String {
    let mut text = raw.replace("\r\n", "\n").replace('\r', "\n");

    if !text.contains('\n') {
        if let Some(pos) = text.find(']').filter(|pos| *pos > 0) {
            text.insert(pos + 1, '\n');
        }
        text = text
            .replace("님,", "님,\n")
            .replace("쇼핑몰입니다.", "쇼핑몰입니다")
            .replace("쇼핑몰입니다", "쇼핑몰입니다.\n")
            .replace("발송됩니다.", "발송됩니다")
            .replace("발송됩니다", "발송됩니다.\n")
            .replace('◎', "\n◎")
            .replace("감사합니다", "\n감사합니다");
        text = text
            .split('\n')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n");
    }

    while text.contains("\n\n") {
        text = text.replace("\n\n", "\n");
    }
    collapse_spaces(&space_colons(text.trim_matches('\n')))
}
