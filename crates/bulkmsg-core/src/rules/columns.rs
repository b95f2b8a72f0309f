use crate::domain::Field;
use crate::table::{Cell, RecipientRow};
use serde::Serialize;
use std::collections::BTreeMap;

/// Columns pandas-style readers generate for blank headers.
pub const UNNAMED_PREFIX: &str = "unnamed";

/// Keyword rules for one field. Exact names win over substring and prefix
/// matches anywhere in the header; within a stage the first column wins.
struct FieldRule {
    field: Field,
    exact: &'static [&'static str],
    contains: &'static [&'static str],
    prefix: &'static [&'static str],
}

const FIELD_RULES: [FieldRule; 8] = [
    FieldRule {
        field: Field::Phone,
        exact: &["휴대폰번호", "전화번호"],
        contains: &[
            "휴대폰", "휴대", "전화", "수신", "연락", "폰", "번호", "phone", "mobile", "tel",
        ],
        prefix: &[],
    },
    FieldRule {
        field: Field::Name,
        exact: &["이름"],
        contains: &["성명", "고객명", "고객", "수신자", "받는분", "name"],
        prefix: &[],
    },
    FieldRule {
        field: Field::OrderDate,
        exact: &["주문일자", "date"],
        contains: &[
            "주문일자",
            "주문날짜",
            "결제일자",
            "결제일",
            "주문일",
            "구매일",
            "order date",
            "orderdate",
        ],
        prefix: &[],
    },
    FieldRule {
        field: Field::OrderAmount,
        exact: &["주문금액"],
        contains: &[
            "주문금액", "결제금액", "금액", "가격", "비용", "price", "amount", "cost",
        ],
        prefix: &[],
    },
    FieldRule {
        field: Field::Product,
        exact: &["주문상품"],
        contains: &["주문상품", "상품명", "제품명", "상품", "제품", "product", "item"],
        prefix: &[],
    },
    FieldRule {
        field: Field::SendFlag,
        exact: &["조건", "발송여부", "send", "전송"],
        contains: &[],
        prefix: &[UNNAMED_PREFIX],
    },
    FieldRule {
        field: Field::Message,
        exact: &["메시지내용", "메시지", "내용", "message"],
        contains: &[],
        prefix: &[],
    },
    FieldRule {
        field: Field::Subject,
        exact: &["제목", "subject"],
        contains: &[],
        prefix: &[],
    },
];

impl FieldRule {
    fn matches_exact(&self, column: &str) -> bool {
        self.exact.iter().any(|name| *name == column)
    }

    fn matches_loose(&self, column: &str) -> bool {
        if self.prefix.iter().any(|prefix| column.starts_with(prefix)) {
            return true;
        }
        // Generated blank headers carry no meaning; "unnamed" would
        // otherwise satisfy the "name" keyword.
        !column.starts_with(UNNAMED_PREFIX)
            && self.contains.iter().any(|keyword| column.contains(keyword))
    }

    fn resolve<'c>(&self, columns: &[(&'c str, String)]) -> Option<&'c str> {
        columns
            .iter()
            .find(|(_, lower)| self.matches_exact(lower))
            .or_else(|| columns.iter().find(|(_, lower)| self.matches_loose(lower)))
            .map(|(original, _)| *original)
    }
}

/// Which table column carries each semantic field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap {
    columns: BTreeMap<Field, String>,
}

impl FieldMap {
    pub fn resolve<S: AsRef<str>>(columns: &[S]) -> Self {
        let normalized: Vec<(&str, String)> = columns
            .iter()
            .map(|column| {
                let column = column.as_ref();
                (column, column.trim().to_lowercase())
            })
            .collect();

        let columns = FIELD_RULES
            .iter()
            .filter_map(|rule| {
                rule.resolve(&normalized)
                    .map(|column| (rule.field, column.to_string()))
            })
            .collect();
        Self { columns }
    }

    pub fn column(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    pub fn cell<'r>(&self, field: Field, row: &'r RecipientRow) -> Option<&'r Cell> {
        self.column(field)
            .and_then(|column| row.get(column))
            .filter(|cell| !cell.is_empty())
    }

    pub fn value(&self, field: Field, row: &RecipientRow) -> Option<String> {
        self.cell(field, row).map(Cell::display)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.columns
            .iter()
            .map(|(field, column)| (*field, column.as_str()))
    }
}
