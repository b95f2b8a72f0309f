use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic columns the resolver looks for in an uploaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Phone,
    Name,
    OrderDate,
    OrderAmount,
    Product,
    SendFlag,
    Message,
    Subject,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::Phone,
        Field::Name,
        Field::OrderDate,
        Field::OrderAmount,
        Field::Product,
        Field::SendFlag,
        Field::Message,
        Field::Subject,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Phone => "phone",
            Field::Name => "name",
            Field::OrderDate => "order_date",
            Field::OrderAmount => "order_amount",
            Field::Product => "product",
            Field::SendFlag => "send_flag",
            Field::Message => "message",
            Field::Subject => "subject",
        }
    }

    /// Maps a template variable (`이름`, `name`, ...) to its well-known field.
    pub fn from_variable(name: &str) -> Option<Field> {
        match name.trim() {
            "이름" | "name" => Some(Field::Name),
            "주문일자" | "order_date" => Some(Field::OrderDate),
            "주문금액" | "order_amount" => Some(Field::OrderAmount),
            "주문상품" | "product" => Some(Field::Product),
            _ => None,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
