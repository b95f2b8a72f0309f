use crate::domain::MessageRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewEntry {
    /// 1-based position among the generated messages.
    pub index: usize,
    pub phone: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Engine outcome as returned to callers. Failures carry only `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<MessageRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<Vec<PreviewEntry>>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped_invalid_phone: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filtered_out: Option<usize>,
}

impl EngineResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            total: None,
            recipients: None,
            preview: None,
            message: message.into(),
            skipped_invalid_phone: None,
            filtered_out: None,
        }
    }
}

/// Phone numbers pulled from a free-form list or a two-column CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientList {
    pub recipients: Vec<String>,
    /// Names aligned with `recipients`; empty when the source had none.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Entries dropped for having too few digits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalid: Vec<String>,
}

impl RecipientList {
    pub fn count(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}
