//! Recipient lists for direct-input sends, where every number receives the
//! same text and no table template is involved.

use crate::domain::{normalize_phone, MessageRecord, MessageType};
use crate::dto::RecipientList;
use crate::error::{CoreError, Result};
use crate::rules::format_message;
use crate::table::delimited::read_csv;
use tracing::debug;

const PHONE_COLUMN: usize = 1;
const NAME_COLUMN: usize = 0;

/// Splits on newlines when there are any, otherwise on commas.
pub fn parse_recipient_list(raw: &str) -> RecipientList {
    let entries: Vec<&str> = if raw.contains('\n') {
        raw.split('\n').collect()
    } else {
        raw.split(',').collect()
    };

    let mut list = RecipientList::default();
    for entry in entries.into_iter().map(str::trim).filter(|e| !e.is_empty()) {
        match normalize_phone(entry) {
            Ok(phone) => list.recipients.push(phone),
            Err(_) => list.invalid.push(entry.to_string()),
        }
    }
    list
}

/// Reads names from column A and phone numbers from column B, below a
/// required header row.
pub fn parse_recipient_csv(data: &[u8]) -> Result<RecipientList> {
    let workbook = read_csv(data)?;
    let mut rows = workbook
        .sheets
        .first()
        .map(|sheet| sheet.rows.iter())
        .into_iter()
        .flatten();
    if !rows.any(|row| row.iter().any(|cell| !cell.is_empty())) {
        return Err(CoreError::MissingHeader);
    }

    let mut list = RecipientList::default();
    for (index, row) in rows.enumerate() {
        let Some(raw_phone) = row.get(PHONE_COLUMN).map(|cell| cell.display()) else {
            debug!(row = index + 1, "row has no phone column");
            continue;
        };
        match normalize_phone(&raw_phone) {
            Ok(phone) => {
                let name = row
                    .get(NAME_COLUMN)
                    .map(|cell| cell.display())
                    .unwrap_or_default();
                list.recipients.push(phone);
                list.names.push(name);
            }
            Err(_) => list.invalid.push(raw_phone),
        }
    }

    if list.is_empty() {
        return Err(CoreError::NoRecipients);
    }
    Ok(list)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectMessage {
    pub text: String,
    pub sender: String,
    pub image_id: Option<String>,
    pub subject: Option<String>,
    pub lms_threshold: usize,
}

/// One record per recipient, all carrying the same formatted text.
pub fn compose_direct_messages(
    recipients: &[String],
    message: &DirectMessage,
) -> Vec<MessageRecord> {
    let message_type = MessageType::infer(
        &message.text,
        message.image_id.is_some(),
        message.lms_threshold,
    );
    let text = format_message(&message.text);
    let subject = message
        .subject
        .clone()
        .filter(|_| message_type.allows_subject());

    recipients
        .iter()
        .map(|to| MessageRecord {
            to: to.clone(),
            from: message.sender.clone(),
            text: text.clone(),
            message_type,
            image_id: message.image_id.clone(),
            subject: subject.clone(),
        })
        .collect()
}
