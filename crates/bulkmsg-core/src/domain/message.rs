use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageType {
    Sms,
    Lms,
    Mms,
}

impl MessageType {
    /// Attachments force MMS; otherwise long texts become LMS.
    pub fn infer(text: &str, has_image: bool, lms_threshold: usize) -> Self {
        if has_image {
            MessageType::Mms
        } else if text.chars().count() > lms_threshold {
            MessageType::Lms
        } else {
            MessageType::Sms
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Sms => "SMS",
            MessageType::Lms => "LMS",
            MessageType::Mms => "MMS",
        }
    }

    pub fn allows_subject(self) -> bool {
        !matches!(self, MessageType::Sms)
    }
}

/// One outbound message, in the shape the delivery API accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub to: String,
    pub from: String,
    pub text: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(rename = "imageId", default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}
