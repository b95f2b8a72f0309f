use crate::attachment::Attachment;
use crate::error::{DeliveryError, Result};
use crate::report::DeliveryReport;
use crate::sender::MessageSender;
use bulkmsg_core::MessageRecord;
use tracing::info;
use uuid::Uuid;

/// Logs what would be sent and reports every record as delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunSender;

impl MessageSender for DryRunSender {
    fn provider_name(&self) -> &'static str {
        "dry-run"
    }

    fn send_one(&self, message: &MessageRecord) -> Result<DeliveryReport> {
        info!(
            to = %message.to,
            from = %message.from,
            kind = message.message_type.as_str(),
            chars = message.text.chars().count(),
            "dry run: message not sent"
        );
        Ok(DeliveryReport::delivered(1))
    }

    fn send_many(&self, messages: &[MessageRecord]) -> Result<DeliveryReport> {
        if messages.is_empty() {
            return Err(DeliveryError::EmptyBatch);
        }
        for message in messages {
            self.send_one(message)?;
        }
        Ok(DeliveryReport::delivered(messages.len()))
    }

    fn upload_image(&self, attachment: &Attachment) -> Result<String> {
        let image_id = format!("dry-run-{}", Uuid::new_v4().simple());
        info!(
            file = attachment.filename(),
            bytes = attachment.data().len(),
            %image_id,
            "dry run: image not uploaded"
        );
        Ok(image_id)
    }
}
