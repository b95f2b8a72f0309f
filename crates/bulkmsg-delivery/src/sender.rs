use crate::attachment::Attachment;
use crate::error::{DeliveryError, Result};
use crate::report::DeliveryReport;
use bulkmsg_core::MessageRecord;

/// A messaging provider that accepts the engine's records.
pub trait MessageSender {
    fn provider_name(&self) -> &'static str;
    fn send_one(&self, message: &MessageRecord) -> Result<DeliveryReport>;
    fn send_many(&self, messages: &[MessageRecord]) -> Result<DeliveryReport>;
    /// Returns the provider's id for the uploaded image.
    fn upload_image(&self, attachment: &Attachment) -> Result<String>;
}

/// Sends one record through `send_one` and larger batches through `send_many`.
pub fn dispatch(sender: &dyn MessageSender, messages: &[MessageRecord]) -> Result<DeliveryReport> {
    match messages {
        [] => Err(DeliveryError::EmptyBatch),
        [single] => sender.send_one(single),
        batch => sender.send_many(batch),
    }
}
