pub mod attachment;
pub mod dry_run;
pub mod error;
pub mod report;
pub mod sender;
pub mod solapi;
pub mod storage;

pub use attachment::{Attachment, MAX_ATTACHMENT_BYTES};
pub use dry_run::DryRunSender;
pub use error::{DeliveryError, Result};
pub use report::{DeliveryReport, FailedRecipient, FailureReason};
pub use sender::{dispatch, MessageSender};
pub use solapi::{SolapiCredentials, SolapiSender};
pub use storage::{default_storage_dir, new_upload_key, FsObjectStore, ObjectStore};
