pub mod field;
pub mod message;
pub mod phone;

pub use field::Field;
pub use message::{MessageRecord, MessageType};
pub use phone::{normalize_phone, normalize_sender, MIN_PHONE_DIGITS};
