use crate::error::{DeliveryError, Result};
use base64::{engine::general_purpose, Engine as _};
use std::fs;
use std::path::Path;

pub const MAX_ATTACHMENT_BYTES: usize = 200 * 1024;
const ALLOWED_MIME: &str = "image/jpeg";

/// An MMS image, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    filename: String,
    data: Vec<u8>,
}

impl Attachment {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let filename = filename.into();
        if data.len() > MAX_ATTACHMENT_BYTES {
            return Err(DeliveryError::FileTooLarge {
                size: data.len(),
                limit: MAX_ATTACHMENT_BYTES,
            });
        }
        let mime = mime_guess::from_path(&filename).first();
        match mime {
            Some(mime) if mime.essence_str() == ALLOWED_MIME => Ok(Self { filename, data }),
            Some(mime) => Err(DeliveryError::InvalidFileType(mime.essence_str().to_string())),
            None => Err(DeliveryError::InvalidFileType(filename)),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(filename, data)
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }
}
