use crate::attachment::Attachment;
use crate::error::{DeliveryError, Result};
use crate::report::{DeliveryReport, FailedRecipient};
use crate::sender::MessageSender;
use bulkmsg_core::MessageRecord;
use serde::Deserialize;
use std::env;
use std::fmt;

pub const PROVIDER_NAME: &str = "solapi";

#[derive(Clone, PartialEq, Eq)]
pub struct SolapiCredentials {
    pub api_key: String,
    pub api_secret: String,
}

impl fmt::Debug for SolapiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolapiCredentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

impl SolapiCredentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Reads both values from the named environment variables.
    pub fn from_env(key_var: &str, secret_var: &str) -> Result<Self> {
        let read = |name: &str| {
            env::var(name)
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| DeliveryError::MissingCredentials(name.to_string()))
        };
        Ok(Self::new(read(key_var)?, read(secret_var)?))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendManyResponse {
    #[serde(default)]
    failed_message_list: Vec<FailedMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FailedMessage {
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    error_code: Option<serde_json::Value>,
    #[serde(default)]
    status_code: Option<serde_json::Value>,
}

impl FailedMessage {
    fn code(&self) -> Option<String> {
        self.error_code
            .as_ref()
            .or(self.status_code.as_ref())
            .and_then(|value| match value {
                serde_json::Value::String(code) => Some(code.clone()),
                serde_json::Value::Number(code) => Some(code.to_string()),
                _ => None,
            })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    file_id: Option<String>,
}

#[cfg_attr(not(feature = "solapi"), allow(dead_code))]
fn parse_send_many(total: usize, body: &str) -> Result<DeliveryReport> {
    let response: SendManyResponse = serde_json::from_str(body)?;
    let failed = response
        .failed_message_list
        .into_iter()
        .map(|failed| {
            let code = failed.code();
            FailedRecipient::from_code(
                failed.to.unwrap_or_else(|| "unknown".to_string()),
                code.as_deref(),
            )
        })
        .collect();
    Ok(DeliveryReport::with_failures(total, failed))
}

#[cfg_attr(not(feature = "solapi"), allow(dead_code))]
fn parse_upload(body: &str) -> Result<String> {
    let response: UploadResponse = serde_json::from_str(body)?;
    response
        .file_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DeliveryError::Parse("upload response has no fileId".to_string()))
}

#[cfg(feature = "solapi")]
mod imp {
    use super::{
        parse_send_many, parse_upload, Attachment, DeliveryError, DeliveryReport, MessageRecord,
        MessageSender, Result, SolapiCredentials, PROVIDER_NAME,
    };
    use chrono::Utc;
    use hmac::{Hmac, Mac};
    use reqwest::blocking::Client;
    use reqwest::header::AUTHORIZATION;
    use serde::Serialize;
    use sha2::Sha256;
    use std::time::Duration;
    use tracing::{debug, info};
    use url::Url;
    use uuid::Uuid;

    type HmacSha256 = Hmac<Sha256>;

    const SEND_PATH: &str = "messages/v4/send";
    const SEND_MANY_PATH: &str = "messages/v4/send-many";
    const UPLOAD_PATH: &str = "storage/v1/files";
    const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    #[derive(Serialize)]
    struct SendOneRequest<'a> {
        message: &'a MessageRecord,
    }

    #[derive(Serialize)]
    struct SendManyRequest<'a> {
        messages: &'a [MessageRecord],
    }

    #[derive(Serialize)]
    struct UploadRequest<'a> {
        file: String,
        #[serde(rename = "type")]
        kind: &'static str,
        name: &'a str,
    }

    /// `signature` is hex(HMAC-SHA256(secret, date + salt)).
    pub fn authorization_header(
        credentials: &SolapiCredentials,
        date: &str,
        salt: &str,
    ) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(credentials.api_secret.as_bytes())?;
        mac.update(date.as_bytes());
        mac.update(salt.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());
        Ok(format!(
            "HMAC-SHA256 apiKey={}, date={date}, salt={salt}, signature={signature}",
            credentials.api_key
        ))
    }

    #[derive(Debug, Clone)]
    pub struct SolapiSender {
        base_url: Url,
        credentials: SolapiCredentials,
        client: Client,
    }

    impl SolapiSender {
        pub fn new(
            base_url: &str,
            credentials: SolapiCredentials,
            timeout: Duration,
        ) -> Result<Self> {
            let mut base_url = Url::parse(base_url)?;
            if base_url.scheme() != "https" {
                return Err(DeliveryError::InvalidBaseUrl(format!(
                    "{base_url} must use https"
                )));
            }
            if !base_url.path().ends_with('/') {
                let path = format!("{}/", base_url.path());
                base_url.set_path(&path);
            }
            let client = Client::builder()
                .user_agent("bulkmsg")
                .timeout(timeout)
                .connect_timeout(Duration::from_secs(10))
                .build()?;
            Ok(Self {
                base_url,
                credentials,
                client,
            })
        }

        pub fn endpoint(&self, path: &str) -> Result<Url> {
            Ok(self.base_url.join(path)?)
        }

        fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<String> {
            let url = self.endpoint(path)?;
            let date = Utc::now().format(DATE_FORMAT).to_string();
            let salt = Uuid::new_v4().to_string();
            let authorization = authorization_header(&self.credentials, &date, &salt)?;

            debug!(%url, "posting to delivery API");
            let response = self
                .client
                .post(url)
                .header(AUTHORIZATION, authorization)
                .json(body)
                .send()?;
            let status = response.status();
            let text = response.text()?;
            if !status.is_success() {
                return Err(DeliveryError::Api {
                    status: status.as_u16(),
                    body: text,
                });
            }
            Ok(text)
        }
    }

    impl MessageSender for SolapiSender {
        fn provider_name(&self) -> &'static str {
            PROVIDER_NAME
        }

        fn send_one(&self, message: &MessageRecord) -> Result<DeliveryReport> {
            self.post(SEND_PATH, &SendOneRequest { message })?;
            info!(to = %message.to, "message accepted");
            Ok(DeliveryReport::delivered(1))
        }

        fn send_many(&self, messages: &[MessageRecord]) -> Result<DeliveryReport> {
            if messages.is_empty() {
                return Err(DeliveryError::EmptyBatch);
            }
            let body = self.post(SEND_MANY_PATH, &SendManyRequest { messages })?;
            let report = parse_send_many(messages.len(), &body)?;
            info!(
                total = report.total,
                failed = report.failed_count,
                "batch accepted"
            );
            Ok(report)
        }

        fn upload_image(&self, attachment: &Attachment) -> Result<String> {
            let body = self.post(
                UPLOAD_PATH,
                &UploadRequest {
                    file: attachment.to_base64(),
                    kind: "MMS",
                    name: attachment.filename(),
                },
            )?;
            let file_id = parse_upload(&body)?;
            info!(%file_id, "image uploaded");
            Ok(file_id)
        }
    }

}

#[cfg(not(feature = "solapi"))]
mod imp {
    use super::{
        Attachment, DeliveryError, DeliveryReport, MessageRecord, MessageSender, Result,
        SolapiCredentials, PROVIDER_NAME,
    };
    use std::time::Duration;

    const UNAVAILABLE: &str = "Solapi delivery requires the solapi feature";

    /// Never constructed; `new` always reports the missing feature.
    #[derive(Debug, Clone)]
    pub struct SolapiSender {
        _private: (),
    }

    impl SolapiSender {
        pub fn new(
            _base_url: &str,
            _credentials: SolapiCredentials,
            _timeout: Duration,
        ) -> Result<Self> {
            Err(DeliveryError::Unavailable(UNAVAILABLE.to_string()))
        }
    }

    impl MessageSender for SolapiSender {
        fn provider_name(&self) -> &'static str {
            PROVIDER_NAME
        }

        fn send_one(&self, _message: &MessageRecord) -> Result<DeliveryReport> {
            Err(DeliveryError::Unavailable(UNAVAILABLE.to_string()))
        }

        fn send_many(&self, _messages: &[MessageRecord]) -> Result<DeliveryReport> {
            Err(DeliveryError::Unavailable(UNAVAILABLE.to_string()))
        }

        fn upload_image(&self, _attachment: &Attachment) -> Result<String> {
            Err(DeliveryError::Unavailable(UNAVAILABLE.to_string()))
        }
    }

}

#[cfg(feature = "solapi")]
pub use imp::authorization_header;
pub use imp::SolapiSender;
