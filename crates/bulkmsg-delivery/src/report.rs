use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the provider refused one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    Validation,
    InsufficientBalance,
    RateLimit,
    ServerError,
    InvalidPhone,
    InvalidSender,
    BlockedNumber,
    Unknown,
}

impl FailureReason {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "ValidationError" => FailureReason::Validation,
            "InsufficientBalance" | "NotEnoughBalance" => FailureReason::InsufficientBalance,
            "RateLimitError" => FailureReason::RateLimit,
            "ServerError" | "HttpError" => FailureReason::ServerError,
            "InvalidPhoneNumber" => FailureReason::InvalidPhone,
            "InvalidFrom" => FailureReason::InvalidSender,
            "BlockedNumber" => FailureReason::BlockedNumber,
            _ => FailureReason::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FailureReason::Validation => "validation error",
            FailureReason::InsufficientBalance => "insufficient balance",
            FailureReason::RateLimit => "rate limit exceeded",
            FailureReason::ServerError => "server error",
            FailureReason::InvalidPhone => "invalid phone number",
            FailureReason::InvalidSender => "invalid sender number",
            FailureReason::BlockedNumber => "blocked number",
            FailureReason::Unknown => "unknown error",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecipient {
    pub to: String,
    pub reason: FailureReason,
    /// Provider code, kept when it did not map to a known reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl FailedRecipient {
    pub fn from_code(to: impl Into<String>, code: Option<&str>) -> Self {
        let reason = code.map_or(FailureReason::Unknown, FailureReason::from_code);
        let code = code
            .filter(|_| reason == FailureReason::Unknown)
            .map(str::to_string);
        Self {
            to: to.into(),
            reason,
            code,
        }
    }

    pub fn describe(&self) -> String {
        match &self.code {
            Some(code) => format!("{} (code {code})", self.reason),
            None => self.reason.to_string(),
        }
    }
}

/// Outcome of one dispatch. Failed recipients do not make the dispatch fail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReport {
    pub total: usize,
    pub failed_count: usize,
    pub failed: Vec<FailedRecipient>,
}

impl DeliveryReport {
    pub fn delivered(total: usize) -> Self {
        Self {
            total,
            failed_count: 0,
            failed: Vec::new(),
        }
    }

    pub fn with_failures(total: usize, failed: Vec<FailedRecipient>) -> Self {
        Self {
            total,
            failed_count: failed.len(),
            failed,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.total.saturating_sub(self.failed_count)
    }

    pub fn summary(&self) -> String {
        if self.failed_count == 0 {
            format!("{} messages sent", self.total)
        } else {
            format!(
                "{} of {} messages sent, {} failed",
                self.succeeded(),
                self.total,
                self.failed_count
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DeliveryReport, FailedRecipient, FailureReason};

    #[test]
    fn provider_codes_map_to_reasons() {
        assert_eq!(
            FailureReason::from_code("NotEnoughBalance"),
            FailureReason::InsufficientBalance
        );
        assert_eq!(FailureReason::from_code("HttpError"), FailureReason::ServerError);
        assert_eq!(FailureReason::from_code("InvalidFrom"), FailureReason::InvalidSender);
        assert_eq!(FailureReason::from_code("3059"), FailureReason::Unknown);
    }

    #[test]
    fn unknown_codes_are_kept_for_display() {
        let failed = FailedRecipient::from_code("01012345678", Some("3059"));
        assert_eq!(failed.describe(), "unknown error (code 3059)");

        let failed = FailedRecipient::from_code("01012345678", Some("BlockedNumber"));
        assert_eq!(failed.code, None);
        assert_eq!(failed.describe(), "blocked number");

        let failed = FailedRecipient::from_code("01012345678", None);
        assert_eq!(failed.reason, FailureReason::Unknown);
    }

    #[test]
    fn summary_counts_failures() {
        let report = DeliveryReport::with_failures(
            3,
            vec![FailedRecipient::from_code("01012345678", Some("InvalidPhoneNumber"))],
        );
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.summary(), "2 of 3 messages sent, 1 failed");
        assert_eq!(DeliveryReport::delivered(4).summary(), "4 messages sent");
    }
}
