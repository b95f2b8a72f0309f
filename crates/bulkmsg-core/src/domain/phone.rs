use crate::error::{CoreError, Result};

pub const MIN_PHONE_DIGITS: usize = 10;
const INTERNATIONAL_PREFIX: &str = "82";

/// Reduces a raw phone cell to digits and rewrites a leading `82` country
/// code to the domestic `0` trunk prefix.
pub fn normalize_phone(value: &str) -> Result<String> {
    let digits: String = value.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(CoreError::InvalidPhone(value.trim().to_string()));
    }

    if let Some(rest) = digits.strip_prefix(INTERNATIONAL_PREFIX) {
        return Ok(format!("0{rest}"));
    }

    Ok(digits)
}

/// Sender identifiers only lose their separators; they are not validated.
pub fn normalize_sender(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|ch| !matches!(ch, '-' | ' '))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_phone, normalize_sender};

    #[test]
    fn normalize_phone_strips_formatting() {
        let value = normalize_phone("010-1234-5678").unwrap();
        assert_eq!(value, "01012345678");
    }

    #[test]
    fn normalize_phone_rewrites_country_code() {
        let value = normalize_phone("+82 10-1234-5678").unwrap();
        assert_eq!(value, "01012345678");
    }

    #[test]
    fn normalize_phone_rejects_short_values() {
        assert!(normalize_phone("1234-567").is_err());
        assert!(normalize_phone("   ").is_err());
        assert!(normalize_phone("phone").is_err());
    }

    #[test]
    fn normalize_phone_accepts_ten_digits() {
        let value = normalize_phone("(02) 123-45678").unwrap();
        assert_eq!(value, "0212345678");
    }

    #[test]
    fn normalize_sender_drops_hyphens() {
        assert_eq!(normalize_sender(" 010-3201-8824 "), "01032018824");
    }
}
