//! Normalization of raw form values
//!
//! Request payloads arrive from HTML forms as well as JSON clients, so numeric
//! fields may be sent either as numbers or as text.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

pub static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("valid email pattern"));

/// Minimum count of digits and `+` signs in a phone number
const MIN_PHONE_CHARS: usize = 6;

/// A number or a piece of text holding one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(serde_json::Number),
    Text(String),
}

impl FieldValue {
    /// Text form, `None` when blank
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Text(s) => clean_text(Some(s.clone())),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n.into())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(FieldValue::Number)
            .unwrap_or_else(|| FieldValue::Text(n.to_string()))
    }
}

/// Trim text; blank becomes `None`
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse a price. The first `,` is read as the decimal separator.
pub fn parse_price(value: &str) -> Option<f64> {
    let normalized = value.trim().replacen(',', ".", 1);
    normalized
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

/// Parse a whole, non-negative number of years
pub fn parse_warranty(value: &str) -> Option<i64> {
    let years = value.trim().parse::<f64>().ok()?;
    if years.is_finite() && years >= 0.0 && years.fract() == 0.0 {
        Some(years as i64)
    } else {
        None
    }
}

/// Parse a positive record identifier
pub fn parse_id(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

pub fn is_valid_phone(value: &str) -> bool {
    value
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .count()
        >= MIN_PHONE_CHARS
}

/// Messages recorded by the `validator` derive for one field
pub fn field_messages(errors: &ValidationErrors, field: &str) -> Vec<String> {
    errors
        .field_errors()
        .get(field)
        .map(|list| {
            list.iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}.", field))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_accepts_comma_decimal() {
        assert_eq!(parse_price("12,50"), Some(12.5));
        assert_eq!(parse_price(" 1200 "), Some(1200.0));
        assert_eq!(parse_price("0"), Some(0.0));
    }

    #[test]
    fn price_rejects_negative_and_garbage() {
        assert_eq!(parse_price("-5"), None);
        assert_eq!(parse_price("abc"), None);
        assert_eq!(parse_price("inf"), None);
        assert_eq!(parse_price("1,2,3"), None);
    }

    #[test]
    fn warranty_must_be_whole() {
        assert_eq!(parse_warranty("3"), Some(3));
        assert_eq!(parse_warranty("2.0"), Some(2));
        assert_eq!(parse_warranty("1.5"), None);
        assert_eq!(parse_warranty("-1"), None);
    }

    #[test]
    fn phone_counts_digits_and_plus() {
        assert!(is_valid_phone("+596 696 12 34 56"));
        assert!(is_valid_phone("06-12-34"));
        assert!(!is_valid_phone("12 34"));
        assert!(!is_valid_phone("phone"));
    }

    #[test]
    fn email_pattern_matches_simple_addresses() {
        assert!(EMAIL_PATTERN.is_match("jane.doe@example.com"));
        assert!(!EMAIL_PATTERN.is_match("jane@example"));
        assert!(!EMAIL_PATTERN.is_match("jane doe@example.com"));
    }

    #[test]
    fn field_value_reads_numbers_and_text() {
        let value: FieldValue = serde_json::from_str("1200").unwrap();
        assert_eq!(value.as_text().as_deref(), Some("1200"));
        let value: FieldValue = serde_json::from_str("\"  \"").unwrap();
        assert_eq!(value.as_text(), None);
    }

    #[test]
    fn clean_text_drops_blank() {
        assert_eq!(clean_text(Some("  Dell ".into())), Some("Dell".into()));
        assert_eq!(clean_text(Some("   ".into())), None);
        assert_eq!(clean_text(None), None);
    }
}
