//! Text formats shared by prevalidation, validation and normalization.

use once_cell::sync::Lazy;
use regex::Regex;

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-5][0-9a-f]{3}-[089ab][0-9a-f]{3}-[0-9a-f]{12}$").unwrap()
});

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\d{4}-\d\d-\d\dT\d\d:\d\d:\d\d(\.\d+)?(([+-]\d\d:\d\d)|Z)?$").unwrap()
});

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)*$").unwrap()
});

static NCODE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]*$").unwrap());

static INT_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[+-]?\d+").unwrap());

static FLOAT_PREFIX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap()
});

pub fn is_uuid(text: &str) -> bool {
    UUID_REGEX.is_match(text)
}

/// ISO-8601 date-time with optional fraction and offset.
pub fn is_date(text: &str) -> bool {
    DATE_REGEX.is_match(text)
}

pub fn is_email(text: &str) -> bool {
    EMAIL_REGEX.is_match(text)
}

/// Digits only. The empty string qualifies.
pub fn is_ncode(text: &str) -> bool {
    NCODE_REGEX.is_match(text)
}

/// Parses the leading integer of `text`, ignoring anything after it.
pub fn leading_int(text: &str) -> Option<i64> {
    INT_PREFIX_REGEX
        .find(text)
        .and_then(|m| m.as_str().trim().parse().ok())
}

/// Parses the leading decimal number of `text`, ignoring anything after it.
pub fn leading_float(text: &str) -> Option<f64> {
    FLOAT_PREFIX_REGEX
        .find(text)
        .and_then(|m| m.as_str().trim().parse().ok())
}
