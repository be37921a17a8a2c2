use crate::error::{AppError, AppResult};
use regex::Regex;
use std::sync::LazyLock;

static SLUG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,61}[a-z0-9]$").unwrap());
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+\d{8,15}$").unwrap());

/// Organization slug: lowercase letters, digits and inner hyphens, 3-63 chars.
pub fn validate_slug(slug: &str) -> AppResult<()> {
    if !SLUG_RE.is_match(slug) || slug.contains("--") {
        return Err(AppError::ValidationError(format!(
            "Invalid slug '{slug}': use 3-63 lowercase letters, digits or hyphens"
        )));
    }
    Ok(())
}

pub fn validate_color(color: &str) -> AppResult<()> {
    if !COLOR_RE.is_match(color) {
        return Err(AppError::ValidationError(format!(
            "Invalid color '{color}': expected #rrggbb"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if !EMAIL_RE.is_match(email) {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }
    Ok(())
}

/// Normalize a phone number to `+<digits>`; numbers without a country code
/// are assumed Italian.
pub fn normalize_phone(phone: &str) -> AppResult<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let normalized = if phone.trim_start().starts_with('+') {
        format!("+{digits}")
    } else if let Some(rest) = digits.strip_prefix("00") {
        format!("+{rest}")
    } else {
        format!("+39{digits}")
    };

    if !PHONE_RE.is_match(&normalized) {
        return Err(AppError::ValidationError(format!(
            "Invalid phone number '{phone}'"
        )));
    }
    Ok(normalized)
}
