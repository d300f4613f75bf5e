pub mod accounts;
pub mod invites;
pub mod roles;
pub mod tenants;
pub mod users;

use regex::Regex;
use std::sync::LazyLock;

use crate::error::AppError;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Emails are stored trimmed and lowercased; every lookup goes through here.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalize and check the shape of an email address.
pub fn parse_email(email: &str) -> Result<String, AppError> {
    let email = normalize_email(email);
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(email)
}
