// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Input validation and normalization for request bodies.
//!
//! Each function returns the normalized value (trimmed, and lower-cased
//! where the field is case-insensitive) or a message suitable for a 422
//! response. Lengths are counted in characters.

pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 20;
pub const EMAIL_MAX_LEN: usize = 255;
pub const TOPIC_NAME_MAX_LEN: usize = 255;
pub const QUESTION_MIN_LEN: usize = 10;
pub const QUESTION_MAX_LEN: usize = 5000;
pub const ANSWER_MIN_LEN: usize = 10;
pub const ANSWER_MAX_LEN: usize = 10000;
pub const IMAGE_URL_MAX_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

pub fn username(raw: &str) -> ValidationResult<String> {
    let username = raw.trim().to_lowercase();
    if username.is_empty() {
        return Err(ValidationError::new("Username is required"));
    }

    let len = username.chars().count();
    if len < USERNAME_MIN_LEN {
        return Err(ValidationError::new(format!(
            "Username must be at least {USERNAME_MIN_LEN} characters long"
        )));
    }
    if len > USERNAME_MAX_LEN {
        return Err(ValidationError::new(format!(
            "Username must be at most {USERNAME_MAX_LEN} characters long"
        )));
    }

    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-';
    if !username.chars().all(allowed) {
        return Err(ValidationError::new(
            "Username can only contain lowercase letters, numbers, underscores, and hyphens",
        ));
    }

    Ok(username)
}

pub fn email(raw: &str) -> ValidationResult<String> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::new("Email is required"));
    }
    if !is_plausible_email(&email) {
        return Err(ValidationError::new("Invalid email format"));
    }
    if email.chars().count() > EMAIL_MAX_LEN {
        return Err(ValidationError::new("Email is too long"));
    }
    Ok(email)
}

/// `local@domain.tld`: local part of `[a-z0-9._%+-]`, domain of `[a-z0-9.-]`,
/// alphabetic TLD of at least two letters.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let host_ok = !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    local_ok && host_ok && tld_ok
}

pub fn topic_name(raw: &str) -> ValidationResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ValidationError::new("Topic name is required"));
    }
    if name.chars().count() > TOPIC_NAME_MAX_LEN {
        return Err(ValidationError::new(format!(
            "Topic name is too long (max {TOPIC_NAME_MAX_LEN} characters)"
        )));
    }
    Ok(name.to_string())
}

pub fn question_text(raw: &str) -> ValidationResult<String> {
    bounded_text(raw, "Question", QUESTION_MIN_LEN, QUESTION_MAX_LEN)
}

pub fn answer_text(raw: &str) -> ValidationResult<String> {
    bounded_text(raw, "Answer", ANSWER_MIN_LEN, ANSWER_MAX_LEN)
}

fn bounded_text(raw: &str, field: &str, min: usize, max: usize) -> ValidationResult<String> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ValidationError::new(format!("{field} is required")));
    }

    let len = text.chars().count();
    if len < min {
        return Err(ValidationError::new(format!(
            "{field} must be at least {min} characters long"
        )));
    }
    if len > max {
        return Err(ValidationError::new(format!(
            "{field} is too long (max {max} characters)"
        )));
    }
    Ok(text.to_string())
}

/// Validate an optional image URL.
///
/// A blank value normalizes to `None`, which clears the image on update.
pub fn image_url(raw: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(url) = raw.map(str::trim).filter(|u| !u.is_empty()) else {
        return Ok(None);
    };

    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ValidationError::new("URL must start with http:// or https://"));
    }
    if url.chars().count() > IMAGE_URL_MAX_LEN {
        return Err(ValidationError::new("URL is too long"));
    }
    Ok(Some(url.to_string()))
}
