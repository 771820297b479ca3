//! Login form rules
//!
//! Errors are collected per field and returned, never thrown, so a front end
//! can show each one next to its input.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub const ALLOWED_EMAIL_DOMAINS: [&str; 2] = ["iyte.edu.tr", "std.iyte.edu.tr"];
pub const MIN_PASSWORD_LEN: usize = 8;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9._%+-]+@(?i:std\.)?(?i:iyte\.edu\.tr)$";

static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN));

/// Compiled once; a bad pattern stays an error instead of a panic
pub fn email_regex() -> Result<&'static Regex, &'static regex::Error> {
    EMAIL_RE.as_ref()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Institutional address: `@iyte.edu.tr` or `@std.iyte.edu.tr`
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email is required".to_string());
    }
    let re = match email_regex() {
        Ok(re) => re,
        Err(e) => return Some(format!("Email rule is broken: {e}")),
    };
    if !re.is_match(trimmed) {
        return Some(format!(
            "Email must end with @{} or @{}",
            ALLOWED_EMAIL_DOMAINS[0], ALLOWED_EMAIL_DOMAINS[1]
        ));
    }
    None
}

/// At least 8 characters with lower, upper, digit and special
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    let mut missing = Vec::new();
    if password.chars().count() < MIN_PASSWORD_LEN {
        missing.push(format!("at least {MIN_PASSWORD_LEN} characters"));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        missing.push("a lowercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        missing.push("an uppercase letter".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        missing.push("a digit".to_string());
    }
    if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
        missing.push("a special character".to_string());
    }
    if missing.is_empty() {
        None
    } else {
        Some(format!("Password needs {}", missing.join(", ")))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember_me: false,
        }
    }

    pub fn remember(mut self, remember_me: bool) -> Self {
        self.remember_me = remember_me;
        self
    }

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(msg) = validate_email(&self.email) {
            errors.push(FieldError::new("email", msg));
        }
        if let Some(msg) = validate_password(&self.password) {
            errors.push(FieldError::new("password", msg));
        }
        errors
    }
}
