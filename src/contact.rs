//! Contact form checks.
//!
//! Invalid input is reported with a message and left as typed; nothing is
//! silently removed from a field.

use chrono::{SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\s'.\-]*$").unwrap_or_else(|err| panic!("invalid name pattern: {err}"))
});
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\d\s\-()+]*$").unwrap_or_else(|err| panic!("invalid phone pattern: {err}"))
});
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .unwrap_or_else(|err| panic!("invalid email pattern: {err}"))
});

/// Remaining-character count below which the comments counter warns.
pub const NEAR_LIMIT: usize = 20;
pub const OUTPUT_HEADER: &str = "error-message-if-any:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

pub fn validate_name(value: &str) -> Result<(), FieldError> {
    if NAME_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::new(
            "name",
            "Invalid character entered in the Name section.",
        ))
    }
}

pub fn validate_phone(value: &str) -> Result<(), FieldError> {
    if PHONE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::new(
            "tel",
            "Invalid character entered in the Phone Number section.",
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentsCounter {
    pub remaining: usize,
    pub near_limit: bool,
}

impl CommentsCounter {
    pub fn message(&self) -> String {
        format!(
            "{} characters remaining for comments section.",
            self.remaining
        )
    }
}

pub fn comments_remaining(value: &str, max_len: usize) -> CommentsCounter {
    let remaining = max_len.saturating_sub(value.chars().count());
    CommentsCounter {
        remaining,
        near_limit: remaining < NEAR_LIMIT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoggedError {
    pub field: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub timestamp: String,
}

/// Every validation failure seen during a session, serialized into the
/// form's hidden `form-errors` field on submit.
#[derive(Debug, Clone, Default)]
pub struct FormErrorLog {
    entries: Vec<LoggedError>,
}

impl FormErrorLog {
    pub fn record(&mut self, error: &FieldError, value: Option<&str>) {
        self.entries.push(LoggedError {
            field: error.field.clone(),
            message: error.message.clone(),
            value: value.map(str::to_string),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
    }

    pub fn entries(&self) -> &[LoggedError] {
        &self.entries
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub tel: String,
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub errors: Vec<FieldError>,
    pub form_errors: String,
    pub output: String,
}

impl ContactForm {
    pub fn validate(&self, max_comments: usize) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Please fill out this field."));
        } else if let Err(err) = validate_name(&self.name) {
            errors.push(err);
        }
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Please fill out this field."));
        } else if !EMAIL_PATTERN.is_match(&self.email) {
            errors.push(FieldError::new("email", "Please enter an email address."));
        }
        if let Err(err) = validate_phone(&self.tel) {
            errors.push(err);
        }
        if self.comments.chars().count() > max_comments {
            errors.push(FieldError::new(
                "comments",
                format!("Please use no more than {max_comments} characters."),
            ));
        }
        errors
    }

    /// Validate, add the current errors to the session log and produce the
    /// hidden-field payload and output text.
    pub fn submit(
        &self,
        max_comments: usize,
        log: &mut FormErrorLog,
    ) -> serde_json::Result<SubmissionReport> {
        let errors = self.validate(max_comments);
        for err in &errors {
            log.record(err, Some(self.value_of(&err.field)));
        }
        let mut output = OUTPUT_HEADER.to_string();
        for err in &errors {
            output.push_str(&format!("\n- {}: {}", err.field, err.message));
        }
        Ok(SubmissionReport {
            form_errors: log.to_json()?,
            errors,
            output,
        })
    }

    fn value_of(&self, field: &str) -> &str {
        match field {
            "name" => &self.name,
            "email" => &self.email,
            "tel" => &self.tel,
            "comments" => &self.comments,
            _ => "",
        }
    }
}
