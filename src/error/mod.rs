use std::collections::HashMap;
use std::fmt;

use reqwest::Error as ReqwestError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeJsonError;
use std::io::Error as IoError;

use crate::config::ConfigError;
use crate::loader::LoadError;
use crate::records::StoreError;
use crate::storage::SlotError;

/// A structured application error that can be serialized and surfaced to the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppError {
    /// Machine readable error code.
    pub code: String,
    /// Human friendly message that can be shown directly to the user.
    pub message: String,
    /// Arbitrary key/value pairs that provide additional context.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub context: HashMap<String, String>,
    /// Optional nested cause that preserves the error chain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<AppError>>,
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        AppError {
            code: code.into(),
            message: message.into(),
            context: HashMap::new(),
            cause: None,
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn context(&self) -> &HashMap<String, String> {
        &self.context
    }

    pub fn cause(&self) -> Option<&AppError> {
        self.cause.as_deref()
    }

    /// Adds a contextual key/value pair to the error.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets the nested cause for the error.
    pub fn with_cause(mut self, cause: impl Into<AppError>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.context.is_empty() {
            write!(f, "[{}] {}", self.code, self.message)
        } else {
            let mut pairs: Vec<_> = self.context.iter().collect();
            pairs.sort();
            write!(f, "[{}] {} ({:?})", self.code, self.message, pairs)
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

impl From<IoError> for AppError {
    fn from(error: IoError) -> Self {
        let code = format!("IO/{:?}", error.kind());
        let mut app_error = AppError::new(code, error.to_string());
        if let Some(os_code) = error.raw_os_error() {
            app_error = app_error.with_context("os_code", os_code.to_string());
        }
        app_error
    }
}

impl From<SerdeJsonError> for AppError {
    fn from(error: SerdeJsonError) -> Self {
        let code = if error.is_data() {
            "JSON/DATA"
        } else if error.is_syntax() {
            "JSON/SYNTAX"
        } else if error.is_eof() {
            "JSON/EOF"
        } else if error.is_io() {
            "JSON/IO"
        } else {
            "JSON/ERROR"
        };

        let mut app_error = AppError::new(code, error.to_string());
        let line = error.line();
        if line > 0 {
            app_error = app_error.with_context("line", line.to_string());
        }
        let column = error.column();
        if column > 0 {
            app_error = app_error.with_context("column", column.to_string());
        }
        app_error
    }
}

impl From<ReqwestError> for AppError {
    fn from(error: ReqwestError) -> Self {
        let code = if error.is_timeout() {
            "HTTP/TIMEOUT"
        } else if error.is_connect() {
            "HTTP/CONNECT"
        } else if error.is_decode() {
            "HTTP/DECODE"
        } else if error.is_status() {
            "HTTP/STATUS"
        } else {
            "HTTP/ERROR"
        };
        let mut app_error = AppError::new(code, error.to_string());
        if let Some(status) = error.status() {
            app_error = app_error.with_context("status", status.as_u16().to_string());
        }
        if let Some(url) = error.url() {
            app_error = app_error.with_context("url", url.to_string());
        }
        app_error
    }
}

impl From<SlotError> for AppError {
    fn from(error: SlotError) -> Self {
        match error {
            SlotError::QuotaExceeded { key, needed, quota } => {
                AppError::new("STORAGE/QUOTA_EXCEEDED", "Storage quota exceeded")
                    .with_context("key", key)
                    .with_context("needed", needed.to_string())
                    .with_context("quota", quota.to_string())
            }
            SlotError::Io(err) => AppError::from(err).with_context("source", "slot_store"),
            SlotError::Corrupt(err) => {
                AppError::new("STORAGE/CORRUPT", "Storage file is not readable")
                    .with_cause(AppError::from(err))
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        let message = error.to_string();
        match error {
            StoreError::Read(err) => {
                AppError::new("STORAGE/READ", message).with_cause(AppError::from(err))
            }
            StoreError::Write(err) => {
                AppError::new("STORAGE/WRITE", message).with_cause(AppError::from(err))
            }
            StoreError::Decode(err) => {
                AppError::new("STORAGE/DECODE", message).with_cause(AppError::from(err))
            }
            StoreError::Encode(err) => {
                AppError::new("STORAGE/ENCODE", message).with_cause(AppError::from(err))
            }
            StoreError::NotAList => AppError::new("STORAGE/INVALID_SHAPE", message),
            StoreError::InvalidPosition { position, len } => {
                AppError::new("RECORDS/INVALID_POSITION", message)
                    .with_context("position", position.to_string())
                    .with_context("len", len.to_string())
            }
        }
    }
}

impl From<LoadError> for AppError {
    fn from(error: LoadError) -> Self {
        let message = error.to_string();
        match error {
            LoadError::Absent => AppError::new("LOAD/ABSENT", message),
            LoadError::Storage(err) => {
                AppError::new("LOAD/STORAGE", message).with_cause(AppError::from(err))
            }
            LoadError::RemoteNotConfigured => AppError::new("LOAD/NO_REMOTE", message),
            LoadError::Malformed(err) => {
                AppError::new("LOAD/MALFORMED", message).with_cause(AppError::from(err))
            }
            LoadError::NotAList => AppError::new("LOAD/INVALID_SHAPE", message),
            LoadError::RemoteNotAList => AppError::new("LOAD/REMOTE_INVALID_SHAPE", message),
            LoadError::RemoteStatus(status) => AppError::new("LOAD/REMOTE_STATUS", message)
                .with_context("status", status.to_string()),
            LoadError::RemoteTransport(err) => {
                AppError::new("LOAD/REMOTE_TRANSPORT", message).with_cause(AppError::from(err))
            }
            LoadError::RemoteBody(err) => {
                AppError::new("LOAD/REMOTE_BODY", message).with_cause(AppError::from(err))
            }
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        let message = error.to_string();
        match error {
            ConfigError::Read { path, source } => AppError::new("CONFIG/READ", message)
                .with_context("path", path.display().to_string())
                .with_cause(AppError::from(source)),
            ConfigError::Parse { path, source } => AppError::new("CONFIG/PARSE", message)
                .with_context("path", path.display().to_string())
                .with_cause(AppError::new("TOML/PARSE", source.to_string())),
            ConfigError::NoDataDir => AppError::new("CONFIG/NO_DATA_DIR", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_error_with_context_and_cause() {
        let error = AppError::new("TEST/CODE", "Something went wrong")
            .with_context("entity", "project")
            .with_context("position", "3")
            .with_cause(AppError::new("TEST/INNER", "inner failure"));

        assert_eq!(error.code(), "TEST/CODE");
        assert_eq!(error.message(), "Something went wrong");
        assert_eq!(error.context().get("entity"), Some(&"project".to_string()));
        let cause = error.cause().expect("cause present");
        assert_eq!(cause.message(), "inner failure");
        assert_eq!(cause.code(), "TEST/INNER");
    }

    #[test]
    fn serde_json_errors_capture_position() {
        let err: SerdeJsonError =
            serde_json::from_str::<serde_json::Value>("{\"foo\": }").expect_err("invalid json");
        let app_error = AppError::from(err);
        assert_eq!(app_error.code(), "JSON/SYNTAX");
        assert!(app_error.context().contains_key("line"));
        assert!(app_error.context().contains_key("column"));
    }

    #[test]
    fn invalid_position_carries_bounds() {
        let app_error = AppError::from(StoreError::InvalidPosition { position: 4, len: 2 });
        assert_eq!(app_error.code(), "RECORDS/INVALID_POSITION");
        assert_eq!(app_error.context().get("position"), Some(&"4".to_string()));
        assert_eq!(app_error.context().get("len"), Some(&"2".to_string()));
    }

    #[test]
    fn quota_errors_map_to_storage_code() {
        let app_error = AppError::from(StoreError::Write(SlotError::QuotaExceeded {
            key: "project-cards-data".into(),
            needed: 40,
            quota: 10,
        }));
        assert_eq!(app_error.code(), "STORAGE/WRITE");
        let cause = app_error.cause().expect("slot cause");
        assert_eq!(cause.code(), "STORAGE/QUOTA_EXCEEDED");
        assert_eq!(cause.context().get("quota"), Some(&"10".to_string()));
    }

    #[test]
    fn remote_status_is_reported() {
        let app_error = AppError::from(LoadError::RemoteStatus(503));
        assert_eq!(app_error.code(), "LOAD/REMOTE_STATUS");
        assert_eq!(app_error.context().get("status"), Some(&"503".to_string()));
        assert!(app_error.message().contains("503"));
    }

    #[test]
    fn json_shape_is_flat_struct() {
        let error = AppError::new("VALIDATION", "nope").with_context("field", "name");
        let value = serde_json::to_value(&error).expect("serialize app error");
        assert_eq!(value.get("code").and_then(|v| v.as_str()), Some("VALIDATION"));
        assert_eq!(value.get("message").and_then(|v| v.as_str()), Some("nope"));
        assert_eq!(
            value
                .get("context")
                .and_then(|c| c.get("field"))
                .and_then(|v| v.as_str()),
            Some("name")
        );
        assert!(value.get("cause").is_none());
    }
}
