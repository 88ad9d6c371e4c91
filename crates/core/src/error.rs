//! Coded errors for the release tools
//!
//! Every error carries an [`ErrorCode`] (`E3005` style), optional context
//! and an optional recovery suggestion. [`ErrorReport`] is the serializable
//! form used for JSON logs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Stable error codes, grouped by thousands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    Internal = 1000,

    IoError = 2000,
    FileNotFound = 2001,

    ConfigError = 3000,
    ConfigNotFound = 3001,
    ConfigParseError = 3002,
    InvalidConfigValue = 3004,
    NotConfigured = 3005,

    ProcessError = 5000,
    CommandNotFound = 5001,

    ArtifactMissing = 6001,

    KeystoreGenerationFailed = 7001,

    GradleError = 8002,
    AaptError = 8005,
}

impl ErrorCode {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn category(self) -> &'static str {
        match self {
            Self::Internal => "General",
            Self::IoError | Self::FileNotFound => "IO",
            Self::ConfigError
            | Self::ConfigNotFound
            | Self::ConfigParseError
            | Self::InvalidConfigValue
            | Self::NotConfigured => "Configuration",
            Self::ProcessError | Self::CommandNotFound => "Process",
            Self::ArtifactMissing => "Artifact",
            Self::KeystoreGenerationFailed => "Signing",
            Self::GradleError | Self::AaptError => "Build tools",
        }
    }

    /// Whether the user can fix this by changing settings
    pub fn is_config(self) -> bool {
        self.category() == "Configuration"
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[derive(Error, Debug)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub context: Option<String>,
    pub suggestion: Option<String>,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(context) = &self.context {
            write!(f, "\n  Context: {}", context)?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            suggestion: None,
            source: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Serializable snapshot of this error
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code,
            code_str: self.code.to_string(),
            category: self.code.category().to_string(),
            message: self.message.clone(),
            context: self.context.clone(),
            suggestion: self.suggestion.clone(),
            source: self.source.as_ref().map(ToString::to_string),
        }
    }

    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::FileNotFound,
            format!("File not found: {}", path.as_ref().display()),
        )
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    pub fn config_not_found(path: impl AsRef<Path>) -> Self {
        Self::new(
            ErrorCode::ConfigNotFound,
            format!("Configuration file not found: {}", path.as_ref().display()),
        )
        .with_suggestion("Create .myclass-android.toml or pass --config")
    }

    pub fn process(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ProcessError, message)
    }

    pub fn command_not_found(program: &str) -> Self {
        Self::new(
            ErrorCode::CommandNotFound,
            format!("Command not found: {}", program),
        )
        .with_suggestion(format!("Install {} or set its path under [tools]", program))
    }
}

/// Machine-readable error for JSON logs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub code_str: String,
    pub category: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Process exit codes
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    /// Missing or invalid settings
    pub const CONFIG_ERROR: i32 = 3;
    pub const COMMAND_NOT_FOUND: i32 = 127;
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let code = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorCode::FileNotFound,
            _ => ErrorCode::IoError,
        };
        Error::new(code, err.to_string()).with_source(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::new(ErrorCode::ConfigParseError, format!("TOML parse error: {}", err))
            .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_display() {
        assert_eq!(ErrorCode::FileNotFound.to_string(), "E2001");
        assert_eq!(ErrorCode::NotConfigured.to_string(), "E3005");
        assert_eq!(ErrorCode::GradleError.to_string(), "E8002");
    }

    #[test]
    fn test_categories_follow_thousands() {
        for code in [
            ErrorCode::Internal,
            ErrorCode::IoError,
            ErrorCode::ConfigParseError,
            ErrorCode::CommandNotFound,
            ErrorCode::ArtifactMissing,
            ErrorCode::KeystoreGenerationFailed,
            ErrorCode::AaptError,
        ] {
            let expected = match code.code() / 1000 {
                1 => "General",
                2 => "IO",
                3 => "Configuration",
                5 => "Process",
                6 => "Artifact",
                7 => "Signing",
                _ => "Build tools",
            };
            assert_eq!(code.category(), expected, "{code}");
        }
        assert!(ErrorCode::InvalidConfigValue.is_config());
        assert!(!ErrorCode::ProcessError.is_config());
    }

    #[test]
    fn test_display_includes_context_and_suggestion() {
        let err = Error::command_not_found("aapt").with_context("While reading badging");
        let text = err.to_string();
        assert!(text.starts_with("[E5001] Command not found: aapt"));
        assert!(text.contains("Context: While reading badging"));
        assert!(text.contains("[tools]"));
    }

    #[test]
    fn test_io_not_found_maps_to_file_not_found() {
        let err = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.code, ErrorCode::FileNotFound);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_report_serialization() {
        let report = Error::process("keytool crashed")
            .with_context("While generating keystore")
            .to_report();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["code"], "PROCESS_ERROR");
        assert_eq!(json["code_str"], "E5000");
        assert_eq!(json["category"], "Process");
        assert!(json.get("suggestion").is_none());
    }
}
