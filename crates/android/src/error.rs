use crate::variant::ArtifactKind;
use myclass_core::error::{exit_codes, ErrorCode, ErrorReport};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReleaseError>;

/// External tools the pipeline shells out to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Gradle,
    Aapt,
    Keytool,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gradle => "gradle",
            Self::Aapt => "aapt",
            Self::Keytool => "keytool",
        })
    }
}

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("{setting} is not configured")]
    NotConfigured {
        setting: &'static str,
        hint: &'static str,
    },

    #[error("{kind} file not found: {}", path.display())]
    ArtifactMissing { kind: ArtifactKind, path: PathBuf },

    #[error("{tool} failed with exit code {exit_code}: {command}")]
    SubprocessFailure {
        tool: Tool,
        command: String,
        exit_code: i32,
        stderr: String,
    },

    #[error(transparent)]
    Core(#[from] myclass_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReleaseError {
    pub(crate) fn not_configured(setting: &'static str, hint: &'static str) -> Self {
        Self::NotConfigured { setting, hint }
    }

    /// Error code for programmatic handling
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotConfigured { .. } => ErrorCode::NotConfigured,
            Self::ArtifactMissing { .. } => ErrorCode::ArtifactMissing,
            Self::SubprocessFailure { tool, .. } => match tool {
                Tool::Gradle => ErrorCode::GradleError,
                Tool::Aapt => ErrorCode::AaptError,
                Tool::Keytool => ErrorCode::KeystoreGenerationFailed,
            },
            Self::Core(e) => e.code,
            Self::Io(_) => ErrorCode::IoError,
        }
    }

    /// Process exit code for this failure.
    ///
    /// A failed child's own exit code is passed through unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotConfigured { .. } => exit_codes::CONFIG_ERROR,
            Self::SubprocessFailure { exit_code, .. } if *exit_code > 0 => *exit_code,
            Self::Core(e) if e.code == ErrorCode::CommandNotFound => exit_codes::COMMAND_NOT_FOUND,
            Self::Core(e) if e.code.is_config() => exit_codes::CONFIG_ERROR,
            _ => exit_codes::FAILURE,
        }
    }

    /// Recovery hint for the user, if any
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::NotConfigured { hint, .. } => Some((*hint).to_string()),
            Self::ArtifactMissing { kind, .. } => {
                Some(format!("Build the release {} first", kind.label()))
            }
            Self::Core(e) => e.suggestion.clone(),
            _ => None,
        }
    }

    /// Serializable form for JSON logs
    pub fn to_report(&self) -> ErrorReport {
        match self {
            Self::Core(e) => e.to_report(),
            other => {
                let mut err = myclass_core::Error::new(other.code(), other.to_string());
                err.suggestion = other.suggestion();
                err.to_report()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subprocess_exit_code_propagates() {
        let err = ReleaseError::SubprocessFailure {
            tool: Tool::Gradle,
            command: "./gradlew assembleRelease".to_string(),
            exit_code: 42,
            stderr: "FAILURE: Build failed".to_string(),
        };
        assert_eq!(err.exit_code(), 42);
        assert_eq!(err.code(), ErrorCode::GradleError);
    }

    #[test]
    fn test_signal_killed_child_maps_to_failure() {
        let err = ReleaseError::SubprocessFailure {
            tool: Tool::Keytool,
            command: "keytool -genkey".to_string(),
            exit_code: -1,
            stderr: String::new(),
        };
        assert_eq!(err.exit_code(), exit_codes::FAILURE);
    }

    #[test]
    fn test_not_configured_is_config_error() {
        let err = ReleaseError::not_configured("signing.store_password", "Set UPLOAD_STORE_PASSWORD");
        assert_eq!(err.exit_code(), exit_codes::CONFIG_ERROR);
        assert_eq!(err.to_string(), "signing.store_password is not configured");
        assert_eq!(err.suggestion().as_deref(), Some("Set UPLOAD_STORE_PASSWORD"));
    }

    #[test]
    fn test_report_carries_code_and_hint() {
        let report = ReleaseError::not_configured("project.output_root", "Pass --output-root")
            .to_report();
        assert_eq!(report.code_str, "E3005");
        assert_eq!(report.category, "Configuration");
        assert_eq!(report.suggestion.as_deref(), Some("Pass --output-root"));
    }

    #[test]
    fn test_missing_command_exit_code() {
        let err = ReleaseError::from(myclass_core::Error::command_not_found("aapt"));
        assert_eq!(err.exit_code(), exit_codes::COMMAND_NOT_FOUND);
    }
}
