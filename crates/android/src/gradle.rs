//! Gradle build system integration
//!
//! Runs wrapper tasks in the Android project directory. Shrinking, ProGuard
//! and signing all happen inside Gradle; this module only picks the task and
//! hands over credentials.

use crate::error::{ReleaseError, Result, Tool};
use crate::keystore::SigningConfig;
use crate::variant::{ArtifactKind, BuildVariant};
use myclass_core::process::{CommandResult, CommandRunner, CommandSpec};
use std::path::PathBuf;

pub const CLEAN_TASK: &str = "clean";

/// The wrapper script for this platform
pub fn wrapper() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "./gradlew"
    }
}

/// Task that produces `kind` for `variant`, e.g. `bundleRelease`
pub fn build_task(variant: BuildVariant, kind: ArtifactKind) -> String {
    format!("{}{}", kind.task_prefix(), variant.task_suffix())
}

/// Gradle launcher bound to one project directory
pub struct Gradle<R> {
    runner: R,
    project_dir: PathBuf,
    program: String,
}

impl<R: CommandRunner> Gradle<R> {
    /// Uses the platform wrapper unless `program` is given
    pub fn new(runner: R, project_dir: impl Into<PathBuf>, program: Option<String>) -> Self {
        Self {
            runner,
            project_dir: project_dir.into(),
            program: program.unwrap_or_else(|| wrapper().to_string()),
        }
    }

    /// Run a Gradle task; a non-zero exit becomes a `SubprocessFailure`
    pub fn run_task(&self, task: &str, env: &[(String, String)]) -> Result<CommandResult> {
        let mut spec = CommandSpec::new(&self.program)
            .arg(task)
            .current_dir(&self.project_dir);
        for (key, value) in env {
            spec = spec.env(key, value);
        }

        tracing::info!(task, dir = %self.project_dir.display(), "Running Gradle task");
        let result = self.runner.run(&spec)?;

        if !result.success {
            return Err(ReleaseError::SubprocessFailure {
                tool: Tool::Gradle,
                command: spec.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }
        Ok(result)
    }

    /// Assemble or bundle `variant`, passing signing credentials when known
    pub fn build(
        &self,
        variant: BuildVariant,
        kind: ArtifactKind,
        signing: Option<&SigningConfig>,
    ) -> Result<CommandResult> {
        let env = signing.map(SigningConfig::gradle_env).unwrap_or_default();
        if signing.is_none() && variant.profile().release_signing {
            tracing::debug!("No signing credentials given; Gradle falls back to its own properties");
        }
        self.run_task(&build_task(variant, kind), &env)
    }

    /// Delete previous build outputs
    pub fn clean(&self) -> Result<CommandResult> {
        self.run_task(CLEAN_TASK, &[])
    }
}
