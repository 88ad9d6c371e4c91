//! Process execution utilities
//!
//! Every external tool (Gradle, `aapt`, `keytool`) is spawned through the
//! [`CommandRunner`] trait so pipelines can be exercised against stubs.
//! [`SystemRunner`] is the real implementation.

use crate::error::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Result of a command execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,
    /// Exit code of the command
    pub exit_code: i32,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
}

impl CommandResult {
    /// Create from std::process::Output
    pub fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    /// A successful result with the given stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// A failed result with the given exit code and stderr
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

/// A command line to execute, with optional working directory and environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path
    pub program: String,
    /// Arguments, in order
    pub args: Vec<String>,
    /// Working directory for the child
    pub dir: Option<PathBuf>,
    /// Extra environment variables
    pub env: Vec<(String, String)>,
    /// Indices into `args` that must never be logged
    secret_args: Vec<usize>,
}

impl CommandSpec {
    /// Start building a command for `program`
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append a flag followed by a value that is masked in [`fmt::Display`]
    pub fn secret_arg(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(flag.into());
        self.secret_args.push(self.args.len());
        self.args.push(value.into());
        self
    }

    /// Run the command inside `dir`
    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Set an environment variable for the child
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Look up an environment variable set on this command
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for (i, arg) in self.args.iter().enumerate() {
            if self.secret_args.contains(&i) {
                write!(f, " ****")?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Spawns external commands and waits for them to exit
pub trait CommandRunner {
    /// Run `spec` to completion, capturing its output.
    ///
    /// A non-zero exit is reported through [`CommandResult::success`], not as
    /// an error; `Err` means the process could not be spawned at all.
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        (**self).run(spec)
    }
}

/// Runs commands on the host system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        tracing::debug!(command = %spec, dir = ?spec.dir, "Spawning process");

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(dir) = &spec.dir {
            cmd.current_dir(dir);
        }

        for (key, value) in &spec.env {
            cmd.env(key, value);
        }

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::command_not_found(&spec.program).with_source(e)
            } else {
                Error::process(format!("Failed to execute {}: {}", spec.program, e))
                    .with_source(e)
            }
        })?;

        let result = CommandResult::from_output(output);
        tracing::debug!(
            program = %spec.program,
            exit_code = result.exit_code,
            "Process exited"
        );
        Ok(result)
    }
}

/// Check if a command exists in PATH
pub fn command_exists(program: &str) -> bool {
    which_command(program).is_some()
}

/// Get the path to a command
pub fn which_command(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}
