//! Artifact size reporting
//!
//! Reads the size of a built APK or bundle and, for APKs, relays
//! `aapt dump badging` output.

use crate::artifact::Artifact;
use crate::error::{ReleaseError, Result, Tool};
use crate::variant::ArtifactKind;
use myclass_core::process::{CommandRunner, CommandSpec};
use serde::Serialize;
use std::fmt;
use std::path::Path;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

/// Size of a built artifact
#[derive(Debug, Clone, Serialize)]
pub struct SizeReport {
    pub artifact: Artifact,
    /// Raw `aapt dump badging` output, when requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badging: Option<String>,
}

impl SizeReport {
    pub fn size_bytes(&self) -> u64 {
        self.artifact.size_bytes
    }

    /// Whole megabytes, truncated
    pub fn size_mb(&self) -> u64 {
        self.artifact.size_bytes / BYTES_PER_MB
    }

    /// Absolute artifact path
    pub fn path(&self) -> &Path {
        &self.artifact.path
    }
}

impl fmt::Display for SizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} MB ({} bytes)", self.size_mb(), self.size_bytes())
    }
}

/// Measures artifacts after the external build has finished
pub struct SizeReporter<R> {
    runner: R,
    aapt: String,
}

impl<R: CommandRunner> SizeReporter<R> {
    pub fn new(runner: R, aapt: impl Into<String>) -> Self {
        Self {
            runner,
            aapt: aapt.into(),
        }
    }

    /// Size the artifact at `path`.
    ///
    /// Returns [`ReleaseError::ArtifactMissing`] without spawning anything
    /// when the file is absent. Badging is skipped for bundles since `aapt`
    /// only reads APKs.
    pub fn report(&self, path: &Path, kind: ArtifactKind, badging: bool) -> Result<SizeReport> {
        let path = std::path::absolute(path)?;

        let metadata = match std::fs::metadata(&path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err(ReleaseError::ArtifactMissing { kind, path }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ReleaseError::ArtifactMissing { kind, path });
            }
            Err(e) => return Err(e.into()),
        };

        let artifact = Artifact {
            kind,
            path,
            size_bytes: metadata.len(),
        };
        tracing::info!(
            path = %artifact.path.display(),
            size_bytes = artifact.size_bytes,
            "Artifact measured"
        );

        let badging = if badging && kind == ArtifactKind::Apk {
            Some(self.badging(&artifact.path)?)
        } else {
            if badging {
                tracing::debug!("Skipping badging for {}", kind);
            }
            None
        };

        Ok(SizeReport { artifact, badging })
    }

    fn badging(&self, apk: &Path) -> Result<String> {
        let spec = CommandSpec::new(&self.aapt)
            .args(["dump", "badging"])
            .arg(apk.to_string_lossy());

        let result = self.runner.run(&spec)?;
        if !result.success {
            return Err(ReleaseError::SubprocessFailure {
                tool: Tool::Aapt,
                command: spec.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }
        Ok(result.stdout)
    }
}
