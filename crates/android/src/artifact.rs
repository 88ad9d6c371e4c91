//! Expected build output locations

use crate::error::{ReleaseError, Result};
use crate::variant::{ArtifactKind, BuildVariant};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A file produced by the external build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Resolves where Gradle writes APKs and bundles.
///
/// Follows `<root>/outputs/{apk|bundle}/<variant>/app-<variant>.<apk|aab>`.
#[derive(Debug, Clone, Default)]
pub struct ArtifactLocator {
    output_root: Option<PathBuf>,
}

impl ArtifactLocator {
    /// An empty path counts as unset
    pub fn new(output_root: Option<PathBuf>) -> Self {
        Self {
            output_root: output_root.filter(|p| !p.as_os_str().is_empty()),
        }
    }

    /// The configured output root
    pub fn output_root(&self) -> Result<&Path> {
        self.output_root.as_deref().ok_or_else(|| {
            ReleaseError::not_configured(
                "project.output_root",
                "Set project.output_root in .myclass-android.toml or pass --output-root",
            )
        })
    }

    /// Expected path of the `kind` artifact for `variant`
    pub fn locate(&self, variant: BuildVariant, kind: ArtifactKind) -> Result<PathBuf> {
        Ok(self
            .output_root()?
            .join("outputs")
            .join(kind.output_dir())
            .join(variant.name())
            .join(format!("app-{}.{}", variant.name(), kind.extension())))
    }
}
