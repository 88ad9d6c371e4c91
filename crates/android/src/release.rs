//! Release pipelines
//!
//! Each operation is a fixed sequence: provision keystore, optionally clean,
//! run the Gradle build, then size the artifact. A failing stage stops the
//! pipeline and its error is returned unchanged. Nothing is retried or
//! rolled back.

use crate::artifact::ArtifactLocator;
use crate::error::{ReleaseError, Result};
use crate::gradle::{self, Gradle};
use crate::keystore::{DistinguishedName, KeystoreOutcome, KeystoreProvisioner, SigningConfig};
use crate::size::{SizeReport, SizeReporter};
use crate::variant::{ArtifactKind, BuildVariant};
use myclass_cli::output::{format_duration, Status};
use myclass_cli::progress;
use myclass_core::config::{ConfigSchema, SigningSection};
use myclass_core::process::CommandRunner;
use myclass_telemetry::Timer;
use std::fmt;
use std::path::PathBuf;

/// The named release operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    AnalyzeApkSize,
    CleanAndRebuild,
    GenerateKeystore,
    BuildSignedBundle,
    BuildSignedApk,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AnalyzeApkSize => "analyze-apk-size",
            Self::CleanAndRebuild => "clean-and-rebuild",
            Self::GenerateKeystore => "generate-keystore",
            Self::BuildSignedBundle => "build-signed-bundle",
            Self::BuildSignedApk => "build-signed-apk",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An external build to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStep {
    pub variant: BuildVariant,
    pub kind: ArtifactKind,
}

/// An artifact to size after the build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStep {
    pub variant: BuildVariant,
    pub kind: ArtifactKind,
    pub badging: bool,
}

/// Stages of one operation, fixed at construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub operation: Operation,
    pub provision_keystore: bool,
    pub clean: bool,
    pub build: Option<BuildStep>,
    pub report: Option<ReportStep>,
}

impl Pipeline {
    /// Build the APK (unless `build` is false), then report its size and badging
    pub fn analyze_apk_size(variant: BuildVariant, build: bool) -> Self {
        Self {
            operation: Operation::AnalyzeApkSize,
            provision_keystore: false,
            clean: false,
            build: build.then_some(BuildStep {
                variant,
                kind: ArtifactKind::Apk,
            }),
            report: Some(ReportStep {
                variant,
                kind: ArtifactKind::Apk,
                badging: true,
            }),
        }
    }

    pub fn clean_and_rebuild(variant: BuildVariant) -> Self {
        Self {
            operation: Operation::CleanAndRebuild,
            provision_keystore: false,
            clean: true,
            build: Some(BuildStep {
                variant,
                kind: ArtifactKind::Apk,
            }),
            report: Some(ReportStep {
                variant,
                kind: ArtifactKind::Apk,
                badging: false,
            }),
        }
    }

    pub fn generate_keystore() -> Self {
        Self {
            operation: Operation::GenerateKeystore,
            provision_keystore: true,
            clean: false,
            build: None,
            report: None,
        }
    }

    pub fn build_signed_bundle(variant: BuildVariant) -> Self {
        Self::signed(Operation::BuildSignedBundle, variant, ArtifactKind::AppBundle)
    }

    pub fn build_signed_apk(variant: BuildVariant) -> Self {
        Self::signed(Operation::BuildSignedApk, variant, ArtifactKind::Apk)
    }

    fn signed(operation: Operation, variant: BuildVariant, kind: ArtifactKind) -> Self {
        Self {
            operation,
            provision_keystore: true,
            clean: false,
            build: Some(BuildStep { variant, kind }),
            report: Some(ReportStep {
                variant,
                kind,
                badging: false,
            }),
        }
    }

    /// Number of stages that will run
    pub fn stage_count(&self) -> usize {
        usize::from(self.provision_keystore)
            + usize::from(self.clean)
            + usize::from(self.build.is_some())
            + usize::from(self.report.is_some())
    }
}

/// What happened to the artifact after the build
#[derive(Debug, Clone)]
pub enum ArtifactOutcome {
    Found(SizeReport),
    /// Not fatal: the caller is told to build first
    Missing {
        variant: BuildVariant,
        kind: ArtifactKind,
        path: PathBuf,
    },
}

/// Summary of a finished pipeline
#[derive(Debug, Clone)]
pub struct ReleaseReport {
    pub operation: Operation,
    pub keystore: Option<KeystoreOutcome>,
    pub build_task: Option<String>,
    pub artifact: Option<ArtifactOutcome>,
}

impl ReleaseReport {
    /// Human-readable result lines
    pub fn render(&self) -> String {
        let mut lines = Vec::new();

        match (self.operation, &self.keystore) {
            (Operation::GenerateKeystore, Some(KeystoreOutcome::Created(_))) => {
                lines.push("Keystore generated successfully!".to_string());
            }
            (Operation::GenerateKeystore, Some(KeystoreOutcome::AlreadyExists(_))) => {
                lines.push("Keystore already exists.".to_string());
            }
            (Operation::BuildSignedApk, _) => {
                lines.push("Signed APK built successfully!".to_string());
            }
            (Operation::BuildSignedBundle, _) => {
                lines.push("Signed app bundle built successfully!".to_string());
            }
            (Operation::CleanAndRebuild, _) => {
                lines.push(
                    "Clean rebuild completed. Check APK size for optimization results."
                        .to_string(),
                );
            }
            _ => {}
        }

        if let Some(outcome) = &self.keystore {
            lines.push(format!("Keystore location: {}", outcome.path().display()));
        }

        match &self.artifact {
            Some(ArtifactOutcome::Found(report)) => {
                let (label, location) = match report.artifact.kind {
                    ArtifactKind::Apk => ("APK", "APK"),
                    ArtifactKind::AppBundle => ("App Bundle", "Bundle"),
                };
                lines.push(format!("{} Size: {}", label, report));
                lines.push(format!("{} location: {}", location, report.path().display()));
            }
            Some(ArtifactOutcome::Missing { variant, kind, .. }) => {
                lines.push(format!(
                    "{} file not found. Build the {} {} first.",
                    kind.label(),
                    variant,
                    kind.label()
                ));
            }
            None => {}
        }

        lines.join("\n")
    }

    /// Badging output, if it was collected
    pub fn badging(&self) -> Option<&str> {
        match &self.artifact {
            Some(ArtifactOutcome::Found(report)) => report.badging.as_deref(),
            _ => None,
        }
    }
}

/// Settings the orchestrator needs from configuration
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
    pub locator: ArtifactLocator,
    pub android_dir: PathBuf,
    pub gradle: Option<String>,
    pub aapt: String,
    pub keytool: String,
    pub signing: SigningSection,
}

impl ReleaseSettings {
    pub fn from_schema(schema: &ConfigSchema) -> Self {
        Self {
            locator: ArtifactLocator::new(schema.project.output_root.clone()),
            android_dir: schema.project.android_dir.clone(),
            gradle: schema.tools.gradle.clone(),
            aapt: schema.tools.aapt.clone(),
            keytool: schema.tools.keytool.clone(),
            signing: schema.signing.clone(),
        }
    }
}

/// Runs [`Pipeline`]s against one project
pub struct ReleaseOrchestrator<R> {
    runner: R,
    settings: ReleaseSettings,
}

impl<R: CommandRunner> ReleaseOrchestrator<R> {
    pub fn new(runner: R, settings: ReleaseSettings) -> Self {
        Self { runner, settings }
    }

    /// Run every stage of `pipeline` in order, stopping at the first failure
    pub fn run(&self, pipeline: &Pipeline) -> Result<ReleaseReport> {
        let _span = tracing::info_span!("pipeline", operation = %pipeline.operation).entered();
        let total = pipeline.stage_count();
        let mut stage = 0;

        // Resolve everything that can fail on configuration before spawning anything
        let artifact_path = pipeline
            .report
            .map(|r| self.settings.locator.locate(r.variant, r.kind))
            .transpose()?;
        let signing = if pipeline.provision_keystore {
            Some(SigningConfig::from_section(&self.settings.signing)?)
        } else {
            // A partial configuration is left to Gradle's own properties
            SigningConfig::from_section(&self.settings.signing).ok()
        };

        let mut report = ReleaseReport {
            operation: pipeline.operation,
            keystore: None,
            build_task: None,
            artifact: None,
        };

        if let (true, Some(signing)) = (pipeline.provision_keystore, signing.as_ref()) {
            stage += 1;
            Status::step(stage, total, "Checking upload keystore");
            let dname = self.settings.signing.dname.clone().map(DistinguishedName::from);
            let outcome = self.timed("keystore", "Generating keystore", || {
                KeystoreProvisioner::new(&self.runner, &self.settings.keytool)
                    .provision(signing, dname.as_ref())
            })?;
            report.keystore = Some(outcome);
        }

        let gradle = Gradle::new(
            &self.runner,
            &self.settings.android_dir,
            self.settings.gradle.clone(),
        );

        if pipeline.clean {
            stage += 1;
            Status::step(stage, total, "Cleaning build outputs");
            self.timed(gradle::CLEAN_TASK, "Running clean", || gradle.clean())?;
        }

        if let Some(build) = pipeline.build {
            stage += 1;
            let task = gradle::build_task(build.variant, build.kind);
            Status::step(stage, total, &format!("Building {} {}", build.variant, build.kind));
            self.timed(&task, &format!("Running {}", task), || {
                gradle.build(build.variant, build.kind, signing.as_ref())
            })?;
            report.build_task = Some(task);
        }

        if let (Some(step), Some(path)) = (pipeline.report, artifact_path) {
            stage += 1;
            Status::step(stage, total, &format!("Measuring {}", step.kind));
            let reporter = SizeReporter::new(&self.runner, &self.settings.aapt);
            report.artifact = Some(match reporter.report(&path, step.kind, step.badging) {
                Ok(size) => ArtifactOutcome::Found(size),
                Err(ReleaseError::ArtifactMissing { kind, path }) => {
                    tracing::warn!(path = %path.display(), "Artifact not found");
                    ArtifactOutcome::Missing {
                        variant: step.variant,
                        kind,
                        path,
                    }
                }
                Err(e) => return Err(e),
            });
        }

        Ok(report)
    }

    /// Run one blocking stage behind a spinner and log its duration
    fn timed<T>(&self, name: &str, message: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let timer = Timer::start(name);
        let spinner = progress::spinner(message);
        let result = f();
        match &result {
            Ok(_) => {
                let done = format!("{} ({})", name, format_duration(timer.elapsed()));
                progress::finish_success(&spinner, &done);
            }
            Err(_) => progress::finish_error(&spinner, name),
        }
        timer.stop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use myclass_core::process::CommandResult;
    use myclass_core::testing::RecordingRunner;

    fn settings(root: &std::path::Path) -> ReleaseSettings {
        ReleaseSettings {
            locator: ArtifactLocator::new(Some(root.join("build"))),
            android_dir: root.to_path_buf(),
            gradle: Some("gradlew".to_string()),
            aapt: "aapt".to_string(),
            keytool: "keytool".to_string(),
            signing: SigningSection {
                key_alias: Some("upload".to_string()),
                key_password: Some("kp".to_string()),
                store_password: Some("sp".to_string()),
                store_file: root.join("upload.jks"),
                dname: None,
            },
        }
    }

    #[test]
    fn test_pipeline_table() {
        let analyze = Pipeline::analyze_apk_size(BuildVariant::Release, true);
        assert!(!analyze.provision_keystore);
        assert!(analyze.report.unwrap().badging);
        assert_eq!(analyze.stage_count(), 2);
        assert_eq!(Pipeline::analyze_apk_size(BuildVariant::Release, false).stage_count(), 1);

        let rebuild = Pipeline::clean_and_rebuild(BuildVariant::Release);
        assert!(rebuild.clean);
        assert_eq!(rebuild.stage_count(), 3);

        let keystore = Pipeline::generate_keystore();
        assert!(keystore.build.is_none() && keystore.report.is_none());
        assert_eq!(keystore.stage_count(), 1);

        let bundle = Pipeline::build_signed_bundle(BuildVariant::Release);
        assert_eq!(bundle.build.unwrap().kind, ArtifactKind::AppBundle);
        assert_eq!(bundle.stage_count(), 3);

        assert_eq!(Pipeline::build_signed_apk(BuildVariant::Release).operation.name(), "build-signed-apk");
    }

    #[test]
    fn test_build_failure_skips_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("upload.jks"), b"ks").unwrap();
        let runner = RecordingRunner::with_handler(|spec| {
            if spec.program == "gradlew" {
                CommandResult::failed(17, "compilation error")
            } else {
                CommandResult::ok("")
            }
        });

        // A stale artifact from an earlier build must not be reported
        let stale = dir.path().join("build/outputs/apk/release");
        std::fs::create_dir_all(&stale).unwrap();
        std::fs::write(stale.join("app-release.apk"), b"old").unwrap();

        let orchestrator = ReleaseOrchestrator::new(&runner, settings(dir.path()));
        let err = orchestrator
            .run(&Pipeline::analyze_apk_size(BuildVariant::Release, true))
            .unwrap_err();

        assert_eq!(err.exit_code(), 17);
        assert_eq!(runner.calls_to("aapt"), 0);
    }

    #[test]
    fn test_keytool_failure_skips_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.signing.dname = Some(myclass_core::config::DnameConfig {
            common_name: "MyClass Teacher".to_string(),
            organizational_unit: "Mobile".to_string(),
            organization: "FusionLKit".to_string(),
            locality: "Colombo".to_string(),
            state: "Western".to_string(),
            country: "LK".to_string(),
        });
        let runner = RecordingRunner::with_handler(|spec| {
            if spec.program == "keytool" {
                CommandResult::failed(5, "keytool error: java.lang.Exception")
            } else {
                CommandResult::ok("")
            }
        });

        let err = ReleaseOrchestrator::new(&runner, settings)
            .run(&Pipeline::build_signed_bundle(BuildVariant::Release))
            .unwrap_err();

        assert_eq!(err.exit_code(), 5);
        assert_eq!(runner.calls_to("keytool"), 1);
        assert_eq!(runner.calls_to("gradlew"), 0);
        assert_eq!(runner.calls_to("aapt"), 0);
    }

    #[test]
    fn test_clean_failure_skips_assemble() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::with_handler(|spec| {
            if spec.args.first().map(String::as_str) == Some(gradle::CLEAN_TASK) {
                CommandResult::failed(2, "Could not delete build directory")
            } else {
                CommandResult::ok("")
            }
        });

        let err = ReleaseOrchestrator::new(&runner, settings(dir.path()))
            .run(&Pipeline::clean_and_rebuild(BuildVariant::Release))
            .unwrap_err();

        assert_eq!(err.exit_code(), 2);
        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert!(!calls.iter().any(|c| c.args.iter().any(|a| a == "assembleRelease")));
    }

    #[test]
    fn test_missing_credentials_fail_before_any_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.signing.key_password = None;
        let runner = RecordingRunner::succeeding();

        let err = ReleaseOrchestrator::new(&runner, settings)
            .run(&Pipeline::build_signed_apk(BuildVariant::Release))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::NotConfigured { setting: "signing.key_password", .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_unset_output_root_fails_before_build() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = settings(dir.path());
        settings.locator = ArtifactLocator::new(None);
        let runner = RecordingRunner::succeeding();

        let err = ReleaseOrchestrator::new(&runner, settings)
            .run(&Pipeline::clean_and_rebuild(BuildVariant::Release))
            .unwrap_err();

        assert!(matches!(err, ReleaseError::NotConfigured { .. }));
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_missing_artifact_is_informational() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::succeeding();

        let report = ReleaseOrchestrator::new(&runner, settings(dir.path()))
            .run(&Pipeline::analyze_apk_size(BuildVariant::Release, false))
            .unwrap();

        assert!(matches!(report.artifact, Some(ArtifactOutcome::Missing { .. })));
        assert_eq!(
            report.render(),
            "APK file not found. Build the release APK first."
        );
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_clean_runs_before_build() {
        let dir = tempfile::tempdir().unwrap();
        let runner = RecordingRunner::succeeding();

        ReleaseOrchestrator::new(&runner, settings(dir.path()))
            .run(&Pipeline::clean_and_rebuild(BuildVariant::Release))
            .unwrap();

        let tasks: Vec<String> = runner.calls().iter().map(|c| c.args[0].clone()).collect();
        assert_eq!(tasks, vec!["clean", "assembleRelease"]);
    }

    #[test]
    fn test_generate_keystore_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("upload.jks"), b"ks").unwrap();
        let runner = RecordingRunner::succeeding();

        let report = ReleaseOrchestrator::new(&runner, settings(dir.path()))
            .run(&Pipeline::generate_keystore())
            .unwrap();

        assert!(report.render().starts_with("Keystore already exists."));
        assert!(runner.calls().is_empty());
    }
}
