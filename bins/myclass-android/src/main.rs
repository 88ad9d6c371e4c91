//! MyClassTeacher Android CLI
//!
//! Release tooling for the MyClassTeacher Flutter app: size analysis,
//! clean rebuilds, keystore generation and signed builds.

use anyhow::Result;
use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand};
use myclass_android::gradle;
use myclass_android::{
    ArtifactKind, ArtifactLocator, ArtifactOutcome, BuildVariant, PackagingRules, Pipeline,
    ReleaseError, ReleaseOrchestrator, ReleaseSettings,
};
use myclass_cli::output::{on_off, Status};
use myclass_core::config::{Config, ConfigSchema};
use myclass_core::error::exit_codes;
use myclass_core::process::{self, SystemRunner};
use myclass_telemetry::TelemetryConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "myclass-android")]
#[command(about = "Release tooling for the MyClassTeacher Android app")]
#[command(version)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase output verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Build output root of the app module; empty leaves it unset
    #[arg(long, global = true, env = "MYCLASS_OUTPUT_ROOT", value_parser = path_parser())]
    output_root: Option<PathBuf>,

    /// Upload keystore path
    #[arg(long, global = true, env = "MYCLASS_KEYSTORE", value_parser = path_parser())]
    keystore: Option<PathBuf>,

    /// Upload key alias
    #[arg(long, global = true, env = "UPLOAD_KEY_ALIAS")]
    key_alias: Option<String>,

    /// Upload key password
    #[arg(long, global = true, env = "UPLOAD_KEY_PASSWORD", hide_env_values = true)]
    key_password: Option<String>,

    /// Keystore password
    #[arg(long, global = true, env = "UPLOAD_STORE_PASSWORD", hide_env_values = true)]
    store_password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the release APK and report its size and badging
    #[command(name = "analyze-apk-size")]
    AnalyzeApkSize {
        /// Build variant
        #[arg(long, default_value = "release")]
        variant: BuildVariant,
        /// Measure the existing APK without building
        #[arg(long)]
        no_build: bool,
        /// Skip `aapt dump badging`
        #[arg(long)]
        no_badging: bool,
    },

    /// Clean build outputs, then rebuild the release APK
    #[command(name = "clean-and-rebuild")]
    CleanAndRebuild {
        /// Build variant
        #[arg(long, default_value = "release")]
        variant: BuildVariant,
    },

    /// Create the upload keystore if it does not exist
    #[command(name = "generate-keystore")]
    GenerateKeystore,

    /// Build a signed release app bundle
    #[command(name = "build-signed-bundle")]
    BuildSignedBundle {
        /// Build variant
        #[arg(long, default_value = "release")]
        variant: BuildVariant,
    },

    /// Build a signed release APK
    #[command(name = "build-signed-apk")]
    BuildSignedApk {
        /// Build variant
        #[arg(long, default_value = "release")]
        variant: BuildVariant,
    },

    /// Print the expected artifact path
    Locate {
        /// Build variant
        #[arg(long, default_value = "release")]
        variant: BuildVariant,
        /// Artifact kind: apk, bundle
        #[arg(long, default_value = "apk")]
        kind: ArtifactKind,
    },

    /// Show build variant settings and packaging rules
    Variants {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose environment
    Doctor,
}

/// Accepts empty paths, which clap's `PathBuf` parser rejects
fn path_parser() -> impl clap::builder::TypedValueParser<Value = PathBuf> {
    clap::builder::OsStringValueParser::new().map(PathBuf::from)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        owo_colors::set_override(false);
    }
    Status::set_quiet(cli.quiet);

    let mut telemetry = TelemetryConfig::from_verbosity(cli.verbose, cli.quiet);
    telemetry.json = cli.log_json;
    myclass_telemetry::init_with_config(telemetry)?;
    tracing::debug!(session = myclass_telemetry::session_id(), "Starting");

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            Status::error(&e.to_string());
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
    };
    apply_overrides(&mut config.schema, &cli);

    let exit_code = match cli.command {
        Commands::AnalyzeApkSize { variant, no_build, no_badging } => {
            let mut pipeline = Pipeline::analyze_apk_size(variant, !no_build);
            if let Some(report) = pipeline.report.as_mut() {
                report.badging = !no_badging;
            }
            run_pipeline(&config, &pipeline)
        }
        Commands::CleanAndRebuild { variant } => {
            run_pipeline(&config, &Pipeline::clean_and_rebuild(variant))
        }
        Commands::GenerateKeystore => {
            run_pipeline(&config, &Pipeline::generate_keystore())
        }
        Commands::BuildSignedBundle { variant } => {
            run_pipeline(&config, &Pipeline::build_signed_bundle(variant))
        }
        Commands::BuildSignedApk { variant } => {
            run_pipeline(&config, &Pipeline::build_signed_apk(variant))
        }
        Commands::Locate { variant, kind } => {
            run_locate(&config, variant, kind)
        }
        Commands::Variants { json } => {
            run_variants(&config, json)
        }
        Commands::Doctor => {
            run_doctor(&config)
        }
    };

    std::process::exit(exit_code);
}

/// Flags and environment win over the config file
fn apply_overrides(schema: &mut ConfigSchema, cli: &Cli) {
    if let Some(root) = &cli.output_root {
        schema.project.output_root = Some(root.clone());
    }
    if let Some(keystore) = cli.keystore.as_ref().filter(|p| !p.as_os_str().is_empty()) {
        schema.signing.store_file = keystore.clone();
    }
    if let Some(alias) = &cli.key_alias {
        schema.signing.key_alias = Some(alias.clone());
    }
    if let Some(password) = &cli.key_password {
        schema.signing.key_password = Some(password.clone());
    }
    if let Some(password) = &cli.store_password {
        schema.signing.store_password = Some(password.clone());
    }
}

fn run_pipeline(config: &Config, pipeline: &Pipeline) -> i32 {
    Status::header(&format!("myclass-android {}", pipeline.operation));

    let orchestrator =
        ReleaseOrchestrator::new(SystemRunner, ReleaseSettings::from_schema(&config.schema));

    match orchestrator.run(pipeline) {
        Ok(report) => {
            if let Some(ArtifactOutcome::Missing { path, .. }) = &report.artifact {
                Status::warning(&format!("Expected at {}", path.display()));
            }
            Status::result(&report.render());
            if let Some(badging) = report.badging() {
                Status::relay(badging);
            }
            exit_codes::SUCCESS
        }
        Err(e) => print_error(&e),
    }
}

fn print_error(err: &ReleaseError) -> i32 {
    if let Ok(report) = serde_json::to_string(&err.to_report()) {
        tracing::debug!(%report, "Command failed");
    }
    Status::error(&err.to_string());
    if let ReleaseError::SubprocessFailure { stderr, .. } = err {
        if !stderr.trim().is_empty() {
            eprintln!("{}", stderr.trim_end());
        }
    }
    // Core errors already carry their suggestion in the message
    let suggestion = match err {
        ReleaseError::Core(_) => None,
        _ => err.suggestion(),
    };
    if let Some(suggestion) = suggestion {
        Status::info(&suggestion);
    }
    err.exit_code()
}

fn run_locate(config: &Config, variant: BuildVariant, kind: ArtifactKind) -> i32 {
    let locator = ArtifactLocator::new(config.schema.project.output_root.clone());
    match locator.locate(variant, kind) {
        Ok(path) => {
            let path = std::path::absolute(&path).unwrap_or(path);
            Status::result(&path.display().to_string());
            exit_codes::SUCCESS
        }
        Err(e) => print_error(&e),
    }
}

fn run_variants(config: &Config, json: bool) -> i32 {
    let rules = match PackagingRules::from_config(&config.schema.packaging) {
        Ok(rules) => rules,
        Err(e) => return print_error(&e),
    };
    let profiles: Vec<_> = BuildVariant::ALL.iter().map(BuildVariant::profile).collect();

    if json {
        let value = serde_json::json!({
            "variants": profiles,
            "packaging": rules,
        });
        return match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                Status::result(&text);
                exit_codes::SUCCESS
            }
            Err(e) => {
                Status::error(&format!("Serialization error: {}", e));
                exit_codes::FAILURE
            }
        };
    }

    for profile in &profiles {
        Status::header(profile.variant.name());
        Status::field("minify", on_off(profile.minify));
        Status::field("shrink resources", on_off(profile.shrink_resources));
        Status::field("debuggable", on_off(profile.debuggable));
        Status::field("crunch PNGs", on_off(profile.crunch_pngs));
        Status::field("zip align", on_off(profile.zip_align));
        Status::field("release signing", on_off(profile.release_signing));
        if !profile.proguard_files.is_empty() {
            Status::field("proguard", &profile.proguard_files.join(", "));
        }
    }

    Status::header("packaging");
    Status::field("exclude", &rules.excludes.join(", "));
    Status::field("pick first", &rules.pick_first.join(", "));
    Status::field("ABI filters", &rules.abi_filters.join(", "));
    Status::field("resource configs", &rules.resource_configs.join(", "));

    exit_codes::SUCCESS
}

fn run_doctor(config: &Config) -> i32 {
    let schema = &config.schema;
    let mut healthy = true;

    Status::header("Environment Check");

    match &config.path {
        Some(path) => Status::success(&format!("config: {}", path)),
        None => Status::info("config: built-in defaults"),
    }

    let gradle_ok = match &schema.tools.gradle {
        Some(program) => process::command_exists(program),
        None => schema.project.android_dir.join(gradle::wrapper()).is_file(),
    };
    let gradle_name = schema.tools.gradle.as_deref().unwrap_or(gradle::wrapper());
    if gradle_ok {
        Status::success(&format!("gradle: {}", gradle_name));
    } else {
        Status::error(&format!(
            "gradle: {} not found in {}",
            gradle_name,
            schema.project.android_dir.display()
        ));
        healthy = false;
    }

    for (label, program) in [("aapt", &schema.tools.aapt), ("keytool", &schema.tools.keytool)] {
        match process::which_command(program) {
            Some(path) => Status::success(&format!("{}: {}", label, path.display())),
            None => {
                Status::error(&format!("{}: not found", label));
                healthy = false;
            }
        }
    }

    match &schema.project.output_root {
        Some(root) if !root.as_os_str().is_empty() => {
            Status::field("output root", &root.display().to_string());
        }
        _ => Status::warning("output root: not configured"),
    }

    let store = &schema.signing.store_file;
    if store.is_file() {
        Status::success(&format!("keystore: {}", store.display()));
    } else {
        Status::warning(&format!("keystore: {} (not generated yet)", store.display()));
    }

    for (label, value) in [
        ("UPLOAD_KEY_ALIAS", &schema.signing.key_alias),
        ("UPLOAD_KEY_PASSWORD", &schema.signing.key_password),
        ("UPLOAD_STORE_PASSWORD", &schema.signing.store_password),
    ] {
        if value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
            Status::success(&format!("{}: set", label));
        } else {
            Status::warning(&format!("{}: missing", label));
        }
    }

    if healthy {
        exit_codes::SUCCESS
    } else {
        exit_codes::FAILURE
    }
}
