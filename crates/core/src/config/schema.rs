//! Configuration schema definitions
//!
//! Mirrors the `.myclass-android.toml` layout.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration schema
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigSchema {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub signing: SigningSection,

    #[serde(default)]
    pub packaging: PackagingConfig,
}

/// Project layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Gradle project directory (the Flutter app's `android/` folder)
    #[serde(default = "default_android_dir")]
    pub android_dir: PathBuf,

    /// Build output root of the app module. An empty string leaves it unset.
    #[serde(default = "default_output_root")]
    pub output_root: Option<PathBuf>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            android_dir: default_android_dir(),
            output_root: default_output_root(),
        }
    }
}

fn default_android_dir() -> PathBuf {
    PathBuf::from("android")
}

#[allow(clippy::unnecessary_wraps)]
fn default_output_root() -> Option<PathBuf> {
    Some(PathBuf::from("android/app/build"))
}

/// External tool locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Gradle launcher; the platform's wrapper script when unset
    #[serde(default)]
    pub gradle: Option<String>,

    /// Badging tool
    #[serde(default = "default_aapt")]
    pub aapt: String,

    /// Keystore generation tool
    #[serde(default = "default_keytool")]
    pub keytool: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            gradle: None,
            aapt: default_aapt(),
            keytool: default_keytool(),
        }
    }
}

fn default_aapt() -> String {
    "aapt".to_string()
}

fn default_keytool() -> String {
    "keytool".to_string()
}

/// Release signing settings.
///
/// Credentials have no defaults. They are normally supplied through the
/// `UPLOAD_*` environment variables rather than written here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningSection {
    #[serde(default)]
    pub key_alias: Option<String>,

    #[serde(default, skip_serializing)]
    pub key_password: Option<String>,

    #[serde(default, skip_serializing)]
    pub store_password: Option<String>,

    /// Keystore used both when generating and when signing
    #[serde(default = "default_store_file")]
    pub store_file: PathBuf,

    /// Distinguished name fields for a newly generated key
    #[serde(default)]
    pub dname: Option<DnameConfig>,
}

impl Default for SigningSection {
    fn default() -> Self {
        Self {
            key_alias: None,
            key_password: None,
            store_password: None,
            store_file: default_store_file(),
            dname: None,
        }
    }
}

fn default_store_file() -> PathBuf {
    PathBuf::from("android/app/myclassteacher.keystore")
}

/// Distinguished name fields, all required when the section is present
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DnameConfig {
    pub common_name: String,
    pub organizational_unit: String,
    pub organization: String,
    pub locality: String,
    pub state: String,
    pub country: String,
}

/// Packaging overrides; built-in rules apply to any field left unset
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackagingConfig {
    #[serde(default)]
    pub excludes: Option<Vec<String>>,

    #[serde(default)]
    pub pick_first: Option<Vec<String>>,

    #[serde(default)]
    pub abi_filters: Option<Vec<String>>,

    #[serde(default)]
    pub resource_configs: Option<Vec<String>>,
}
