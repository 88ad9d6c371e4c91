//! Upload keystore provisioning
//!
//! Generates the release keystore with `keytool` when it does not exist yet.
//! The same keystore path is used for generation and for signing.

use crate::error::{ReleaseError, Result, Tool};
use myclass_core::config::{DnameConfig, SigningSection};
use myclass_core::process::{CommandRunner, CommandSpec};
use std::fmt;
use std::path::{Path, PathBuf};

pub const KEY_ALGORITHM: &str = "RSA";
pub const KEY_SIZE_BITS: u32 = 2048;
pub const VALIDITY_DAYS: u32 = 10000;

/// Gradle project property prefix. The app's build file must read
/// `MYAPP_UPLOAD_STORE_FILE` for the generated keystore to be used.
const GRADLE_PROPERTY_ENV: &str = "ORG_GRADLE_PROJECT_MYAPP_UPLOAD_";

/// Release signing credentials. Passwords never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningConfig {
    pub key_alias: String,
    pub key_password: String,
    pub store_file: PathBuf,
    pub store_password: String,
}

impl SigningConfig {
    /// Resolve from configuration. Every credential is mandatory.
    pub fn from_section(section: &SigningSection) -> Result<Self> {
        Ok(Self {
            key_alias: required(
                &section.key_alias,
                "signing.key_alias",
                "Set UPLOAD_KEY_ALIAS or signing.key_alias",
            )?,
            key_password: required(
                &section.key_password,
                "signing.key_password",
                "Set UPLOAD_KEY_PASSWORD",
            )?,
            store_password: required(
                &section.store_password,
                "signing.store_password",
                "Set UPLOAD_STORE_PASSWORD",
            )?,
            store_file: section.store_file.clone(),
        })
    }

    /// Environment that exposes these credentials as Gradle project properties
    pub fn gradle_env(&self) -> Vec<(String, String)> {
        let store_file = std::path::absolute(&self.store_file)
            .unwrap_or_else(|_| self.store_file.clone());

        [
            ("KEY_ALIAS", self.key_alias.clone()),
            ("KEY_PASSWORD", self.key_password.clone()),
            ("STORE_PASSWORD", self.store_password.clone()),
            ("STORE_FILE", store_file.to_string_lossy().into_owned()),
        ]
        .into_iter()
        .map(|(key, value)| (format!("{}{}", GRADLE_PROPERTY_ENV, key), value))
        .collect()
    }
}

impl fmt::Debug for SigningConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningConfig")
            .field("key_alias", &self.key_alias)
            .field("key_password", &"****")
            .field("store_file", &self.store_file)
            .field("store_password", &"****")
            .finish()
    }
}

fn required(value: &Option<String>, setting: &'static str, hint: &'static str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.clone()),
        _ => Err(ReleaseError::not_configured(setting, hint)),
    }
}

/// Distinguished name written into a newly generated key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistinguishedName {
    pub common_name: String,
    pub organizational_unit: String,
    pub organization: String,
    pub locality: String,
    pub state: String,
    pub country: String,
}

impl From<DnameConfig> for DistinguishedName {
    fn from(c: DnameConfig) -> Self {
        Self {
            common_name: c.common_name,
            organizational_unit: c.organizational_unit,
            organization: c.organization,
            locality: c.locality,
            state: c.state,
            country: c.country,
        }
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CN={}, OU={}, O={}, L={}, S={}, C={}",
            self.common_name,
            self.organizational_unit,
            self.organization,
            self.locality,
            self.state,
            self.country
        )
    }
}

/// Result of a provisioning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeystoreOutcome {
    Created(PathBuf),
    AlreadyExists(PathBuf),
}

impl KeystoreOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Created(p) | Self::AlreadyExists(p) => p,
        }
    }

    pub fn created(&self) -> bool {
        matches!(self, Self::Created(_))
    }
}

/// Creates the upload keystore on first use
pub struct KeystoreProvisioner<R> {
    runner: R,
    keytool: String,
}

impl<R: CommandRunner> KeystoreProvisioner<R> {
    pub fn new(runner: R, keytool: impl Into<String>) -> Self {
        Self {
            runner,
            keytool: keytool.into(),
        }
    }

    /// Generate `signing.store_file` unless it already exists.
    ///
    /// The distinguished name is only needed when a key is generated.
    pub fn provision(
        &self,
        signing: &SigningConfig,
        dname: Option<&DistinguishedName>,
    ) -> Result<KeystoreOutcome> {
        let path = &signing.store_file;
        if path.exists() {
            tracing::info!(path = %path.display(), "Keystore already exists");
            return Ok(KeystoreOutcome::AlreadyExists(path.clone()));
        }

        let dname = dname.ok_or_else(|| {
            ReleaseError::not_configured(
                "signing.dname",
                "Add a [signing.dname] section to generate a new keystore",
            )
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let spec = self.genkey_command(signing, dname);
        tracing::info!(path = %path.display(), alias = %signing.key_alias, "Generating keystore");

        let result = self.runner.run(&spec)?;
        if !result.success {
            return Err(ReleaseError::SubprocessFailure {
                tool: Tool::Keytool,
                command: spec.to_string(),
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        if !path.exists() {
            return Err(myclass_core::Error::file_not_found(path)
                .with_context("keytool exited successfully but wrote no keystore")
                .into());
        }

        Ok(KeystoreOutcome::Created(path.clone()))
    }

    fn genkey_command(&self, signing: &SigningConfig, dname: &DistinguishedName) -> CommandSpec {
        CommandSpec::new(&self.keytool)
            .args(["-genkey", "-v", "-keystore"])
            .arg(signing.store_file.to_string_lossy())
            .arg("-alias")
            .arg(&signing.key_alias)
            .args(["-keyalg", KEY_ALGORITHM])
            .arg("-keysize")
            .arg(KEY_SIZE_BITS.to_string())
            .arg("-validity")
            .arg(VALIDITY_DAYS.to_string())
            .secret_arg("-storepass", &signing.store_password)
            .secret_arg("-keypass", &signing.key_password)
            .arg("-dname")
            .arg(dname.to_string())
    }
}
