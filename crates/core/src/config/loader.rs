//! Configuration file loading

use super::schema::ConfigSchema;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Configuration wrapper
#[derive(Debug, Clone)]
pub struct Config {
    pub schema: ConfigSchema,
    pub path: Option<String>,
}

impl Config {
    /// Load configuration from a file path or use defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config_path = path.map(String::from).or_else(find_config_file);

        let schema = match config_path {
            Some(ref p) if Path::new(p).exists() => load_config_file(p)?,
            Some(ref p) if path.is_some() => return Err(Error::config_not_found(p)),
            _ => ConfigSchema::default(),
        };

        Ok(Self {
            schema,
            path: config_path,
        })
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut schema: ConfigSchema = toml::from_str(content)?;
        expand_paths(&mut schema)?;
        Ok(Self { schema, path: None })
    }

    /// Load with defaults only (no file)
    pub fn default() -> Self {
        Self {
            schema: ConfigSchema::default(),
            path: None,
        }
    }
}

/// Find configuration file in standard locations
fn find_config_file() -> Option<String> {
    let candidates = [
        ".myclass-android.toml",
        "myclass-android.toml",
        ".config/myclass-android.toml",
    ];

    for candidate in candidates {
        if Path::new(candidate).exists() {
            return Some(candidate.to_string());
        }
    }

    None
}

/// Load and parse a TOML configuration file
fn load_config_file(path: &str) -> Result<ConfigSchema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::config(format!("Failed to read config file {}: {}", path, e)))?;

    let mut schema: ConfigSchema = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse config file {}: {}", path, e)))?;

    expand_paths(&mut schema)?;
    Ok(schema)
}

/// Expand `~` and environment variables in path settings
fn expand_paths(schema: &mut ConfigSchema) -> Result<()> {
    schema.project.android_dir = expand(&schema.project.android_dir)?;
    if let Some(root) = schema.project.output_root.take() {
        schema.project.output_root = Some(expand(&root)?);
    }
    schema.signing.store_file = expand(&schema.signing.store_file)?;
    Ok(())
}

pub(crate) fn expand(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw).map_err(|e| {
        Error::config(format!("Failed to expand path {}: {}", raw, e))
            .with_suggestion("Check that every referenced environment variable is set")
    })?;
    Ok(PathBuf::from(expanded.as_ref()))
}
