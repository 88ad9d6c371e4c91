//! Packaging rules handed to the Android Gradle Plugin
//!
//! These are configuration only. The plugin applies them while assembling
//! the artifact; here they are validated, shown and matched against entry
//! paths so a rule change can be checked before a build.

use crate::error::{ReleaseError, Result};
use glob::{MatchOptions, Pattern};
use myclass_core::config::PackagingConfig;
use myclass_core::{Error, ErrorCode};
use serde::Serialize;

/// ABIs the NDK can target
pub const KNOWN_ABIS: [&str; 4] = ["arm64-v8a", "armeabi-v7a", "x86", "x86_64"];

const DEFAULT_EXCLUDES: [&str; 12] = [
    "META-INF/DEPENDENCIES",
    "META-INF/LICENSE",
    "META-INF/LICENSE.txt",
    "META-INF/license.txt",
    "META-INF/NOTICE",
    "META-INF/NOTICE.txt",
    "META-INF/notice.txt",
    "META-INF/ASL2.0",
    "META-INF/*.kotlin_module",
    "META-INF/*.version",
    "**/lib/*/libc++_shared.so",
    "**/lib/*/libjsc.so",
];

const DEFAULT_PICK_FIRST: [&str; 2] = ["**/lib/*/libc++_shared.so", "**/lib/*/libjsc.so"];

const DEFAULT_ABI_FILTERS: [&str; 2] = ["arm64-v8a", "armeabi-v7a"];

const DEFAULT_RESOURCE_CONFIGS: [&str; 2] = ["en", "si"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// What happens to an archive entry during packaging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingAction {
    Exclude,
    PickFirst,
    Keep,
}

/// Exclude and pick-first patterns plus ABI and resource filters
#[derive(Debug, Clone, Serialize)]
pub struct PackagingRules {
    pub excludes: Vec<String>,
    pub pick_first: Vec<String>,
    pub abi_filters: Vec<String>,
    pub resource_configs: Vec<String>,
    #[serde(skip)]
    compiled_excludes: Vec<Pattern>,
    #[serde(skip)]
    compiled_pick_first: Vec<Pattern>,
}

impl PackagingRules {
    /// Build rules, rejecting malformed globs and unknown ABIs
    pub fn new(
        excludes: Vec<String>,
        pick_first: Vec<String>,
        abi_filters: Vec<String>,
        resource_configs: Vec<String>,
    ) -> Result<Self> {
        if let Some(abi) = abi_filters.iter().find(|a| !KNOWN_ABIS.contains(&a.as_str())) {
            return Err(Error::new(
                ErrorCode::InvalidConfigValue,
                format!("Unknown ABI in packaging.abi_filters: {}", abi),
            )
            .with_suggestion(format!("Use one of: {}", KNOWN_ABIS.join(", ")))
            .into());
        }

        Ok(Self {
            compiled_excludes: compile(&excludes, "packaging.excludes")?,
            compiled_pick_first: compile(&pick_first, "packaging.pick_first")?,
            excludes,
            pick_first,
            abi_filters,
            resource_configs,
        })
    }

    /// The app's built-in rules
    pub fn defaults() -> Result<Self> {
        Self::from_config(&PackagingConfig::default())
    }

    /// Built-in rules with any configured overrides applied
    pub fn from_config(config: &PackagingConfig) -> Result<Self> {
        Self::new(
            or_default(&config.excludes, &DEFAULT_EXCLUDES),
            or_default(&config.pick_first, &DEFAULT_PICK_FIRST),
            or_default(&config.abi_filters, &DEFAULT_ABI_FILTERS),
            or_default(&config.resource_configs, &DEFAULT_RESOURCE_CONFIGS),
        )
    }

    /// Classify an archive entry. Exclusion wins over pick-first.
    pub fn classify(&self, entry: &str) -> PackagingAction {
        let entry = entry.trim_start_matches('/');
        if self
            .compiled_excludes
            .iter()
            .any(|p| p.matches_with(entry, MATCH_OPTIONS))
        {
            PackagingAction::Exclude
        } else if self
            .compiled_pick_first
            .iter()
            .any(|p| p.matches_with(entry, MATCH_OPTIONS))
        {
            PackagingAction::PickFirst
        } else {
            PackagingAction::Keep
        }
    }

    /// Whether native libraries for `abi` are packaged
    pub fn includes_abi(&self, abi: &str) -> bool {
        self.abi_filters.iter().any(|a| a == abi)
    }
}

fn or_default(value: &Option<Vec<String>>, default: &[&str]) -> Vec<String> {
    value
        .clone()
        .unwrap_or_else(|| default.iter().map(|s| (*s).to_string()).collect())
}

fn compile(patterns: &[String], setting: &str) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| {
            Pattern::new(p).map_err(|e| {
                ReleaseError::from(Error::new(
                    ErrorCode::InvalidConfigValue,
                    format!("Invalid glob in {}: {} ({})", setting, p, e.msg),
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_exclude_license_files() {
        let rules = PackagingRules::defaults().unwrap();
        assert_eq!(rules.classify("META-INF/LICENSE"), PackagingAction::Exclude);
        assert_eq!(rules.classify("META-INF/notice.txt"), PackagingAction::Exclude);
        assert_eq!(
            rules.classify("META-INF/kotlinx-coroutines-core.kotlin_module"),
            PackagingAction::Exclude
        );
        assert_eq!(
            rules.classify("META-INF/androidx.core_core.version"),
            PackagingAction::Exclude
        );
    }

    #[test]
    fn test_single_star_does_not_cross_directories() {
        let rules = PackagingRules::defaults().unwrap();
        assert_eq!(
            rules.classify("META-INF/services/foo.kotlin_module"),
            PackagingAction::Keep
        );
    }

    #[test]
    fn test_native_libs_excluded_over_pick_first() {
        let rules = PackagingRules::defaults().unwrap();
        assert_eq!(
            rules.classify("lib/arm64-v8a/libc++_shared.so"),
            PackagingAction::Exclude
        );
        assert_eq!(
            rules.classify("jni/lib/armeabi-v7a/libjsc.so"),
            PackagingAction::Exclude
        );
        assert_eq!(rules.classify("lib/arm64-v8a/libflutter.so"), PackagingAction::Keep);
    }

    #[test]
    fn test_pick_first_applies_when_not_excluded() {
        let config = PackagingConfig {
            excludes: Some(vec!["META-INF/LICENSE".to_string()]),
            ..PackagingConfig::default()
        };
        let rules = PackagingRules::from_config(&config).unwrap();
        assert_eq!(
            rules.classify("lib/x86_64/libc++_shared.so"),
            PackagingAction::PickFirst
        );
    }

    #[test]
    fn test_default_filters() {
        let rules = PackagingRules::defaults().unwrap();
        assert!(rules.includes_abi("arm64-v8a"));
        assert!(rules.includes_abi("armeabi-v7a"));
        assert!(!rules.includes_abi("x86_64"));
        assert_eq!(rules.resource_configs, vec!["en", "si"]);
    }

    #[test]
    fn test_unknown_abi_rejected() {
        let config = PackagingConfig {
            abi_filters: Some(vec!["mips".to_string()]),
            ..PackagingConfig::default()
        };
        let err = PackagingRules::from_config(&config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfigValue);
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let config = PackagingConfig {
            excludes: Some(vec!["META-INF/[".to_string()]),
            ..PackagingConfig::default()
        };
        assert!(PackagingRules::from_config(&config).is_err());
    }
}
