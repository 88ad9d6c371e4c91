//! Build variants and artifact kinds
//!
//! Flags mirror the app module's `buildTypes` block so the CLI can show what
//! each variant does without opening Gradle files.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Gradle build type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    Debug,
    Release,
    Profile,
}

impl BuildVariant {
    pub const ALL: [BuildVariant; 3] = [Self::Debug, Self::Release, Self::Profile];

    /// Lowercase name used in output paths
    pub fn name(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Profile => "profile",
        }
    }

    /// Capitalized name used in Gradle task names
    pub fn task_suffix(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::Profile => "Profile",
        }
    }

    /// Build-type settings for this variant
    pub fn profile(&self) -> VariantProfile {
        match self {
            Self::Debug => VariantProfile {
                variant: *self,
                minify: false,
                shrink_resources: false,
                debuggable: true,
                jni_debuggable: true,
                renderscript_debuggable: true,
                crunch_pngs: false,
                zip_align: false,
                proguard_files: Vec::new(),
                release_signing: false,
                build_config_fields: Vec::new(),
                res_values: Vec::new(),
            },
            Self::Release => VariantProfile {
                variant: *self,
                release_signing: true,
                build_config_fields: vec![
                    ("ENABLE_LOGGING", "false"),
                    ("ENABLE_DEBUG_FEATURES", "false"),
                ],
                res_values: vec![("app_name", "Classes")],
                ..optimized(*self)
            },
            Self::Profile => optimized(*self),
        }
    }
}

fn optimized(variant: BuildVariant) -> VariantProfile {
    VariantProfile {
        variant,
        minify: true,
        shrink_resources: true,
        debuggable: false,
        jni_debuggable: false,
        renderscript_debuggable: false,
        crunch_pngs: true,
        zip_align: true,
        proguard_files: vec![PROGUARD_DEFAULT, PROGUARD_RULES],
        release_signing: false,
        build_config_fields: Vec::new(),
        res_values: Vec::new(),
    }
}

/// Default optimizing ProGuard configuration shipped with the Android SDK
pub const PROGUARD_DEFAULT: &str = "proguard-android-optimize.txt";
/// App-specific ProGuard rules
pub const PROGUARD_RULES: &str = "proguard-rules.pro";

impl fmt::Display for BuildVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown build variant '{0}' (expected debug, release or profile)")]
pub struct UnknownVariant(String);

impl FromStr for BuildVariant {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "profile" => Ok(Self::Profile),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// What the external build produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Apk,
    AppBundle,
}

impl ArtifactKind {
    /// Directory under `outputs/`
    pub fn output_dir(&self) -> &'static str {
        match self {
            Self::Apk => "apk",
            Self::AppBundle => "bundle",
        }
    }

    /// File extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Apk => "apk",
            Self::AppBundle => "aab",
        }
    }

    /// Human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Apk => "APK",
            Self::AppBundle => "App Bundle",
        }
    }

    /// Prefix of the Gradle task that produces this kind
    pub fn task_prefix(&self) -> &'static str {
        match self {
            Self::Apk => "assemble",
            Self::AppBundle => "bundle",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown artifact kind '{0}' (expected apk or bundle)")]
pub struct UnknownArtifactKind(String);

impl FromStr for ArtifactKind {
    type Err = UnknownArtifactKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "apk" => Ok(Self::Apk),
            "bundle" | "aab" | "app-bundle" => Ok(Self::AppBundle),
            _ => Err(UnknownArtifactKind(s.to_string())),
        }
    }
}

/// Build-type settings applied by the Android Gradle Plugin
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantProfile {
    pub variant: BuildVariant,
    pub minify: bool,
    pub shrink_resources: bool,
    pub debuggable: bool,
    pub jni_debuggable: bool,
    pub renderscript_debuggable: bool,
    pub crunch_pngs: bool,
    pub zip_align: bool,
    pub proguard_files: Vec<&'static str>,
    /// Signed with the upload keystore rather than the debug key
    pub release_signing: bool,
    pub build_config_fields: Vec<(&'static str, &'static str)>,
    pub res_values: Vec<(&'static str, &'static str)>,
}

impl VariantProfile {
    /// Whether ProGuard runs for this variant
    pub fn runs_proguard(&self) -> bool {
        self.minify && !self.proguard_files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_roundtrip_names() {
        for variant in BuildVariant::ALL {
            assert_eq!(variant.name().parse::<BuildVariant>().unwrap(), variant);
        }
        assert_eq!("Release".parse::<BuildVariant>().unwrap(), BuildVariant::Release);
    }

    #[test]
    fn test_unknown_variant() {
        let err = "staging".parse::<BuildVariant>().unwrap_err();
        assert!(err.to_string().contains("staging"));
    }

    #[test]
    fn test_artifact_kind_aliases() {
        assert_eq!("apk".parse::<ArtifactKind>().unwrap(), ArtifactKind::Apk);
        assert_eq!("aab".parse::<ArtifactKind>().unwrap(), ArtifactKind::AppBundle);
        assert_eq!("bundle".parse::<ArtifactKind>().unwrap(), ArtifactKind::AppBundle);
        assert!("ipa".parse::<ArtifactKind>().is_err());
    }

    #[test]
    fn test_debug_profile_is_unoptimized() {
        let profile = BuildVariant::Debug.profile();
        assert!(!profile.minify);
        assert!(!profile.shrink_resources);
        assert!(profile.debuggable);
        assert!(!profile.runs_proguard());
        assert!(!profile.release_signing);
    }

    #[test]
    fn test_release_profile_shrinks_and_signs() {
        let profile = BuildVariant::Release.profile();
        assert!(profile.minify && profile.shrink_resources);
        assert!(profile.crunch_pngs && profile.zip_align);
        assert!(!profile.debuggable && !profile.jni_debuggable);
        assert!(profile.runs_proguard());
        assert!(profile.release_signing);
        assert!(profile.build_config_fields.contains(&("ENABLE_LOGGING", "false")));
        assert_eq!(profile.res_values, vec![("app_name", "Classes")]);
    }

    #[test]
    fn test_profile_variant_matches_release_without_signing() {
        let profile = BuildVariant::Profile.profile();
        let release = BuildVariant::Release.profile();
        assert_eq!(profile.minify, release.minify);
        assert_eq!(profile.proguard_files, release.proguard_files);
        assert!(!profile.release_signing);
        assert!(profile.build_config_fields.is_empty());
    }
}
