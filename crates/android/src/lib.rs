//! Release tooling for the MyClassTeacher Android app
//!
//! This crate drives the external Android toolchain:
//! - Artifact location and size reporting
//! - Upload keystore provisioning
//! - Gradle clean, assemble and bundle tasks
//! - Build variant and packaging defaults

pub mod artifact;
pub mod error;
pub mod gradle;
pub mod keystore;
pub mod packaging;
pub mod release;
pub mod size;
pub mod variant;

pub use artifact::{Artifact, ArtifactLocator};
pub use error::{ReleaseError, Result, Tool};
pub use keystore::{DistinguishedName, KeystoreOutcome, KeystoreProvisioner, SigningConfig};
pub use packaging::{PackagingAction, PackagingRules};
pub use release::{
    ArtifactOutcome, Operation, Pipeline, ReleaseOrchestrator, ReleaseReport, ReleaseSettings,
};
pub use size::{SizeReport, SizeReporter};
pub use variant::{ArtifactKind, BuildVariant, VariantProfile};
