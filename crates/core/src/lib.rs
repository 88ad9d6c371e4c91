//! Core utilities for the MyClassTeacher Android release tools
//!
//! This crate provides shared functionality used by the release pipeline and the CLI:
//!
//! - **Error handling**: Coded errors with context and recovery suggestions
//! - **Process execution**: External tools run behind the [`process::CommandRunner`] seam
//! - **Configuration**: TOML-based configuration with path expansion
//!
//! # Example
//!
//! ```rust,no_run
//! use myclass_core::config::Config;
//! use myclass_core::process::{CommandRunner, CommandSpec, SystemRunner};
//!
//! let config = Config::load(None).expect("config");
//! let result = SystemRunner
//!     .run(&CommandSpec::new("keytool").arg("-help"))
//!     .expect("keytool");
//! println!("{} -> {}", config.schema.tools.keytool, result.exit_code);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod process;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{Error, ErrorCode, ErrorReport, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{exit_codes, Error, ErrorCode, Result};
    pub use crate::process::{CommandResult, CommandRunner, CommandSpec, SystemRunner};
}
