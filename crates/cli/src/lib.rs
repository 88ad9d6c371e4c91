//! Terminal helpers for the release CLI
//!
//! Provides shared CLI functionality:
//! - Status lines
//! - Duration formatting
//! - Spinners for long-running builds

#![warn(missing_docs)]

pub mod output;
pub mod progress;
