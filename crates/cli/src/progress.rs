//! Progress indicators
//!
//! A spinner is shown while Gradle or keytool run, since their output is
//! captured rather than streamed.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::output::Status;

/// Create a spinner for a blocking external tool.
///
/// Hidden in quiet mode so nothing reaches the terminal.
pub fn spinner(message: &str) -> ProgressBar {
    if Status::is_quiet() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg} {elapsed:.dim}")
    {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Finish a spinner with a success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a spinner with an error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_lifecycle() {
        let pb = spinner("Running assembleRelease...");
        finish_success(&pb, "assembleRelease");
        assert!(pb.is_finished());
    }

    #[test]
    fn test_spinner_error_finish() {
        let pb = spinner("Generating keystore...");
        finish_error(&pb, "keytool failed");
        assert!(pb.is_finished());
    }
}
