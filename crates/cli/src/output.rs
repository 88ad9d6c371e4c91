//! Terminal output utilities
//!
//! Status lines for pipeline stages and verbatim relay of tool output.

use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};

static QUIET: AtomicBool = AtomicBool::new(false);

/// Status message helpers
///
/// Warnings and errors go to stderr and are never silenced. Quiet mode
/// drops everything else except [`Status::result`] and [`Status::relay`].
pub struct Status;

impl Status {
    /// Suppress non-essential output for the rest of the process
    pub fn set_quiet(quiet: bool) {
        QUIET.store(quiet, Ordering::Relaxed);
    }

    /// Whether non-essential output is suppressed
    pub fn is_quiet() -> bool {
        QUIET.load(Ordering::Relaxed)
    }

    /// Print a success message
    pub fn success(message: &str) {
        if Self::is_quiet() {
            return;
        }
        println!("{} {}", "✓".green(), message);
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print an info message
    pub fn info(message: &str) {
        if Self::is_quiet() {
            return;
        }
        println!("{} {}", "ℹ".blue(), message);
    }

    /// Print a pipeline stage marker
    pub fn step(step: usize, total: usize, message: &str) {
        if Self::is_quiet() {
            return;
        }
        println!("{} {}", format!("[{}/{}]", step, total).dimmed(), message);
    }

    /// Print a header
    pub fn header(message: &str) {
        if Self::is_quiet() {
            return;
        }
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print an aligned `label: value` line
    pub fn field(label: &str, value: &str) {
        if Self::is_quiet() {
            return;
        }
        println!("  {:<22} {}", format!("{}:", label).dimmed(), value);
    }

    /// Print a plain result line. Shown even in quiet mode.
    pub fn result(message: &str) {
        println!("{}", message);
    }

    /// Pass external tool output through unchanged
    pub fn relay(output: &str) {
        print!("{}", output);
        if !output.is_empty() && !output.ends_with('\n') {
            println!();
        }
    }
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        let mins = (secs / 60.0).floor();
        let remaining_secs = secs % 60.0;
        format!("{}m {:.0}s", mins, remaining_secs)
    }
}

/// Render a boolean build flag as shown in variant tables
pub fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_duration_ms() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }

    #[test]
    fn test_format_duration_gradle_build() {
        // A typical release build lands in the minutes range
        assert_eq!(format_duration(Duration::from_secs(185)), "3m 5s");
        assert_eq!(format_duration(Duration::from_secs_f32(42.5)), "42.5s");
    }

    #[test]
    fn test_on_off() {
        assert_eq!(on_off(true), "on");
        assert_eq!(on_off(false), "off");
    }

    #[test]
    fn test_quiet_toggle() {
        Status::set_quiet(true);
        assert!(Status::is_quiet());
        Status::set_quiet(false);
        assert!(!Status::is_quiet());
    }
}
