//! Test doubles for process execution

use crate::error::Result;
use crate::process::{CommandResult, CommandRunner, CommandSpec};
use std::cell::RefCell;

type Handler = Box<dyn Fn(&CommandSpec) -> CommandResult>;

/// A [`CommandRunner`] that records every spec instead of spawning it.
///
/// The handler decides what each call "returns" and may touch the
/// filesystem to imitate the real tool.
pub struct RecordingRunner {
    calls: RefCell<Vec<CommandSpec>>,
    handler: Handler,
}

impl RecordingRunner {
    /// Every command succeeds with empty output
    pub fn succeeding() -> Self {
        Self::with_handler(|_| CommandResult::ok(""))
    }

    /// Use `handler` to produce each result
    pub fn with_handler(handler: impl Fn(&CommandSpec) -> CommandResult + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    /// All recorded commands, in call order
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    /// Number of recorded commands whose program is `program`
    pub fn calls_to(&self, program: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|spec| spec.program == program)
            .count()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandResult> {
        self.calls.borrow_mut().push(spec.clone());
        Ok((self.handler)(spec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_runner_counts_by_program() {
        let runner = RecordingRunner::succeeding();
        runner.run(&CommandSpec::new("aapt")).unwrap();
        runner.run(&CommandSpec::new("keytool")).unwrap();
        runner.run(&CommandSpec::new("aapt")).unwrap();

        assert_eq!(runner.calls_to("aapt"), 2);
        assert_eq!(runner.calls_to("keytool"), 1);
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn test_recording_runner_uses_handler() {
        let runner = RecordingRunner::with_handler(|_| CommandResult::failed(3, "nope"));
        let result = runner.run(&CommandSpec::new("gradlew")).unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, 3);
    }
}
