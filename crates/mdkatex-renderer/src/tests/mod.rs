//! Shared test doubles and crate-level behaviour tests.

use std::fs;

use mockall::mock;

use crate::process::{ProcessExecutor, ProcessOutcome};


mock! {
    pub(crate) Executor {}
    impl ProcessExecutor for Executor {
        fn execute(&self, argv: &[String]) -> ProcessOutcome;
    }
}

/// A successful outcome printing `stdout`.
pub(crate) fn success(stdout: &str) -> ProcessOutcome {
    ProcessOutcome::Success {
        stdout: stdout.to_owned(),
        stderr: String::new(),
    }
}

/// A successful outcome that also wrote `stderr`.
pub(crate) fn success_with_stderr(stdout: &str, stderr: &str) -> ProcessOutcome {
    ProcessOutcome::Success {
        stdout: stdout.to_owned(),
        stderr: stderr.to_owned(),
    }
}

/// A renderer failure exiting with `code` and printing `stderr`.
pub(crate) fn non_zero_exit(code: i32, stderr: &str) -> ProcessOutcome {
    ProcessOutcome::NonZeroExit {
        code,
        output: stderr.to_owned(),
    }
}

/// Emulates a renderer: writes `html` to the path following `--output`.
pub(crate) fn write_output(argv: &[String], html: &str) -> ProcessOutcome {
    let output = argv
        .iter()
        .skip_while(|arg| arg.as_str() != "--output")
        .nth(1)
        .expect("invocation carries --output");
    fs::write(output, html).expect("write renderer output");
    success("")
}

/// Returns the value following `flag` in `argv`.
pub(crate) fn flag_value<'a>(argv: &'a [String], flag: &str) -> Option<&'a str> {
    argv.iter()
        .skip_while(|arg| arg.as_str() != flag)
        .nth(1)
        .map(String::as_str)
}
