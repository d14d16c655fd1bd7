//! Unit tests for process execution and outcome classification.

use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn executor() -> SystemExecutor {
    SystemExecutor::new(Duration::from_secs(10))
}

fn shell(script: &str) -> Vec<String> {
    vec!["/bin/sh".into(), "-c".into(), script.into()]
}

#[cfg(unix)]
#[rstest]
fn zero_exit_captures_stdout_and_stderr(executor: SystemExecutor) {
    let outcome = executor.execute(&shell("printf 'npm WARN\\n' >&2; printf '0.16.9\\n'"));
    match outcome {
        ProcessOutcome::Success { stdout, stderr } => {
            assert_eq!(stdout, "0.16.9\n");
            assert_eq!(stderr, "npm WARN\n");
        }
        other => panic!("expected success, got {other:?}"),
    }
}

#[cfg(unix)]
#[rstest]
fn non_zero_exit_combines_stdout_then_stderr(executor: SystemExecutor) {
    let outcome = executor.execute(&shell("echo partial; echo 'parse error' >&2; exit 3"));
    match outcome {
        ProcessOutcome::NonZeroExit { code, output } => {
            assert_eq!(code, 3);
            assert_eq!(output, "partial\n\nparse error");
        }
        other => panic!("expected non-zero exit, got {other:?}"),
    }
}

#[cfg(unix)]
#[rstest]
fn signal_termination_is_named(executor: SystemExecutor) {
    let outcome = executor.execute(&shell("kill -TERM $$"));
    match outcome {
        ProcessOutcome::Signaled { signal, name } => {
            assert_eq!(signal, 15);
            assert_eq!(name, "SIGTERM");
        }
        other => panic!("expected signal termination, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn hung_process_is_killed_after_timeout() {
    let executor = SystemExecutor::new(Duration::from_millis(200));
    let started = Instant::now();
    let outcome = executor.execute(&shell("exec sleep 30"));
    assert!(
        matches!(outcome, ProcessOutcome::TimedOut { timeout } if timeout == Duration::from_millis(200)),
        "expected timeout, got {outcome:?}"
    );
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[rstest]
fn missing_program_is_a_launch_failure(executor: SystemExecutor) {
    let outcome = executor.execute(&["/nonexistent/mdkatex/katex".to_owned()]);
    assert!(
        matches!(outcome, ProcessOutcome::LaunchFailure { .. }),
        "expected launch failure, got {outcome:?}"
    );
}

#[rstest]
fn empty_argv_is_a_launch_failure(executor: SystemExecutor) {
    let outcome = executor.execute(&[]);
    assert!(matches!(outcome, ProcessOutcome::LaunchFailure { .. }));
}

#[test]
fn default_executor_uses_default_timeout() {
    assert_eq!(SystemExecutor::default().timeout(), DEFAULT_TIMEOUT);
}

#[rstest]
#[case::non_zero(
    ProcessOutcome::NonZeroExit { code: 1, output: "parse error".into() },
    "parse error"
)]
#[case::signaled(
    ProcessOutcome::Signaled { signal: 9, name: "SIGKILL".into() },
    "SIGKILL"
)]
#[case::timed_out(
    ProcessOutcome::TimedOut { timeout: Duration::from_millis(5) },
    "5ms"
)]
fn failures_convert_to_render_failures(#[case] outcome: ProcessOutcome, #[case] expected: &str) {
    assert!(!outcome.is_success());
    let failure = outcome.into_stdout().expect_err("should fail");
    assert!(
        failure.to_string().contains(expected),
        "expected {expected} in {failure}"
    );
}

#[test]
fn success_converts_to_stdout() {
    let outcome = ProcessOutcome::Success {
        stdout: "ok".into(),
        stderr: "ignored".into(),
    };
    assert!(outcome.is_success());
    assert_eq!(outcome.into_stdout().expect("success"), "ok");
}

#[test]
fn combine_output_trims_surrounding_whitespace() {
    assert_eq!(combine_output("", "boom\n"), "boom");
    assert_eq!(combine_output("  a\n", "b  "), "a\n\nb");
}
