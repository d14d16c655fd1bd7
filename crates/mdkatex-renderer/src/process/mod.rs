//! Renderer subprocess execution.
//!
//! [`SystemExecutor`] implements [`ProcessExecutor`] by spawning the renderer
//! with stdout and stderr piped, draining both pipes on helper threads so a
//! chatty child never blocks on a full pipe buffer, and waiting for exit under
//! a timeout. Every exit path classifies into a [`ProcessOutcome`]; pipe
//! handles are owned by the reader threads and released when they finish.

use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::RenderFailure;
use crate::signals::signal_name;

/// Tracing target for renderer process operations.
const PROCESS_TARGET: &str = "mdkatex_renderer::process";

/// Default cap on a single renderer invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// First poll interval while waiting for the child; doubles up to the max.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);
const MAX_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Tagged result of one renderer invocation.
#[derive(Debug, Clone)]
pub enum ProcessOutcome {
    /// The process exited with status zero.
    Success {
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The process exited with a non-zero status.
    NonZeroExit {
        /// Exit status code.
        code: i32,
        /// Stdout followed by stderr, trimmed.
        output: String,
    },
    /// The process was terminated by a signal.
    Signaled {
        /// Signal number.
        signal: i32,
        /// Canonical signal name.
        name: String,
    },
    /// The process could not be started.
    LaunchFailure {
        /// Underlying OS error.
        source: Arc<io::Error>,
    },
    /// The process outlived the timeout and was killed.
    TimedOut {
        /// Timeout that elapsed.
        timeout: Duration,
    },
}

impl ProcessOutcome {
    /// Returns `true` for [`ProcessOutcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Converts the outcome into captured stdout or a [`RenderFailure`].
    ///
    /// # Errors
    ///
    /// Returns the failure matching any non-success variant.
    pub fn into_stdout(self) -> Result<String, RenderFailure> {
        match self {
            Self::Success { stdout, .. } => Ok(stdout),
            Self::NonZeroExit { code, output } => Err(RenderFailure::NonZeroExit { code, output }),
            Self::Signaled { signal, name } => Err(RenderFailure::Signaled { signal, name }),
            Self::LaunchFailure { source } => Err(RenderFailure::LaunchFailure { source }),
            Self::TimedOut { timeout } => Err(RenderFailure::TimedOut { timeout }),
        }
    }

    fn launch_failure(source: io::Error) -> Self {
        Self::LaunchFailure {
            source: Arc::new(source),
        }
    }
}

/// Trait abstracting renderer process execution for testability.
///
/// The production implementation is [`SystemExecutor`]. Tests substitute
/// doubles that count invocations or fake the renderer's output file.
pub trait ProcessExecutor {
    /// Runs `argv` (program first) to completion and classifies the result.
    fn execute(&self, argv: &[String]) -> ProcessOutcome;
}

impl<E: ProcessExecutor + ?Sized> ProcessExecutor for &E {
    fn execute(&self, argv: &[String]) -> ProcessOutcome {
        (**self).execute(argv)
    }
}

/// Executes renderer invocations as real child processes.
#[derive(Debug, Clone, Copy)]
pub struct SystemExecutor {
    timeout: Duration,
}

impl SystemExecutor {
    /// Creates an executor that kills children running longer than `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Returns the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ProcessExecutor for SystemExecutor {
    fn execute(&self, argv: &[String]) -> ProcessOutcome {
        run_process(argv, self.timeout)
    }
}

fn run_process(argv: &[String], timeout: Duration) -> ProcessOutcome {
    let Some((program, args)) = argv.split_first() else {
        return ProcessOutcome::launch_failure(io::Error::new(
            io::ErrorKind::InvalidInput,
            "empty argument vector",
        ));
    };

    debug!(target: PROCESS_TARGET, ?argv, "spawning renderer process");

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let started = Instant::now();
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(error) => {
            debug!(target: PROCESS_TARGET, program, %error, "renderer failed to launch");
            return ProcessOutcome::launch_failure(error);
        }
    };

    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    let status = match wait_for_exit(&mut child, timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            warn!(
                target: PROCESS_TARGET,
                program,
                timeout_ms = millis(timeout),
                "renderer timed out, process killed"
            );
            // Grandchildren may still hold the pipes open; the readers are
            // detached instead of joined so the caller is not blocked.
            drop(stdout_reader);
            drop(stderr_reader);
            return ProcessOutcome::TimedOut { timeout };
        }
        Err(error) => {
            drop(child.kill());
            drop(child.wait());
            return ProcessOutcome::launch_failure(error);
        }
    };

    let stdout = collect(stdout_reader);
    let stderr = collect(stderr_reader);

    debug!(
        target: PROCESS_TARGET,
        program,
        ?status,
        elapsed_ms = millis(started.elapsed()),
        "renderer process exited"
    );

    classify(status, stdout, stderr)
}

/// Waits for the child to exit, killing it once `timeout` elapses.
///
/// Returns `Ok(None)` after a timeout kill.
fn wait_for_exit(child: &mut Child, timeout: Duration) -> io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    let mut interval = MIN_POLL_INTERVAL;

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() > timeout {
            drop(child.kill());
            drop(child.wait());
            return Ok(None);
        }
        thread::sleep(interval);
        interval = (interval * 2).min(MAX_POLL_INTERVAL);
    }
}

fn spawn_reader<R>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn collect(reader: Option<JoinHandle<io::Result<Vec<u8>>>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .and_then(Result::ok)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

fn classify(status: ExitStatus, stdout: String, stderr: String) -> ProcessOutcome {
    match status.code() {
        Some(0) => ProcessOutcome::Success { stdout, stderr },
        Some(code) => ProcessOutcome::NonZeroExit {
            code,
            output: combine_output(&stdout, &stderr),
        },
        None => termination_signal(status).map_or_else(
            || ProcessOutcome::NonZeroExit {
                code: -1,
                output: combine_output(&stdout, &stderr),
            },
            |signal| ProcessOutcome::Signaled {
                signal,
                name: signal_name(signal).unwrap_or("UNKNOWN").to_owned(),
            },
        ),
    }
}

/// Joins stdout and stderr (in that order) for diagnostics.
fn combine_output(stdout: &str, stderr: &str) -> String {
    format!("{stdout}\n{stderr}").trim().to_owned()
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
const fn termination_signal(_status: ExitStatus) -> Option<i32> {
    None
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests;
