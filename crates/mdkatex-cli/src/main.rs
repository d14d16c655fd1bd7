//! CLI entrypoint for the mdkatex renderer.
//!
//! The binary delegates to [`mdkatex_cli::run`], which loads configuration,
//! parses the command, and renders or inspects through the renderer core.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdin: StdinLock<'_> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    mdkatex_cli::run(std::env::args_os(), &mut stdin, &mut stdout, &mut stderr)
}
