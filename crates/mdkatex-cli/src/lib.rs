//! Command-line interface runtime for the mdkatex renderer.
//!
//! The module owns argument parsing, configuration bootstrapping, telemetry
//! set-up, and dispatch to the renderer core. The entry point takes its IO
//! streams as parameters so tests can drive it without a terminal.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use mdkatex_config::Config;
use mdkatex_renderer::{OptionValue, RenderOptions, Renderer, janitor};

mod cli;
mod config;
mod errors;
mod telemetry;

use cli::{Cli, CliCommand, RenderArgs};
use config::{ConfigLoader, OrthoConfigLoader, split_config_arguments};
use errors::AppError;

/// Bundles the IO streams provided to the CLI runtime.
struct IoStreams<'a, R: Read, W: Write, E: Write> {
    stdin: &'a mut R,
    stdout: &'a mut W,
    stderr: &'a mut E,
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, stdin: &mut R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
{
    let mut io = IoStreams {
        stdin,
        stdout,
        stderr,
    };
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

fn run_with_loader<I, R, W, E, L>(args: I, io: &mut IoStreams<'_, R, W, E>, loader: &L) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: Read,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    let args: Vec<OsString> = args.into_iter().collect();
    let split = split_config_arguments(&args);

    let result = Cli::try_parse_from(&split.command_arguments)
        .map_err(AppError::CliUsage)
        .and_then(|cli| {
            let config = loader.load(&split.config_arguments)?;
            telemetry::initialise(&config)?;
            execute(cli.command, &config, io)
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(AppError::CliUsage(error))
            if matches!(error.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            write!(io.stdout, "{error}").map_or(ExitCode::FAILURE, |()| ExitCode::SUCCESS)
        }
        Err(error) => {
            drop(writeln!(io.stderr, "{error}"));
            ExitCode::FAILURE
        }
    }
}

fn execute<R, W, E>(
    command: CliCommand,
    config: &Config,
    io: &mut IoStreams<'_, R, W, E>,
) -> Result<(), AppError>
where
    R: Read,
    W: Write,
    E: Write,
{
    match command {
        CliCommand::Render(args) => {
            let options = render_options(&args)?;
            let tex = args.tex.map_or_else(|| read_stdin(io.stdin), Ok)?;
            let html = Renderer::from_config(config).render(&tex, &options)?;
            writeln!(io.stdout, "{html}").map_err(AppError::WriteOutput)
        }
        CliCommand::Options => {
            let renderer = Renderer::from_config(config);
            for (name, description) in renderer.options_catalog() {
                writeln!(io.stdout, "--{name}\t{description}").map_err(AppError::WriteOutput)?;
            }
            Ok(())
        }
        CliCommand::Resolve => {
            let renderer = Renderer::from_config(config);
            let binary = renderer.resolve()?;
            writeln!(io.stdout, "{}", binary.argv().join(" ")).map_err(AppError::WriteOutput)
        }
        CliCommand::Clean => {
            let removed = janitor::sweep(config.cache_dir().as_std_path(), config.retention());
            writeln!(io.stdout, "removed {removed} expired cache entries")
                .map_err(AppError::WriteOutput)
        }
    }
}

/// Builds render options: display mode first, then `-o` options in order.
fn render_options(args: &RenderArgs) -> Result<RenderOptions, AppError> {
    let mut options = RenderOptions::new();
    if args.display_mode {
        options.insert("display-mode", true);
    }
    for raw in &args.options {
        let (name, value) = parse_option(raw)?;
        options.insert(name, value);
    }
    Ok(options)
}

/// Parses `NAME` as a switch and `NAME=VALUE` as a typed value.
fn parse_option(raw: &str) -> Result<(&str, OptionValue), AppError> {
    let (name, value) = raw
        .split_once('=')
        .map_or((raw, OptionValue::Bool(true)), |(name, value)| {
            (name, OptionValue::parse(value))
        });
    let key = name.trim_start_matches("--");
    if key.is_empty() {
        return Err(AppError::InvalidOption(raw.to_owned()));
    }
    Ok((key, value))
}

fn read_stdin<R: Read>(stdin: &mut R) -> Result<String, AppError> {
    let mut tex = String::new();
    stdin.read_to_string(&mut tex).map_err(AppError::ReadInput)?;
    Ok(tex.trim_end().to_owned())
}
