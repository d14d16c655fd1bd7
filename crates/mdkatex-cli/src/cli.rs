//! CLI argument definitions for the mdkatex toolchain.

use clap::{Args, Parser, Subcommand};

/// Command-line interface for the mdkatex renderer.
#[derive(Parser, Debug)]
#[command(
    name = "mdkatex",
    version,
    about = "Render TeX to HTML through an external KaTeX binary, with caching",
    disable_help_subcommand = true
)]
pub(crate) struct Cli {
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Operations offered by the CLI.
#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CliCommand {
    /// Renders TeX to HTML, reading standard input when no TeX is given.
    Render(RenderArgs),
    /// Lists the options accepted by the resolved renderer.
    Options,
    /// Prints the resolved renderer invocation.
    Resolve,
    /// Removes expired entries from the render cache.
    Clean,
}

/// Arguments of the `render` command.
#[derive(Args, Debug, Clone)]
pub(crate) struct RenderArgs {
    /// Renders in display mode.
    #[arg(long)]
    pub(crate) display_mode: bool,
    /// Renderer option as `NAME` (a switch) or `NAME=VALUE`; repeatable.
    #[arg(short = 'o', long = "option", value_name = "NAME[=VALUE]")]
    pub(crate) options: Vec<String>,
    /// TeX source to render.
    #[arg(value_name = "TEX", allow_hyphen_values = true)]
    pub(crate) tex: Option<String>,
}
