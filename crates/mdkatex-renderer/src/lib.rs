//! External KaTeX invocation with on-disk memoization.
//!
//! The `mdkatex-renderer` crate turns TeX snippets into HTML by running an
//! external `katex` command line renderer and caching its output. It is built
//! from small parts that can be used on their own:
//!
//! - [`BinaryResolver`] finds a working renderer on the search path (directly
//!   or through the `npx` package runner) or in a directory of bundled
//!   platform binaries, and remembers a successful search on disk.
//! - [`OptionsCatalog`] lists the options the renderer accepts, parsed from
//!   its `--help` output.
//! - [`build_argv`] translates [`RenderOptions`] into command line flags.
//! - [`ProcessExecutor`] runs one invocation and classifies the result as a
//!   [`ProcessOutcome`]; [`SystemExecutor`] is the real implementation.
//! - [`RenderCache`] stores output under a digest of the input and the full
//!   argument vector and runs the [`janitor`] after every render.
//!
//! [`Renderer`] owns one of each and is the usual entry point.
//!
//! # Example
//!
//! ```rust,no_run
//! use mdkatex_config::Config;
//! use mdkatex_renderer::{RenderOptions, Renderer};
//!
//! let renderer = Renderer::from_config(&Config::default());
//! let options = RenderOptions::new().with("display-mode", true);
//! let html = renderer.render(r"\int_0^1 x\,dx", &options).expect("render");
//! println!("{html}");
//! ```

pub mod cache;
pub mod catalog;
pub mod command;
pub mod digest;
pub mod error;
mod files;
pub mod janitor;
pub mod options;
pub mod process;
pub mod renderer;
pub mod resolver;
mod signals;

#[cfg(test)]
mod tests;

pub use self::cache::RenderCache;
pub use self::catalog::{OptionHelp, OptionsCatalog, parse_help_text};
pub use self::command::build_argv;
pub use self::digest::cache_digest;
pub use self::error::{RenderError, RenderFailure, RendererError, ResolveError};
pub use self::janitor::sweep;
pub use self::options::{OptionValue, RenderOptions};
pub use self::process::{ProcessExecutor, ProcessOutcome, SystemExecutor};
pub use self::renderer::{Renderer, RendererSettings};
pub use self::resolver::{BinaryResolver, Platform, ResolvedBinary, ResolverSettings};
pub use self::signals::signal_name;
