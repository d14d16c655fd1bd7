//! Discovery of the renderer's configurable options.
//!
//! The catalog starts from a built-in copy of the renderer's `--help` output
//! and overlays whatever the live renderer reports, so a newer renderer can
//! add or redescribe options. Options managed internally by the cache
//! (`input`, `output`, `display-mode`) and the informational `version` and
//! `help` flags are never listed.

use std::collections::BTreeMap;

use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::RenderFailure;
use crate::process::ProcessExecutor;
use crate::resolver::ResolvedBinary;

/// Tracing target for option discovery.
const CATALOG_TARGET: &str = "mdkatex_renderer::catalog";

/// Option name to one-line description.
pub type OptionHelp = BTreeMap<String, String>;

/// Abbreviated help output of a known baseline renderer release.
pub const DEFAULT_HELP_TEXT: &str = "
Options:
  -V, --version              output the version number
  -d, --display-mode         Render math in display...
  --leqno                    Render display math in...
  --fleqn                    Render display math fl...
  -t, --no-throw-on-error    Render errors (in the ...
  -c, --error-color <color>  A color string given i...
  -b, --color-is-text-color  Makes \\color behave li...
  -S, --strict               Turn on strict / LaTeX...
  -s, --max-size <n>         If non-zero, all user-...
  -e, --max-expand <n>       Limit the number of ma...
  -m, --macro <def>          Define custom macro of...
  -f, --macro-file <path>    Read macro definitions...
  -i, --input <path>         Read LaTeX input from ...
  -o, --output <path>        Write html output to t...
  -h, --help                 output usage information
";

/// Options the cache manages itself or that carry no rendering meaning.
pub const RESERVED_OPTIONS: [&str; 5] = ["version", "help", "input", "output", "display-mode"];

/// Marker preceding the option listing in help output.
const OPTIONS_HEADER: &str = "Options:";

#[expect(
    clippy::expect_used,
    reason = "pattern is a compile-time constant covered by tests"
)]
static OPTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)--(?P<name>[a-z\-]+)\s+(?:<[a-z\-]+>)?\s+(?P<text>[^\n]*[ \s\w(){},:;.'\\/\[\]]*)",
    )
    .expect("option pattern compiles")
});

/// Parses the option listing of a renderer's `--help` output.
///
/// Only text after the first `Options:` marker is considered; wrapped
/// description lines are joined with single spaces.
#[must_use]
pub fn parse_help_text(help_text: &str) -> OptionHelp {
    let listing = help_text
        .split_once(OPTIONS_HEADER)
        .map_or(help_text, |(_, rest)| rest);

    let mut options: OptionHelp = OPTION_PATTERN
        .captures_iter(listing)
        .filter_map(|captures| {
            let name = captures.name("name")?.as_str();
            let description = captures
                .name("text")
                .map_or("", |text| text.as_str())
                .lines()
                .map(str::trim)
                .collect::<Vec<_>>()
                .join(" ");
            Some((name.to_owned(), description.trim().to_owned()))
        })
        .collect();

    for reserved in RESERVED_OPTIONS {
        options.remove(reserved);
    }
    options
}

/// Runs `binary --help` through `executor` and returns its stdout.
///
/// # Errors
///
/// Returns the [`RenderFailure`] describing any unsuccessful invocation.
pub fn fetch_help_text<E>(binary: &ResolvedBinary, executor: &E) -> Result<String, RenderFailure>
where
    E: ProcessExecutor + ?Sized,
{
    let mut argv = binary.argv().to_vec();
    argv.push(String::from("--help"));
    executor.execute(&argv).into_stdout()
}

/// Lazily computed, memoized option catalog.
#[derive(Debug, Default)]
pub struct OptionsCatalog {
    options: OnceCell<OptionHelp>,
}

impl OptionsCatalog {
    /// Creates an empty catalog; nothing is computed until first use.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            options: OnceCell::new(),
        }
    }

    /// Returns the catalog, computing it on first call.
    ///
    /// `live_help` is invoked at most once and supplies the live renderer's
    /// help output. `Ok(None)` means no renderer could be resolved, which is
    /// silent; an error is logged and the built-in listing is used alone.
    /// Either way the result is memoized.
    pub fn discover<F>(&self, live_help: F) -> &OptionHelp
    where
        F: FnOnce() -> Result<Option<String>, RenderFailure>,
    {
        self.options.get_or_init(|| {
            let mut options = parse_help_text(DEFAULT_HELP_TEXT);
            match live_help() {
                Ok(Some(help_text)) => {
                    let live = parse_help_text(&help_text);
                    debug!(
                        target: CATALOG_TARGET,
                        discovered = live.len(),
                        "merging live renderer options"
                    );
                    options.extend(live);
                }
                Ok(None) => {
                    debug!(target: CATALOG_TARGET, "no renderer resolved, using built-in options");
                }
                Err(error) => {
                    warn!(
                        target: CATALOG_TARGET,
                        %error,
                        "renderer help unavailable, using built-in options"
                    );
                }
            }
            options
        })
    }

    /// Returns the catalog if it has already been computed.
    #[must_use]
    pub fn get(&self) -> Option<&OptionHelp> {
        self.options.get()
    }
}

#[cfg(test)]
mod tests;
