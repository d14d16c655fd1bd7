//! Translates ordered render options into a renderer argument vector.

use crate::options::{OptionValue, RenderOptions};
use crate::resolver::ResolvedBinary;

/// Flag introducing the TeX input file.
pub(crate) const INPUT_FLAG: &str = "--input";
/// Flag introducing the HTML output file.
pub(crate) const OUTPUT_FLAG: &str = "--output";

/// Builds the argument vector for a render.
///
/// The resolved invocation prefix comes first, followed by one entry per
/// option in iteration order: `true` adds a bare `--name`, `false` adds
/// nothing, and any other value adds `--name` and its string form.
///
/// ```
/// use mdkatex_renderer::{RenderOptions, ResolvedBinary, build_argv};
///
/// let binary = ResolvedBinary::new(vec!["/usr/bin/katex".into()]);
/// let options = RenderOptions::new()
///     .with("display-mode", true)
///     .with("--error-color", "#cc0000")
///     .with("leqno", false);
/// assert_eq!(
///     build_argv(&binary, &options),
///     ["/usr/bin/katex", "--display-mode", "--error-color", "#cc0000"],
/// );
/// ```
#[must_use]
pub fn build_argv(binary: &ResolvedBinary, options: &RenderOptions) -> Vec<String> {
    let mut argv = binary.argv().to_vec();
    for (name, value) in options.iter() {
        match value {
            OptionValue::Bool(true) => argv.push(flag_name(name)),
            OptionValue::Bool(false) => {}
            other => {
                argv.push(flag_name(name));
                argv.push(other.to_string());
            }
        }
    }
    argv
}

fn flag_name(name: &str) -> String {
    if name.starts_with("--") {
        name.to_owned()
    } else {
        format!("--{name}")
    }
}
