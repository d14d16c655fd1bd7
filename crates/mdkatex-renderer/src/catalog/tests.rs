//! Unit tests for option discovery.

use std::cell::Cell;

use rstest::rstest;

use super::*;
use crate::tests::{MockExecutor, non_zero_exit, success};

const LIVE_HELP: &str = "Usage: katex [options]

Options:
  --fleqn                    Render display math flush left
  --trust                    Trust the input, enabling all HTML features such
                             as \\url
  -o, --output <path>        Write html output to the given file
";

#[rstest]
fn builtin_listing_excludes_reserved_options() {
    let options = parse_help_text(DEFAULT_HELP_TEXT);

    assert_eq!(options.len(), 10);
    for reserved in RESERVED_OPTIONS {
        assert!(!options.contains_key(reserved), "{reserved} should be hidden");
    }
    assert_eq!(
        options.get("error-color").map(String::as_str),
        Some("A color string given i...")
    );
    assert_eq!(
        options.get("color-is-text-color").map(String::as_str),
        Some("Makes \\color behave li...")
    );
}

#[rstest]
fn wrapped_descriptions_are_joined() {
    let options = parse_help_text(LIVE_HELP);

    assert_eq!(
        options.get("trust").map(String::as_str),
        Some("Trust the input, enabling all HTML features such as \\url")
    );
    assert!(!options.contains_key("output"));
}

#[rstest]
fn text_before_options_header_is_ignored() {
    let options = parse_help_text("Usage: katex --bogus  flag\nOptions:\n  --leqno  Left tags\n");

    assert!(!options.contains_key("bogus"));
    assert_eq!(options.get("leqno").map(String::as_str), Some("Left tags"));
}

#[rstest]
fn live_options_overlay_builtin_ones() {
    let catalog = OptionsCatalog::new();

    let options = catalog.discover(|| Ok(Some(LIVE_HELP.to_owned())));

    assert_eq!(
        options.get("fleqn").map(String::as_str),
        Some("Render display math flush left")
    );
    assert!(options.contains_key("trust"));
    assert!(options.contains_key("leqno"), "builtin entries survive");
}

#[rstest]
fn unresolvable_renderer_falls_back_to_builtin_listing() {
    let catalog = OptionsCatalog::new();

    let options = catalog.discover(|| Ok(None));

    assert_eq!(options, &parse_help_text(DEFAULT_HELP_TEXT));
}

#[rstest]
fn failing_help_invocation_falls_back_to_builtin_listing() {
    let catalog = OptionsCatalog::new();

    let options = catalog.discover(|| Err(RenderFailure::NonZeroExit {
        code: 1,
        output: String::from("unknown option"),
    }));

    assert_eq!(options.len(), 10);
}

#[rstest]
fn discovery_is_memoized() {
    let catalog = OptionsCatalog::new();
    let calls = Cell::new(0);
    let live = || {
        calls.set(calls.get() + 1);
        Ok(Some(LIVE_HELP.to_owned()))
    };

    assert!(catalog.get().is_none());
    let first = catalog.discover(live).clone();
    let second = catalog.discover(|| Ok(None));

    assert_eq!(calls.get(), 1);
    assert_eq!(&first, second);
    assert!(catalog.get().is_some());
}

#[rstest]
fn fetch_help_text_appends_help_flag() {
    let binary = ResolvedBinary::new(vec![String::from("npx"), String::from("katex")]);
    let mut executor = MockExecutor::new();
    executor
        .expect_execute()
        .withf(|argv: &[String]| argv == ["npx", "katex", "--help"])
        .times(1)
        .returning(|_| success(LIVE_HELP));

    let help = fetch_help_text(&binary, &executor).expect("help text");

    assert_eq!(help, LIVE_HELP);
}

#[rstest]
fn fetch_help_text_reports_failures() {
    let binary = ResolvedBinary::new(vec![String::from("katex")]);
    let mut executor = MockExecutor::new();
    executor
        .expect_execute()
        .returning(|_| non_zero_exit(2, "boom"));

    let error = fetch_help_text(&binary, &executor).expect_err("should fail");

    assert!(matches!(error, RenderFailure::NonZeroExit { code: 2, .. }));
}
