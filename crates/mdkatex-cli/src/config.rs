//! Configuration loading helpers for the mdkatex CLI.
//!
//! Leading configuration flags are separated from the command tokens so the
//! `ortho_config` loader only receives the flags it understands.

use std::ffi::{OsStr, OsString};

use mdkatex_config::Config;
use ortho_config::OrthoConfig;

use crate::errors::AppError;

/// CLI flags recognised by the configuration loader.
///
/// Must match the fields of [`Config`].
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--log-filter",
    "--log-format",
    "--cache-dir",
    "--retention-secs",
    "--timeout-secs",
    "--bundle-dir",
    "--command-name",
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from `args`, the program name followed by the
    /// configuration flags that preceded the command.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = text
        .split_once('=')
        .map_or((text.as_ref(), false), |(name, _)| (name, true));
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

/// Arguments split into the loader's share and the command's share.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by the leading configuration flags.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by everything from the command onwards.
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits `args` at the first token that is not a configuration flag or the
/// value of one.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut remaining = rest.iter();
    let mut command_arguments = vec![program.clone()];

    while let Some(argument) = remaining.next() {
        match classify_flag(argument) {
            FlagAction::Include { needs_value } => {
                config_arguments.push(argument.clone());
                if needs_value {
                    config_arguments.extend(remaining.next().cloned());
                }
            }
            FlagAction::Stop => {
                command_arguments.push(argument.clone());
                command_arguments.extend(remaining.by_ref().cloned());
                break;
            }
        }
    }

    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn os_args(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case("--cache-dir", FlagAction::Include { needs_value: true })]
    #[case("render", FlagAction::Stop)]
    #[case("--display-mode", FlagAction::Stop)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(classify_flag(OsStr::new(argument)), expected);
    }

    #[rstest]
    fn leading_config_flags_are_split_from_the_command() {
        let args = os_args(&[
            "mdkatex",
            "--cache-dir",
            "/tmp/cache",
            "--log-format=compact",
            "render",
            "--timeout-secs",
            "x",
        ]);

        let split = split_config_arguments(&args);

        assert_eq!(
            split.config_arguments,
            os_args(&["mdkatex", "--cache-dir", "/tmp/cache", "--log-format=compact"])
        );
        assert_eq!(
            split.command_arguments,
            os_args(&["mdkatex", "render", "--timeout-secs", "x"])
        );
    }

    #[rstest]
    fn empty_arguments_split_into_nothing() {
        assert_eq!(split_config_arguments(&[]), ConfigArgumentSplit::default());
    }

    #[rstest]
    fn trailing_flag_without_value_is_passed_to_the_loader() {
        let split = split_config_arguments(&os_args(&["mdkatex", "--retention-secs"]));

        assert_eq!(
            split.config_arguments,
            os_args(&["mdkatex", "--retention-secs"])
        );
        assert_eq!(split.command_arguments, os_args(&["mdkatex"]));
    }
}
