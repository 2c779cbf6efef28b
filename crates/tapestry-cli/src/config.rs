//! Configuration loading helpers for the Tapestry CLI.
//!
//! Configuration flags must precede the subcommand. The leading run of
//! recognised flags (and their values) is handed to `ortho_config`; the rest
//! of the command line is parsed by clap.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use tapestry_config::Config;

use crate::AppError;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: keep in sync with the fields of `tapestry_config::Config`.
pub(crate) const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--log-filter",
    "--log-format",
    "--max-call-depth",
    "--max-nodes",
    "--exclude-paths",
    "--workspace-root",
    "--qualify-receivers",
];

/// Flags that never take a value.
const CONFIG_SWITCHES: &[&str] = &["--qualify-receivers"];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the filtered configuration arguments.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Skip,
}

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

impl OrthoConfigLoader {
    fn process_config_flag(argument: &OsStr) -> FlagAction {
        let argument_text = argument.to_string_lossy();
        if !argument_text.starts_with("--") {
            return FlagAction::Skip;
        }

        let (flag, has_inline_value) = match argument_text.split_once('=') {
            Some((flag, _)) => (flag, true),
            None => (argument_text.as_ref(), false),
        };

        if CONFIG_CLI_FLAGS.contains(&flag) {
            return FlagAction::Include {
                needs_value: !has_inline_value && !CONFIG_SWITCHES.contains(&flag),
            };
        }

        FlagAction::Skip
    }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command_start: usize,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some(program) = args.first() else {
        return ConfigArgumentSplit {
            config_arguments: Vec::new(),
            command_start: 0,
        };
    };

    let mut filtered: Vec<OsString> = vec![program.clone()];
    let mut command_start = 1usize;
    let mut pending_value = false;

    for argument in args.iter().skip(1) {
        if pending_value {
            filtered.push(argument.clone());
            pending_value = false;
            command_start += 1;
            continue;
        }

        match OrthoConfigLoader::process_config_flag(argument.as_os_str()) {
            FlagAction::Include { needs_value } => {
                filtered.push(argument.clone());
                command_start += 1;
                pending_value = needs_value;
            }
            FlagAction::Skip => break,
        }
    }

    ConfigArgumentSplit {
        config_arguments: filtered,
        command_start,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::inline("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case::separate("--log-filter", FlagAction::Include { needs_value: true })]
    #[case::switch("--qualify-receivers", FlagAction::Include { needs_value: false })]
    #[case::command("trace", FlagAction::Skip)]
    #[case::unknown("--pretty", FlagAction::Skip)]
    fn classifies_flags(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(
            OrthoConfigLoader::process_config_flag(OsStr::new(argument)),
            expected
        );
    }

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn leading_flags_are_routed_to_the_loader() {
        let args = os(&[
            "tapestry",
            "--max-call-depth",
            "3",
            "--qualify-receivers",
            "--log-format=json",
            "trace",
            "main.go",
            "main",
            "--pretty",
        ]);

        let split = split_config_arguments(&args);

        assert_eq!(
            split.config_arguments,
            os(&[
                "tapestry",
                "--max-call-depth",
                "3",
                "--qualify-receivers",
                "--log-format=json"
            ])
        );
        assert_eq!(split.command_start, 5);
    }

    #[test]
    fn flags_after_the_command_stay_with_the_command() {
        let args = os(&["tapestry", "file", "lib.rs", "--max-nodes", "4"]);
        let split = split_config_arguments(&args);
        assert_eq!(split.config_arguments, os(&["tapestry"]));
        assert_eq!(split.command_start, 1);
    }

    #[test]
    fn empty_arguments_split_to_nothing() {
        let split = split_config_arguments(&[]);
        assert!(split.config_arguments.is_empty());
        assert_eq!(split.command_start, 0);
    }
}
