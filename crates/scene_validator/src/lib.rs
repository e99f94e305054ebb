use std::collections::BTreeSet;
use std::path::PathBuf;

use scene_graph::{OutputFormat, RunError, ValidationOutcome, ValidatorConfig};
use thiserror::Error;

pub const DATA_DIR_ENV_VAR: &str = "SCENE_DATA_DIR";
pub const ENTRY_SCENE_ENV_VAR: &str = "SCENE_ENTRY_SCENE";
pub const RESERVED_KEYWORDS_ENV_VAR: &str = "SCENE_RESERVED_KEYWORDS";

pub const EXIT_PASSED: u8 = 0;
pub const EXIT_FAILED: u8 = 1;
pub const EXIT_USAGE: u8 = 2;

/// Stream that log events and abort messages go to. JSON output owns stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStream {
    Stdout,
    Stderr,
}

pub fn diagnostic_stream(format: OutputFormat) -> DiagnosticStream {
    match format {
        OutputFormat::Text => DiagnosticStream::Stdout,
        OutputFormat::Json => DiagnosticStream::Stderr,
    }
}

/// Any missing reference, empty store, or aborted run fails.
pub fn exit_code(result: &Result<ValidationOutcome, RunError>) -> u8 {
    match result {
        Ok(outcome) if outcome.passed() => EXIT_PASSED,
        Ok(_) | Err(_) => EXIT_FAILED,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Help,
    Validate(ValidatorConfig),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing value for {flag}")]
    MissingValue { flag: &'static str },
    #[error("invalid --format value '{value}' (expected text or json)")]
    InvalidFormat { value: String },
    #[error("{flag} must not be empty")]
    EmptyValue { flag: &'static str },
    #[error("unknown argument '{arg}'")]
    UnknownArgument { arg: String },
}

/// Builds the run configuration from command-line flags, falling back to the
/// environment and then to the built-in defaults.
pub fn parse_args<F>(args: &[String], env: F) -> Result<CliCommand, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = config_from_env(env);

    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--data-dir" => {
                let value = flag_value(args, index, "--data-dir")?;
                config.data_dir = PathBuf::from(value);
                index += 2;
            }
            "--entry-scene" => {
                let value = flag_value(args, index, "--entry-scene")?;
                config.entry_scene = value.to_string();
                index += 2;
            }
            "--reserved" => {
                let value = flag_value(args, index, "--reserved")?;
                config.reserved_keywords = parse_keyword_list(value);
                index += 2;
            }
            "--format" => {
                let value = flag_value(args, index, "--format")?;
                config.format = match value {
                    "text" => OutputFormat::Text,
                    "json" => OutputFormat::Json,
                    other => {
                        return Err(ConfigError::InvalidFormat {
                            value: other.to_string(),
                        })
                    }
                };
                index += 2;
            }
            other => {
                return Err(ConfigError::UnknownArgument {
                    arg: other.to_string(),
                })
            }
        }
    }

    Ok(CliCommand::Validate(config))
}

fn config_from_env<F>(env: F) -> ValidatorConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = ValidatorConfig::default();
    if let Some(dir) = env(DATA_DIR_ENV_VAR).filter(|dir| !dir.trim().is_empty()) {
        config.data_dir = PathBuf::from(dir.trim());
    }
    if let Some(entry) = env(ENTRY_SCENE_ENV_VAR).filter(|entry| !entry.trim().is_empty()) {
        config.entry_scene = entry.trim().to_string();
    }
    if let Some(raw) = env(RESERVED_KEYWORDS_ENV_VAR) {
        config.reserved_keywords = parse_keyword_list(&raw);
    }
    config
}

fn flag_value<'a>(
    args: &'a [String],
    index: usize,
    flag: &'static str,
) -> Result<&'a str, ConfigError> {
    let value = args
        .get(index + 1)
        .map(String::as_str)
        .ok_or(ConfigError::MissingValue { flag })?;
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyValue { flag });
    }
    Ok(value)
}

fn parse_keyword_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn usage_text() -> String {
    [
        "scene_validator - check that every scene reference resolves",
        "",
        "Usage:",
        "  scene_validator [--data-dir <path>] [--entry-scene <id>] [--reserved <a,b,...>] [--format text|json]",
        "",
        "Defaults:",
        "  --data-dir src/data       (env SCENE_DATA_DIR)",
        "  --entry-scene start_alley (env SCENE_ENTRY_SCENE)",
        "  --reserved RETURN         (env SCENE_RESERVED_KEYWORDS)",
        "  --format text",
        "",
        "Exit status is 1 when any referenced scene is missing, the data directory",
        "does not exist, no scenes were found, or a scene has no usable description.",
        "Argument errors exit with 2.",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use scene_graph::{SceneLoadError, ValidationError};

    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn validate_config(command: CliCommand) -> ValidatorConfig {
        match command {
            CliCommand::Validate(config) => config,
            CliCommand::Help => panic!("expected validate command"),
        }
    }

    #[test]
    fn no_arguments_uses_defaults() {
        let config = validate_config(parse_args(&[], no_env).expect("parse"));
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = validate_config(
            parse_args(
                &args(&[
                    "--data-dir",
                    "content/scenes",
                    "--entry-scene",
                    "prologue",
                    "--reserved",
                    "RETURN, QUIT,,",
                    "--format",
                    "json",
                ]),
                no_env,
            )
            .expect("parse"),
        );
        assert_eq!(config.data_dir, PathBuf::from("content/scenes"));
        assert_eq!(config.entry_scene, "prologue");
        assert_eq!(
            config.reserved_keywords,
            BTreeSet::from(["QUIT".to_string(), "RETURN".to_string()])
        );
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn env_applies_below_flags() {
        let env = HashMap::from([
            (DATA_DIR_ENV_VAR, "from/env"),
            (ENTRY_SCENE_ENV_VAR, " intro "),
            (RESERVED_KEYWORDS_ENV_VAR, "BACK"),
        ]);
        let lookup = |key: &str| env.get(key).map(|value| value.to_string());

        let config = validate_config(parse_args(&[], lookup).expect("parse"));
        assert_eq!(config.data_dir, PathBuf::from("from/env"));
        assert_eq!(config.entry_scene, "intro");
        assert_eq!(config.reserved_keywords, BTreeSet::from(["BACK".to_string()]));

        let config = validate_config(
            parse_args(&args(&["--data-dir", "from/flag"]), lookup).expect("parse"),
        );
        assert_eq!(config.data_dir, PathBuf::from("from/flag"));
    }

    #[test]
    fn help_short_circuits() {
        assert_eq!(
            parse_args(&args(&["--format", "json", "--help"]), no_env).expect("parse"),
            CliCommand::Help
        );
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert_eq!(
            parse_args(&args(&["--data-dir"]), no_env),
            Err(ConfigError::MissingValue { flag: "--data-dir" })
        );
        assert_eq!(
            parse_args(&args(&["--format", "yaml"]), no_env),
            Err(ConfigError::InvalidFormat {
                value: "yaml".to_string()
            })
        );
        assert_eq!(
            parse_args(&args(&["--entry-scene", " "]), no_env),
            Err(ConfigError::EmptyValue {
                flag: "--entry-scene"
            })
        );
        assert_eq!(
            parse_args(&args(&["validate"]), no_env),
            Err(ConfigError::UnknownArgument {
                arg: "validate".to_string()
            })
        );
    }

    fn outcome(defect_count: usize) -> ValidationOutcome {
        ValidationOutcome {
            defect_count,
            errors: vec!["- x: Referenced from y (in a.json)".to_string(); defect_count],
        }
    }

    #[test]
    fn exit_code_passes_only_without_defects() {
        assert_eq!(exit_code(&Ok(outcome(0))), EXIT_PASSED);
        assert_eq!(exit_code(&Ok(outcome(2))), EXIT_FAILED);
    }

    #[test]
    fn exit_code_fails_for_empty_store_outcome() {
        let empty = ValidationOutcome {
            defect_count: 1,
            errors: vec!["No scenes found".to_string()],
        };
        assert_eq!(exit_code(&Ok(empty)), EXIT_FAILED);
    }

    #[test]
    fn exit_code_fails_for_aborted_runs() {
        let missing_dir = Err(RunError::Load(SceneLoadError::DataDirMissing {
            path: PathBuf::from("src/data"),
        }));
        assert_eq!(exit_code(&missing_dir), EXIT_FAILED);

        let malformed = Err(RunError::Validation(ValidationError::MalformedScene {
            scene_id: "attic".to_string(),
            document: "house.json".to_string(),
        }));
        assert_eq!(exit_code(&malformed), EXIT_FAILED);
    }

    #[test]
    fn json_output_moves_diagnostics_off_stdout() {
        assert_eq!(diagnostic_stream(OutputFormat::Text), DiagnosticStream::Stdout);
        assert_eq!(diagnostic_stream(OutputFormat::Json), DiagnosticStream::Stderr);
    }
}
