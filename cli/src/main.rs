//! configmap - inspect and resolve keys of a JSON or TOML configuration file.

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use configmap_core::{ConfigMap, Value, WriteBack};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod logging;
mod output;

/// Resolve configuration keys from a file, the environment and defaults.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Configuration file (JSON or TOML). Defaults to `<config dir>/configmap/config.toml`.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Also write logs to a daily rotated file in this directory.
    #[arg(long = "log-dir")]
    log_dir: Option<PathBuf>,

    /// Print the whole map as JSON after the command.
    #[arg(long = "dump")]
    dump: bool,

    /// Command to run.
    #[command(subcommand)]
    command: CliCommand,
}

/// Operations on the loaded map.
#[derive(Subcommand, Debug, PartialEq)]
enum CliCommand {
    /// Print a stored value; fails if the key is missing or empty.
    Get {
        /// Key to look up.
        key: String,
    },

    /// Resolve a key from the file, falling back to a default.
    Resolve {
        /// Key to resolve.
        key: String,
        /// Default value, parsed as JSON when possible.
        #[arg(short = 'd', long = "default")]
        default: Option<String>,
    },

    /// Resolve a key from the environment, then the file, then a fallback.
    Env {
        /// Key and environment variable name.
        key: String,
        /// Fallback value, parsed as JSON when possible.
        #[arg(long = "fallback")]
        fallback: Option<String>,
        /// Store the resolved value instead of the fallback.
        #[arg(long = "persist-resolved")]
        persist_resolved: bool,
    },

    /// Print the whole map.
    Dump,
}

/// Default configuration file location.
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("configmap").join("config.toml"))
}

/// Parse a command-line value as JSON, falling back to plain text.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::from(raw))
}

/// Build the map from the given file or the default location.
///
/// A missing default file yields an empty map; a missing explicit file is an error.
fn load_map(file: Option<&Path>) -> Result<ConfigMap> {
    let mut config = ConfigMap::new();

    if let Some(path) = file {
        config
            .load_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    } else if let Some(path) = default_config_path()
        && path.is_file()
    {
        config
            .load_file(&path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
    } else {
        tracing::debug!("No configuration file, starting empty");
    }

    Ok(config)
}

/// Print a value as compact JSON.
fn print_value(value: &Value) -> Result<()> {
    output::println(format_args!("{}", serde_json::to_string(value)?));
    Ok(())
}

/// Print the map as pretty JSON.
fn print_map(config: &ConfigMap) -> Result<()> {
    output::println(format_args!("{}", serde_json::to_string_pretty(config)?));
    Ok(())
}

/// Run the selected command against a loaded map.
fn execute(command: &CliCommand, mut config: ConfigMap) -> Result<ConfigMap> {
    match command {
        CliCommand::Get { key } => {
            let Some(value) = config.get(key) else {
                bail!("{key} is not set");
            };
            print_value(value)?;
        },
        CliCommand::Resolve { key, default } => {
            let default = default.as_deref().map(parse_value);
            let value = config
                .get_or_default(key, default)
                .with_context(|| format!("Failed to resolve {key}"))?;
            print_value(&value)?;
        },
        CliCommand::Env {
            key,
            fallback,
            persist_resolved,
        } => {
            if *persist_resolved {
                config = config.write_back(WriteBack::Resolved);
            }
            let fallback = fallback.as_deref().map(parse_value);
            let value = config
                .get_env_or_default(key, fallback)
                .with_context(|| format!("Failed to resolve {key}"))?;
            print_value(&value)?;
        },
        CliCommand::Dump => print_map(&config)?,
    }

    Ok(config)
}

/// Run the main application logic.
fn run(args: &CliArgs) -> Result<()> {
    let config = load_map(args.file.as_deref())?;
    tracing::info!(entries = config.len(), "Configuration loaded");

    let config = execute(&args.command, config)?;
    if args.dump && args.command != CliCommand::Dump {
        print_map(&config)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let _guard = match logging::init_logging(args.log_dir.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            // Stderr-only subscriber so the failure itself is visible
            let _ = tracing_subscriber::fmt().with_writer(std::io::stderr).try_init();
            tracing::error!("Failed to initialize logging: {e}");
            None
        },
    };

    if let Err(e) = run(&args) {
        tracing::error!("{e:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_env_command() {
        let args = CliArgs::try_parse_from([
            "configmap",
            "--dump",
            "env",
            "PORT",
            "--fallback",
            "8080",
            "--persist-resolved",
        ]);
        let args = args.unwrap();
        assert!(args.dump);
        assert_eq!(
            args.command,
            CliCommand::Env {
                key: "PORT".to_string(),
                fallback: Some("8080".to_string()),
                persist_resolved: true,
            }
        );
    }

    #[test]
    fn test_parse_value_json_or_text() {
        assert_eq!(parse_value("8080"), Value::Integer(8080));
        assert_eq!(parse_value("false"), Value::Bool(false));
        assert_eq!(parse_value("[\"a\"]"), Value::from(vec!["a"]));
        assert_eq!(parse_value("\"quoted\""), Value::from("quoted"));
        assert_eq!(parse_value("localhost"), Value::from("localhost"));
        assert_eq!(parse_value(""), Value::from(""));
    }

    #[test]
    fn test_execute_resolve_stores_default() {
        let command = CliCommand::Resolve {
            key: "host".to_string(),
            default: Some("localhost".to_string()),
        };
        let config = execute(&command, ConfigMap::new()).unwrap();
        assert_eq!(config.get("host"), Some(&Value::from("localhost")));
    }

    #[test]
    fn test_execute_resolve_without_default_fails() {
        let command = CliCommand::Resolve {
            key: "host".to_string(),
            default: None,
        };
        let err = execute(&command, ConfigMap::new()).err().map(|e| format!("{e:#}"));
        assert_eq!(
            err.as_deref(),
            Some("Failed to resolve host: Provided default value is invalid")
        );
    }

    #[test]
    fn test_execute_get_missing_key_fails() {
        let command = CliCommand::Get {
            key: "absent".to_string(),
        };
        assert!(execute(&command, ConfigMap::new()).is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        assert!(load_map(Some(Path::new("/nonexistent/configmap.json"))).is_err());
    }

    /// Key that is never set in the test environment.
    const UNSET_KEY: &str = "CONFIGMAP_CLI_TEST_UNSET_MODE";

    #[test]
    fn test_execute_env_stores_fallback_by_default() {
        let command = CliCommand::Env {
            key: UNSET_KEY.to_string(),
            fallback: Some("fallback".to_string()),
            persist_resolved: false,
        };
        let config = ConfigMap::new().with_entries([(UNSET_KEY, "stored")]);

        let config = execute(&command, config).unwrap();
        assert_eq!(config.raw(UNSET_KEY), Some(&Value::from("fallback")));
    }

    #[test]
    fn test_execute_env_persist_resolved_keeps_stored_value() {
        let command = CliCommand::Env {
            key: UNSET_KEY.to_string(),
            fallback: Some("fallback".to_string()),
            persist_resolved: true,
        };
        let config = ConfigMap::new().with_entries([(UNSET_KEY, "stored")]);

        let config = execute(&command, config).unwrap();
        assert_eq!(config.raw(UNSET_KEY), Some(&Value::from("stored")));
    }

    #[test]
    fn test_execute_env_without_fallback_fails() {
        let command = CliCommand::Env {
            key: UNSET_KEY.to_string(),
            fallback: None,
            persist_resolved: false,
        };
        assert!(execute(&command, ConfigMap::new()).is_err());
    }

    #[test]
    fn test_execute_dump_leaves_map_unchanged() {
        let config = ConfigMap::new().with_entries([("name", Value::from("svc")), ("blank", Value::from(""))]);
        let before = config.entries().clone();

        let after = execute(&CliCommand::Dump, config).unwrap();
        assert_eq!(after.entries(), &before);
    }

    #[test]
    fn test_run_with_file_and_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"host": "localhost"}"#).unwrap();

        let args = CliArgs::try_parse_from([
            "configmap",
            "--file",
            path.to_str().unwrap(),
            "--dump",
            "resolve",
            "port",
            "--default",
            "8080",
        ])
        .unwrap();
        assert!(run(&args).is_ok());
    }

    #[test]
    fn test_load_map_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"localhost\"\n").unwrap();

        let config = load_map(Some(&path)).unwrap();
        assert_eq!(config.get("host"), Some(&Value::from("localhost")));
    }
}
