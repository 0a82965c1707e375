//! CLI argument parsing for az-prom-rules-converter
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `<INPUT>`: Prometheus rules file path (`-` for stdin), or JSON text with `--json`
//! - `--azure-monitor-workspace` / `--amw` / `-amw` / `-amw=<id>`: Azure Monitor workspace id (env: AZ_PROM_AZURE_MONITOR_WORKSPACE)
//! - `--cluster-name` / `-c`: Cluster name (env: AZ_PROM_CLUSTER_NAME)
//! - `--action-group-id` / `-a`: Action group resource id (env: AZ_PROM_ACTION_GROUP_ID)
//! - `--location` / `-l`: Rule group location (env: AZ_PROM_LOCATION)
//! - `--output` / `-o`: Output file; stdout when not set
//! - `--skip-validation` / `-s`: Skip schema validation
//! - `--json` / `-j`: Treat `<INPUT>` as JSON text instead of a file path
//! - `--config`: Options file (env: AZ_PROM_CONFIG)
//! - `--log-level`: Log level (trace/debug/info/warn/error, env: AZ_PROM_LOG_LEVEL)
//!
//! # Precedence
//!
//! Option values are resolved in the following order (highest to lowest priority):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Options file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::{ConfigError, ConversionOptions};

/// Azure Prometheus rule groups tool
///
/// Converts a Prometheus rule groups YAML file to an ARM template.
#[derive(Parser, Debug)]
#[command(name = "az-prom-rules-converter")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input Prometheus rule groups YAML file path ("-" reads stdin)
    #[arg(value_name = "INPUT")]
    pub input: String,

    /// Azure monitor workspace id's that this rule group is scoped to
    #[arg(
        long = "azure-monitor-workspace",
        visible_alias = "amw",
        value_name = "ID",
        env = "AZ_PROM_AZURE_MONITOR_WORKSPACE"
    )]
    pub azure_monitor_workspace: Option<String>,

    /// The cluster name of the rule group evaluation
    #[arg(short, long, value_name = "NAME", env = "AZ_PROM_CLUSTER_NAME")]
    pub cluster_name: Option<String>,

    /// The resource id of the action group to use for alerting rules
    #[arg(short, long, value_name = "ID", env = "AZ_PROM_ACTION_GROUP_ID")]
    pub action_group_id: Option<String>,

    /// Output path. If not set, output is printed to stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Skip validation
    #[arg(short, long)]
    pub skip_validation: bool,

    /// Rule group location
    #[arg(short, long, value_name = "LOCATION", env = "AZ_PROM_LOCATION")]
    pub location: Option<String>,

    /// Treat INPUT as JSON text instead of a file path
    #[arg(short, long)]
    pub json: bool,

    /// Options file (YAML or JSON) with defaults for the options above
    #[arg(long, value_name = "FILE", env = "AZ_PROM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, value_enum, default_value = "warn", env = "AZ_PROM_LOG_LEVEL")]
    pub log_level: LogLevel,
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level
    Info,
    /// Warn level - default
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Rewrite the legacy `-amw` and `-amw=<id>` spellings to `--azure-monitor-workspace`
///
/// clap only supports single-character short flags.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            let rewritten = match arg.to_str() {
                Some("-amw") => Some(OsString::from("--azure-monitor-workspace")),
                Some(s) => s
                    .strip_prefix("-amw=")
                    .map(|id| OsString::from(format!("--azure-monitor-workspace={}", id))),
                None => None,
            };
            rewritten.unwrap_or(arg)
        })
        .collect()
}

impl Cli {
    /// Parse the process arguments
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args_os()))
    }

    /// Resolve the conversion options
    ///
    /// Values from the options file are overridden by flags and environment
    /// variables.
    ///
    /// # Errors
    /// Returns an error if the options file cannot be loaded or the resulting
    /// options are invalid
    pub fn to_options(&self) -> Result<ConversionOptions, ConfigError> {
        let base = match &self.config {
            Some(path) => ConversionOptions::load(path)?,
            None => ConversionOptions::default(),
        };

        let overrides = ConversionOptions {
            azure_monitor_workspace: self.azure_monitor_workspace.clone(),
            cluster_name: self.cluster_name.clone(),
            action_group_id: self.action_group_id.clone(),
            location: self.location.clone(),
            skip_validation: self.skip_validation,
            json: self.json,
        };

        let options = base.merge(overrides);
        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 6] = [
        "AZ_PROM_AZURE_MONITOR_WORKSPACE",
        "AZ_PROM_CLUSTER_NAME",
        "AZ_PROM_ACTION_GROUP_ID",
        "AZ_PROM_LOCATION",
        "AZ_PROM_CONFIG",
        "AZ_PROM_LOG_LEVEL",
    ];

    /// Parse without picking up option values from the caller's environment
    fn parse(args: &[&str]) -> Cli {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        Cli::parse_from(normalize_args(args.iter().copied()))
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevel::Trace.to_string(), "trace");
        assert_eq!(LogLevel::Debug.to_string(), "debug");
        assert_eq!(LogLevel::Info.to_string(), "info");
        assert_eq!(LogLevel::Warn.to_string(), "warn");
        assert_eq!(LogLevel::Error.to_string(), "error");
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(tracing::Level::from(LogLevel::Trace), tracing::Level::TRACE);
        assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
        assert_eq!(tracing::Level::from(LogLevel::Error), tracing::Level::ERROR);
    }

    #[test]
    fn test_cli_default_values() {
        let cli = parse(&["az-prom-rules-converter", "rules.yml"]);
        assert_eq!(cli.input, "rules.yml");
        assert_eq!(cli.cluster_name, None);
        assert_eq!(cli.output, None);
        assert!(!cli.skip_validation);
        assert!(!cli.json);
        assert_eq!(cli.config, None);
        assert_eq!(cli.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_cli_short_options() {
        let cli = parse(&[
            "az-prom-rules-converter",
            "-c",
            "aks",
            "-a",
            "/subscriptions/s/actionGroups/ag",
            "-l",
            "westeurope",
            "-o",
            "out.json",
            "-s",
            "-j",
            "{}",
        ]);
        assert_eq!(cli.cluster_name.as_deref(), Some("aks"));
        assert_eq!(
            cli.action_group_id.as_deref(),
            Some("/subscriptions/s/actionGroups/ag")
        );
        assert_eq!(cli.location.as_deref(), Some("westeurope"));
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert!(cli.skip_validation);
        assert!(cli.json);
        assert_eq!(cli.input, "{}");
    }

    #[test]
    fn test_amw_spellings() {
        for flag in ["-amw", "--amw", "--azure-monitor-workspace"] {
            let cli = parse(&["az-prom-rules-converter", flag, "ws", "rules.yml"]);
            assert_eq!(cli.azure_monitor_workspace.as_deref(), Some("ws"), "{}", flag);
        }
    }

    #[test]
    fn test_amw_with_equals() {
        let cli = parse(&["az-prom-rules-converter", "-amw=/subscriptions/s/ws", "rules.yml"]);
        assert_eq!(
            cli.azure_monitor_workspace.as_deref(),
            Some("/subscriptions/s/ws")
        );

        let args = normalize_args(["-amw=", "-amwx", "-c"]);
        assert_eq!(
            args,
            vec![
                OsString::from("--azure-monitor-workspace="),
                OsString::from("-amwx"),
                OsString::from("-c"),
            ]
        );
    }

    #[test]
    fn test_to_options() {
        let cli = parse(&["az-prom-rules-converter", "-c", "aks", "-s", "rules.yml"]);
        let options = cli.to_options().unwrap();
        assert_eq!(options.cluster_name.as_deref(), Some("aks"));
        assert!(options.skip_validation);
        assert!(!options.json);
    }

    #[test]
    fn test_to_options_rejects_empty_values() {
        let cli = parse(&["az-prom-rules-converter", "-c", "", "rules.yml"]);
        assert!(matches!(
            cli.to_options(),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
