//! Conversion options
//!
//! Options can be built programmatically, loaded from a YAML (or JSON) file,
//! or assembled by the CLI from flags and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the options file
    #[error("Failed to read options file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the options file
    #[error("Failed to parse options file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Options validation error
    #[error("Invalid options: {0}")]
    ValidationError(String),
}

/// Immutable options consumed by every conversion step
///
/// String options become `defaultValue`s of the matching ARM template
/// parameters. They are never interpolated into the resources themselves;
/// resources always reference the parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionOptions {
    /// Azure Monitor workspace resource id the rule groups are scoped to
    pub azure_monitor_workspace: Option<String>,

    /// Cluster the rule groups are evaluated for
    pub cluster_name: Option<String>,

    /// Action group resource id used by alerting rules
    pub action_group_id: Option<String>,

    /// Rule group location
    pub location: Option<String>,

    /// Skip both JSON Schema validation steps
    pub skip_validation: bool,

    /// Input is JSON text rather than YAML
    pub json: bool,
}

impl ConversionOptions {
    /// Create options with every field unset
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_azure_monitor_workspace(mut self, value: impl Into<String>) -> Self {
        self.azure_monitor_workspace = Some(value.into());
        self
    }

    pub fn with_cluster_name(mut self, value: impl Into<String>) -> Self {
        self.cluster_name = Some(value.into());
        self
    }

    pub fn with_action_group_id(mut self, value: impl Into<String>) -> Self {
        self.action_group_id = Some(value.into());
        self
    }

    pub fn with_location(mut self, value: impl Into<String>) -> Self {
        self.location = Some(value.into());
        self
    }

    pub fn with_skip_validation(mut self, skip: bool) -> Self {
        self.skip_validation = skip;
        self
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Load options from a YAML file
    ///
    /// JSON files are accepted as well, since JSON is valid YAML.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let options: ConversionOptions = serde_yaml::from_str(&contents)?;
        options.validate()?;
        tracing::debug!(path = %path.display(), "Loaded conversion options");
        Ok(options)
    }

    /// Overlay `other` on top of `self`; fields set in `other` win
    pub fn merge(mut self, other: ConversionOptions) -> Self {
        if other.azure_monitor_workspace.is_some() {
            self.azure_monitor_workspace = other.azure_monitor_workspace;
        }
        if other.cluster_name.is_some() {
            self.cluster_name = other.cluster_name;
        }
        if other.action_group_id.is_some() {
            self.action_group_id = other.action_group_id;
        }
        if other.location.is_some() {
            self.location = other.location;
        }
        self.skip_validation |= other.skip_validation;
        self.json |= other.json;
        self
    }

    /// Validate the options
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("azureMonitorWorkspace", &self.azure_monitor_workspace),
            ("clusterName", &self.cluster_name),
            ("actionGroupId", &self.action_group_id),
            ("location", &self.location),
        ];
        for (name, value) in fields {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "{} must not be empty",
                    name
                )));
            }
        }
        Ok(())
    }
}
