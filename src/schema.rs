//! JSON Schema validation of Prometheus rule files and Azure rule groups
//!
//! Both schemas are embedded in the binary and compiled on first use. A
//! compiled validator is immutable and shared by every later validation in
//! the process.

use std::collections::HashSet;

use jsonschema::Validator;
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Schema errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// 내장 스키마 컴파일 실패
    #[error("Failed to compile {name} schema: {message}")]
    Compile { name: &'static str, message: String },
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    /// JSON Pointer to the offending value
    pub instance_path: String,
    /// JSON Pointer to the failing schema keyword
    pub schema_path: String,
    pub message: String,
}

/// A schema embedded at build time, compiled lazily
pub struct EmbeddedSchema {
    name: &'static str,
    source: &'static str,
    compiled: OnceCell<Validator>,
}

impl EmbeddedSchema {
    const fn new(name: &'static str, source: &'static str) -> Self {
        Self {
            name,
            source,
            compiled: OnceCell::new(),
        }
    }

    /// Schema name used in error messages
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get the compiled validator, compiling it on first call
    pub fn validator(&self) -> Result<&Validator, SchemaError> {
        self.compiled.get_or_try_init(|| {
            let compile_error = |message: String| SchemaError::Compile {
                name: self.name,
                message,
            };
            let schema: Value =
                serde_json::from_str(self.source).map_err(|e| compile_error(e.to_string()))?;
            let validator = jsonschema::draft7::options()
                .build(&schema)
                .map_err(|e| compile_error(e.to_string()))?;
            tracing::debug!(schema = self.name, "Compiled JSON schema");
            Ok(validator)
        })
    }

    /// Validate `instance`, returning every violation found
    pub fn validate(&self, instance: &Value) -> Result<Vec<SchemaViolation>, SchemaError> {
        let validator = self.validator()?;
        Ok(validator
            .iter_errors(instance)
            .map(|error| SchemaViolation {
                instance_path: error.instance_path.to_string(),
                schema_path: error.schema_path.to_string(),
                message: error.to_string(),
            })
            .collect())
    }
}

/// Schema of a Prometheus rules file
pub static PROMETHEUS_RULES_SCHEMA: EmbeddedSchema = EmbeddedSchema::new(
    "Prometheus rules",
    include_str!("../schemas/prometheus.rules.json"),
);

/// Schema of a `Microsoft.AlertsManagement/prometheusRuleGroups` resource
pub static AZURE_RULE_GROUP_SCHEMA: EmbeddedSchema = EmbeddedSchema::new(
    "Azure Prometheus rule group",
    include_str!("../schemas/azure-prometheus-rule-group.json"),
);

/// Validate a parsed Prometheus rules document
///
/// Besides the schema, group names must be unique within the document.
pub fn validate_prometheus_rules(document: &Value) -> Result<Vec<SchemaViolation>, SchemaError> {
    let mut violations = PROMETHEUS_RULES_SCHEMA.validate(document)?;
    violations.extend(duplicate_group_names(document));
    Ok(violations)
}

/// Validate a converted ARM rule group resource
pub fn validate_azure_rule_group(resource: &Value) -> Result<Vec<SchemaViolation>, SchemaError> {
    AZURE_RULE_GROUP_SCHEMA.validate(resource)
}

fn duplicate_group_names(document: &Value) -> Vec<SchemaViolation> {
    let Some(groups) = document.get("groups").and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    groups
        .iter()
        .enumerate()
        .filter_map(|(i, group)| {
            let name = group.get("name")?.as_str()?;
            if seen.insert(name) {
                return None;
            }
            Some(SchemaViolation {
                instance_path: format!("/groups/{}/name", i),
                schema_path: "/definitions/ruleGroup/properties/name".to_string(),
                message: format!("Group name '{}' is not unique within the file", name),
            })
        })
        .collect()
}
