//! Prometheus rule to Azure Prometheus rule conversion
//!
//! Prometheus rule files mix two kinds of rules in one list. A rule carrying a
//! `record` key is a recording rule; every other rule is an alerting rule.
//!
//! # Example (YAML)
//!
//! ```yaml
//! - record: job:http_requests:rate5m
//!   expr: sum by (job) (rate(http_requests_total[5m]))
//! - alert: HighErrorRate
//!   expr: job:http_errors:ratio5m > 0.05
//!   for: 10m
//!   labels:
//!     team: payments
//! ```
//!
//! Both kinds have `expr` renamed to `expression`. Alerting rules also get
//! Azure defaults for severity, auto-resolution and the action group, and
//! their `for` is converted to ISO-8601.

use once_cell::sync::Lazy;
use serde_json::{json, Map, Value};

use super::{no_extended_props, ObjectConverter};
use crate::arm::parameter_ref;
use crate::config::ConversionOptions;
use crate::duration::prom_duration_to_iso8601;
use crate::error::{type_name, ConvertError};

/// Severity assigned to converted alerting rules
pub const DEFAULT_SEVERITY: u8 = 3;

/// How long a fired alert waits before auto-resolving
pub const DEFAULT_TIME_TO_RESOLVE: &str = "PT10M";

static ALERTING_RULE_CONVERTER: Lazy<ObjectConverter> = Lazy::new(|| {
    ObjectConverter::builder(alerting_extended_props)
        .converter("for", convert_duration)
        .rename("expr", "expression")
        .build()
});

static RECORDING_RULE_CONVERTER: Lazy<ObjectConverter> = Lazy::new(|| {
    ObjectConverter::builder(no_extended_props)
        .rename("expr", "expression")
        .build()
});

fn alerting_extended_props(_: &ConversionOptions) -> Map<String, Value> {
    let mut props = Map::new();
    props.insert("severity".to_string(), json!(DEFAULT_SEVERITY));
    props.insert(
        "resolveConfiguration".to_string(),
        json!({
            "autoResolve": true,
            "timeToResolve": DEFAULT_TIME_TO_RESOLVE,
        }),
    );
    props.insert(
        "actions".to_string(),
        json!([{ "actionGroupId": parameter_ref("actionGroupId") }]),
    );
    props
}

/// Value converter for Prometheus duration fields (`for`, `interval`)
pub fn convert_duration(
    field: &str,
    value: &Value,
    _: &ConversionOptions,
) -> Result<Value, ConvertError> {
    let duration = value.as_str().ok_or_else(|| ConvertError::InvalidType {
        field: field.to_string(),
        expected: "a duration string",
        found: type_name(value),
    })?;
    prom_duration_to_iso8601(duration).map(Value::String)
}

/// A Prometheus rule, classified by kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule<'a> {
    /// Rule with a `record` key
    Recording(&'a Map<String, Value>),
    /// Any other rule
    Alerting(&'a Map<String, Value>),
}

impl<'a> Rule<'a> {
    /// Classify a rule value
    ///
    /// # Errors
    ///
    /// Returns `ConvertError::NotAnObject` if the rule is not a mapping.
    pub fn classify(value: &'a Value) -> Result<Self, ConvertError> {
        let fields = value.as_object().ok_or_else(|| ConvertError::NotAnObject {
            what: "Rule",
            found: type_name(value),
        })?;

        Ok(match fields.get("record") {
            Some(record) if !record.is_null() => Rule::Recording(fields),
            _ => Rule::Alerting(fields),
        })
    }

    /// Whether this is a recording rule
    pub fn is_recording(&self) -> bool {
        matches!(self, Rule::Recording(_))
    }

    /// Convert into the Azure rule shape
    pub fn convert(&self, options: &ConversionOptions) -> Result<Value, ConvertError> {
        let converted = match self {
            Rule::Recording(fields) => convert_recording_rule(fields, options)?,
            Rule::Alerting(fields) => convert_alerting_rule(fields, options)?,
        };
        Ok(Value::Object(converted))
    }
}

/// Convert a Prometheus alerting rule
pub fn convert_alerting_rule(
    rule: &Map<String, Value>,
    options: &ConversionOptions,
) -> Result<Map<String, Value>, ConvertError> {
    ALERTING_RULE_CONVERTER.convert(rule, options)
}

/// Convert a Prometheus recording rule
pub fn convert_recording_rule(
    rule: &Map<String, Value>,
    options: &ConversionOptions,
) -> Result<Map<String, Value>, ConvertError> {
    RECORDING_RULE_CONVERTER.convert(rule, options)
}

/// Classify and convert a single rule
pub fn convert_rule(rule: &Value, options: &ConversionOptions) -> Result<Value, ConvertError> {
    Rule::classify(rule)?.convert(options)
}

/// Value converter for a group's `rules` list
pub fn convert_rules(
    field: &str,
    value: &Value,
    options: &ConversionOptions,
) -> Result<Value, ConvertError> {
    let rules = value.as_array().ok_or_else(|| ConvertError::InvalidType {
        field: field.to_string(),
        expected: "a sequence of rules",
        found: type_name(value),
    })?;

    rules
        .iter()
        .map(|rule| convert_rule(rule, options))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}
