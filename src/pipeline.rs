//! Prometheus rules to ARM template conversion flow
//!
//! The flow is a fixed sequence of steps. Each step takes the previous step's
//! output and the options, and either produces the next value or stops the
//! whole flow with a [`StepError`]:
//!
//! ```text
//! validate_not_empty -> parse_yaml_or_json -> validate_prometheus_schema
//!     -> to_arm_template -> validate_arm_template
//! ```
//!
//! In JSON mode `parse_json` replaces `parse_yaml_or_json`. With
//! `skip_validation` both schema steps pass their input through unchanged.

use serde::Serialize;
use serde_json::{json, Value};

use crate::arm::ArmTemplate;
use crate::config::ConversionOptions;
use crate::converter::group::convert_group;
use crate::error::{type_name, ErrorKind, StepError};
use crate::schema::{self, SchemaError, SchemaViolation};

/// Outcome of a flow, in the shape handed to callers outside Rust
///
/// Exactly one of `output` and `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,
}

impl From<Result<ArmTemplate, StepError>> for StepResult {
    fn from(result: Result<ArmTemplate, StepError>) -> Self {
        match result.and_then(|template| {
            serde_json::to_value(&template).map_err(|e| {
                StepError::new(
                    ErrorKind::GroupConversion,
                    "Failed to serialize ARM template",
                    Value::String(e.to_string()),
                )
            })
        }) {
            Ok(output) => Self {
                success: true,
                output: Some(output),
                error: None,
            },
            Err(error) => Self {
                success: false,
                output: None,
                error: Some(error),
            },
        }
    }
}

/// Fail when there is no input text
pub fn validate_not_empty(input: &str) -> Result<&str, StepError> {
    if input.is_empty() {
        return Err(StepError::empty_input());
    }
    Ok(input)
}

fn yaml_failure(error: &serde_yaml::Error) -> StepError {
    let location = error.location();
    StepError::new(
        ErrorKind::Parse,
        "Failed to convert YAML to JSON",
        json!({
            "message": error.to_string(),
            "line": location.as_ref().map(|l| l.line()),
            "column": location.as_ref().map(|l| l.column()),
        }),
    )
}

/// Parse YAML text; JSON is accepted too, since it is valid YAML
///
/// Merge keys (`<<: *anchor`) are resolved before the document is turned
/// into JSON.
pub fn parse_yaml_or_json(input: &str) -> Result<Value, StepError> {
    let mut document: serde_yaml::Value =
        serde_yaml::from_str(input).map_err(|e| yaml_failure(&e))?;
    document.apply_merge().map_err(|e| yaml_failure(&e))?;

    serde_json::to_value(document).map_err(|e| {
        StepError::new(
            ErrorKind::Parse,
            "Failed to convert YAML to JSON",
            json!({ "message": e.to_string() }),
        )
    })
}

/// Parse strict JSON text
pub fn parse_json(input: &str) -> Result<Value, StepError> {
    serde_json::from_str::<Value>(input).map_err(|e| {
        StepError::new(
            ErrorKind::Parse,
            "Failed to parse JSON input",
            json!({
                "message": e.to_string(),
                "line": e.line(),
                "column": e.column(),
            }),
        )
    })
}

fn schema_failure(error: SchemaError) -> StepError {
    match error {
        SchemaError::Compile { name, message } => StepError::new(
            ErrorKind::SchemaValidation,
            format!("Failed to compile {} schema", name),
            Value::String(message),
        ),
    }
}

fn violations_to_details(violations: &[SchemaViolation]) -> Value {
    serde_json::to_value(violations).unwrap_or(Value::Null)
}

/// Validate the parsed document against the Prometheus rules schema
pub fn validate_prometheus_schema(
    document: Value,
    options: &ConversionOptions,
) -> Result<Value, StepError> {
    if options.skip_validation {
        return Ok(document);
    }

    let violations = schema::validate_prometheus_rules(&document).map_err(schema_failure)?;
    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "Prometheus rules schema violations");
        return Err(StepError::new(
            ErrorKind::SchemaValidation,
            "Failed to validate Prometheus Rules Schema",
            violations_to_details(&violations),
        ));
    }
    Ok(document)
}

/// Build the ARM template, converting groups in order
///
/// Stops at the first group that fails to convert; later groups are never
/// looked at.
pub fn to_arm_template(
    document: &Value,
    options: &ConversionOptions,
) -> Result<ArmTemplate, StepError> {
    let mut template = ArmTemplate::skeleton(options);

    let groups = match document.get("groups") {
        None | Some(Value::Null) => return Ok(template),
        Some(Value::Array(groups)) => groups,
        Some(other) => {
            return Err(StepError::new(
                ErrorKind::GroupConversion,
                "Error converting groups",
                json!({
                    "groups": other,
                    "exception": format!("groups must be a sequence, found {}", type_name(other)),
                }),
            ));
        }
    };

    for (i, group) in groups.iter().enumerate() {
        let resource = convert_group(group, options).map_err(|e| {
            tracing::debug!(group = i, error = %e, "Group conversion failed");
            StepError::group_conversion(i, group, &e)
        })?;
        template.resources.push(resource);
    }

    Ok(template)
}

/// Validate every resource against the Azure rule group schema
///
/// All resources are checked. When several fail, only the last failure is
/// reported.
pub fn validate_arm_template(
    template: ArmTemplate,
    options: &ConversionOptions,
) -> Result<ArmTemplate, StepError> {
    if options.skip_validation {
        return Ok(template);
    }

    let mut failure = None;
    for (i, resource) in template.resources.iter().enumerate() {
        let value = serde_json::to_value(resource).map_err(|e| {
            StepError::new(
                ErrorKind::SchemaValidation,
                format!("Failed to validate Azure Prometheus schema for group {}", i),
                Value::String(e.to_string()),
            )
        })?;
        let violations = schema::validate_azure_rule_group(&value).map_err(schema_failure)?;
        if !violations.is_empty() {
            tracing::debug!(group = i, count = violations.len(), "Azure schema violations");
            failure = Some(StepError::new(
                ErrorKind::SchemaValidation,
                format!("Failed to validate Azure Prometheus schema for group {}", i),
                violations_to_details(&violations),
            ));
        }
    }

    match failure {
        Some(error) => Err(error),
        None => Ok(template),
    }
}

/// Run the whole flow on `input`
///
/// # Errors
///
/// Returns the error of the first step that fails.
///
/// # Example
///
/// ```
/// use az_prom_rules_converter::config::ConversionOptions;
/// use az_prom_rules_converter::pipeline::convert;
///
/// let rules = "groups:\n  - name: example\n    rules:\n      - record: job:up:sum\n        expr: sum by (job) (up)\n";
/// let template = convert(rules, &ConversionOptions::default()).unwrap();
/// assert_eq!(template.resources.len(), 1);
/// ```
pub fn convert(input: &str, options: &ConversionOptions) -> Result<ArmTemplate, StepError> {
    let result = run_steps(input, options);
    match &result {
        Ok(template) => tracing::info!(
            resources = template.resources.len(),
            "Converted Prometheus rules to ARM template"
        ),
        Err(error) => tracing::debug!(error = %error.title, "Conversion failed"),
    }
    result
}

fn run_steps(input: &str, options: &ConversionOptions) -> Result<ArmTemplate, StepError> {
    tracing::debug!(step = "validate_not_empty", bytes = input.len());
    let text = validate_not_empty(input)?;

    let document = if options.json {
        tracing::debug!(step = "parse_json");
        parse_json(text)?
    } else {
        tracing::debug!(step = "parse_yaml_or_json");
        parse_yaml_or_json(text)?
    };

    tracing::debug!(step = "validate_prometheus_schema", skip = options.skip_validation);
    let document = validate_prometheus_schema(document, options)?;

    tracing::debug!(step = "to_arm_template");
    let template = to_arm_template(&document, options)?;

    tracing::debug!(step = "validate_arm_template", skip = options.skip_validation);
    validate_arm_template(template, options)
}

/// Run the whole flow and wrap the outcome in a [`StepResult`]
pub fn run(input: &str, options: &ConversionOptions) -> StepResult {
    convert(input, options).into()
}
