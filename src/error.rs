//! Error types for az-prom-rules-converter
//!
//! Converters return [`ConvertError`] for malformed rule content. The pipeline
//! turns every failure into a [`StepError`], which is what callers see.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// 규칙 변환 중 발생하는 에러
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Prometheus duration 문법과 일치하지 않음
    #[error("'{input}' does not match {grammar}")]
    DurationFormat {
        input: String,
        grammar: &'static str,
    },

    /// 필드 값의 타입이 올바르지 않음
    #[error("Field '{field}' must be {expected}, found {found}")]
    InvalidType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// 객체가 아닌 값
    #[error("{what} must be a mapping, found {found}")]
    NotAnObject {
        what: &'static str,
        found: &'static str,
    },
}

/// Human readable name of a JSON value's type, used in error messages
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Failure categories a pipeline run can end with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No input text was supplied
    EmptyInput,
    /// Input is neither valid YAML nor valid JSON
    Parse,
    /// A document or resource failed its JSON Schema
    SchemaValidation,
    /// A rule group could not be converted
    GroupConversion,
}

/// Failed pipeline step
///
/// Serializes as `{"title": ..., "details": ...}`, the error object handed to
/// the CLI and to any other caller of the pipeline.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[error("{title}")]
pub struct StepError {
    #[serde(skip)]
    pub kind: ErrorKind,
    pub title: String,
    pub details: Value,
}

impl StepError {
    /// Create a new step error
    pub fn new(kind: ErrorKind, title: impl Into<String>, details: Value) -> Self {
        Self {
            kind,
            title: title.into(),
            details,
        }
    }

    pub fn empty_input() -> Self {
        Self::new(
            ErrorKind::EmptyInput,
            "Input is empty",
            Value::String("Input is empty".to_string()),
        )
    }

    /// Error raised while converting the group at `index`
    pub fn group_conversion(index: usize, group: &Value, source: &ConvertError) -> Self {
        Self::new(
            ErrorKind::GroupConversion,
            format!("Error converting group {}", index),
            serde_json::json!({
                "group": group,
                "exception": source.to_string(),
            }),
        )
    }
}
