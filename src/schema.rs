//! Pipeline Schema Validator
//!
//! Validates a raw request body against the embedded pipeline JSON Schema
//! before serde parsing, so clients get one error per offending field
//! instead of serde's first-failure message.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pipecheck::schema::parse_pipeline;
//!
//! let pipeline = parse_pipeline(br#"{"nodes": [], "edges": []}"#)?;
//! ```

use jsonschema::Validator;
use serde_json::Value;
use std::sync::OnceLock;

use crate::error::PipecheckError;
use crate::pipeline::Pipeline;

/// Embedded schema JSON (compiled at build time)
const SCHEMA_JSON: &str = include_str!("../schemas/pipeline.schema.json");

/// Global schema validator instance (lazy initialization)
static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

fn validator() -> Result<&'static Validator, PipecheckError> {
    let compiled = VALIDATOR.get_or_init(|| {
        let schema: Value = serde_json::from_str(SCHEMA_JSON)
            .map_err(|e| format!("Failed to parse schema JSON: {}", e))?;
        jsonschema::validator_for(&schema).map_err(|e| format!("Failed to compile schema: {}", e))
    });

    compiled
        .as_ref()
        .map_err(|reason| PipecheckError::SchemaUnavailable { reason: reason.clone() })
}

/// Schema validation error details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    /// JSON pointer to the offending field (e.g. "/nodes/0/id")
    pub path: String,
    /// Human-readable error message
    pub message: String,
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    pub fn path_or_root(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }
}

/// Schema error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    MissingRequired,
    TypeMismatch,
    Other,
}

impl SchemaErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaErrorKind::MissingRequired => "missing",
            SchemaErrorKind::TypeMismatch => "type",
            SchemaErrorKind::Other => "other",
        }
    }
}

/// Turn one jsonschema error into a field-level [`SchemaError`]
///
/// For missing properties jsonschema points at the parent object; the
/// missing field name is appended so the path names the field itself.
fn to_schema_error(error: &jsonschema::ValidationError) -> SchemaError {
    let kind_str = format!("{:?}", error.kind);
    let message = error.to_string();
    let mut path = error.instance_path.to_string();

    let kind = if kind_str.contains("Required") {
        if let Some(field) = extract_quoted(&message) {
            path.push('/');
            path.push_str(&field);
        }
        SchemaErrorKind::MissingRequired
    } else if kind_str.contains("Type") {
        SchemaErrorKind::TypeMismatch
    } else {
        SchemaErrorKind::Other
    };

    SchemaError { path, message, kind }
}

/// Extract the first double-quoted string from an error message
fn extract_quoted(msg: &str) -> Option<String> {
    let start = msg.find('"')?;
    let end = msg[start + 1..].find('"')?;
    Some(msg[start + 1..start + 1 + end].to_string())
}

/// Validate a JSON value against the pipeline schema
pub fn validate_value(value: &Value) -> Result<(), PipecheckError> {
    let errors: Vec<SchemaError> = validator()?
        .iter_errors(value)
        .map(|e| to_schema_error(&e))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(PipecheckError::SchemaValidationFailed { errors })
    }
}

/// Parse and validate a request body into a [`Pipeline`]
pub fn parse_pipeline(body: &[u8]) -> Result<Pipeline, PipecheckError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| PipecheckError::InvalidJson {
        details: e.to_string(),
    })?;

    validate_value(&value)?;

    serde_json::from_value(value).map_err(|e| PipecheckError::Deserialize {
        details: e.to_string(),
    })
}
