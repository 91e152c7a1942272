//! Error types with fix suggestions

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::schema::SchemaError;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum PipecheckError {
    // ─────────────────────────────────────────────────────────────
    // Request errors (PIPE-001 to PIPE-009)
    // ─────────────────────────────────────────────────────────────
    #[error("[PIPE-001] Invalid JSON body: {details}")]
    InvalidJson { details: String },

    #[error("[PIPE-002] Schema validation failed: {}", format_schema_errors(.errors))]
    SchemaValidationFailed { errors: Vec<SchemaError> },

    #[error("[PIPE-003] Could not read pipeline: {details}")]
    Deserialize { details: String },

    // ─────────────────────────────────────────────────────────────
    // Server errors (PIPE-010 to PIPE-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[PIPE-010] Invalid CORS origin '{origin}'")]
    InvalidOrigin { origin: String },

    #[error("[PIPE-011] Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("[PIPE-012] Server error: {0}")]
    Server(std::io::Error),

    #[error("[PIPE-013] Pipeline schema unavailable: {reason}")]
    SchemaUnavailable { reason: String },

    // ─────────────────────────────────────────────────────────────
    // CLI errors (PIPE-020 to PIPE-029)
    // ─────────────────────────────────────────────────────────────
    #[error("[PIPE-020] Cannot read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

fn format_schema_errors(errors: &[SchemaError]) -> String {
    if errors.is_empty() {
        return "no errors".to_string();
    }
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path_or_root(), e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl PipecheckError {
    /// Get the error code (e.g., "PIPE-001")
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidJson { .. } => "PIPE-001",
            Self::SchemaValidationFailed { .. } => "PIPE-002",
            Self::Deserialize { .. } => "PIPE-003",
            Self::InvalidOrigin { .. } => "PIPE-010",
            Self::Bind { .. } => "PIPE-011",
            Self::Server(_) => "PIPE-012",
            Self::SchemaUnavailable { .. } => "PIPE-013",
            Self::Io { .. } => "PIPE-020",
        }
    }

    /// HTTP status used when the error is returned to a client
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidJson { .. } => StatusCode::BAD_REQUEST,
            Self::SchemaValidationFailed { .. } | Self::Deserialize { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl FixSuggestion for PipecheckError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            PipecheckError::InvalidJson { .. } => Some("Check JSON syntax: quoting, commas and brackets"),
            PipecheckError::SchemaValidationFailed { .. } => {
                Some("Each node needs string 'id' and 'type'; each edge needs string 'id', 'source' and 'target'")
            }
            PipecheckError::Deserialize { .. } => Some("Send an object with 'nodes' and 'edges' arrays"),
            PipecheckError::InvalidOrigin { .. } => {
                Some("Use a full origin such as http://localhost:3000")
            }
            PipecheckError::Bind { .. } => {
                Some("Choose a free port with --bind or PIPECHECK_BIND")
            }
            PipecheckError::Server(_) | PipecheckError::SchemaUnavailable { .. } => None,
            PipecheckError::Io { .. } => Some("Check file path and permissions"),
        }
    }
}

/// One entry of the `detail` array in an error response
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub loc: String,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: Vec<ErrorDetail>,
}

impl From<&PipecheckError> for ErrorBody {
    fn from(err: &PipecheckError) -> Self {
        let detail = match err {
            PipecheckError::SchemaValidationFailed { errors } => errors
                .iter()
                .map(|e| ErrorDetail {
                    loc: e.path.clone(),
                    msg: e.message.clone(),
                    kind: e.kind.as_str().to_string(),
                })
                .collect(),
            other => vec![ErrorDetail {
                loc: String::new(),
                msg: other.to_string(),
                kind: other.code().to_string(),
            }],
        };
        Self { detail }
    }
}

impl IntoResponse for PipecheckError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::from(&self))).into_response()
    }
}
