//! Server configuration
//!
//! Values come from `pipecheck serve` flags, falling back to `PIPECHECK_*`
//! environment variables (a `.env` file is loaded first by the binary).

use axum::http::HeaderValue;
use clap::Args;
use std::net::SocketAddr;

use crate::cycle_checker::Traversal;
use crate::error::PipecheckError;

pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Flags for `pipecheck serve`
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "PIPECHECK_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Browser origin allowed to call the API (repeatable, or comma-separated)
    #[arg(
        long = "allow-origin",
        env = "PIPECHECK_ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ALLOWED_ORIGINS.map(String::from)
    )]
    pub allowed_origins: Vec<String>,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "PIPECHECK_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// DFS flavour: iterative (explicit stack) or recursive
    #[arg(long, env = "PIPECHECK_TRAVERSAL", default_value_t = Traversal::Iterative)]
    pub traversal: Traversal,
}

/// Resolved settings shared (read-only) by every request
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
    pub traversal: Traversal,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8000)),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            traversal: Traversal::default(),
        }
    }
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            bind: args.bind,
            allowed_origins: args
                .allowed_origins
                .into_iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect(),
            max_body_bytes: args.max_body_bytes,
            traversal: args.traversal,
        }
    }
}

impl ServerConfig {
    /// Allowed origins as header values, rejecting anything unrepresentable
    pub fn origin_header_values(&self) -> Result<Vec<HeaderValue>, PipecheckError> {
        self.allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin).map_err(|_| PipecheckError::InvalidOrigin {
                    origin: origin.clone(),
                })
            })
            .collect()
    }
}
