//! pipecheck - DAG checking service for pipeline editors

pub mod config;
pub mod cycle_checker;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod server;
pub mod variables;

pub use config::{ServeArgs, ServerConfig};
pub use cycle_checker::{check, CycleChecker, Traversal, MAX_RECURSION_NODES};
pub use error::{FixSuggestion, PipecheckError};
pub use pipeline::{CheckResult, Edge, Node, ParseResponse, Pipeline};
pub use server::{router, serve};
