//! Pipeline request and response structures

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A node as submitted by the pipeline editor.
///
/// `node_type` and `data` are opaque: they are carried through but never
/// interpreted by the cycle check.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Node {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// A directed connection between two nodes
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Request body for `POST /pipelines/parse`
///
/// No cross-field invariant is enforced: edges may point at nodes that were
/// never declared.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Pipeline {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Node count, edge count and DAG flag for one pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckResult {
    pub num_nodes: usize,
    pub num_edges: usize,
    pub is_dag: bool,
}

/// Response body for `POST /pipelines/parse`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ParseResponse {
    #[serde(flatten)]
    pub result: CheckResult,
    /// Template variables referenced from node text, if any
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
}
