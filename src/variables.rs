//! Template variable extraction
//!
//! Text nodes reference pipeline inputs as `{{ name }}`. Only the string
//! stored under `data.text` is scanned; the rest of `data` stays opaque.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::pipeline::Node;

static VARIABLE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_$][a-zA-Z0-9_$]*)\s*\}\}").expect("valid regex")
});

/// Collect variable names from all text nodes, first occurrence order
pub fn extract_variables(nodes: &[Node]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut variables = Vec::new();

    for text in nodes
        .iter()
        .filter_map(|n| n.data.get("text").and_then(|v| v.as_str()))
    {
        for caps in VARIABLE_PATTERN.captures_iter(text) {
            let name = &caps[1];
            if seen.insert(name.to_string()) {
                variables.push(name.to_string());
            }
        }
    }

    variables
}
