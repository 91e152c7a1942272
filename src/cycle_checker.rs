//! Cycle detection over pipeline graphs
//!
//! Depth-first search with three node states: unvisited, on the current path,
//! and finished. Reaching a node that is still on the current path is a
//! back-edge and closes a cycle. Reaching a finished node (cross or forward
//! edge, e.g. the bottom of a diamond) is not.
//!
//! Two traversals are provided and always agree:
//! - [`Traversal::Recursive`]: native recursion, fine for small graphs
//! - [`Traversal::Iterative`]: explicit stack of `(node, next neighbor)` frames,
//!   so depth is bounded by heap rather than call stack
//!
//! Graphs with more than [`MAX_RECURSION_NODES`] nodes always take the
//! iterative path, whatever traversal was requested.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::pipeline::{CheckResult, Edge, Node};

/// Largest graph the recursive traversal will walk on the call stack
///
/// Depth is bounded by the node count plus one undeclared leaf.
pub const MAX_RECURSION_NODES: usize = 2048;

/// DFS flavour used by [`CycleChecker`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Traversal {
    Recursive,
    #[default]
    Iterative,
}

impl fmt::Display for Traversal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Traversal::Recursive => write!(f, "recursive"),
            Traversal::Iterative => write!(f, "iterative"),
        }
    }
}

impl FromStr for Traversal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "recursive" => Ok(Traversal::Recursive),
            "iterative" => Ok(Traversal::Iterative),
            _ => Err(format!(
                "unknown traversal '{}' (expected 'recursive' or 'iterative')",
                s
            )),
        }
    }
}

/// Outgoing adjacency keyed by declared node ID
///
/// Edges whose source was never declared are dropped. Targets are kept as-is,
/// declared or not; an undeclared target simply has no successors.
struct Adjacency<'a> {
    successors: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Adjacency<'a> {
    fn build(nodes: &'a [Node], edges: &'a [Edge]) -> Self {
        let mut successors: HashMap<&'a str, Vec<&'a str>> = HashMap::with_capacity(nodes.len());

        // Duplicate IDs overwrite, leaving a single shared entry
        for node in nodes {
            successors.insert(node.id.as_str(), Vec::new());
        }

        for edge in edges {
            if let Some(targets) = successors.get_mut(edge.source.as_str()) {
                targets.push(edge.target.as_str());
            }
        }

        Self { successors }
    }

    #[inline]
    fn successors(&self, node: &str) -> &[&'a str] {
        self.successors
            .get(node)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Per-run traversal state, threaded explicitly through every visit
#[derive(Default)]
struct DfsState<'a> {
    visited: HashSet<&'a str>,
    on_stack: HashSet<&'a str>,
    path: Vec<&'a str>,
}

impl<'a> DfsState<'a> {
    fn enter(&mut self, node: &'a str) {
        self.visited.insert(node);
        self.on_stack.insert(node);
        self.path.push(node);
    }

    fn leave(&mut self, node: &'a str) {
        self.on_stack.remove(node);
        self.path.pop();
    }

    /// Path from `target` to the current node, closed by `target`
    ///
    /// `target` is on stack, and every on-stack node is on the path.
    fn close_cycle(&self, target: &'a str) -> Vec<&'a str> {
        let start = self.path.iter().position(|&n| n == target);
        debug_assert!(start.is_some(), "on-stack node '{}' missing from path", target);
        let start = start.unwrap_or(0);
        let mut cycle = self.path[start..].to_vec();
        cycle.push(target);
        cycle
    }
}

fn visit_recursive<'a>(
    node: &'a str,
    adjacency: &Adjacency<'a>,
    state: &mut DfsState<'a>,
) -> Option<Vec<&'a str>> {
    state.enter(node);

    for &next in adjacency.successors(node) {
        if !state.visited.contains(next) {
            if let Some(cycle) = visit_recursive(next, adjacency, state) {
                return Some(cycle);
            }
        } else if state.on_stack.contains(next) {
            return Some(state.close_cycle(next));
        }
    }

    state.leave(node);
    None
}

fn visit_iterative<'a>(
    root: &'a str,
    adjacency: &Adjacency<'a>,
    state: &mut DfsState<'a>,
) -> Option<Vec<&'a str>> {
    // Each frame is a node plus the index of its next unexplored successor
    let mut frames: Vec<(&'a str, usize)> = vec![(root, 0)];
    state.enter(root);

    while let Some(&(node, pos)) = frames.last() {
        match adjacency.successors(node).get(pos) {
            Some(&next) => {
                let top = frames.len() - 1;
                frames[top].1 += 1;

                if !state.visited.contains(next) {
                    state.enter(next);
                    frames.push((next, 0));
                } else if state.on_stack.contains(next) {
                    return Some(state.close_cycle(next));
                }
            }
            None => {
                state.leave(node);
                frames.pop();
            }
        }
    }

    None
}

/// Determines whether a pipeline graph is a DAG
///
/// Holds no state between calls; every check builds its own adjacency and
/// traversal sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct CycleChecker {
    traversal: Traversal,
}

impl CycleChecker {
    pub fn new(traversal: Traversal) -> Self {
        Self { traversal }
    }

    pub fn traversal(&self) -> Traversal {
        self.traversal
    }

    /// Traversal actually used for a graph of `node_count` nodes
    pub fn effective_traversal(&self, node_count: usize) -> Traversal {
        match self.traversal {
            Traversal::Recursive if node_count > MAX_RECURSION_NODES => Traversal::Iterative,
            t => t,
        }
    }

    /// Count nodes and edges and report DAG-ness
    pub fn check(&self, nodes: &[Node], edges: &[Edge]) -> CheckResult {
        self.analyze(nodes, edges).0
    }

    /// Like [`check`](Self::check), also returning the cycle witness if any
    pub fn analyze(&self, nodes: &[Node], edges: &[Edge]) -> (CheckResult, Option<Vec<String>>) {
        let cycle = self.find_cycle(nodes, edges);
        let result = CheckResult {
            num_nodes: nodes.len(),
            num_edges: edges.len(),
            is_dag: cycle.is_none(),
        };
        (result, cycle)
    }

    /// Return the first cycle found, as a closed path `[a, .., a]`
    ///
    /// Roots are tried in node order; the search stops at the first back-edge.
    pub fn find_cycle(&self, nodes: &[Node], edges: &[Edge]) -> Option<Vec<String>> {
        let adjacency = Adjacency::build(nodes, edges);
        let mut state = DfsState::default();

        for node in nodes {
            let root = node.id.as_str();
            if state.visited.contains(root) {
                continue;
            }

            let found = match self.effective_traversal(nodes.len()) {
                Traversal::Recursive => visit_recursive(root, &adjacency, &mut state),
                Traversal::Iterative => visit_iterative(root, &adjacency, &mut state),
            };

            if let Some(cycle) = found {
                return Some(cycle.into_iter().map(String::from).collect());
            }
        }

        None
    }
}

/// Check with the default (iterative) traversal
pub fn check(nodes: &[Node], edges: &[Edge]) -> CheckResult {
    CycleChecker::default().check(nodes, edges)
}
