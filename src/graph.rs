//! Dependency graph diagnostics.
//!
//! Provides the `DependencyGraph` type, a directed graph over variable
//! names. A [`Calculation`](crate::Calculation) resolves its nodes with a
//! fixpoint scan and never needs this graph to run; it is built on demand
//! to explain *why* some nodes stayed unresolved.

use crate::error::CalculationError;
use crate::variable::VariableName;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::{HashMap, HashSet};

/// A directed graph of variable dependencies.
///
/// An edge `a -> b` means the formula for `a` reads `b`. Nodes are kept in
/// insertion order, so cycle reports are deterministic.
///
/// # Examples
///
/// ```rust
/// use spawncalc::graph::DependencyGraph;
/// use spawncalc::VariableName;
///
/// let a = VariableName::new("a").unwrap();
/// let b = VariableName::new("b").unwrap();
///
/// let mut graph = DependencyGraph::new();
/// graph.add_dependency(a.clone(), b.clone());
/// assert!(graph.detect_cycles().is_ok());
///
/// graph.add_dependency(b, a);
/// assert!(graph.detect_cycles().is_err());
/// ```
#[derive(Debug, Default)]
pub struct DependencyGraph {
    graph: DiGraph<VariableName, ()>,
    node_map: HashMap<VariableName, NodeIndex>,
}

impl DependencyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node if it doesn't exist and return its index.
    pub fn add_node(&mut self, name: VariableName) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&name) {
            return idx;
        }
        let idx = self.graph.add_node(name.clone());
        self.node_map.insert(name, idx);
        idx
    }

    /// Record that `dependent` reads `dependency`.
    pub fn add_dependency(&mut self, dependent: VariableName, dependency: VariableName) {
        let from = self.add_node(dependent);
        let to = self.add_node(dependency);
        self.graph.update_edge(from, to, ());
    }

    /// Search for a cycle.
    ///
    /// Returns `CalculationError::Cycle` with a closed path such as
    /// `[a, b, c, a]`, containing only the nodes on the cycle.
    pub fn detect_cycles(&self) -> Result<(), CalculationError> {
        let mut visited = HashSet::new();
        let mut on_stack = HashSet::new();
        let mut path = Vec::new();

        for idx in self.graph.node_indices() {
            if visited.contains(&idx) {
                continue;
            }
            if let Some(cycle) = self.dfs(idx, &mut visited, &mut on_stack, &mut path) {
                return Err(CalculationError::Cycle { path: cycle });
            }
        }
        Ok(())
    }

    fn dfs(
        &self,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        on_stack: &mut HashSet<NodeIndex>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<VariableName>> {
        visited.insert(node);
        on_stack.insert(node);
        path.push(node);

        let mut neighbors: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Outgoing)
            .collect();
        neighbors.reverse();

        for next in neighbors {
            if on_stack.contains(&next) {
                let start = path.iter().position(|&n| n == next).unwrap_or(0);
                let mut cycle: Vec<VariableName> =
                    path[start..].iter().map(|&n| self.graph[n].clone()).collect();
                cycle.push(self.graph[next].clone());
                return Some(cycle);
            }
            if !visited.contains(&next) {
                if let Some(cycle) = self.dfs(next, visited, on_stack, path) {
                    return Some(cycle);
                }
            }
        }

        on_stack.remove(&node);
        path.pop();
        None
    }
}
