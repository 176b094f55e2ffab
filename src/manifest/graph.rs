//! Dependency graph over `enabled_by` links
//!
//! Rejects dangling references, self-references and cycles, and yields the
//! order in which gated inputs can be resolved. Uses petgraph for graph
//! operations.

use std::collections::HashMap;

use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("enabled_by cycle: '{input}' -> '{reference}' closes a loop")]
    Cycle { input: String, reference: String },

    #[error("input '{input}' is enabled by unknown input '{reference}'")]
    UnknownReference { input: String, reference: String },

    #[error("input '{input}' cannot be enabled by itself")]
    SelfReference { input: String },

    #[error("unknown input: {0}")]
    UnknownInput(String),
}

/// Directed graph of `enabled_by` links between a tool's inputs
///
/// The edge direction is reference -> dependent: a reference resolves
/// before the inputs it gates.
#[derive(Debug, Default)]
pub struct InputGraph {
    /// The underlying directed graph
    graph: DiGraph<String, ()>,

    /// Map from input name to node index
    node_map: HashMap<String, NodeIndex>,
}

impl InputGraph {
    /// Creates an empty graph
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Builds a graph from `(input, enabled_by)` pairs
    pub fn from_gates<'a, I>(gates: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
    {
        let mut graph = Self::new();

        // First pass: add all nodes
        let gates: Vec<_> = gates.into_iter().collect();
        for (input, _) in &gates {
            graph.add_input(*input);
        }

        // Second pass: add all edges
        for (input, reference) in &gates {
            if let Some(reference) = reference {
                graph.add_gate(input, reference)?;
            }
        }

        Ok(graph)
    }

    /// Adds an input to the graph
    pub fn add_input(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.node_map.contains_key(&name) {
            let idx = self.graph.add_node(name.clone());
            self.node_map.insert(name, idx);
        }
    }

    /// Adds a gate edge: `input` is enabled by `reference`
    pub fn add_gate(&mut self, input: &str, reference: &str) -> Result<(), GraphError> {
        if input == reference {
            return Err(GraphError::SelfReference {
                input: input.to_string(),
            });
        }

        let input_idx = *self
            .node_map
            .get(input)
            .ok_or_else(|| GraphError::UnknownInput(input.to_string()))?;

        let reference_idx =
            *self
                .node_map
                .get(reference)
                .ok_or_else(|| GraphError::UnknownReference {
                    input: input.to_string(),
                    reference: reference.to_string(),
                })?;

        // Add edge: reference -> input
        self.graph.add_edge(reference_idx, input_idx, ());

        // Check for cycles
        if is_cyclic_directed(&self.graph) {
            // Remove the edge we just added
            if let Some(edge) = self.graph.find_edge(reference_idx, input_idx) {
                self.graph.remove_edge(edge);
            }
            return Err(GraphError::Cycle {
                input: input.to_string(),
                reference: reference.to_string(),
            });
        }

        Ok(())
    }

    /// Returns all inputs in resolve order (references before dependents)
    pub fn resolve_order(&self) -> Vec<String> {
        // Construction keeps the graph acyclic, so toposort cannot fail
        toposort(&self.graph, None)
            .map(|order| {
                order
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the inputs this input is gated on (its references)
    pub fn references(&self, name: &str) -> Vec<String> {
        let idx = match self.node_map.get(name) {
            Some(idx) => *idx,
            None => return vec![],
        };

        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }

    /// Returns the inputs gated on this input (its dependents)
    pub fn dependents(&self, name: &str) -> Vec<String> {
        let idx = match self.node_map.get(name) {
            Some(idx) => *idx,
            None => return vec![],
        };

        self.graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .filter_map(|idx| self.graph.node_weight(idx).cloned())
            .collect()
    }

    /// Returns true if the graph contains the input
    pub fn contains(&self, name: &str) -> bool {
        self.node_map.contains_key(name)
    }

    /// Returns the number of inputs in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }
}
