//! Tool declarations and load-time validation
//!
//! A manifest maps tool identifiers to tool entries; each entry declares
//! the tool's inputs. Gating mistakes (conflicting triggers, dangling or
//! cyclic references) are configuration errors caught here at load time,
//! never at resolve time.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::graph::{GraphError, InputGraph};
use super::input::InputSpec;
use super::value_type::ValueType;

#[derive(Debug, Error, PartialEq)]
pub enum SpecError {
    #[error("input '{input}': enabled_by_type and enabled_by_value are mutually exclusive")]
    ConflictingTriggers { input: String },

    #[error("input '{input}': {trigger} requires enabled_by")]
    TriggerWithoutReference {
        input: String,
        trigger: &'static str,
    },

    #[error("input '{input}': {trigger} must not be empty")]
    EmptyTrigger {
        input: String,
        trigger: &'static str,
    },

    #[error("input '{input}': trigger type '{tag}' is never produced by reference '{reference}'")]
    UnmatchableTriggerType {
        input: String,
        reference: String,
        tag: ValueType,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Validation failure scoped to one tool of a manifest
#[derive(Debug, Error, PartialEq)]
#[error("tool '{tool}': {source}")]
pub struct ManifestError {
    pub tool: String,
    #[source]
    pub source: SpecError,
}

#[derive(Debug, Error, PartialEq)]
pub enum SelectError {
    #[error("manifest declares no tools")]
    Empty,

    #[error("tool '{0}' not found in manifest")]
    NotFound(String),

    #[error("manifest declares multiple tools, pass --tool (available: {0})")]
    Ambiguous(String),
}

/// Declaration of one tool
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Human-readable tool name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Tool kind, e.g. `python` or `custom_llm`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Module the implementation lives in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,

    /// Function invoked with the pruned input payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Input declarations, keyed by input name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, InputSpec>,

    /// Tool-level metadata this crate does not interpret, preserved as-is
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl ToolSpec {
    /// Gets an input declaration by name
    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.get(name)
    }

    /// Iterates over input names in deterministic (sorted) order
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    /// The name shown for this tool: its `name` field, or the manifest id
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(id)
    }

    /// Builds the `enabled_by` graph for this tool
    ///
    /// Fails on dangling references, self-references and cycles.
    pub fn graph(&self) -> Result<InputGraph, GraphError> {
        InputGraph::from_gates(
            self.inputs
                .iter()
                .map(|(name, spec)| (name.as_str(), spec.enabled_by.as_deref())),
        )
    }

    /// Validates the tool's gating declarations.
    ///
    /// Checked per input: trigger kinds are mutually exclusive, triggers
    /// require a reference, trigger lists are non-empty, and type triggers
    /// only name tags the reference declares. Checked across inputs:
    /// references exist, no input references itself, no cycles.
    pub fn validate(&self) -> Result<(), SpecError> {
        for (name, spec) in &self.inputs {
            self.validate_input(name, spec)?;
        }
        self.graph()?;
        Ok(())
    }

    fn validate_input(&self, name: &str, spec: &InputSpec) -> Result<(), SpecError> {
        if spec.enabled_by_type.is_some() && spec.enabled_by_value.is_some() {
            return Err(SpecError::ConflictingTriggers {
                input: name.to_string(),
            });
        }

        if spec.enabled_by.is_none() {
            if spec.enabled_by_type.is_some() {
                return Err(SpecError::TriggerWithoutReference {
                    input: name.to_string(),
                    trigger: "enabled_by_type",
                });
            }
            if spec.enabled_by_value.is_some() {
                return Err(SpecError::TriggerWithoutReference {
                    input: name.to_string(),
                    trigger: "enabled_by_value",
                });
            }
        }

        if spec.enabled_by_type.as_ref().is_some_and(Vec::is_empty) {
            return Err(SpecError::EmptyTrigger {
                input: name.to_string(),
                trigger: "enabled_by_type",
            });
        }
        if spec.enabled_by_value.as_ref().is_some_and(Vec::is_empty) {
            return Err(SpecError::EmptyTrigger {
                input: name.to_string(),
                trigger: "enabled_by_value",
            });
        }

        // A type trigger outside the reference's declared tags can never
        // fire. Only checkable when the reference exists and declares tags;
        // dangling references are the graph's problem.
        if let (Some(reference), Some(tags)) = (&spec.enabled_by, &spec.enabled_by_type) {
            if let Some(reference_spec) = self.inputs.get(reference) {
                if !reference_spec.types.is_empty() {
                    for tag in tags {
                        if !reference_spec.types.contains(tag) {
                            return Err(SpecError::UnmatchableTriggerType {
                                input: name.to_string(),
                                reference: reference.clone(),
                                tag: tag.clone(),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// A manifest file: tool identifier -> tool declaration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    tools: BTreeMap<String, ToolSpec>,
}

impl Manifest {
    /// Creates an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterates over `(tool id, tool)` pairs in deterministic order
    pub fn tools(&self) -> impl Iterator<Item = (&String, &ToolSpec)> {
        self.tools.iter()
    }

    /// Gets a tool by its manifest identifier
    pub fn get(&self, id: &str) -> Option<&ToolSpec> {
        self.tools.get(id)
    }

    /// Inserts a tool; returns false if the id was already taken
    pub fn insert(&mut self, id: impl Into<String>, tool: ToolSpec) -> bool {
        use std::collections::btree_map::Entry;
        match self.tools.entry(id.into()) {
            Entry::Vacant(entry) => {
                entry.insert(tool);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Returns the number of tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true if the manifest declares no tools
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Validates every tool, reporting the first failure with its tool id
    pub fn validate(&self) -> Result<(), ManifestError> {
        for (id, tool) in &self.tools {
            tool.validate().map_err(|source| ManifestError {
                tool: id.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Picks the tool a command should operate on.
    ///
    /// With an explicit id the tool must exist. Without one the manifest
    /// must declare exactly one tool.
    pub fn select(&self, id: Option<&str>) -> Result<(&str, &ToolSpec), SelectError> {
        match id {
            Some(id) => self
                .tools
                .get_key_value(id)
                .map(|(id, tool)| (id.as_str(), tool))
                .ok_or_else(|| SelectError::NotFound(id.to_string())),
            None => {
                let mut tools = self.tools.iter();
                match (tools.next(), tools.next()) {
                    (None, _) => Err(SelectError::Empty),
                    (Some((id, tool)), None) => Ok((id.as_str(), tool)),
                    (Some(_), Some(_)) => Err(SelectError::Ambiguous(
                        self.tools
                            .keys()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", "),
                    )),
                }
            }
        }
    }
}
