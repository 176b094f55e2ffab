//! Runtime form state
//!
//! The host owns the state: a mapping from input name to the value
//! currently entered in the form. Values are type-erased JSON values and
//! `null` means unset. The resolver only ever reads the state.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::manifest::{ToolSpec, DEFAULT_TYPE_KEY};

/// Current values of a tool's input form
///
/// Serializes as a plain JSON/YAML object. The type key (the object key
/// holding a runtime type tag, `"type"` unless reconfigured) travels with
/// the state but is not part of the serialized form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    values: BTreeMap<String, Value>,
    type_key: String,
}

impl FormState {
    /// Creates an empty state with the default type key
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
            type_key: DEFAULT_TYPE_KEY.to_string(),
        }
    }

    /// Creates an empty state with a custom type key
    pub fn with_type_key(type_key: impl Into<String>) -> Self {
        Self {
            values: BTreeMap::new(),
            type_key: type_key.into(),
        }
    }

    /// The object key holding runtime type tags
    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    /// Changes the type key
    pub fn set_type_key(&mut self, type_key: impl Into<String>) {
        self.type_key = type_key.into();
    }

    /// Sets an input's value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Removes an input's value
    pub fn unset(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    /// Gets the raw entry for an input, `null` included
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Gets an input's value if it is set (present and non-null)
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|value| !value.is_null())
    }

    /// Returns true if the input is set (present and non-null)
    pub fn is_set(&self, name: &str) -> bool {
        self.value(name).is_some()
    }

    /// Returns the number of entries, `null` entries included
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the state holds no entries
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over entries in deterministic (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Keeps only the entries the predicate accepts
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &Value) -> bool) {
        self.values.retain(|name, value| keep(name, value));
    }

    /// Seeds unset inputs from the tool's declared defaults
    pub fn apply_defaults(&mut self, tool: &ToolSpec) {
        for (name, spec) in &tool.inputs {
            if let Some(default) = &spec.default {
                if !self.is_set(name) {
                    self.set(name.clone(), default.clone());
                }
            }
        }
    }

    /// Reads a state file, picking the format from the extension.
    ///
    /// `.json` parses as JSON; everything else parses as YAML.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state = if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?
        } else {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse state file: {}", path.display()))?
        };

        Ok(state)
    }

    /// Writes the state to a file, picking the format from the extension
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            let mut content = serde_json::to_string_pretty(self)?;
            content.push('\n');
            content
        } else {
            serde_yaml::to_string(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for FormState {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.values.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FormState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let values = BTreeMap::deserialize(deserializer)?;
        Ok(Self {
            values,
            type_key: DEFAULT_TYPE_KEY.to_string(),
        })
    }
}

impl FromIterator<(String, Value)> for FormState {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
            type_key: DEFAULT_TYPE_KEY.to_string(),
        }
    }
}
