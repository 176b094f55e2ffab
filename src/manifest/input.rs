//! Input declarations
//!
//! Each tool input declares its value types, an optional gate on another
//! input (`enabled_by` plus a trigger list), and display metadata that the
//! resolver ignores but hosts may render.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::value_type::{display_tags, ValueType};

/// Declaration of one tool input
///
/// Unknown manifest keys (`dynamic_list`, UI hints, ...) are preserved in
/// `extra` so rewriting a manifest keeps them intact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    /// Declared value types, in order of preference
    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<ValueType>,

    /// Default value hosts prefill for unset inputs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Closed list of values the host offers as choices
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Value>>,

    /// Tucked behind an "advanced" toggle in hosts
    #[serde(default, skip_serializing_if = "is_false")]
    pub advanced: bool,

    /// May be omitted from the payload entirely
    #[serde(default, skip_serializing_if = "is_false")]
    pub optional: bool,

    /// Name of the input this one is gated on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_by: Option<String>,

    /// Reference type tags that enable this input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_by_type: Option<Vec<ValueType>>,

    /// Literal reference values that enable this input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled_by_value: Option<Vec<Value>>,

    /// Display metadata this crate does not interpret, preserved as-is
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

/// How a gated input is triggered by its reference value
#[derive(Debug, Clone, PartialEq)]
pub enum Trigger<'a> {
    /// Enabled when the reference value's type tag is in the list
    Types(&'a [ValueType]),
    /// Enabled when the reference value equals one of the literals
    Values(&'a [Value]),
    /// Enabled whenever the reference holds any value
    Presence,
}

impl InputSpec {
    /// Returns the gate, if any: the reference input name and its trigger.
    ///
    /// A spec that invalidly declares both trigger kinds answers with the
    /// type trigger here; validation rejects such specs at load time.
    pub fn gate(&self) -> Option<(&str, Trigger<'_>)> {
        let reference = self.enabled_by.as_deref()?;
        let trigger = match (&self.enabled_by_type, &self.enabled_by_value) {
            (Some(tags), _) => Trigger::Types(tags),
            (None, Some(values)) => Trigger::Values(values),
            (None, None) => Trigger::Presence,
        };
        Some((reference, trigger))
    }

    /// Returns true if this input is gated on another input
    pub fn is_gated(&self) -> bool {
        self.enabled_by.is_some()
    }

    /// One-line gate summary for listings
    ///
    /// Examples: `enabled by connection = "azure-open-ai-connection"`,
    /// `enabled by connection : AzureOpenAIConnection`.
    pub fn gate_summary(&self) -> Option<String> {
        let (reference, trigger) = self.gate()?;
        Some(match trigger {
            Trigger::Types(tags) => {
                format!("enabled by {} : {}", reference, display_tags(tags))
            }
            Trigger::Values(values) => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                format!("enabled by {} = {}", reference, rendered.join(" | "))
            }
            Trigger::Presence => format!("enabled by {}", reference),
        })
    }

    /// Declared types rendered for listings (`any` when none are declared)
    pub fn type_summary(&self) -> String {
        if self.types.is_empty() {
            "any".to_string()
        } else {
            display_tags(&self.types)
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}
