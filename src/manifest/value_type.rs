//! Value type tags for tool inputs
//!
//! Inputs declare their value types as a closed set of symbolic tags.
//! Type-based gating (`enabled_by_type`) matches the runtime tag of a
//! reference input's value against these tags.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object key that marks a runtime value as carrying a custom type tag
///
/// A state value like `{"type": "AzureOpenAIConnection", "name": "prod"}`
/// has the runtime tag `AzureOpenAIConnection`. The key can be overridden
/// per form state (see `FormState::set_type_key`).
pub const DEFAULT_TYPE_KEY: &str = "type";

/// A symbolic type tag
///
/// The built-in tags cover the scalar and container shapes a manifest can
/// declare; `Custom` carries named host types such as connection classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Double,
    Bool,
    String,
    Secret,
    List,
    Object,
    /// Named host type (e.g. `AzureOpenAIConnection`)
    #[serde(untagged)]
    Custom(std::string::String),
}

impl ValueType {
    /// Infers the structural tag of a runtime value.
    ///
    /// Returns `None` when no tag can be determined: the value is unset
    /// (`null`), or it is an object whose type key holds a non-string.
    /// Dependents of such a value resolve disabled rather than erroring.
    pub fn infer(value: &Value, type_key: &str) -> Option<ValueType> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Some(ValueType::Int)
                } else {
                    Some(ValueType::Double)
                }
            }
            Value::String(_) => Some(ValueType::String),
            Value::Array(_) => Some(ValueType::List),
            Value::Object(map) => match map.get(type_key) {
                None => Some(ValueType::Object),
                Some(Value::String(tag)) => Some(ValueType::Custom(tag.clone())),
                Some(_) => None,
            },
        }
    }

    /// Infers the tag of a runtime value against its input's declared tags.
    ///
    /// The structural tag wins when the input declares it. Otherwise the
    /// declared tags are tried in order and the first that accepts the
    /// structural value by coercion wins (`secret` accepts `string`,
    /// `double` accepts `int`). A structural tag with no declared match is
    /// returned as-is; trigger membership then decides enablement.
    pub fn infer_declared(
        value: &Value,
        type_key: &str,
        declared: &[ValueType],
    ) -> Option<ValueType> {
        let tag = Self::infer(value, type_key)?;
        if declared.is_empty() || declared.contains(&tag) {
            return Some(tag);
        }
        for candidate in declared {
            if candidate.accepts(&tag) {
                return Some(candidate.clone());
            }
        }
        Some(tag)
    }

    /// Returns true if a value with structural tag `other` can be carried
    /// by an input declared with this tag
    fn accepts(&self, other: &ValueType) -> bool {
        matches!(
            (self, other),
            (ValueType::Secret, ValueType::String) | (ValueType::Double, ValueType::Int)
        )
    }

    /// Returns true for named host types outside the built-in tag set
    pub fn is_custom(&self) -> bool {
        matches!(self, ValueType::Custom(_))
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int => f.write_str("int"),
            ValueType::Double => f.write_str("double"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::String => f.write_str("string"),
            ValueType::Secret => f.write_str("secret"),
            ValueType::List => f.write_str("list"),
            ValueType::Object => f.write_str("object"),
            ValueType::Custom(name) => f.write_str(name),
        }
    }
}

/// Formats a tag list the way manifests declare it, e.g. `string, int`
pub fn display_tags(tags: &[ValueType]) -> String {
    tags.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
