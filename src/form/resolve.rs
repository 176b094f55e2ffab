//! Enablement resolution
//!
//! The resolver is a pure projection of (tool, state) onto a per-input
//! enabled/disabled map. Hosts call it on every edit, so it does no I/O,
//! allocates little, and is total: undeclared or cyclic references (which
//! validation would have rejected) disable their dependents instead of
//! erroring.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::state::FormState;
use crate::manifest::{ToolSpec, Trigger, ValueType};

/// Per-input enablement, the resolver's result
///
/// Maps every declared input name to enabled (`true`) or disabled
/// (`false`). Serializes as a plain object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Enablement(BTreeMap<String, bool>);

impl Enablement {
    /// Returns true if the named input is enabled; unknown names are not
    pub fn is_enabled(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    /// Gets the entry for an input, if declared
    pub fn get(&self, name: &str) -> Option<bool> {
        self.0.get(name).copied()
    }

    /// Iterates over `(input, enabled)` in deterministic (sorted) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0
            .iter()
            .map(|(name, &enabled)| (name.as_str(), enabled))
    }

    /// Names of enabled inputs, sorted
    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|&(_, enabled)| enabled)
            .map(|(name, _)| name)
    }

    /// Names of disabled inputs, sorted
    pub fn disabled(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|&(_, enabled)| !enabled)
            .map(|(name, _)| name)
    }

    /// Returns the number of entries
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The payload a host would submit: the state with disabled inputs'
    /// values removed. Entries that are not declared inputs are removed
    /// too.
    pub fn prune(&self, state: &FormState) -> FormState {
        let mut pruned = state.clone();
        pruned.retain(|name, _| self.is_enabled(name));
        pruned
    }
}

/// Computes the enablement of every input of a tool.
///
/// An input without `enabled_by` is enabled. An input with `enabled_by`
/// is enabled only if its reference is enabled, set, and matches the
/// trigger: one of the `enabled_by_value` literals, or a runtime type tag
/// in `enabled_by_type`, or mere presence when no trigger is declared.
pub fn resolve(tool: &ToolSpec, state: &FormState) -> Enablement {
    let mut resolver = Resolver {
        tool,
        state,
        resolved: BTreeMap::new(),
        visiting: HashSet::new(),
    };

    for name in tool.inputs.keys() {
        resolver.resolve_input(name);
    }

    Enablement(resolver.resolved)
}

struct Resolver<'a> {
    tool: &'a ToolSpec,
    state: &'a FormState,
    resolved: BTreeMap<String, bool>,
    visiting: HashSet<&'a str>,
}

impl<'a> Resolver<'a> {
    fn resolve_input(&mut self, name: &'a str) -> bool {
        if let Some(&enabled) = self.resolved.get(name) {
            return enabled;
        }

        // An in-progress name means a reference cycle; report the
        // reference as disabled instead of recursing forever.
        if !self.visiting.insert(name) {
            return false;
        }

        let enabled = self.compute(name);

        self.visiting.remove(name);
        self.resolved.insert(name.to_string(), enabled);
        enabled
    }

    fn compute(&mut self, name: &str) -> bool {
        let tool = self.tool;
        let state = self.state;

        let Some(spec) = tool.inputs.get(name) else {
            return false;
        };

        let Some((reference, trigger)) = spec.gate() else {
            return true;
        };

        // Undeclared references cannot be resolved; their dependents stay
        // disabled.
        let Some(reference_spec) = tool.inputs.get(reference) else {
            return false;
        };

        // A disabled reference disables its dependents.
        if !self.resolve_input(reference) {
            return false;
        }

        // An unset reference never triggers anything.
        let Some(value) = state.value(reference) else {
            return false;
        };

        match trigger {
            Trigger::Presence => true,
            Trigger::Values(literals) => literals.contains(value),
            Trigger::Types(tags) => {
                ValueType::infer_declared(value, state.type_key(), &reference_spec.types)
                    .is_some_and(|tag| tags.contains(&tag))
            }
        }
    }
}
