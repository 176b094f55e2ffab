//! Enablement resolution command

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use super::output::Output;
use crate::form::{resolve, FormState};
use crate::manifest::load_manifest;

/// Resolve which inputs are enabled for a form state
pub fn run(
    output: &Output,
    manifest_path: &Path,
    tool_id: Option<&str>,
    state_path: Option<&Path>,
    assignments: &[String],
    defaults: bool,
    prune: bool,
    type_key: Option<&str>,
) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let (id, tool) = manifest.select(tool_id)?;
    output.verbose_ctx("resolve", &format!("Selected tool: {}", id));

    let mut state = match state_path {
        Some(path) => FormState::load(path)?,
        None => FormState::new(),
    };
    if let Some(key) = type_key {
        state.set_type_key(key);
    }

    for assignment in assignments {
        let (name, value) = parse_assignment(assignment)?;
        output.verbose_ctx("resolve", &format!("Set {} = {}", name, value));
        state.set(name, value);
    }

    if defaults {
        state.apply_defaults(tool);
        output.verbose_ctx("resolve", "Applied declared defaults");
    }

    let enablement = resolve(tool, &state);

    if output.is_json() {
        let mut doc = serde_json::json!({
            "tool": id,
            "enabled": enablement,
        });
        if prune {
            doc["payload"] = serde_json::to_value(enablement.prune(&state))?;
        }
        output.data(&doc);
    } else {
        for (name, enabled) in enablement.iter() {
            println!("[{}] {}", if enabled { "x" } else { " " }, name);
        }

        if prune {
            let payload = enablement.prune(&state);
            output.blank();
            println!("Payload:");
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }

    Ok(())
}

/// Splits a `NAME=VALUE` assignment; VALUE parses as JSON, else as a string
fn parse_assignment(assignment: &str) -> Result<(String, Value)> {
    let (name, raw) = assignment
        .split_once('=')
        .with_context(|| format!("Invalid assignment '{}', expected NAME=VALUE", assignment))?;

    if name.is_empty() {
        anyhow::bail!("Invalid assignment '{}', input name is empty", assignment);
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}
