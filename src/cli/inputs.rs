//! Input listing command

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::manifest::load_manifest;

/// List a tool's inputs with types, defaults and gating
pub fn run(output: &Output, manifest_path: &Path, tool_id: Option<&str>) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let (id, tool) = manifest.select(tool_id)?;
    output.verbose_ctx("inputs", &format!("Selected tool: {}", id));

    if output.is_json() {
        output.data(&serde_json::json!({
            "tool": id,
            "inputs": tool.inputs,
        }));
    } else if tool.inputs.is_empty() {
        println!("Tool '{}' declares no inputs.", id);
    } else {
        println!("Inputs for {} ({}):", tool.display_name(id), id);
        println!("{:<26} {:<28} {:<18} GATE", "NAME", "TYPE", "DEFAULT");
        println!("{}", "-".repeat(100));
        for (name, spec) in &tool.inputs {
            let mut label = name.clone();
            if spec.advanced {
                label.push_str(" (advanced)");
            }
            if spec.optional {
                label.push_str(" (optional)");
            }

            let default = spec
                .default
                .as_ref()
                .map(|value| value.to_string())
                .unwrap_or_else(|| "-".to_string());
            let gate = spec.gate_summary().unwrap_or_else(|| "-".to_string());

            println!(
                "{:<26} {:<28} {:<18} {}",
                label,
                spec.type_summary(),
                default,
                gate
            );
        }
    }

    Ok(())
}
