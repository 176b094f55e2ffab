//! Dependency graph command

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::manifest::load_manifest;

/// Show a tool's `enabled_by` edges and resolve order
pub fn run(output: &Output, manifest_path: &Path, tool_id: Option<&str>) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let (id, tool) = manifest.select(tool_id)?;

    let graph = tool.graph()?;
    let order = graph.resolve_order();

    if output.is_json() {
        let edges: Vec<_> = tool
            .inputs
            .iter()
            .filter_map(|(name, spec)| {
                spec.enabled_by.as_ref().map(|reference| {
                    serde_json::json!({
                        "input": name,
                        "reference": reference,
                    })
                })
            })
            .collect();

        output.data(&serde_json::json!({
            "tool": id,
            "edges": edges,
            "order": order,
        }));
    } else {
        println!("Gates for {} ({}):", tool.display_name(id), id);
        let mut gated = 0;
        for (name, spec) in &tool.inputs {
            if let Some(summary) = spec.gate_summary() {
                println!("  {}: {}", name, summary);
                gated += 1;
            }
        }
        if gated == 0 {
            println!("  (none)");
        }

        let ungated: Vec<_> = tool
            .inputs
            .iter()
            .filter(|(_, spec)| !spec.is_gated())
            .map(|(name, _)| name.as_str())
            .collect();
        if !ungated.is_empty() {
            output.blank();
            println!("Always enabled: {}", ungated.join(", "));
        }

        output.blank();
        println!("Resolve order: {}", order.join(" -> "));
    }

    Ok(())
}
