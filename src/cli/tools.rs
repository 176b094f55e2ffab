//! Tool listing command

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::manifest::load_path;

/// List the tools declared under a manifest file or directory
pub fn run(output: &Output, path: &Path) -> Result<()> {
    let files = load_path(path)?;
    output.verbose_ctx("tools", &format!("Loaded {} manifest file(s)", files.len()));

    let mut rows = Vec::new();
    for file in &files {
        for (id, tool) in file.manifest.tools() {
            rows.push((id, tool, &file.path));
        }
    }

    if output.is_json() {
        let items: Vec<_> = rows
            .iter()
            .map(|(id, tool, path)| {
                serde_json::json!({
                    "id": id,
                    "name": tool.name,
                    "type": tool.kind,
                    "inputs": tool.inputs.len(),
                    "path": path.display().to_string(),
                })
            })
            .collect();
        output.data(&items);
    } else if rows.is_empty() {
        println!("No tools found.");
    } else {
        println!("Tools ({}):", rows.len());
        println!("{:<40} {:<16} {:<12} INPUTS", "ID", "NAME", "TYPE");
        println!("{}", "-".repeat(80));
        for (id, tool, _) in &rows {
            println!(
                "{:<40} {:<16} {:<12} {}",
                id,
                tool.display_name(id),
                tool.kind.as_deref().unwrap_or("-"),
                tool.inputs.len()
            );
        }
    }

    Ok(())
}
