//! Manifest validation command
//!
//! Reports every tool of every manifest, not just the first failure.

use std::path::Path;

use anyhow::Result;

use super::output::Output;
use crate::manifest::{discover_manifest_paths, read_manifest};

/// Validate every tool under a manifest file or directory
pub fn run(output: &Output, path: &Path) -> Result<()> {
    let paths = if path.is_dir() {
        discover_manifest_paths(path)?
    } else {
        vec![path.to_path_buf()]
    };

    if paths.is_empty() {
        anyhow::bail!("No manifest files found under {}", path.display());
    }

    let mut files = Vec::new();
    let mut tool_count = 0usize;
    let mut failures = 0usize;

    for manifest_path in &paths {
        output.verbose_ctx("validate", &format!("Checking: {}", manifest_path.display()));

        let manifest = match read_manifest(manifest_path) {
            Ok(manifest) => manifest,
            Err(e) => {
                failures += 1;
                if output.is_text() {
                    println!("{}", manifest_path.display());
                    println!("  parse error: {:#}", e);
                }
                files.push(serde_json::json!({
                    "path": manifest_path.display().to_string(),
                    "error": format!("{:#}", e),
                    "tools": [],
                }));
                continue;
            }
        };

        if output.is_text() {
            println!("{}", manifest_path.display());
        }

        let mut tools = Vec::new();
        for (id, tool) in manifest.tools() {
            tool_count += 1;
            match tool.validate() {
                Ok(()) => {
                    if output.is_text() {
                        println!("  {}: ok ({} input(s))", id, tool.inputs.len());
                    }
                    tools.push(serde_json::json!({ "id": id, "valid": true }));
                }
                Err(e) => {
                    failures += 1;
                    if output.is_text() {
                        println!("  {}: {}", id, e);
                    }
                    tools.push(serde_json::json!({
                        "id": id,
                        "valid": false,
                        "error": e.to_string(),
                    }));
                }
            }
        }

        files.push(serde_json::json!({
            "path": manifest_path.display().to_string(),
            "tools": tools,
        }));
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "valid": failures == 0,
            "files": files,
        }));
    } else if failures == 0 {
        output.blank();
        println!("{} tool(s) valid", tool_count);
    }

    if failures > 0 {
        anyhow::bail!("{} validation failure(s)", failures);
    }

    Ok(())
}
