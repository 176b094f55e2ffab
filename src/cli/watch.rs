//! Watch command
//!
//! Foreground loop that re-validates the manifest and re-resolves the
//! enablement map whenever the watched files change. Parent directories
//! are watched so editors that replace files on save keep triggering.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::new_debouncer;

use super::output::Output;
use crate::form::{resolve, FormState};
use crate::manifest::load_manifest;

pub fn run(
    output: &Output,
    manifest_path: &Path,
    tool_id: Option<&str>,
    state_path: Option<&Path>,
    type_key: Option<&str>,
    debounce_ms: u64,
) -> Result<()> {
    let mut targets = vec![canonical(manifest_path)];
    if let Some(path) = state_path {
        targets.push(canonical(path));
    }

    let mut dirs: Vec<PathBuf> = targets.iter().map(|target| watch_dir(target)).collect();
    dirs.sort();
    dirs.dedup();

    let (tx, rx) = mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(debounce_ms), tx)
        .context("Failed to create file watcher")?;

    for dir in &dirs {
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch: {}", dir.display()))?;
    }

    output.verbose_ctx(
        "watch",
        &format!("Watching {} path(s), debounce {}ms", targets.len(), debounce_ms),
    );

    // First pass before any change; failures are reported, not fatal,
    // so the loop keeps running while the user edits.
    if let Err(e) = run_once(output, manifest_path, tool_id, state_path, type_key) {
        output.error(&format!("{:#}", e));
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant = events
                    .iter()
                    .filter(|event| targets.iter().any(|target| target == &event.path))
                    .count();
                if relevant == 0 {
                    continue;
                }

                output.verbose_ctx("watch", &format!("Detected {} change(s)", relevant));
                if output.is_text() {
                    println!();
                    println!("{}", "-".repeat(40));
                }

                if let Err(e) = run_once(output, manifest_path, tool_id, state_path, type_key) {
                    output.error(&format!("{:#}", e));
                }
            }
            Ok(Err(error)) => {
                output.error(&format!("Watch error: {:?}", error));
            }
            Err(_) => break,
        }
    }

    Ok(())
}

/// One validation + resolution pass
fn run_once(
    output: &Output,
    manifest_path: &Path,
    tool_id: Option<&str>,
    state_path: Option<&Path>,
    type_key: Option<&str>,
) -> Result<()> {
    let manifest = load_manifest(manifest_path)?;
    let (id, tool) = manifest.select(tool_id)?;

    let mut state = match state_path {
        Some(path) => FormState::load(path)?,
        None => FormState::new(),
    };
    if let Some(key) = type_key {
        state.set_type_key(key);
    }

    let enablement = resolve(tool, &state);

    if output.is_json() {
        output.data(&serde_json::json!({
            "tool": id,
            "enabled": enablement,
        }));
    } else {
        println!("{} ({}):", tool.display_name(id), id);
        for (name, enabled) in enablement.iter() {
            println!("  [{}] {}", if enabled { "x" } else { " " }, name);
        }
    }

    Ok(())
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn watch_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
