//! Manifest discovery and loading
//!
//! Manifests are YAML or JSON files, chosen by extension. A path given to
//! the CLI is either a single manifest file or a directory scanned
//! (non-recursively) for manifest files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::tool::Manifest;

/// File extensions recognized as manifests
const MANIFEST_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

/// A manifest together with the file it came from
#[derive(Debug, Clone)]
pub struct ManifestFile {
    /// Path the manifest was loaded from
    pub path: PathBuf,

    /// Parsed manifest
    pub manifest: Manifest,
}

/// Checks whether a path has a manifest extension
pub fn is_manifest_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
}

/// Parses manifest content, picking the format from the path's extension.
///
/// `.json` parses as JSON; everything else parses as YAML (which accepts
/// JSON documents too).
pub fn parse_manifest(path: &Path, content: &str) -> Result<Manifest> {
    let manifest = if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
        serde_json::from_str(content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?
    } else {
        serde_yaml::from_str(content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))?
    };

    Ok(manifest)
}

/// Reads and parses a manifest file without validating it
pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;

    parse_manifest(path, &content)
}

/// Reads, parses and validates a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let manifest = read_manifest(path)?;

    manifest
        .validate()
        .with_context(|| format!("Invalid manifest: {}", path.display()))?;

    Ok(manifest)
}

/// Lists manifest files in a directory, sorted by file name.
///
/// Non-recursive; entries without a manifest extension are skipped. The
/// sort order is the precedence order for [`merge_manifests`].
pub fn discover_manifest_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read manifest directory: {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_manifest_path(path))
        .collect();

    paths.sort();
    Ok(paths)
}

/// Loads every manifest under a path.
///
/// A file path loads as a single manifest; a directory path loads every
/// discovered manifest file. Any unreadable or invalid manifest fails the
/// whole load.
pub fn load_path(path: &Path) -> Result<Vec<ManifestFile>> {
    let paths = if path.is_dir() {
        discover_manifest_paths(path)?
    } else {
        vec![path.to_path_buf()]
    };

    paths
        .into_iter()
        .map(|path| {
            let manifest = load_manifest(&path)?;
            Ok(ManifestFile { path, manifest })
        })
        .collect()
}

/// Merges manifests into one, in order; the first file to declare a tool
/// id wins.
pub fn merge_manifests<'a>(files: impl IntoIterator<Item = &'a ManifestFile>) -> Manifest {
    let mut merged = Manifest::new();
    for file in files {
        for (id, tool) in file.manifest.tools() {
            merged.insert(id.clone(), tool.clone());
        }
    }
    merged
}
