//! Tool manifests: input declarations, gating rules and validation
//!
//! Contains the declarative side of the crate without any I/O concerns,
//! plus the loader that reads manifest files.

mod graph;
mod input;
mod loader;
mod tool;
mod value_type;

pub use graph::{GraphError, InputGraph};
pub use input::{InputSpec, Trigger};
pub use loader::{
    discover_manifest_paths, is_manifest_path, load_manifest, load_path, merge_manifests,
    parse_manifest, read_manifest, ManifestFile,
};
pub use tool::{Manifest, ManifestError, SelectError, SpecError, ToolSpec};
pub use value_type::{display_tags, ValueType, DEFAULT_TYPE_KEY};
