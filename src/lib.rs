//! Cascade CLI - Conditional enablement for tool input forms
//!
//! Cascade reads tool manifests in which inputs declare `enabled_by`
//! gates on other inputs, validates the gating declarations, and resolves
//! which inputs are enabled for a given form state. Hosts use the result
//! to show, hide and prune form fields.

pub mod cli;
pub mod config;
pub mod form;
pub mod manifest;

pub use form::{resolve, Enablement, FormState};
pub use manifest::{InputSpec, Manifest, ToolSpec, ValueType};
