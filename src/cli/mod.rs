//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `validate` | Check every tool's gating declarations |
//! | `tools` | List declared tools |
//! | `inputs` | List a tool's inputs, types and gates |
//! | `resolve` | Compute the enabled/disabled map for a state |
//! | `graph` | Show `enabled_by` edges and resolve order |
//! | `watch` | Re-run validation and resolution on file changes |
//! | `tui` | Interactive form preview |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! cascade --verbose resolve tools.yaml --set connection=azure-open-ai-connection
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod graph_cmd;
mod inputs;
mod output;
mod resolve_cmd;
mod tools;
mod tui;
mod validate;
mod watch;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
