//! Output formatting for CLI commands
//!
//! Commands render either human-readable text or machine-parseable JSON,
//! chosen once at startup. Diagnostics always go to stderr so JSON stdout
//! stays parseable.

use serde::Serialize;

use crate::config;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<config::OutputFormat> for OutputFormat {
    fn from(format: config::OutputFormat) -> Self {
        match format {
            config::OutputFormat::Text => OutputFormat::Text,
            config::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Output helper shared by every command
pub struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self { format, verbose }
    }

    /// Returns true if using JSON format
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Returns true if using text format
    pub fn is_text(&self) -> bool {
        matches!(self.format, OutputFormat::Text)
    }

    /// Prints a serializable document on stdout.
    ///
    /// JSON mode emits one compact document per call. Text mode pretty-prints,
    /// as a fallback for data with no dedicated text layout.
    pub fn data<T: Serialize>(&self, data: &T) {
        let rendered = if self.is_json() {
            serde_json::to_string(data)
        } else {
            serde_json::to_string_pretty(data)
        };
        if let Ok(json) = rendered {
            println!("{}", json);
        }
    }

    /// Prints a non-fatal error on stderr
    pub fn error(&self, message: &str) {
        if self.is_json() {
            eprintln!("{}", serde_json::json!({ "error": message }));
        } else {
            eprintln!("Error: {}", message);
        }
    }

    /// Prints a blank separator line (text only)
    pub fn blank(&self) {
        if self.is_text() {
            println!();
        }
    }

    /// Prints a debug message on stderr (only when --verbose is set)
    pub fn verbose(&self, message: &str) {
        if self.verbose {
            eprintln!("[verbose] {}", message);
        }
    }

    /// Like [`verbose`](Self::verbose), prefixed with the reporting command
    pub fn verbose_ctx(&self, context: &str, message: &str) {
        if self.verbose {
            eprintln!("[verbose:{}] {}", context, message);
        }
    }
}
