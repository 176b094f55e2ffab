//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{graph_cmd, inputs, resolve_cmd, tools, tui, validate, watch};
use crate::config::GlobalConfig;

#[derive(Parser)]
#[command(name = "cascade")]
#[command(author, version, about = "Conditional enablement for tool input forms")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Object key carrying runtime type tags (default: "type")
    #[arg(long, global = true, value_name = "KEY")]
    pub type_key: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate every tool in a manifest file or directory
    Validate {
        /// Manifest file or directory
        path: PathBuf,
    },

    /// List the tools a manifest file or directory declares
    Tools {
        /// Manifest file or directory
        path: PathBuf,
    },

    /// List a tool's inputs with types, gating and defaults
    Inputs {
        /// Manifest file
        manifest: PathBuf,

        /// Tool id (required when the manifest declares several)
        #[arg(long)]
        tool: Option<String>,
    },

    /// Resolve which inputs are enabled for a form state
    Resolve {
        /// Manifest file
        manifest: PathBuf,

        /// Tool id (required when the manifest declares several)
        #[arg(long)]
        tool: Option<String>,

        /// State file (JSON or YAML)
        #[arg(long)]
        state: Option<PathBuf>,

        /// Set an input value, repeatable (VALUE parses as JSON, else string)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Seed unset inputs from declared defaults
        #[arg(long)]
        defaults: bool,

        /// Also print the pruned payload the host would submit
        #[arg(long)]
        prune: bool,
    },

    /// Show a tool's enabled_by graph and resolve order
    Graph {
        /// Manifest file
        manifest: PathBuf,

        /// Tool id (required when the manifest declares several)
        #[arg(long)]
        tool: Option<String>,
    },

    /// Re-validate and re-resolve whenever watched files change
    Watch {
        /// Manifest file
        manifest: PathBuf,

        /// Tool id (required when the manifest declares several)
        #[arg(long)]
        tool: Option<String>,

        /// State file to watch (JSON or YAML)
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Interactive form preview (edit values, watch inputs toggle)
    Tui {
        /// Manifest file
        manifest: PathBuf,

        /// Tool id (required when the manifest declares several)
        #[arg(long)]
        tool: Option<String>,

        /// State file to preload (JSON or YAML)
        #[arg(long)]
        state: Option<PathBuf>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = GlobalConfig::load()?;

    let format = cli
        .format
        .unwrap_or_else(|| config.default_format.into());
    let output = Output::new(format, cli.verbose);

    output.verbose("Cascade CLI starting");

    // Flag beats config beats the built-in "type"
    let type_key = cli.type_key.or_else(|| config.type_key.clone());

    match cli.command {
        Commands::Validate { path } => {
            output.verbose_ctx("validate", &format!("Validating: {}", path.display()));
            validate::run(&output, &path)?
        }

        Commands::Tools { path } => {
            output.verbose_ctx("tools", &format!("Listing tools under: {}", path.display()));
            tools::run(&output, &path)?
        }

        Commands::Inputs { manifest, tool } => {
            inputs::run(&output, &manifest, tool.as_deref())?
        }

        Commands::Resolve {
            manifest,
            tool,
            state,
            set,
            defaults,
            prune,
        } => resolve_cmd::run(
            &output,
            &manifest,
            tool.as_deref(),
            state.as_deref(),
            &set,
            defaults,
            prune,
            type_key.as_deref(),
        )?,

        Commands::Graph { manifest, tool } => {
            graph_cmd::run(&output, &manifest, tool.as_deref())?
        }

        Commands::Watch {
            manifest,
            tool,
            state,
        } => watch::run(
            &output,
            &manifest,
            tool.as_deref(),
            state.as_deref(),
            type_key.as_deref(),
            config.debounce_ms,
        )?,

        Commands::Tui {
            manifest,
            tool,
            state,
        } => tui::run(
            &output,
            &manifest,
            tool.as_deref(),
            state.as_deref(),
            type_key.as_deref(),
        )?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
