//! Interactive TUI form preview
//!
//! Provides a terminal-based playground for editing a tool's form values
//! and watching enablement react, using ratatui.

mod app;
mod event;
mod ui;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::{anyhow, Result};

use super::Output;
use app::App;
use event::EventHandler;

/// Launch the TUI
pub fn run(
    output: &Output,
    manifest_path: &Path,
    tool_id: Option<&str>,
    state_path: Option<&Path>,
    type_key: Option<&str>,
) -> Result<()> {
    output.verbose_ctx("tui", "Starting form preview");

    let mut terminal = ui::init_terminal()?;

    // A manifest error must not leave the terminal in raw mode
    let mut app = match App::new(manifest_path, tool_id, state_path, type_key) {
        Ok(app) => app,
        Err(e) => {
            ui::restore_terminal()?;
            return Err(e);
        }
    };

    let events = EventHandler::new(250);

    // Catch panics from the main loop so the terminal is restored either way
    let result = panic::catch_unwind(AssertUnwindSafe(|| app.run(&mut terminal, events)));

    let restored = ui::restore_terminal();

    match result {
        Ok(outcome) => {
            restored?;
            outcome
        }
        Err(payload) => {
            let _ = restored;
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned());
            match message {
                Some(m) => Err(anyhow!("TUI panicked: {}", m)),
                None => Err(anyhow!("TUI panicked with unknown error")),
            }
        }
    }
}
