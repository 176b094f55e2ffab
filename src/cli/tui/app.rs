//! TUI application state and logic

use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use serde_json::Value;

use super::event::{Event, EventHandler};
use super::ui::{self, Terminal};
use crate::form::{resolve, Enablement, FormState};
use crate::manifest::{load_manifest, InputSpec, ToolSpec};

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Editing(String),
}

/// Application state
pub struct App {
    /// Path the manifest was loaded from
    manifest_path: PathBuf,

    /// Manifest id of the tool being previewed
    tool_id: String,

    /// The tool's declaration
    tool: ToolSpec,

    /// Current form values
    state: FormState,

    /// Enablement computed from the current values
    enablement: Enablement,

    /// Input names, references before dependents
    inputs: Vec<String>,

    /// Selected input index
    selected: usize,

    /// Input mode
    mode: Mode,

    /// Status message to display
    status_message: Option<String>,

    /// Where `w` persists the values, if anywhere
    state_path: Option<PathBuf>,

    /// Whether to quit
    should_quit: bool,
}

impl App {
    /// Create a new application
    pub fn new(
        manifest_path: &Path,
        tool_id: Option<&str>,
        state_path: Option<&Path>,
        type_key: Option<&str>,
    ) -> Result<Self> {
        let manifest = load_manifest(manifest_path)?;
        let (id, tool) = manifest.select(tool_id)?;
        let tool_id = id.to_string();
        let tool = tool.clone();
        let inputs = tool.graph()?.resolve_order();

        // A missing state file is fine; `w` creates it
        let mut state = match state_path {
            Some(path) if path.exists() => FormState::load(path)?,
            _ => FormState::new(),
        };
        if let Some(key) = type_key {
            state.set_type_key(key);
        }

        let enablement = resolve(&tool, &state);

        Ok(Self {
            manifest_path: manifest_path.to_path_buf(),
            tool_id,
            tool,
            state,
            enablement,
            inputs,
            selected: 0,
            mode: Mode::Normal,
            status_message: None,
            state_path: state_path.map(Path::to_path_buf),
            should_quit: false,
        })
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal, events: EventHandler) -> Result<()> {
        while !self.should_quit {
            // Draw UI
            terminal.draw(|frame| self.draw(frame))?;

            // Handle events
            match events.next()? {
                Event::Key(key) => self.handle_key(key)?,
                Event::Tick => {}
            }
        }

        Ok(())
    }

    /// Draw the UI
    fn draw(&self, frame: &mut Frame) {
        ui::draw(frame, self);
    }

    /// Handle key events
    fn handle_key(&mut self, key: crossterm::event::KeyEvent) -> Result<()> {
        // Check for quit first (Ctrl+C in any mode)
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match &self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Editing(_) => self.handle_edit_key(key),
        }
    }

    /// Handle keys in normal mode
    fn handle_normal_key(&mut self, key: crossterm::event::KeyEvent) -> Result<()> {
        match key.code {
            // Quit
            KeyCode::Char('q') => {
                self.should_quit = true;
            }

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_selection_down();
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_selection_up();
            }

            // Value editing
            KeyCode::Char('e') | KeyCode::Enter => {
                self.start_edit();
            }
            KeyCode::Char(' ') => {
                self.cycle_choice();
            }
            KeyCode::Char('d') => {
                self.apply_default();
            }
            KeyCode::Char('x') => {
                self.unset_value();
            }

            // Persistence
            KeyCode::Char('w') => {
                self.save_state();
            }
            KeyCode::Char('r') => {
                self.reload();
            }

            // Help
            KeyCode::Char('?') => {
                self.status_message = Some(
                    "j/k:move e:edit space:cycle d:default x:unset w:save r:reload q:quit"
                        .to_string(),
                );
            }

            _ => {}
        }

        Ok(())
    }

    /// Handle keys in editing mode
    fn handle_edit_key(&mut self, key: crossterm::event::KeyEvent) -> Result<()> {
        let buffer = if let Mode::Editing(ref b) = self.mode {
            b.clone()
        } else {
            return Ok(());
        };

        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                self.commit_edit(buffer);
            }
            KeyCode::Backspace => {
                let mut buffer = buffer;
                buffer.pop();
                self.mode = Mode::Editing(buffer);
            }
            KeyCode::Char(c) => {
                let mut buffer = buffer;
                buffer.push(c);
                self.mode = Mode::Editing(buffer);
            }
            _ => {}
        }

        Ok(())
    }

    /// Move selection down
    fn move_selection_down(&mut self) {
        if !self.inputs.is_empty() {
            self.selected = (self.selected + 1) % self.inputs.len();
        }
    }

    /// Move selection up
    fn move_selection_up(&mut self) {
        if !self.inputs.is_empty() {
            self.selected = if self.selected == 0 {
                self.inputs.len() - 1
            } else {
                self.selected - 1
            };
        }
    }

    /// Begin editing the selected input, prefilled with its current value
    fn start_edit(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        let buffer = match self.state.value(&name) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        self.mode = Mode::Editing(buffer);
    }

    /// Commit an edit buffer as the selected input's value
    ///
    /// An empty buffer unsets the input. Anything else parses as JSON,
    /// falling back to a plain string.
    fn commit_edit(&mut self, raw: String) {
        let Some(name) = self.selected_name() else {
            self.mode = Mode::Normal;
            return;
        };

        if raw.is_empty() {
            self.state.unset(&name);
            self.status_message = Some(format!("{} unset", name));
        } else {
            let value = parse_value(&raw);
            self.status_message = Some(format!("{} = {}", name, value));
            self.state.set(name, value);
        }

        self.mode = Mode::Normal;
        self.refresh();
    }

    /// Step the selected input to its next declared choice
    fn cycle_choice(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };

        let next = match self.tool.input(&name).and_then(|spec| spec.choices.as_ref()) {
            Some(choices) if !choices.is_empty() => {
                let position = self
                    .state
                    .value(&name)
                    .and_then(|current| choices.iter().position(|choice| choice == current));
                let index = position.map(|p| (p + 1) % choices.len()).unwrap_or(0);
                choices[index].clone()
            }
            _ => {
                self.status_message = Some(format!("'{}' declares no choices", name));
                return;
            }
        };

        self.status_message = Some(format!("{} = {}", name, next));
        self.state.set(name, next);
        self.refresh();
    }

    /// Set the selected input to its declared default
    fn apply_default(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };

        let default = self.tool.input(&name).and_then(|spec| spec.default.clone());
        match default {
            Some(value) => {
                self.status_message = Some(format!("{} = {}", name, value));
                self.state.set(name, value);
                self.refresh();
            }
            None => {
                self.status_message = Some(format!("'{}' has no default", name));
            }
        }
    }

    /// Unset the selected input's value
    fn unset_value(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };

        self.state.unset(&name);
        self.status_message = Some(format!("{} unset", name));
        self.refresh();
    }

    /// Write the values to the state file
    fn save_state(&mut self) {
        match &self.state_path {
            Some(path) => match self.state.save(path) {
                Ok(()) => {
                    self.status_message = Some(format!("Saved {}", path.display()));
                }
                Err(e) => {
                    self.status_message = Some(format!("Save failed: {:#}", e));
                }
            },
            None => {
                self.status_message = Some("No state file to save to (pass --state)".to_string());
            }
        }
    }

    /// Re-read the manifest and state file, dropping unsaved edits
    fn reload(&mut self) {
        match self.reload_inner() {
            Ok(()) => {
                self.status_message = Some("Reloaded".to_string());
            }
            Err(e) => {
                self.status_message = Some(format!("Reload failed: {:#}", e));
            }
        }
    }

    fn reload_inner(&mut self) -> Result<()> {
        let manifest = load_manifest(&self.manifest_path)?;
        let (_, tool) = manifest.select(Some(&self.tool_id))?;
        let tool = tool.clone();
        let inputs = tool.graph()?.resolve_order();

        let type_key = self.state.type_key().to_string();
        let mut state = match &self.state_path {
            Some(path) if path.exists() => FormState::load(path)?,
            _ => FormState::new(),
        };
        state.set_type_key(type_key);

        self.tool = tool;
        self.inputs = inputs;
        self.state = state;
        if self.selected >= self.inputs.len() {
            self.selected = 0;
        }
        self.refresh();

        Ok(())
    }

    /// Recompute enablement from the current values
    fn refresh(&mut self) {
        self.enablement = resolve(&self.tool, &self.state);
    }

    /// Name of the currently selected input
    fn selected_name(&self) -> Option<String> {
        self.inputs.get(self.selected).cloned()
    }

    // Public accessors for the view

    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    pub fn tool(&self) -> &ToolSpec {
        &self.tool
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn enablement(&self) -> &Enablement {
        &self.enablement
    }

    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_spec(&self) -> Option<(&str, &InputSpec)> {
        let name = self.inputs.get(self.selected)?;
        Some((name.as_str(), self.tool.input(name)?))
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }
}

/// Parse raw input as JSON, falling back to a plain string
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
