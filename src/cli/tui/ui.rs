//! Terminal setup and the form preview layout

use std::io::{self, stdout, Stdout};

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::app::{App, Mode};

/// Terminal type alias
pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Initialize the terminal for TUI mode
pub fn init_terminal() -> Result<Terminal> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = ratatui::Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
pub fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(())
}

/// Draw the form preview layout
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: vertical split for main content and status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),   // Main content
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    // Split main content: inputs panel left, details and payload right
    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40), // Inputs
            Constraint::Percentage(60), // Details + payload
        ])
        .split(main_chunks[0]);

    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(55), // Details
            Constraint::Percentage(45), // Payload
        ])
        .split(content_chunks[1]);

    draw_inputs_panel(frame, app, content_chunks[0]);
    draw_details_panel(frame, app, right_chunks[0]);
    draw_payload_panel(frame, app, right_chunks[1]);
    draw_status_bar(frame, app, main_chunks[1]);
}

/// Draw the inputs panel
fn draw_inputs_panel(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .inputs()
        .iter()
        .map(|name| {
            let enabled = app.enablement().is_enabled(name);
            let marker = if enabled { "[x]" } else { "[ ]" };
            let value = match app.state().value(name) {
                Some(value) => format!(" = {}", truncate(&value.to_string(), 24)),
                None => String::new(),
            };

            let item = ListItem::new(format!("{} {}{}", marker, name, value));
            if enabled {
                item
            } else {
                item.style(Style::default().fg(Color::DarkGray))
            }
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Inputs").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = ListState::default();
    state.select(Some(app.selected()));

    frame.render_stateful_widget(list, area, &mut state);
}

/// Draw the details panel for the selected input
fn draw_details_panel(frame: &mut Frame, app: &App, area: Rect) {
    let content = if let Some((name, spec)) = app.selected_spec() {
        let enabled = app.enablement().is_enabled(name);

        let value_str = match app.state().value(name) {
            Some(value) => value.to_string(),
            None => "(unset)".to_string(),
        };

        let mut lines = vec![
            format!("Input: {}", name),
            format!("Types: {}", spec.type_summary()),
            format!("Enabled: {}", if enabled { "yes" } else { "no" }),
            format!("Value: {}", value_str),
        ];

        if let Some(default) = &spec.default {
            lines.push(format!("Default: {}", default));
        }

        if let Some(choices) = &spec.choices {
            let rendered: Vec<String> = choices.iter().map(|c| c.to_string()).collect();
            lines.push(format!("Choices: {}", rendered.join(", ")));
        }

        let mut flags = Vec::new();
        if spec.advanced {
            flags.push("advanced");
        }
        if spec.optional {
            flags.push("optional");
        }
        if !flags.is_empty() {
            lines.push(format!("Flags: {}", flags.join(", ")));
        }

        lines.push(String::new());
        match spec.gate_summary() {
            Some(summary) => {
                lines.push(format!("Gate: {}", summary));
                if let Some((reference, _)) = spec.gate() {
                    let reference_value = match app.state().value(reference) {
                        Some(value) => value.to_string(),
                        None => "(unset)".to_string(),
                    };
                    let reference_state = if app.enablement().is_enabled(reference) {
                        "enabled"
                    } else {
                        "disabled"
                    };
                    lines.push(format!(
                        "Reference: {} = {} ({})",
                        reference, reference_value, reference_state
                    ));
                }
            }
            None => {
                lines.push("Gate: always enabled".to_string());
            }
        }

        lines.join("\n")
    } else {
        "No inputs declared".to_string()
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().title("Details").borders(Borders::ALL))
        .wrap(Wrap { trim: true });

    frame.render_widget(paragraph, area);
}

/// Draw the pruned payload panel
fn draw_payload_panel(frame: &mut Frame, app: &App, area: Rect) {
    let payload = app.enablement().prune(app.state());
    let content = serde_json::to_string_pretty(&payload).unwrap_or_default();

    let paragraph = Paragraph::new(content)
        .block(Block::default().title("Payload").borders(Borders::ALL))
        .wrap(Wrap { trim: false });

    frame.render_widget(paragraph, area);
}

/// Draw the status bar
fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (content, style) = match app.mode() {
        Mode::Normal => {
            let msg = app
                .status_message()
                .unwrap_or("[e]dit [space]cycle [d]efault [x]unset [w]rite [r]eload [q]uit [?]help");
            (msg.to_string(), Style::default())
        }
        Mode::Editing(buffer) => {
            let name = app
                .inputs()
                .get(app.selected())
                .map(String::as_str)
                .unwrap_or("?");
            (
                format!("Edit {}: {}_", name, buffer),
                Style::default().fg(Color::Yellow),
            )
        }
    };

    let status_text = format!("{} [{}] {}", "Cascade", app.tool_id(), content);

    let paragraph = Paragraph::new(status_text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(paragraph, area);
}

/// Truncate to `max` characters, appending "..." when cut
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
