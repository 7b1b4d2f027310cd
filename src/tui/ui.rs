use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::app::{App, AppMode, SettingsField};
use crate::core::style::{ASPECT_RATIOS, STYLE_PRESETS};
use crate::media::ImageAsset;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    match app.mode {
        AppMode::Main | AppMode::Input => draw_main(frame, app),
        AppMode::Settings => draw_settings(frame, app),
    }
}

/// Draw the main session view
fn draw_main(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Title/input
            Constraint::Min(14),    // Session + result panels
            Constraint::Length(3),  // Status bar
            Constraint::Length(2),  // Help line
        ])
        .split(frame.area());

    // Title or input
    if app.mode == AppMode::Input {
        draw_input(frame, app, chunks[0]);
    } else {
        draw_title(frame, chunks[0]);
    }

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    draw_session_panel(frame, app, panels[0]);
    draw_result_panel(frame, app, panels[1]);

    // Status bar
    draw_status(frame, app, chunks[2]);

    // Help line
    draw_help(frame, app, chunks[3]);
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(vec![Line::from(vec![
        Span::styled("📸 ", Style::default()),
        Span::styled(
            "Studio Photo",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            " - casual photos, studio portraits",
            Style::default().fg(Color::Gray),
        ),
    ])])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)),
    );
    frame.render_widget(title, area);
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let input = Paragraph::new(app.input.as_str())
        .style(Style::default().fg(Color::White))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(app.input_purpose.title()),
        );
    frame.render_widget(input, area);

    // Show cursor
    frame.set_cursor_position((area.x + app.cursor_pos as u16 + 1, area.y + 1));
}

fn asset_line(label: &str, asset: &Option<ImageAsset>) -> Line<'static> {
    match asset {
        Some(asset) => Line::from(vec![
            Span::styled(format!("{:<11}", label), Style::default().fg(Color::Gray)),
            Span::styled(
                format!(
                    "{} ({:.0} KB)",
                    asset.mime_type(),
                    asset.bytes().len() as f64 / 1024.0
                ),
                Style::default().fg(Color::Green),
            ),
        ]),
        None => Line::from(vec![
            Span::styled(format!("{:<11}", label), Style::default().fg(Color::Gray)),
            Span::styled("(none)", Style::default().fg(Color::DarkGray)),
        ]),
    }
}

fn draw_session_panel(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Upload targets
            Constraint::Min(6),    // Style picker
            Constraint::Length(3), // Aspect ratio
        ])
        .split(area);

    let state = &app.session.state;

    let uploads = Paragraph::new(vec![
        asset_line("Photo", &state.original),
        asset_line("Editing", &state.editing),
        asset_line("Reference", &state.reference),
    ])
    .block(Block::default().borders(Borders::ALL).title("Session"));
    frame.render_widget(uploads, chunks[0]);

    let items: Vec<ListItem> = STYLE_PRESETS
        .iter()
        .enumerate()
        .map(|(i, preset)| {
            let selected = i == app.style_index;
            let marker = if selected { "● " } else { "  " };
            let style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![Span::styled(
                format!("{}{}", marker, preset.display_name),
                style,
            )]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Style  [←→]"),
    );
    frame.render_widget(list, chunks[1]);

    let ratio = &ASPECT_RATIOS[app.ratio_index];
    let ratio_line = Paragraph::new(Line::from(vec![
        Span::styled(
            ratio.display_name,
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", ratio.value), Style::default().fg(Color::Gray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("Aspect Ratio  [↑↓]"),
    );
    frame.render_widget(ratio_line, chunks[2]);
}

fn draw_result_panel(frame: &mut Frame, app: &App, area: Rect) {
    let state = &app.session.state;

    let mut lines: Vec<Line> = Vec::new();

    if state.is_busy() {
        lines.push(Line::from(Span::styled(
            "Processing...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(error) = &state.last_error {
        lines.push(Line::from(Span::styled(
            "Request failed",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    } else if let Some(result) = &state.generated {
        lines.push(Line::from(Span::styled(
            "Result ready",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Type: ", Style::default().fg(Color::Gray)),
            Span::styled(result.mime_type().to_string(), Style::default().fg(Color::White)),
        ]));
        lines.push(Line::from(vec![
            Span::styled("Size: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{:.0} KB", result.bytes().len() as f64 / 1024.0),
                Style::default().fg(Color::White),
            ),
        ]));
        if let Some(entry) = state.history.last() {
            lines.push(Line::from(vec![
                Span::styled("Flow: ", Style::default().fg(Color::Gray)),
                Span::styled(entry.flow.to_string(), Style::default().fg(Color::White)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Id:   ", Style::default().fg(Color::Gray)),
                Span::styled(entry.id.clone(), Style::default().fg(Color::White)),
            ]));
            lines.push(Line::from(vec![
                Span::styled("At:   ", Style::default().fg(Color::Gray)),
                Span::styled(
                    entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    Style::default().fg(Color::White),
                ),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "d: download  f: edit this result",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Load a photo with 'o', then press 'g' to generate",
            Style::default().fg(Color::DarkGray),
        )));
    }

    if !state.history.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("History: {} result(s) this session", state.history.len()),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let result = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Result"))
        .wrap(Wrap { trim: true });
    frame.render_widget(result, area);
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let (message, style) = if let Some(err) = &app.error_message {
        (err.as_str(), Style::default().fg(Color::Red))
    } else if let Some(status) = &app.status_message {
        (status.as_str(), Style::default().fg(Color::Green))
    } else if app.session.state.is_busy() {
        ("Processing...", Style::default().fg(Color::Yellow))
    } else {
        ("Ready", Style::default().fg(Color::Gray))
    };

    let status = Paragraph::new(message)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("Status"));
    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.mode {
        AppMode::Input => "Enter: Confirm | Esc: Cancel",
        AppMode::Main => {
            "o: Photo | g: Generate | c: Clean up | e: Edit | r: Reference | d: Download | s: Settings | q: Quit"
        }
        _ => "",
    };

    let help = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

/// Draw settings screen
fn draw_settings(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Settings list
            Constraint::Length(3),  // Status
            Constraint::Length(2),  // Help
        ])
        .split(area);

    // Header
    let header = Paragraph::new("Settings")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, chunks[0]);

    // Settings list
    let fields = SettingsField::all();
    let items: Vec<ListItem> = fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let is_selected = i == app.settings_selected;
            let value = if app.settings_editing && is_selected {
                format!("{}▏", app.settings_edit_buffer)
            } else {
                app.get_settings_value(field)
            };

            let has_options = app.get_settings_options(field).is_some();
            let hint = if has_options { " [↵ cycles]" } else { "" };

            let content = Line::from(vec![
                Span::styled(
                    format!("{:<22}", field.label()),
                    if is_selected {
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(Color::White)
                    },
                ),
                Span::styled(
                    format!("{}{}", value, hint),
                    if is_selected && app.settings_editing {
                        Style::default().fg(Color::Yellow)
                    } else {
                        Style::default().fg(Color::Gray)
                    },
                ),
            ]);

            ListItem::new(content)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_widget(list, chunks[1]);

    // Status
    draw_status(frame, app, chunks[2]);

    // Help
    let help_text = if app.settings_editing {
        "Enter: Save | Esc: Cancel"
    } else {
        "↑↓: Navigate | Enter/Space: Edit/Toggle | Esc/q: Back"
    };
    let help = Paragraph::new(help_text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[3]);
}
