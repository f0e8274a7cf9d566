//! Command Box
//!
//! Command input with autocomplete over resources and built-in commands.

use crate::app::App;
use crate::resource::get_resource;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

const MAX_SUGGESTIONS: usize = 8;

/// Short description shown next to a suggestion
fn describe_command(cmd: &str) -> String {
    if let Some(def) = get_resource(cmd) {
        return format!("open {}", def.display_name);
    }
    match cmd {
        "dashboard" => "statistics overview",
        "reports" => "report aggregates and PDF export",
        "logout" => "sign out",
        "lang en" => "English labels",
        "lang ar" => "Arabic labels",
        "range" => "range YYYY-MM-DD YYYY-MM-DD",
        _ => "",
    }
    .to_string()
}

pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(MAX_SUGGESTIONS as u16 + 5)])
        .split(f.area());

    let command_area = chunks[1];
    f.render_widget(Clear, command_area);

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)])
        .split(command_area);

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Command ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    // Typed text plus the rest of the previewed command as ghost text
    let mut input = vec![
        Span::styled(":", Style::default().fg(Color::Cyan)),
        Span::styled(app.command_text.as_str(), Style::default().fg(Color::White)),
    ];
    if let Some(rest) = app
        .command_preview
        .as_deref()
        .and_then(|p| p.strip_prefix(app.command_text.as_str()))
    {
        input.push(Span::styled(rest, Style::default().fg(Color::DarkGray)));
    }
    f.render_widget(Paragraph::new(Line::from(input)).block(input_block), inner_chunks[0]);

    let suggestions_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Suggestions (↑/↓ to select, Tab to complete) ",
            Style::default().fg(Color::DarkGray),
        ));

    // Keep the selection inside the window
    let first = app
        .command_suggestion_selected
        .saturating_sub(MAX_SUGGESTIONS - 1);

    let suggestions: Vec<ListItem> = app
        .command_suggestions
        .iter()
        .enumerate()
        .skip(first)
        .take(MAX_SUGGESTIONS)
        .map(|(i, cmd)| {
            let selected = i == app.command_suggestion_selected;
            let (name_style, desc_style) = if selected {
                let style = Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
                (style, style)
            } else {
                (Style::default().fg(Color::White), Style::default().fg(Color::DarkGray))
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("  {:<14}", cmd), name_style),
                Span::styled(describe_command(cmd), desc_style),
            ]))
        })
        .collect();

    f.render_widget(List::new(suggestions).block(suggestions_block), inner_chunks[1]);
}
