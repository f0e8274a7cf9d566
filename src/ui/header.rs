//! Header Component
//!
//! Displays the signed-in user, server, and the view tabs.

use crate::app::{App, View};
use crate::i18n::Locale;
use crate::resource::{get_all_resource_keys, get_resource};
use crate::VERSION;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" khair v{} ", VERSION),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    // Row 1: user, server, language
    let user = app
        .user
        .as_ref()
        .map(|u| if u.name.is_empty() { u.email.clone() } else { u.name.clone() })
        .unwrap_or_else(|| "-".to_string());
    let language = match app.locale {
        Locale::En => "English",
        Locale::Ar => "العربية",
    };

    let mut session_line = vec![
        Span::styled(" User: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            user,
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Server: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.api.base_url().to_string(), Style::default().fg(Color::Green)),
        Span::raw("  "),
        Span::styled("Lang: ", Style::default().fg(Color::DarkGray)),
        Span::styled(language, Style::default().fg(Color::White)),
    ];
    if app.readonly {
        session_line.push(Span::styled(
            "  [READ-ONLY]",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(session_line)), rows[0]);

    // Row 2: view tabs
    f.render_widget(Paragraph::new(tabs_line(app)), rows[1]);

    // Row 3: help hint
    let help_line = Line::from(Span::styled(
        " ?:help  ::cmd  Tab:next view  /:search  f:filter  n:new  q:quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(help_line), rows[2]);
}

fn tabs_line(app: &App) -> Line<'static> {
    let active = Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let inactive = Style::default().fg(Color::DarkGray);

    let mut spans = vec![Span::raw(" ")];
    let mut push = |label: String, is_active: bool| {
        spans.push(Span::styled(
            format!(" {} ", label),
            if is_active { active } else { inactive },
        ));
        spans.push(Span::raw(" "));
    };

    push("Dashboard".to_string(), app.view == View::Dashboard);
    for key in get_all_resource_keys() {
        if let Some(def) = get_resource(key) {
            let is_active = app.view == View::Resource && app.current_resource_key == key;
            push(def.display_name.clone(), is_active);
        }
    }
    push("Reports".to_string(), app.view == View::Reports);

    Line::from(spans)
}
