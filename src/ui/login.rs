//! Login Screen
//!
//! Shown until a session exists, and again after logout or a 401.

use super::dialog::centered_fixed;
use crate::app::App;
use crate::VERSION;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const LOGO: [&str; 4] = [
    " _     _           _      ",
    "| | __| |__   __ _(_)_ __ ",
    "| |/ /| '_ \\ / _` | | '__|",
    "|   < | | | | (_| | | |   ",
];

pub fn render(f: &mut Frame, app: &App) {
    let area = centered_fixed(56, 18, f.area());
    f.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" khair v{} ", VERSION),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(LOGO.len() as u16 + 1), // Logo
            Constraint::Length(1),                     // Server
            Constraint::Length(1),
            Constraint::Length(1), // Email
            Constraint::Length(1), // Password
            Constraint::Length(1),
            Constraint::Min(2), // Status
            Constraint::Length(1), // Hint
        ])
        .split(inner);

    let logo: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(*l, Style::default().fg(Color::Cyan))))
        .collect();
    f.render_widget(Paragraph::new(logo).alignment(Alignment::Center), chunks[0]);

    let server = Line::from(vec![
        Span::styled("Server: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.api.base_url().to_string(), Style::default().fg(Color::Green)),
    ]);
    f.render_widget(Paragraph::new(server).alignment(Alignment::Center), chunks[1]);

    let form = &app.login;
    let masked = "•".repeat(form.password.chars().count());
    f.render_widget(
        Paragraph::new(input_line("Email", &form.email, !form.focus_password)),
        chunks[3],
    );
    f.render_widget(
        Paragraph::new(input_line("Password", &masked, form.focus_password)),
        chunks[4],
    );

    let status = if form.status.loading {
        Line::from(Span::styled("Signing in...", Style::default().fg(Color::Yellow)))
    } else if let Some(err) = &form.status.error {
        Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from("")
    };
    f.render_widget(
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
        chunks[6],
    );

    let hint = Line::from(Span::styled(
        "Tab: switch field  Enter: sign in  Ctrl+C: quit",
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(Paragraph::new(hint).alignment(Alignment::Center), chunks[7]);
}

fn input_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let label_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let cursor = if focused { "_" } else { "" };

    Line::from(vec![
        Span::styled(format!("  {:<10}", label), label_style),
        Span::styled(format!("{}{}", value, cursor), Style::default().fg(Color::White)),
    ])
}
