//! Help Overlay
//!
//! Shows keyboard shortcuts, including the row actions of the current resource.

use super::dialog::centered_rect;
use crate::app::App;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/k, ↑/↓", "Move up/down"),
            ("gg / G", "First / last row"),
            ("[ / ]", "Previous / next page"),
            ("Tab/S-Tab", "Next / previous view"),
            ("Enter/d", "Record details"),
            ("R", "Refresh"),
        ],
    ),
    (
        "Search & Filters",
        &[
            ("/", "Live search"),
            ("f", "Edit filters (←/→ to change, Enter to apply)"),
            ("c", "Clear search and filters"),
        ],
    ),
    (
        "Records",
        &[
            ("n", "New record"),
            ("e", "Edit selected record"),
            ("D/Delete", "Delete selected record"),
        ],
    ),
    (
        "Forms",
        &[
            ("Tab/↓, S-Tab/↑", "Next / previous field"),
            ("←/→, Space", "Change choice"),
            ("Enter, Ctrl+S", "Save"),
            ("Esc", "Cancel"),
        ],
    ),
    (
        "Reports",
        &[
            ("t", "Next report"),
            ("p", "Save PDF"),
            (":range A B", "Set date range"),
        ],
    ),
    (
        "Commands",
        &[
            (":", "Command mode (resources, dashboard, reports, lang, logout)"),
            ("?/Esc", "Close help"),
            ("q", "Quit"),
        ],
    ),
];

fn key_line(key: &str, description: &str, key_color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", key), Style::default().fg(key_color)),
        Span::raw(description.to_string()),
    ])
}

pub fn render(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, popup_area);

    let bold = Style::default().add_modifier(Modifier::BOLD);
    let mut help_text = Vec::new();

    for (title, keys) in SECTIONS {
        help_text.push(Line::from(Span::styled(*title, bold)));
        help_text.extend(keys.iter().map(|(k, d)| key_line(k, d, Color::Yellow)));
        help_text.push(Line::from(""));
    }

    if let Some(resource) = app.current_resource() {
        if !resource.transitions.is_empty() {
            help_text.push(Line::from(Span::styled(
                format!("{} Actions", resource.display_name),
                bold,
            )));
            for transition in &resource.transitions {
                let color = if transition.key == "reject" {
                    Color::Red
                } else {
                    Color::Yellow
                };
                help_text.push(key_line(&transition.shortcut, &transition.display_name, color));
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Help ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    f.render_widget(Paragraph::new(help_text).block(block), popup_area);
}
