//! Create/Edit Form
//!
//! Modal over the list. One row per field; choice fields show their label,
//! text fields show a cursor when focused.

use super::dialog::centered_rect;
use super::truncate_string;
use crate::api::FormError;
use crate::app::App;
use crate::i18n::Locale;
use crate::resource::{label_for, EditMode, FieldDef, FieldKind, ResourceScreen};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use serde_json::Value;

const LABEL_WIDTH: usize = 20;

pub fn render(f: &mut Frame, app: &App) {
    let Some(screen) = app.screen() else {
        return;
    };
    let edit = &screen.edit;
    if !edit.is_open() {
        return;
    }

    let popup_area = centered_rect(70, 80, f.area());
    f.render_widget(Clear, popup_area);

    let title = match edit.mode() {
        EditMode::Edit { .. } => format!(" Edit {} ", singular(&screen.def().display_name)),
        _ => format!(" New {} ", singular(&screen.def().display_name)),
    };
    let border_color = if edit.is_busy() { Color::Yellow } else { Color::Cyan };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            title,
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(2)])
        .split(inner);

    // Scroll so the focused field stays on screen
    let visible = chunks[0].height as usize;
    let first = app.form_focus.saturating_sub(visible.saturating_sub(1));
    let missing = match &edit.field_error {
        Some(FormError::Required { field, .. }) => Some(field.as_str()),
        _ => None,
    };

    let lines: Vec<Line> = edit
        .fields()
        .iter()
        .enumerate()
        .skip(first)
        .take(visible)
        .map(|(idx, field)| {
            let focused = idx == app.form_focus;
            field_line(screen, field, focused, missing == Some(field.key.as_str()), app.locale)
        })
        .collect();
    f.render_widget(Paragraph::new(lines), chunks[0]);

    let footer = if edit.is_busy() {
        Line::from(Span::styled("Saving...", Style::default().fg(Color::Yellow)))
    } else if let Some(err) = &edit.field_error {
        Line::from(Span::styled(err.to_string(), Style::default().fg(Color::Red)))
    } else if let Some(err) = &edit.status.error {
        Line::from(Span::styled(
            format!("Error: {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::styled(
            "Tab/↑↓: field  ←/→/Space: choose  Enter: save  Esc: cancel",
            Style::default().fg(Color::DarkGray),
        ))
    };
    f.render_widget(Paragraph::new(footer).wrap(Wrap { trim: true }), chunks[1]);
}

fn field_line(
    screen: &ResourceScreen,
    field: &FieldDef,
    focused: bool,
    missing: bool,
    locale: Locale,
) -> Line<'static> {
    let marker = if field.required { "*" } else { " " };
    let label_style = if missing {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let value_style = if focused {
        Style::default().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::White)
    };

    let value = display_value(screen, field, locale);
    let value = match field.kind {
        FieldKind::Select | FieldKind::Reference if focused => format!("‹ {} ›", value),
        FieldKind::Bool => value,
        _ if focused => format!("{}_", value),
        _ => value,
    };

    Line::from(vec![
        Span::styled(
            format!(" {}{:<width$}", marker, truncate_string(&field.label, LABEL_WIDTH), width = LABEL_WIDTH),
            label_style,
        ),
        Span::raw(" "),
        Span::styled(value, value_style),
    ])
}

fn display_value(screen: &ResourceScreen, field: &FieldDef, locale: Locale) -> String {
    let edit = &screen.edit;
    match field.kind {
        FieldKind::Bool => {
            let checked = matches!(edit.field_value(&field.key), Some(Value::Bool(true)));
            if checked { "[x]" } else { "[ ]" }.to_string()
        },
        FieldKind::Select => {
            let code = edit.field_text(&field.key);
            match (&field.options, code.is_empty()) {
                (_, true) => "-".to_string(),
                (Some(set), false) => label_for(set, &code, locale),
                (None, false) => code,
            }
        },
        FieldKind::Reference => {
            let id = edit.field_text(&field.key);
            match (&field.reference, id.is_empty()) {
                (_, true) => "-".to_string(),
                (Some(resource), false) => screen.lookup_label(resource, &id),
                (None, false) => id,
            }
        },
        FieldKind::Text | FieldKind::Textarea | FieldKind::Number | FieldKind::Date => {
            // Textarea shows on one line
            edit.field_text(&field.key).replace('\n', " ⏎ ")
        },
    }
}

/// `Payments` -> `Payment`; `Maintenance` stays as is
fn singular(name: &str) -> &str {
    name.strip_suffix('s').unwrap_or(name)
}
