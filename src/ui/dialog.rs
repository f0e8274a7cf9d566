//! Dialog Components
//!
//! Confirmation, warning and status picker dialogs.

use crate::app::{App, Mode};
use crate::resource::{get_color_for_value, label_for, get_resource};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, app: &App) {
    match app.mode {
        Mode::Confirm => render_confirm_dialog(f, app),
        Mode::Warning => render_warning_dialog(f, app),
        Mode::StatusPicker => render_status_picker(f, app),
        _ => {},
    }
}

fn render_confirm_dialog(f: &mut Frame, app: &App) {
    let Some(pending) = &app.pending_action else {
        return;
    };

    let popup_area = centered_rect(50, 25, f.area());
    f.render_widget(Clear, popup_area);

    let (border_color, title) = if pending.destructive {
        (Color::Red, " Confirm Destructive Action ")
    } else {
        (Color::Yellow, " Confirm Action ")
    };

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

    let content_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let message = Paragraph::new(Line::from(Span::styled(
        pending.message.as_str(),
        Style::default().fg(Color::White),
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(message, content_chunks[0]);

    let selected = |is_selected: bool, bg: Color| {
        if is_selected {
            Style::default()
                .fg(Color::Black)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };
    let yes_bg = if pending.destructive { Color::Red } else { Color::Green };

    let buttons = Line::from(vec![
        Span::styled(" Yes (y) ", selected(pending.selected_yes, yes_bg)),
        Span::raw("    "),
        Span::styled(" No (n) ", selected(!pending.selected_yes, Color::White)),
    ]);
    f.render_widget(
        Paragraph::new(buttons).alignment(Alignment::Center),
        content_chunks[2],
    );
}

fn render_warning_dialog(f: &mut Frame, app: &App) {
    let Some(message) = &app.warning_message else {
        return;
    };

    let popup_area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(
            " Warning ",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));

    let content = vec![
        Line::from(""),
        Line::from(Span::styled(message.as_str(), Style::default().fg(Color::White))),
        Line::from(""),
        Line::from(Span::styled(
            "Press Enter or Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, popup_area);
}

/// List of target statuses, each in its option color
fn render_status_picker(f: &mut Frame, app: &App) {
    let Some(picker) = &app.status_picker else {
        return;
    };
    let transition = get_resource(&app.current_resource_key).and_then(|def| {
        def.transitions
            .iter()
            .find(|t| t.key == picker.transition_key)
    });
    let Some(transition) = transition else {
        return;
    };
    let set = transition.status_options.as_deref().unwrap_or_default();

    let height = (picker.options.len() as u16 + 4).min(f.area().height);
    let popup_area = centered_fixed(40, height, f.area());
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            format!(" {} ", transition.display_name),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Enter: apply  Esc: cancel ").alignment(Alignment::Center));

    let items: Vec<ListItem> = picker
        .options
        .iter()
        .map(|code| {
            let style = match get_color_for_value(set, code) {
                Some([r, g, b]) => Style::default().fg(Color::Rgb(r, g, b)),
                None => Style::default().fg(Color::White),
            };
            ListItem::new(Span::styled(format!("  {}", label_for(set, code, app.locale)), style))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    state.select(Some(picker.selected));
    f.render_stateful_widget(list, popup_area, &mut state);
}

/// Rectangle centered in `r`, sized as a percentage of it
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Rectangle of a fixed size centered in `r`, clipped to it
pub(crate) fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_fixed_clips_to_area() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered_fixed(40, 6, area);
        assert_eq!(rect, Rect::new(0, 2, 30, 6));
    }

    #[test]
    fn test_centered_rect_is_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(50, 50, area);
        assert_eq!(rect.width, 50);
        assert_eq!(rect.height, 20);
        assert_eq!(rect.x, 25);
    }
}
