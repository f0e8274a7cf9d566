//! Terminal User Interface rendering module
//!
//! This module handles all UI rendering for khair using the ratatui framework.
//! It displays one page of association records at a time in a table with
//! vim-style navigation, plus the dashboard and report views.
//!
//! # Architecture
//!
//! - `login` - Sign-in screen
//! - `header` - Header bar with user, server and resource info
//! - `form` - Create/edit modal
//! - `reports` - Dashboard summary and report aggregates
//! - `help` - Help overlay showing keybindings
//! - `dialog` - Confirmation, warning and status picker dialogs
//! - `command_box` - Command mode input (`:` key)
//!
//! # JSON Highlighting
//!
//! The describe and report views provide syntax highlighting for JSON output:
//! - Keys in cyan
//! - Strings in green
//! - Numbers in light blue
//! - Booleans in magenta
//! - Null values in dark gray

mod command_box;
mod dialog;
mod form;
mod header;
mod help;
mod login;
mod reports;

use crate::app::{App, Mode, View};
use crate::i18n::Locale;
use crate::resource::{
    extract_json_value, get_color_for_value, label_for, ColumnDef, ColumnKind, FilterKind,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
    Frame,
};

pub fn render(f: &mut Frame, app: &mut App) {
    if app.mode == Mode::Login {
        login::render(f, app);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Header (multi-line)
            Constraint::Min(1),    // Main content
            Constraint::Length(1), // Footer/crumb
        ])
        .split(f.area());

    header::render(f, app, chunks[0]);

    match app.view {
        View::Dashboard => reports::render_dashboard(f, app, chunks[1]),
        View::Reports => reports::render_reports(f, app, chunks[1]),
        View::Resource => {
            if app.mode == Mode::Describe {
                render_describe_view(f, app, chunks[1]);
            } else {
                render_main_content(f, app, chunks[1]);
            }
        },
    }

    render_crumb(f, app, chunks[2]);

    // Overlays
    match app.mode {
        Mode::Help => {
            help::render(f, app);
        },
        Mode::Confirm | Mode::Warning | Mode::StatusPicker => {
            dialog::render(f, app);
        },
        Mode::Command => {
            command_box::render(f, app);
        },
        Mode::Form => {
            form::render(f, app);
        },
        _ => {},
    }
}

fn render_main_content(f: &mut Frame, app: &mut App, area: Rect) {
    let show_criteria = matches!(app.mode, Mode::Search | Mode::Filter)
        || app
            .screen()
            .is_some_and(|s| s.list.query().has_criteria());

    if show_criteria {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        render_criteria_bar(f, app, chunks[0]);
        render_dynamic_table(f, app, chunks[1]);
    } else {
        render_dynamic_table(f, app, area);
    }
}

/// Search term and filter values; the focused filter is highlighted
fn render_criteria_bar(f: &mut Frame, app: &App, area: Rect) {
    let Some(screen) = app.screen() else {
        return;
    };
    let query = screen.list.query();

    let search_style = if app.mode == Mode::Search {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let search_display = if app.mode == Mode::Search {
        format!("/{}_", app.search_text)
    } else {
        format!("/{}", query.search_term)
    };

    let mut spans = vec![Span::styled(search_display, search_style)];

    for (idx, filter) in screen.def().filters.iter().enumerate() {
        let (value, focused) = match &app.filter_editor {
            Some(editor) if app.mode == Mode::Filter => {
                (editor.values[idx].clone(), editor.index == idx)
            },
            _ => (query.filter(&filter.key).to_string(), false),
        };

        let shown = if value.is_empty() {
            "any".to_string()
        } else {
            match (filter.kind, &filter.options, &filter.reference) {
                (FilterKind::Select, Some(set), _) => label_for(set, &value, app.locale),
                (FilterKind::Reference, _, Some(resource)) => screen.lookup_label(resource, &value),
                _ => value,
            }
        };

        let style = if focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if query.filter(&filter.key).is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        };

        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("{}: {}", filter.label, shown), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the current page of the current resource
fn render_dynamic_table(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(resource) = app.current_resource() else {
        let msg = Paragraph::new("Unknown resource").style(Style::default().fg(Color::Red));
        f.render_widget(msg, area);
        return;
    };

    // Build title with count, page and loading indicator
    let title = match app.screen() {
        Some(screen) => {
            let list = &screen.list;
            let page_info = if list.total_pages() > 0 {
                format!(" page {}/{}", list.query().page, list.total_pages())
            } else {
                String::new()
            };
            let loading = if list.status.loading { " ↻" } else { "" };
            format!(" {}[{}]{}{} ", resource.display_name, list.total_count(), page_info, loading)
        },
        None => format!(" {} ", resource.display_name),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    // Calculate viewport - account for header row
    let visible_height = (inner_area.height as usize).saturating_sub(1);
    app.update_viewport(visible_height);
    app.ensure_visible();

    let Some(screen) = app.screen() else {
        return;
    };
    let rows_data = screen.list.rows();

    if rows_data.is_empty() {
        let message = if screen.list.status.loading || screen.list.result().is_none() {
            "Loading..."
        } else {
            "No records"
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(empty, inner_area);
        return;
    }

    let total_items = rows_data.len();
    let needs_scrollbar = total_items > visible_height;

    // Adjust table area for scrollbar if needed
    let table_area = if needs_scrollbar {
        Rect {
            width: inner_area.width.saturating_sub(1),
            ..inner_area
        }
    } else {
        inner_area
    };

    let range = app.visible_range();

    let header_cells: Vec<Cell> = resource
        .columns
        .iter()
        .map(|col| {
            Cell::from(format!(" {}", col.header)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    // Build only visible rows
    let rows: Vec<Row> = rows_data[range.clone()]
        .iter()
        .map(|item| {
            let cells = resource.columns.iter().map(|col| {
                let value = extract_json_value(item, &col.json_path);
                let style = get_cell_style(&value, col);
                let display_value = format_cell_value(&value, col, app.locale);
                Cell::from(format!(" {}", truncate_string(&display_value, 38))).style(style)
            });
            Row::new(cells.collect::<Vec<_>>())
        })
        .collect();

    let widths: Vec<Constraint> = resource
        .columns
        .iter()
        .map(|col| Constraint::Percentage(col.width))
        .collect();

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Adjust selected index for virtual scrolling
    let selected = screen.selected;
    let mut state = TableState::default();
    if selected >= range.start && selected < range.end {
        state.select(Some(selected - range.start));
    }

    f.render_stateful_widget(table, table_area, &mut state);

    if needs_scrollbar {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(symbols::scrollbar::VERTICAL)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(total_items.saturating_sub(visible_height))
            .position(app.scroll_offset);

        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Get cell style based on value and column definition
fn get_cell_style(value: &str, col: &ColumnDef) -> Style {
    if let Some(ref set) = col.options {
        if let Some([r, g, b]) = get_color_for_value(set, value) {
            return Style::default().fg(Color::Rgb(r, g, b));
        }
    }
    Style::default()
}

/// Localized label for coded values, date part for timestamps
fn format_cell_value(value: &str, col: &ColumnDef, locale: Locale) -> String {
    if let Some(ref set) = col.options {
        return label_for(set, value, locale);
    }
    match col.kind {
        ColumnKind::Date => value.chars().take(10).collect(),
        ColumnKind::Text => value.to_string(),
    }
}

/// Truncate string for display (Unicode-safe)
pub(crate) fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

fn render_describe_view(f: &mut Frame, app: &App, area: Rect) {
    let json = app
        .selected_item_json()
        .unwrap_or_else(|| "No item selected".to_string());

    let loading = if app.screen().is_some_and(|s| s.detail_status.loading) { "↻ " } else { "" };
    let title = if let Some(resource) = app.current_resource() {
        format!(" {} Details {}", resource.display_name, loading)
    } else {
        " Details ".to_string()
    };

    render_json_block(f, &json, &title, app.describe_scroll, area);
}

/// Scrollable, highlighted JSON inside a bordered block
pub(crate) fn render_json_block(f: &mut Frame, json: &str, title: &str, scroll: usize, area: Rect) {
    let lines: Vec<Line> = json.lines().map(highlight_json_line).collect();
    let total_lines = lines.len();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let visible_lines = inner_area.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_lines);
    let scroll = scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    f.render_widget(paragraph, inner_area);

    if total_lines > visible_lines {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(max_scroll + visible_lines).position(scroll);
        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Apply JSON syntax highlighting to a single line
fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = line.chars().peekable();
    let mut current = String::new();
    let mut is_key = true;

    let flush = |current: &mut String, spans: &mut Vec<Span<'static>>| {
        if !current.is_empty() {
            spans.push(Span::styled(current.clone(), get_json_value_style(current)));
            current.clear();
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if !current.is_empty() {
                    spans.push(Span::raw(current.clone()));
                    current.clear();
                }

                let mut string_content = String::from("\"");
                while let Some(next_c) = chars.next() {
                    string_content.push(next_c);
                    if next_c == '"' {
                        break;
                    }
                    if next_c == '\\' {
                        if let Some(escaped) = chars.next() {
                            string_content.push(escaped);
                        }
                    }
                }

                let color = if is_key { Color::Cyan } else { Color::Green };
                spans.push(Span::styled(string_content, Style::default().fg(color)));
            },
            ':' => {
                spans.push(Span::styled(
                    ":".to_string(),
                    Style::default().fg(Color::White),
                ));
                is_key = false;
            },
            ',' => {
                flush(&mut current, &mut spans);
                spans.push(Span::styled(
                    ",".to_string(),
                    Style::default().fg(Color::White),
                ));
                is_key = true;
            },
            '{' | '}' | '[' | ']' => {
                flush(&mut current, &mut spans);
                spans.push(Span::styled(
                    c.to_string(),
                    Style::default().fg(Color::Yellow),
                ));
                if c == '{' || c == '[' {
                    is_key = c == '{';
                }
            },
            ' ' | '\t' => {
                flush(&mut current, &mut spans);
                spans.push(Span::raw(c.to_string()));
            },
            _ => {
                current.push(c);
            },
        }
    }

    flush(&mut current, &mut spans);
    Line::from(spans)
}

/// Get style for JSON values (numbers, booleans, null)
fn get_json_value_style(value: &str) -> Style {
    let trimmed = value.trim();
    if trimmed == "null" {
        Style::default().fg(Color::DarkGray)
    } else if trimmed == "true" || trimmed == "false" {
        Style::default().fg(Color::Magenta)
    } else if trimmed.parse::<f64>().is_ok() {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::White)
    }
}

/// Key hints for the current view and mode
fn mode_hint(app: &App) -> String {
    match (app.mode.clone(), app.view) {
        (Mode::Describe, _) => "j/k: scroll | q/d/Esc: back".to_string(),
        (Mode::Search, _) => "Type to search | Enter: keep | Esc: clear".to_string(),
        (Mode::Filter, _) => "Tab: next filter | ←/→: change | Enter: apply | Esc: cancel".to_string(),
        (_, View::Dashboard) => "R: refresh | Tab: next view".to_string(),
        (_, View::Reports) => "t: report | p: save PDF | :range start end | R: reload".to_string(),
        (_, View::Resource) => {
            let mut hints = vec!["n:new e:edit D:delete f:filter [/]:page".to_string()];
            if let Some(resource) = app.current_resource() {
                hints.extend(
                    resource
                        .transitions
                        .iter()
                        .map(|t| format!("{}:{}", t.shortcut, t.display_name)),
                );
            }
            hints.join(" ")
        },
    }
}

/// Most relevant error for the footer
fn current_error(app: &App) -> Option<String> {
    if let Some(err) = &app.error_message {
        return Some(err.clone());
    }
    match app.view {
        View::Resource => {
            let screen = app.screen()?;
            screen
                .action_status
                .error
                .clone()
                .or_else(|| screen.list.status.error.clone())
        },
        View::Dashboard => app.dashboard.status.error.clone(),
        View::Reports => app.reports.status.error.clone(),
    }
}

fn render_crumb(f: &mut Frame, app: &App, area: Rect) {
    let crumb_display = app.get_breadcrumb().join(" > ");

    let busy = match app.view {
        View::Resource => app
            .screen()
            .is_some_and(|s| s.list.status.loading || s.action_status.loading),
        View::Dashboard => app.dashboard.status.loading,
        View::Reports => app.reports.status.loading,
    };

    let error = current_error(app);
    let (status_text, style) = if let Some(err) = error {
        (
            format!("Error: {}", err),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )
    } else if let Some(info) = &app.info_message {
        (info.clone(), Style::default().fg(Color::Green))
    } else if busy {
        ("Loading...".to_string(), Style::default().fg(Color::Yellow))
    } else {
        (mode_hint(app), Style::default().fg(Color::DarkGray))
    };

    let crumb = Line::from(vec![
        Span::styled(
            format!("<{}>", crumb_display),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(status_text, style),
    ]);

    f.render_widget(Paragraph::new(crumb), area);
}
