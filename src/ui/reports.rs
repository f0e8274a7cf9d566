//! Dashboard and Reports views

use super::render_json_block;
use crate::api::reports::{dashboard_summary, ReportKind};
use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

fn titled_block(title: &str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
}

fn placeholder(f: &mut Frame, block: Block, message: &str, area: Rect) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(block);
    f.render_widget(paragraph, area);
}

pub fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let block = titled_block("Dashboard");

    let Some(stats) = &app.dashboard.stats else {
        let message = if app.dashboard.status.loading {
            "Loading..."
        } else {
            "No statistics loaded (R to refresh)"
        };
        placeholder(f, block, message, area);
        return;
    };

    let rows: Vec<Row> = dashboard_summary(stats)
        .into_iter()
        .map(|(label, value)| {
            Row::new(vec![
                Cell::from(format!(" {}", label)).style(Style::default().fg(Color::DarkGray)),
                Cell::from(value).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Percentage(40), Constraint::Percentage(60)]).block(block);
    f.render_widget(table, area);
}

pub fn render_reports(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    f.render_widget(Paragraph::new(report_bar(app)), chunks[0]);

    let state = &app.reports;
    let title = format!(
        "{} report {} .. {}",
        capitalize(state.kind.as_str()),
        state.range.start,
        state.range.end
    );

    if !state.kind.has_aggregate() {
        placeholder(f, titled_block(&title), "Available as PDF only (p to save)", chunks[1]);
        return;
    }

    match &state.data {
        Some(data) => {
            let json = serde_json::to_string_pretty(data).unwrap_or_default();
            render_json_block(f, &json, &format!(" {} ", title), state.scroll, chunks[1]);
        },
        None => {
            let message = if state.status.loading { "Loading..." } else { "No data" };
            placeholder(f, titled_block(&title), message, chunks[1]);
        },
    }
}

/// Report kinds with the active one highlighted, then the last saved PDF
fn report_bar(app: &App) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for kind in ReportKind::ALL {
        let style = if kind == app.reports.kind {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" {} ", kind.as_str()), style));
        spans.push(Span::raw(" "));
    }
    if let Some(path) = &app.reports.last_download {
        spans.push(Span::styled(
            format!(" saved: {}", path.display()),
            Style::default().fg(Color::Green),
        ));
    }
    Line::from(spans)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("financial"), "Financial");
        assert_eq!(capitalize(""), "");
    }
}
