//! UI rendering

use super::app::{App, FormField};
use flight_lookup::{Candidate, LookupStatus};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Render the entire UI
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // From
            Constraint::Length(3), // To
            Constraint::Length(3), // Airline
            Constraint::Min(5),    // Candidates of the focused field
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    for (i, field) in app.fields.iter().enumerate() {
        render_input(frame, field, i == app.focus, chunks[i]);
    }
    render_candidates(frame, app.focused(), chunks[3]);
    render_status_bar(frame, app, chunks[4]);
}

/// Render one input box, with the cursor if it has focus
fn render_input(frame: &mut Frame, form_field: &FormField, focused: bool, area: Rect) {
    let field = &form_field.field;
    let border = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(format!(" {} ", form_field.slot.title()));

    let text = field.display_text();
    let line = if text.is_empty() {
        Line::from(Span::styled(
            field.placeholder().to_string(),
            Style::default().fg(Color::DarkGray),
        ))
    } else if field.query().is_empty() {
        // Committed selection, not live input
        Line::from(Span::styled(text, Style::default().fg(Color::Green)))
    } else {
        Line::from(text)
    };

    frame.render_widget(Paragraph::new(line).block(block), area);

    if focused {
        let x = area.x + 1 + field.query().width() as u16;
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

/// Render the candidate list of the focused field
fn render_candidates(frame: &mut Frame, form_field: &FormField, area: Rect) {
    let field = &form_field.field;
    let title = match (field.status(), form_field.last_duration) {
        (LookupStatus::Ready, Some(d)) => format!(
            " {}s [{}] {} ",
            capitalize(field.category().label()),
            field.candidates().len(),
            format_duration(d)
        ),
        _ => format!(" {}s ", capitalize(field.category().label())),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(title);

    if !field.is_open() || field.candidates().is_empty() {
        let message = field.status_message().unwrap_or("");
        let style = match field.status() {
            LookupStatus::Failed(_) => Style::default().fg(Color::Red),
            _ => Style::default().fg(Color::DarkGray),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message, style)).block(block),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = field.candidates().iter().map(candidate_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_symbol("▌")
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default();
    state.select(Some(field.highlighted_index()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn candidate_item(candidate: &Candidate) -> ListItem<'static> {
    let (code, detail) = candidate.list_line();
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:<4} ", code),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(detail, Style::default().fg(Color::Gray)),
    ]))
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let text = match &app.toast {
        Some(toast) => format!(" {}", toast.message),
        None => {
            " Tab: next field │ Enter: select │ ^S: swap │ ^R: reset │ Esc: done".to_string()
        }
    };
    let status = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, area);
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}µs", micros)
    } else {
        format!("{:.1}ms", micros as f64 / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250µs");
        assert_eq!(format_duration(Duration::from_micros(12_340)), "12.3ms");
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("airport"), "Airport");
        assert_eq!(capitalize(""), "");
    }
}
