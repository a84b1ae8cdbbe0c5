use std::time::Instant;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::notification::Severity;
use crate::task::TaskFilter;
use crate::view::{TaskRow, ViewModel};

use super::app::{AppState, Mode};

const COLOR_TEXT: Color = Color::Rgb(234, 236, 239);
const COLOR_MUTED: Color = Color::Rgb(160, 165, 172);
const COLOR_MUTED_DARK: Color = Color::Rgb(118, 124, 130);
const COLOR_BG_MUTED: Color = Color::Rgb(52, 56, 60);
const COLOR_INFO: Color = Color::Rgb(116, 198, 219);
const COLOR_WARNING: Color = Color::Rgb(244, 200, 98);
const COLOR_ERROR: Color = Color::Rgb(255, 107, 107);
const COLOR_SUCCESS: Color = Color::Rgb(126, 210, 146);
const COLOR_ACCENT: Color = Color::Rgb(122, 170, 255);
const COLOR_BORDER_LIST: Color = Color::Rgb(92, 126, 166);

pub fn render(frame: &mut Frame, app: &AppState) {
    let area = frame.size();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2),
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    render_tabs(frame, app, chunks[0]);
    render_input(frame, app, chunks[1]);
    if app.view().empty_state {
        render_empty(frame, chunks[2]);
    } else {
        render_list(frame, app, chunks[2]);
    }
    render_footer(frame, app, chunks[3]);

    if let Some(prompt) = app.prompt() {
        render_confirm_modal(frame, area, prompt);
    }
}

fn render_tabs(frame: &mut Frame, app: &AppState, area: Rect) {
    let view = app.view();
    let tabs = [
        (TaskFilter::All, "1", COLOR_INFO),
        (TaskFilter::InProgress, "2", COLOR_ACCENT),
        (TaskFilter::Completed, "3", COLOR_SUCCESS),
    ];

    let mut spans = Vec::new();
    for (idx, (filter, key, color)) in tabs.into_iter().enumerate() {
        if idx > 0 {
            spans.push(Span::styled("  ", Style::default().fg(COLOR_MUTED_DARK)));
        }
        let text = format!("{key} {} ({})", filter.label(), view.counts.for_filter(filter));
        let style = if view.filter == filter {
            Style::default()
                .fg(color)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else if view.controls_locked {
            Style::default().fg(COLOR_MUTED_DARK)
        } else {
            Style::default().fg(COLOR_MUTED)
        };
        spans.push(Span::styled(text, style));
    }

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(COLOR_BG_MUTED)),
    );
    frame.render_widget(widget, area);
}

fn render_input(frame: &mut Frame, app: &AppState, area: Rect) {
    let active = app.mode == Mode::Input && app.prompt().is_none();
    let border = if app.input.is_invalid() {
        COLOR_ERROR
    } else if active {
        COLOR_ACCENT
    } else {
        COLOR_BG_MUTED
    };

    let width = area.width.saturating_sub(2) as usize;
    let line = if active {
        Line::from(value_with_caret_spans(
            app.input.value(),
            width,
            Style::default().fg(COLOR_TEXT),
        ))
    } else if app.input.value().is_empty() {
        Line::from(Span::styled(
            "Add a new task...",
            Style::default().fg(COLOR_MUTED_DARK),
        ))
    } else {
        Line::from(Span::styled(
            truncate_text(app.input.value(), width),
            Style::default().fg(COLOR_MUTED),
        ))
    };

    let widget = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title("New task"),
    );
    frame.render_widget(widget, area);
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Nothing to do yet.",
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Press a to add your first task.",
            Style::default().fg(COLOR_MUTED),
        )),
    ];
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

fn render_list(frame: &mut Frame, app: &AppState, area: Rect) {
    let view = app.view();
    let content_width = area.width.saturating_sub(2) as usize;
    let height = area.height.saturating_sub(2) as usize;
    let selected = (!view.tasks.is_empty()).then_some(app.selected);
    let (start, end) = list_window(view.tasks.len(), selected, height);

    let mut lines = Vec::new();
    for (idx, row) in view.tasks[start..end].iter().enumerate() {
        let is_selected = app.mode == Mode::List && start + idx == app.selected;
        lines.push(render_list_row(app, row, is_selected, content_width));
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            view.count_message.clone(),
            Style::default().fg(COLOR_MUTED),
        )));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(COLOR_BORDER_LIST))
            .title(view.filter.label()),
    );
    frame.render_widget(widget, area);
}

fn render_list_row(app: &AppState, row: &TaskRow, selected: bool, width: usize) -> Line<'static> {
    let mark = if row.completed { "[x] " } else { "[ ] " };
    let mark_style = if row.completed {
        Style::default().fg(COLOR_SUCCESS)
    } else {
        Style::default().fg(COLOR_MUTED)
    };
    let text_width = width.saturating_sub(mark.len());

    if app.view().is_editing(row.id) {
        let style = Style::default().fg(COLOR_WARNING);
        let mut spans = vec![Span::styled(mark.to_string(), mark_style)];
        if app.draft.is_invalid() {
            spans.push(Span::styled("! ", Style::default().fg(COLOR_ERROR)));
        }
        spans.extend(value_with_caret_spans(app.draft.value(), text_width, style));
        return Line::from(spans);
    }

    let mut text_style = Style::default().fg(COLOR_TEXT);
    if row.completed && app.dim_completed {
        text_style = Style::default()
            .fg(COLOR_MUTED_DARK)
            .add_modifier(Modifier::CROSSED_OUT);
    }
    if selected {
        text_style = text_style.bg(COLOR_BG_MUTED).add_modifier(Modifier::BOLD);
    }

    Line::from(vec![
        Span::styled(mark.to_string(), mark_style),
        Span::styled(truncate_text(&row.text, text_width), text_style),
    ])
}

fn render_footer(frame: &mut Frame, app: &AppState, area: Rect) {
    let hint_span = Span::styled(app.footer_hint(), Style::default().fg(COLOR_INFO));
    let line = if let Some(notification) = app.notification(Instant::now()) {
        Line::from(Span::styled(
            notification.message.clone(),
            Style::default()
                .fg(severity_color(notification.severity))
                .add_modifier(Modifier::BOLD),
        ))
    } else if let Some(err) = app.watch_error() {
        Line::from(vec![
            hint_span,
            Span::raw("  |  "),
            Span::styled(err.to_string(), Style::default().fg(COLOR_WARNING)),
        ])
    } else {
        Line::from(hint_span)
    };
    let mut lines = vec![line];
    lines.extend(counts_line(app.view()));
    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(COLOR_BORDER_LIST)),
        );
    frame.render_widget(widget, area);
}

/// Count summary under the footer; hidden while the list is empty.
fn counts_line(view: &ViewModel) -> Option<Line<'static>> {
    if view.empty_state {
        return None;
    }
    Some(Line::from(Span::styled(
        view.count_message.clone(),
        Style::default().fg(COLOR_ACCENT),
    )))
}

fn render_confirm_modal(frame: &mut Frame, area: Rect, prompt: &str) {
    let content_width = area.width.saturating_sub(8).min(64);
    let modal = centered_rect(content_width, 7, area);
    frame.render_widget(Clear, modal);

    let lines = vec![
        Line::from(Span::styled(
            prompt.to_string(),
            Style::default().fg(COLOR_TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "y/enter confirm  n/esc cancel",
            Style::default().fg(COLOR_MUTED_DARK),
        )),
    ];

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(COLOR_WARNING))
                .title("Confirm"),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, modal);
}

fn severity_color(severity: Severity) -> Color {
    severity.color().parse().unwrap_or(COLOR_TEXT)
}

/// Text followed by a block caret, scrolled so the end stays visible.
fn value_with_caret_spans(value: &str, width: usize, style: Style) -> Vec<Span<'static>> {
    if width == 0 {
        return vec![Span::raw("")];
    }
    let chars: Vec<char> = value.chars().collect();
    let available = width.saturating_sub(1);
    let start = chars.len().saturating_sub(available);
    let text: String = chars[start..].iter().collect();

    let mut spans = Vec::new();
    if !text.is_empty() {
        spans.push(Span::styled(text, style));
    }
    spans.push(Span::styled(
        " ".to_string(),
        style.add_modifier(Modifier::REVERSED),
    ));
    spans
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(2));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn list_window(total: usize, selected: Option<usize>, height: usize) -> (usize, usize) {
    if total == 0 || height == 0 {
        return (0, 0);
    }
    if total <= height {
        return (0, total);
    }
    let selected = selected.unwrap_or(0);
    let mut start = selected.saturating_sub(height / 2);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn truncate_text(value: &str, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() <= max {
        return value.to_string();
    }
    if max <= 3 {
        return chars[..max].iter().collect();
    }
    let mut out: String = chars[..(max - 3)].iter().collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    #[test]
    fn window_follows_selection() {
        assert_eq!(list_window(0, None, 5), (0, 0));
        assert_eq!(list_window(3, Some(2), 5), (0, 3));
        assert_eq!(list_window(20, Some(10), 5), (8, 13));
        assert_eq!(list_window(20, Some(19), 5), (15, 20));
    }

    #[test]
    fn long_text_is_truncated() {
        assert_eq!(truncate_text("Buy milk", 20), "Buy milk");
        assert_eq!(truncate_text("Buy oat milk today", 10), "Buy oat...");
    }

    #[test]
    fn severity_colors_resolve() {
        assert_eq!(severity_color(Severity::Success), Color::Green);
        assert_eq!(severity_color(Severity::Error), Color::Rgb(0xb8, 0x0d, 0x0d));
        assert_eq!(severity_color(Severity::Canceled), Color::Red);
        assert_eq!(severity_color(Severity::Info), Color::Blue);
    }

    #[test]
    fn counts_hidden_in_empty_state() {
        assert!(counts_line(&ViewModel::build(&[], TaskFilter::All)).is_none());

        let tasks = vec![Task::new(1, "Buy milk")];
        let line = counts_line(&ViewModel::build(&tasks, TaskFilter::All)).expect("counts");
        assert_eq!(line.spans[0].content, "You have a total of 1 task!");
    }

    #[test]
    fn caret_keeps_end_visible() {
        let spans = value_with_caret_spans("abcdef", 4, Style::default());
        assert_eq!(spans[0].content, "def");
        assert_eq!(spans[1].content, " ");
    }
}
