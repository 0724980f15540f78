use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
};
use thaytu_core::session::{SessionPhase, SUGGESTIONS};
use thaytu_core::{BackendStatus, ChartId, ChatRole, Fade, SendAffordance, Segment};

use crate::app::App;
use crate::chart::{self, CHART_HEIGHT};

const SPINNER: [char; 4] = ['◐', '◓', '◑', '◒'];
const CHART_MAX_WIDTH: u16 = 64;

/// One terminal row of the transcript
enum Row {
    Text(Line<'static>),
    Chart { id: ChartId, offset: usize },
}

/// Wrap one formatted line to `width` columns, breaking at spaces where possible.
/// Bold runs keep their style across the break.
fn wrap_markup_line(segments: &[Segment], width: usize, base: Style) -> Vec<Line<'static>> {
    let cells: Vec<(char, bool)> = segments
        .iter()
        .flat_map(|s| s.text().chars().map(move |c| (c, s.is_bold())))
        .collect();

    if width == 0 || cells.len() <= width {
        return vec![cells_to_line(&cells, base)];
    }

    let mut lines = Vec::new();
    let mut start = 0;
    while start < cells.len() {
        if cells.len() - start <= width {
            lines.push(cells_to_line(&cells[start..], base));
            break;
        }
        // Look one past the edge so a space right at the boundary is a clean break
        let window = &cells[start..start + width + 1];
        match window.iter().rposition(|(c, _)| *c == ' ').filter(|&p| p > 0) {
            Some(p) => {
                lines.push(cells_to_line(&cells[start..start + p], base));
                start += p + 1;
            }
            None => {
                lines.push(cells_to_line(&cells[start..start + width], base));
                start += width;
            }
        }
    }
    lines
}

fn cells_to_line(cells: &[(char, bool)], base: Style) -> Line<'static> {
    let style_for = |bold: bool| {
        if bold {
            base.fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            base
        }
    };

    let mut spans = Vec::new();
    let mut run = String::new();
    let mut bold = false;
    for &(c, b) in cells {
        if b != bold && !run.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut run), style_for(bold)));
        }
        bold = b;
        run.push(c);
    }
    if !run.is_empty() {
        spans.push(Span::styled(run, style_for(bold)));
    }
    Line::from(spans)
}

fn role_line(role: ChatRole) -> Line<'static> {
    match role {
        ChatRole::User => Line::from(Span::styled(
            "Con:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        ChatRole::Assistant => Line::from(Span::styled(
            "☯ Thầy Tư:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    }
}

/// Lay the whole transcript out as rows for the given inner width
fn transcript_rows(app: &App, width: usize) -> Vec<Row> {
    let mut rows = Vec::new();

    for entry in app.session.transcript().entries() {
        rows.push(Row::Text(role_line(entry.message.role)));
        for line in entry.markup.lines() {
            rows.extend(
                wrap_markup_line(line, width, Style::default())
                    .into_iter()
                    .map(Row::Text),
            );
        }
        if let Some(id) = entry.chart {
            rows.extend((0..CHART_HEIGHT).map(|offset| Row::Chart { id, offset }));
        }
        rows.push(Row::Text(Line::default()));
    }

    if let Some((phrase, fade)) = app.session.indicator().current() {
        let style = match fade {
            Fade::Steady => Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            Fade::Out | Fade::In => Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC | Modifier::DIM),
        };
        rows.push(Row::Text(role_line(ChatRole::Assistant)));
        rows.push(Row::Text(Line::from(Span::styled(phrase.to_string(), style))));
    }

    rows
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, transcript, suggestions, input, footer
    let [header_area, chat_area, suggestions_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_suggestions(app, frame, suggestions_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = match app.session.backend_status() {
        BackendStatus::Unknown => {
            Span::styled(" ● đang kết nối ", Style::default().fg(Color::Gray))
        }
        BackendStatus::Online { agent } => {
            Span::styled(format!(" ● {} ", agent), Style::default().fg(Color::Green))
        }
        BackendStatus::Unreachable => {
            Span::styled(" ● mất kết nối ", Style::default().fg(Color::Red))
        }
    };

    let title = Line::from(vec![
        Span::styled(" ☯ Thầy Tư ", Style::default().fg(Color::Cyan).bold()),
        status,
        Span::styled(app.server_url.clone(), Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Quẻ ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = transcript_rows(app, inner.width as usize);
    let height = inner.height as usize;

    // Store for scroll calculations and mouse hit-testing
    app.chat_area = Some(area);
    app.chat_height = inner.height;
    app.chat_max_scroll = rows.len().saturating_sub(height);
    if app.session.transcript().follows_latest() {
        app.chat_scroll = app.chat_max_scroll;
    } else {
        app.chat_scroll = app.chat_scroll.min(app.chat_max_scroll);
    }

    let visible = rows.iter().skip(app.chat_scroll).take(height);
    let mut lines: Vec<Line> = Vec::with_capacity(height);
    let mut charts: Vec<(ChartId, usize, usize)> = Vec::new(); // id, first visible row, first offset

    for (row_idx, row) in visible.enumerate() {
        match row {
            Row::Text(line) => lines.push(line.clone()),
            Row::Chart { id, offset } => {
                if !charts.iter().any(|(c, _, _)| c == id) {
                    charts.push((*id, row_idx, *offset));
                }
                lines.push(Line::default());
            }
        }
    }
    let visible_rows = lines.len();
    frame.render_widget(Paragraph::new(Text::from(lines)), inner);

    let renderer = app.session.transcript().renderer();
    for (id, row_idx, first_offset) in charts {
        let Some(config) = renderer.get(id) else {
            continue;
        };
        let fully_visible = first_offset == 0 && row_idx + CHART_HEIGHT <= visible_rows;
        if fully_visible {
            let chart_area = Rect {
                x: inner.x,
                y: inner.y + row_idx as u16,
                width: inner.width.min(CHART_MAX_WIDTH),
                height: CHART_HEIGHT as u16,
            };
            chart::render_radar(config, frame, chart_area);
        } else {
            // Partly scrolled out: a placeholder instead of a squashed chart
            let placeholder = Paragraph::new(Span::styled(
                format!("▒ {} ▒", config.dataset.label),
                Style::default().fg(Color::DarkGray),
            ));
            let placeholder_area = Rect {
                x: inner.x,
                y: inner.y + row_idx as u16,
                width: inner.width,
                height: 1,
            };
            frame.render_widget(placeholder, placeholder_area);
        }
    }
}

fn render_suggestions(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let text_style = if app.session.is_pending() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Gray)
    };

    let slot = (area.width as usize / SUGGESTIONS.len().max(1)).saturating_sub(6);
    let mut spans = Vec::new();
    for (i, suggestion) in SUGGESTIONS.iter().enumerate() {
        let mut text: String = suggestion.chars().take(slot).collect();
        if suggestion.chars().count() > slot {
            text.pop();
            text.push('…');
        }
        spans.push(Span::styled(format!(" F{} ", i + 1), key_style));
        spans.push(Span::styled(format!(" {} ", text), text_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input = app.session.input();
    let active = input.is_focused() && input.is_enabled();

    let border_color = if active { Color::Yellow } else { Color::DarkGray };
    let title = match input.affordance() {
        SendAffordance::Ready => Span::styled(
            format!(" {} (Enter) ", SendAffordance::Ready),
            Style::default().fg(Color::Yellow),
        ),
        SendAffordance::Busy => Span::styled(
            format!(
                " {} {} ",
                SPINNER[app.animation_frame as usize % SPINNER.len()],
                SendAffordance::Busy
            ),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = input.cursor();
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = input
        .text()
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let text_color = if input.is_enabled() { Color::Cyan } else { Color::DarkGray };
    let paragraph = Paragraph::new(visible_text)
        .style(Style::default().fg(text_color))
        .block(block);
    frame.render_widget(paragraph, area);

    if active {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let (mode_text, mode_style) = match app.session.phase() {
        SessionPhase::Idle if app.session.input().is_focused() => {
            (" NHẬP ", Style::default().bg(Color::Yellow).fg(Color::Black))
        }
        SessionPhase::Idle => (" XEM ", Style::default().bg(Color::Blue).fg(Color::White)),
        SessionPhase::Sending => (" ĐANG HỎI ", Style::default().bg(Color::Magenta).fg(Color::White)),
        SessionPhase::Resetting => {
            (" LÀM MỚI ", Style::default().bg(Color::Magenta).fg(Color::White))
        }
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    let hints: &[(&str, &str)] = if app.session.input().is_focused() {
        &[
            ("Enter", "gửi"),
            ("Esc", "thôi nhập"),
            ("F1-F4", "gợi ý"),
            ("Ctrl+R", "quẻ mới"),
            ("Ctrl+C", "thoát"),
        ]
    } else {
        &[
            ("i", "nhập"),
            ("j/k", "cuộn"),
            ("PgUp/PgDn", "trang"),
            ("Ctrl+R", "quẻ mới"),
            ("q", "thoát"),
        ]
    };
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
