//! Rendering for the dashboard panels.
//!
//! Pure functions from console state to ratatui widgets. No panel reads
//! another panel's data; everything comes through [`Console`].

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use logflow_core::{
    citation::{split_for_rendering, Segment},
    HealthStatus, LogEntry, LogLevel, ServiceHealth,
};

use crate::app::{ChatRole, Focus, FormField, Tab};
use crate::console::Console;

pub fn render(frame: &mut Frame, console: &Console) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Status + hints
        ])
        .split(frame.area());

    render_header(frame, outer[0], console);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(outer[1]);

    render_sidebar(frame, body[0], console);
    render_main(frame, body[1], console);
    render_footer(frame, outer[2], console);
}

fn health_color(status: HealthStatus) -> Color {
    match status {
        HealthStatus::Healthy => Color::Green,
        HealthStatus::Degraded => Color::Yellow,
        HealthStatus::Offline => Color::Red,
    }
}

fn health_text(status: HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "All Systems Normal",
        HealthStatus::Degraded => "System Degraded",
        HealthStatus::Offline => "System Offline",
    }
}

fn level_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Error => Color::Red,
        LogLevel::Warn => Color::Yellow,
        LogLevel::Info => Color::Green,
        LogLevel::Debug => Color::DarkGray,
    }
}

fn render_header(frame: &mut Frame, area: Rect, console: &Console) {
    let block = Block::default()
        .title(" LogFlow Operator Console ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let health = console.state.effective_health();
    let mut spans = vec![
        Span::styled("  LogFlow", Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
        Span::styled("  SRE Observability Dashboard", Style::default().fg(Color::Gray)),
        Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            health_text(health),
            Style::default()
                .fg(health_color(health))
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if console.state.synthetic {
        spans.push(Span::styled("  |  ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled(
            "SYNTHETIC DATA",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ));
    }
    spans.push(Span::styled("  |  ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
        console.client.base_url().to_string(),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_sidebar(frame: &mut Frame, area: Rect, console: &Console) {
    let state = &console.state;
    let focused = console.focus == Focus::Sidebar;
    let block = Block::default()
        .title(format!(" {} ({}) ", state.sidebar_title(), state.logs.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Green } else { Color::White }));

    if state.logs.is_empty() {
        let hint = if state.effective_health() == HealthStatus::Healthy {
            "  Waiting for incoming logs..."
        } else {
            "  Backend unreachable and no fallback loaded yet."
        };
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )))
            .block(block),
            area,
        );
        return;
    }

    let visible_height = area.height.saturating_sub(2) as usize;
    let selected = state.selected_log;
    // Keep the selected row in view.
    let offset = selected
        .map(|i| i.saturating_sub(visible_height.saturating_sub(1) / 2))
        .unwrap_or(0)
        .min(state.logs.len().saturating_sub(visible_height.max(1)));

    let pulsing = state.pulsing();
    let lines: Vec<Line> = state
        .logs
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_height)
        .map(|(i, log)| log_line(log, Some(i) == selected, pulsing))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn log_line(log: &LogEntry, selected: bool, pulsing: bool) -> Line<'static> {
    let time = log.timestamp.format("%H:%M:%S").to_string();
    if selected {
        // The pulse is the transient "scrolled into view" flash; once it
        // decays the row stays visibly selected.
        let style = if pulsing {
            Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::REVERSED | Modifier::BOLD)
        };
        return Line::from(Span::styled(
            format!(
                " [{time}] {:<5} {:<15} {}",
                log.level.as_str(),
                log.service,
                log.message
            ),
            style,
        ));
    }
    Line::from(vec![
        Span::styled(format!(" [{time}] "), Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{:<5} ", log.level.as_str()),
            Style::default().fg(level_color(log.level)),
        ),
        Span::styled(format!("{:<15} ", log.service), Style::default().fg(Color::Cyan)),
        Span::styled(log.message.clone(), Style::default().fg(Color::Gray)),
    ])
}

fn render_main(frame: &mut Frame, area: Rect, console: &Console) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(area);

    let mut spans = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let style = if *tab == console.tab {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!(" F{} {} ", i + 1, tab.title()), style));
        spans.push(Span::raw("|"));
    }
    spans.pop();
    frame.render_widget(Paragraph::new(Line::from(spans)), chunks[0]);

    match console.tab {
        Tab::TimeTravel => render_time_travel(frame, chunks[1], console),
        Tab::Assistant => render_assistant(frame, chunks[1], console),
        Tab::Metrics => render_metrics(frame, chunks[1], console),
        Tab::Advanced => render_advanced(frame, chunks[1], console),
    }
}

fn field_style(console: &Console, field: FormField) -> Style {
    if console.focus == Focus::Main
        && console.tab == Tab::TimeTravel
        && console.form.focused() == field
    {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_time_travel(frame: &mut Frame, area: Rect, console: &Console) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(4)])
        .split(area);

    let form = &console.form;
    let block = Block::default()
        .title(" Compare Periods ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::LightBlue));

    let mut lines = vec![
        Line::from(vec![
            Span::styled("  Healthy start  ", Style::default().fg(Color::Green)),
            Span::styled(format!(" {} ", form.healthy.date), field_style(console, FormField::HealthyDate)),
            Span::raw("  "),
            Span::styled(format!(" {} ", form.healthy.time), field_style(console, FormField::HealthyTime)),
            Span::raw("  "),
            Span::styled(
                format!(" {} ", form.healthy.meridiem.as_str()),
                field_style(console, FormField::HealthyMeridiem),
            ),
        ]),
        Line::from(vec![
            Span::styled("  Crash start    ", Style::default().fg(Color::Red)),
            Span::styled(format!(" {} ", form.crash.date), field_style(console, FormField::CrashDate)),
            Span::raw("  "),
            Span::styled(format!(" {} ", form.crash.time), field_style(console, FormField::CrashTime)),
            Span::raw("  "),
            Span::styled(
                format!(" {} ", form.crash.meridiem.as_str()),
                field_style(console, FormField::CrashMeridiem),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            if form.in_flight {
                "  Analyzing..."
            } else {
                "  Up/Down: field | Space: AM/PM | Enter: compare | g: jump to citation | e: export"
            },
            Style::default().fg(Color::DarkGray),
        )),
    ];
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("  {error}"),
            Style::default().fg(Color::Red),
        )));
    }
    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    render_comparison(frame, chunks[1], console);
}

fn render_comparison(frame: &mut Frame, area: Rect, console: &Console) {
    let block = Block::default()
        .title(" Sentinel Analysis ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let Some(result) = &console.state.comparison else {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "  Run a comparison to see the differential analysis.",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block),
            area,
        );
        return;
    };

    let mut lines = vec![
        Line::from(vec![
            Span::styled("  Healthy logs: ", Style::default().fg(Color::Gray)),
            Span::styled(
                result.healthy_count.to_string(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   Crash logs: ", Style::default().fg(Color::Gray)),
            Span::styled(
                result.crash_count.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
    ];
    if result.analysis.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No significant divergence detected",
            Style::default().fg(Color::Gray),
        )));
    } else {
        lines.extend(analysis_lines(&result.analysis));
    }

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}

/// Render analysis text line by line, styling citations as addressable
/// spans.
fn analysis_lines(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for raw in text.lines() {
        let mut spans = vec![Span::raw("  ")];
        for segment in split_for_rendering(raw) {
            match segment {
                Segment::Text(t) => spans.push(Span::styled(t, Style::default().fg(Color::Gray))),
                Segment::Citation(id) => spans.push(Span::styled(
                    format!("[Log #{id}]"),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                )),
            }
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn render_assistant(frame: &mut Frame, area: Rect, console: &Console) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(4), Constraint::Length(3)])
        .split(area);

    let block = Block::default()
        .title(" AI Assistant ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let mut lines: Vec<Line> = Vec::new();
    for message in &console.state.chat {
        match message.role {
            ChatRole::Operator => {
                for row in message.text.lines() {
                    lines.push(Line::from(vec![
                        Span::styled("  you> ", Style::default().fg(Color::Green)),
                        Span::styled(row.to_string(), Style::default().fg(Color::White)),
                    ]));
                }
            }
            ChatRole::Assistant => {
                for line in analysis_lines(&message.text) {
                    lines.push(line);
                }
            }
        }
        lines.push(Line::from(""));
    }
    if console.state.ai_busy {
        lines.push(Line::from(Span::styled(
            "  ...",
            Style::default().fg(Color::DarkGray),
        )));
    }

    // Tail the conversation.
    let visible_height = chunks[0].height.saturating_sub(2) as usize;
    let start = lines.len().saturating_sub(visible_height);
    let visible: Vec<Line> = lines.into_iter().skip(start).collect();
    frame.render_widget(Paragraph::new(visible).block(block), chunks[0]);

    let input_block = Block::default()
        .title(" Question (/help for commands, Ctrl+G jumps to a cited log) ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let input_line = if console.input.is_empty() {
        Line::from(vec![
            Span::styled(" > ", Style::default().fg(Color::Green)),
            Span::styled(
                "Ask about your logs, metrics, or system health...",
                Style::default().fg(Color::DarkGray),
            ),
        ])
    } else {
        Line::from(vec![
            Span::styled(" > ", Style::default().fg(Color::Green)),
            Span::styled(console.input.clone(), Style::default().fg(Color::White)),
        ])
    };
    frame.render_widget(Paragraph::new(input_line).block(input_block), chunks[1]);

    if console.focus == Focus::Main {
        let cursor_x = chunks[1].x + 4 + console.cursor_pos as u16;
        let cursor_y = chunks[1].y + 1;
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

fn render_metrics(frame: &mut Frame, area: Rect, console: &Console) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(3)])
        .split(area);

    let m = &console.state.metrics;
    let block = Block::default()
        .title(" System Metrics ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let rate_color = if m.error_rate_pct > 50 {
        Color::Red
    } else {
        Color::Green
    };
    let rows = vec![
        metric_row("Total Logs", m.total.to_string(), Color::White),
        metric_row("Error Rate", format!("{}%", m.error_rate_pct), rate_color),
        metric_row("Error Count", m.error_count.to_string(), Color::Red),
        metric_row("Warnings", m.warning_count.to_string(), Color::Yellow),
        metric_row("Info Logs", m.info_count.to_string(), Color::Blue),
        metric_row("Active Services", m.unique_services.to_string(), Color::Green),
    ];
    let table = Table::new(rows, [Constraint::Length(20), Constraint::Min(8)]).block(block);
    frame.render_widget(table, chunks[0]);

    render_service_health(frame, chunks[1], &m.services);
}

fn metric_row(label: &str, value: String, color: Color) -> Row<'static> {
    Row::new(vec![
        Cell::from(Span::styled(
            format!("  {label}"),
            Style::default().fg(Color::Gray),
        )),
        Cell::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
}

fn render_service_health(frame: &mut Frame, area: Rect, services: &[ServiceHealth]) {
    let block = Block::default()
        .title(" Service Health ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let failing: Vec<&ServiceHealth> = services.iter().filter(|s| s.errors > 0).collect();
    if failing.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                "  No services reporting errors",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block),
            area,
        );
        return;
    }

    let rows: Vec<Row> = failing
        .iter()
        .map(|service| {
            let status_color = match service.status.as_str() {
                "Online" => Color::Green,
                "Degraded" => Color::Yellow,
                _ => Color::Red,
            };
            Row::new(vec![
                Cell::from(Span::styled(
                    format!("  {}", service.name),
                    Style::default().fg(Color::White),
                )),
                Cell::from(Span::styled(
                    format!("{} errors", service.errors),
                    Style::default().fg(Color::Red),
                )),
                Cell::from(Span::styled(
                    service.status.clone(),
                    Style::default().fg(status_color),
                )),
            ])
        })
        .collect();
    let table = Table::new(
        rows,
        [
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ],
    )
    .block(block);
    frame.render_widget(table, area);
}

fn render_advanced(frame: &mut Frame, area: Rect, console: &Console) {
    let a = &console.state.advanced;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(4)])
        .split(area);

    let block = Block::default()
        .title(" Advanced Metrics ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    let rows = vec![
        metric_row("Avg Response Time", format!("{}ms", a.avg_response_time), Color::Blue),
        metric_row("Total Timeouts", a.total_timeouts.to_string(), Color::Red),
        metric_row("Avg Retry Attempts", a.avg_retry_attempts.to_string(), Color::Yellow),
        metric_row("Avg Stock Level", format!("{} units", a.avg_stock_level), Color::Green),
    ];
    frame.render_widget(
        Table::new(rows, [Constraint::Length(22), Constraint::Min(8)]).block(block),
        chunks[0],
    );

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(chunks[1]);

    top_list(frame, columns[0], " Top Users ", &a.top_users);
    top_list(frame, columns[1], " Top Orders ", &a.top_orders);
    top_list(frame, columns[2], " Top Products ", &a.top_products);
    top_list(frame, columns[3], " Top Error Reasons ", &a.top_error_reasons);
}

fn top_list(frame: &mut Frame, area: Rect, title: &str, items: &[logflow_core::NamedCount]) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " No data",
                Style::default().fg(Color::DarkGray),
            )))
            .block(block),
            area,
        );
        return;
    }

    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = items
        .iter()
        .take(visible)
        .map(|item| {
            Line::from(vec![
                Span::styled(format!(" {} ", item.name), Style::default().fg(Color::White)),
                Span::styled(
                    format!("({})", item.count),
                    Style::default().fg(Color::Yellow),
                ),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_footer(frame: &mut Frame, area: Rect, console: &Console) {
    let block = Block::default().borders(Borders::ALL).border_style(
        Style::default().fg(Color::DarkGray),
    );

    let status = match &console.state.status_line {
        Some(line) => Line::from(Span::styled(
            format!(" {line}"),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            " Tab: focus sidebar/main | F1-F4: tabs | Enter on a log: highlight | Esc: live window | Ctrl+C: quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(status).block(block), area);
}
