use crate::event::AgentId;
use crate::projection::{
    day_axis, ActionScatter, FarmGrid, FarmStats, GridCell, LineChart, GRID_COLUMNS,
};
use crate::stream::{ControlCommand, ControlSurface, Frame as StreamFrame, RunOutcome, RunState};
use crossterm::event::KeyCode;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Wrap},
    Frame,
};

const RECENT_ACTIONS: usize = 4;

// ─── Palette ────────────────────────────────────────────────────────────────

fn agent_color(agent: AgentId) -> Color {
    match agent {
        AgentId::Gpt35 => Color::Blue,
        AgentId::Gpt4 => Color::Red,
    }
}

fn energy_color(agent: AgentId) -> Color {
    match agent {
        AgentId::Gpt35 => Color::Green,
        AgentId::Gpt4 => Color::Yellow,
    }
}

fn state_badge(state: RunState) -> Span<'static> {
    let (label, color) = match state {
        RunState::Idle => ("● IDLE", Color::DarkGray),
        RunState::Connecting => ("● CONNECTING", Color::Yellow),
        RunState::Streaming => ("● LIVE", Color::Green),
        RunState::Stopped => ("● STOPPED", Color::DarkGray),
        RunState::Errored => ("● ERROR", Color::Red),
    };
    Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn format_gauge(value: Option<f64>) -> String {
    value.map(|v| format!("{}", v)).unwrap_or_else(|| "-".to_string())
}

// ─── Key handling ───────────────────────────────────────────────────────────

/// Map a key press to a command. Presses on a disabled control do nothing.
pub fn command_for_key(code: KeyCode, controls: ControlSurface) -> Option<ControlCommand> {
    match code {
        KeyCode::Char('s') if controls.start_enabled => Some(ControlCommand::Start),
        KeyCode::Char('x') if controls.stop_enabled => Some(ControlCommand::Stop),
        KeyCode::Char('q') | KeyCode::Esc => Some(ControlCommand::Shutdown),
        _ => None,
    }
}

// ─── Panels ─────────────────────────────────────────────────────────────────

fn render_header(f: &mut Frame, area: Rect, frame: &StreamFrame) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(44)])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled("🌾 ", Style::default().fg(Color::Green)),
        Span::styled("Farm Arena", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
        Span::styled(" Monitor", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::BOTTOM).border_style(Color::DarkGray));

    let mut status = vec![state_badge(frame.state)];
    if !frame.run_id.is_nil() {
        status.push(Span::styled(
            format!("  {} msgs  {}", frame.messages_applied, frame.published_at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    let status = Paragraph::new(Line::from(status))
        .alignment(Alignment::Right)
        .block(Block::default().borders(Borders::BOTTOM).border_style(Color::DarkGray));

    f.render_widget(title, chunks[0]);
    f.render_widget(status, chunks[1]);
}

/// Screen columns taken by one plot, separator included
const CELL_WIDTH: usize = 4;

/// Plot text padded to a fixed display width.
///
/// Crops without a glyph show their initial here; the full name is in the
/// crop tally next to the grid.
fn cell_text(cell: &GridCell) -> String {
    let text = if !cell.occupied {
        "··".to_string()
    } else if Span::raw(cell.glyph.as_str()).width() <= 2 {
        cell.glyph.clone()
    } else {
        cell.glyph.chars().take(1).collect()
    };
    let pad = CELL_WIDTH.saturating_sub(Span::raw(text.as_str()).width());
    format!("{}{}", text, " ".repeat(pad))
}

fn grid_lines(grid: &FarmGrid) -> Vec<Line<'static>> {
    let cell_style = if grid.maintenance_overlay() {
        Style::default().fg(Color::Yellow).bg(Color::DarkGray)
    } else {
        Style::default().fg(Color::White)
    };

    grid.rows()
        .map(|row| {
            let spans: Vec<Span> = row
                .iter()
                .map(|cell| Span::styled(cell_text(cell), cell_style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

fn stats_lines(stats: &FarmStats) -> Vec<Line<'static>> {
    let label = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![
            Span::styled("Day: ", label),
            Span::styled(
                stats.day.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string()),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Money: ", label),
            Span::styled(format_gauge(stats.money), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("Energy: ", label),
            Span::styled(format_gauge(stats.energy), Style::default().fg(Color::Green)),
        ]),
        Line::from(vec![
            Span::styled("Decision: ", label),
            Span::styled(stats.decision.clone().unwrap_or_default(), Style::default().fg(Color::Yellow)),
        ]),
    ];

    if !stats.crops.is_empty() {
        let crops = stats
            .crops
            .iter()
            .map(|(crop, count)| format!("{} {}", crop, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(Line::from(vec![
            Span::styled("Crops: ", label),
            Span::styled(crops, Style::default().fg(Color::White)),
        ]));
    }

    if !stats.harvested.is_empty() {
        let harvested = stats
            .harvested
            .iter()
            .map(|(crop, count)| format!("{} {}", crop, count))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(Line::from(vec![
            Span::styled("Harvested: ", label),
            Span::styled(harvested, Style::default().fg(Color::Magenta)),
        ]));
    }
    lines
}

fn render_farm(f: &mut Frame, area: Rect, agent: AgentId, frame: &StreamFrame) {
    let (Some(grid), Some(stats)) = (frame.dashboard.grid(agent), frame.dashboard.stats(agent))
    else {
        return;
    };

    let mut title = vec![Span::styled(
        format!(" {} Farm ", agent.label()),
        Style::default().fg(agent_color(agent)).add_modifier(Modifier::BOLD),
    )];
    if grid.maintenance_overlay() {
        title.push(Span::styled("🛠️ maintenance ", Style::default().fg(Color::Yellow)));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(agent_color(agent)));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((GRID_COLUMNS * CELL_WIDTH + 1) as u16),
            Constraint::Min(10),
        ])
        .split(inner);

    f.render_widget(Paragraph::new(grid_lines(grid)), chunks[0]);
    f.render_widget(
        Paragraph::new(stats_lines(stats)).wrap(Wrap { trim: true }),
        chunks[1],
    );
}

fn x_bounds(xs: &[f64]) -> [f64; 2] {
    let lo = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !lo.is_finite() || !hi.is_finite() {
        return [0.0, 1.0];
    }
    if lo == hi {
        [lo - 1.0, hi + 1.0]
    } else {
        [lo, hi]
    }
}

fn render_line_chart(
    f: &mut Frame,
    area: Rect,
    chart: &LineChart,
    color: fn(AgentId) -> Color,
) {
    let points: Vec<Vec<(f64, f64)>> = chart
        .series()
        .iter()
        .map(|series| chart.points(series.agent))
        .collect();

    let datasets: Vec<Dataset> = chart
        .series()
        .iter()
        .zip(points.iter())
        .map(|(series, data)| {
            Dataset::default()
                .name(series.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color(series.agent)))
                .data(data)
        })
        .collect();

    let xb = x_bounds(&day_axis(chart.labels()));
    let (lo, hi) = chart.value_bounds().unwrap_or((0.0, 1.0));
    let pad = ((hi - lo) * 0.1).max(1.0);
    let yb = [lo - pad, hi + pad];

    let widget = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" {} ", chart.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .x_axis(
            Axis::default()
                .title("Day")
                .style(Style::default().fg(Color::DarkGray))
                .bounds(xb)
                .labels([format!("{:.0}", xb[0]), format!("{:.0}", xb[1])]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds(yb)
                .labels([format!("{:.0}", yb[0]), format!("{:.0}", yb[1])]),
        );

    f.render_widget(widget, area);
}

fn render_action_chart(f: &mut Frame, area: Rect, scatter: &ActionScatter) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let points: Vec<(AgentId, Vec<(f64, f64)>)> = AgentId::ALL
        .into_iter()
        .map(|agent| {
            let plotted = scatter.points(agent);
            let days: Vec<_> = plotted.iter().map(|p| p.day).collect();
            let data = day_axis(&days)
                .into_iter()
                .zip(plotted.iter())
                .filter_map(|(x, p)| scatter.lane_index(p.lane).map(|y| (x, y as f64)))
                .collect();
            (agent, data)
        })
        .collect();

    let datasets: Vec<Dataset> = points
        .iter()
        .map(|(agent, data)| {
            Dataset::default()
                .name(format!("{} Actions", agent.label()))
                .marker(Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(agent_color(*agent)))
                .data(data)
        })
        .collect();

    let all_x: Vec<f64> = points.iter().flat_map(|(_, d)| d.iter().map(|p| p.0)).collect();
    let xb = x_bounds(&all_x);
    let lanes = scatter.lanes();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(" Actions Over Time ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .x_axis(
            Axis::default()
                .title("Day")
                .style(Style::default().fg(Color::DarkGray))
                .bounds(xb)
                .labels([format!("{:.0}", xb[0]), format!("{:.0}", xb[1])]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, lanes.len().saturating_sub(1) as f64])
                .labels(lanes.iter().copied()),
        );
    f.render_widget(chart, chunks[0]);

    let mut lines = Vec::new();
    for agent in AgentId::ALL {
        lines.push(Line::from(Span::styled(
            agent.label(),
            Style::default().fg(agent_color(agent)).add_modifier(Modifier::BOLD),
        )));
        let plotted = scatter.points(agent);
        for point in plotted.iter().rev().take(RECENT_ACTIONS) {
            let tooltip = ActionScatter::tooltip(point);
            lines.push(Line::from(vec![
                Span::raw(format!(" {} ", point.glyph)),
                Span::styled(tooltip.title, Style::default().fg(Color::Yellow)),
                Span::styled(format!("  {}", tooltip.label), Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    let recent = Paragraph::new(if scatter.is_empty() {
        Text::from(Span::styled("No actions yet", Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(lines)
    })
    .block(
        Block::default()
            .title(" Recent Actions ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    )
    .wrap(Wrap { trim: false });
    f.render_widget(recent, chunks[1]);
}

fn render_notice(f: &mut Frame, area: Rect, frame: &StreamFrame) {
    let line = match (&frame.notice, &frame.last_outcome) {
        (Some(notice), _) => Line::from(Span::styled(
            format!(" ⚠ {}", notice),
            Style::default().fg(Color::Red),
        )),
        (None, Some(RunOutcome::Stopped)) => Line::from(Span::styled(
            " Competition stopped",
            Style::default().fg(Color::DarkGray),
        )),
        _ => Line::from(""),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_help(f: &mut Frame, area: Rect, controls: ControlSurface) {
    let key_style = |enabled: bool| {
        if enabled {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
        }
    };
    let help = Paragraph::new(Line::from(vec![
        Span::styled(" s", key_style(controls.start_enabled)),
        Span::styled(" start  ", Style::default().fg(Color::DarkGray)),
        Span::styled("x", key_style(controls.stop_enabled)),
        Span::styled(" stop  ", Style::default().fg(Color::DarkGray)),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::styled(" quit", Style::default().fg(Color::DarkGray)),
    ]));
    f.render_widget(help, area);
}

// ─── Frame ──────────────────────────────────────────────────────────────────

/// Draw the whole dashboard for one published frame
pub fn draw(f: &mut Frame, frame: &StreamFrame) {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),  // header
            Constraint::Length(8),  // farms
            Constraint::Min(8),     // line charts
            Constraint::Length(12), // action timeline
            Constraint::Length(1),  // notice
            Constraint::Length(1),  // help
        ])
        .split(f.area());

    render_header(f, outer[0], frame);

    let farms = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(outer[1]);
    for (agent, area) in AgentId::ALL.into_iter().zip(farms.iter()) {
        render_farm(f, *area, agent, frame);
    }

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(outer[2]);
    render_line_chart(f, charts[0], frame.dashboard.money_chart(), agent_color);
    render_line_chart(f, charts[1], frame.dashboard.energy_chart(), energy_color);

    render_action_chart(f, outer[3], frame.dashboard.action_scatter());
    render_notice(f, outer[4], frame);
    render_help(f, outer[5], frame.controls);
}
