//! Terminal drawing backend.
//!
//! Consumes the engine's frame geometry and renders it as colored cells:
//! one view unit equals one terminal cell. All layout decisions (bar
//! rects, fill split) are already made by the core; this module only
//! rasterizes them.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use wavescope::render::{Bar, Fill, Rect as GeomRect};
use wavescope::{Mode, Rgb, WaveformEngine};

/// Transport information shown above the waveform.
pub struct StatusLine {
    pub position: f64,
    pub duration: Option<f64>,
    pub finished: bool,
}

/// Render one frame. Returns the inner waveform area so mouse events can
/// be mapped back into view coordinates.
pub fn render(
    frame: &mut Frame,
    engine: &WaveformEngine,
    gradient: Option<f32>,
    status: &StatusLine,
) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // transport bar
            Constraint::Min(4),    // waveform
            Constraint::Length(1), // help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], engine, status);

    let block = Block::default().title(" Waveform ").borders(Borders::ALL);
    let inner = block.inner(chunks[1]);
    frame.render_widget(block, chunks[1]);
    render_waveform(frame, inner, engine, gradient);

    let help = Paragraph::new(" [Q] Quit  [Space] Play/Pause  [S] Stop  [R] Reset  [F] Fit  [Click/Drag] Scrub")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);

    inner
}

fn render_transport(frame: &mut Frame, area: Rect, engine: &WaveformEngine, status: &StatusLine) {
    let block = Block::default().title(" wavescope ").borders(Borders::ALL);

    let mode_str = match engine.mode() {
        Mode::Record => "Record",
        Mode::Playback => "Playback",
    };
    let play_symbol = if engine.is_playing() { "▶" } else { "⏸" };
    let state_str = if engine.is_playing() { "Playing" } else { "Idle" };

    let duration_str = match status.duration {
        Some(duration) => format!("{duration:.2}s"),
        None => "--".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {mode_str}  "),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{play_symbol} {state_str}  "),
            Style::default().fg(if engine.is_playing() {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("{:.2}s / {}  ", status.position, duration_str),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{} bars", engine.levels().len()),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if status.finished {
        spans.push(Span::styled("  complete", Style::default().fg(Color::Magenta)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_waveform(frame: &mut Frame, area: Rect, engine: &WaveformEngine, gradient: Option<f32>) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let geometry = engine.geometry_with_gradient(area.height as f32, gradient);

    let width = area.width as usize;
    let height = area.height as usize;
    let mut cells: Vec<Vec<Option<Color>>> = vec![vec![None; width]; height];

    for bar in &geometry.bars {
        match bar {
            Bar::Single(rect) => paint(&mut cells, rect, &geometry.fill),
            Bar::Pair { upper, lower } => {
                paint(&mut cells, upper, &geometry.fill);
                paint(&mut cells, lower, &geometry.fill);
            }
        }
    }

    let lines: Vec<Line> = cells
        .into_iter()
        .map(|row| {
            Line::from(
                row.into_iter()
                    .map(|cell| match cell {
                        Some(color) => Span::styled("█", Style::default().fg(color)),
                        None => Span::raw(" "),
                    })
                    .collect::<Vec<_>>(),
            )
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

/// Rasterize one rect into the cell grid, coloring each column from the
/// fill split.
fn paint(cells: &mut [Vec<Option<Color>>], rect: &GeomRect, fill: &Fill) {
    let height = cells.len();
    let width = cells.first().map_or(0, Vec::len);

    let x0 = rect.x.round().max(0.0) as usize;
    let x1 = ((rect.x + rect.width).round() as usize).min(width);
    let y0 = rect.y.round().max(0.0) as usize;
    let y1 = ((rect.y + rect.height).round() as usize).min(height);

    for x in x0..x1 {
        let color = terminal_color(fill_color(fill, x as f32));
        for row in cells.iter_mut().take(y1).skip(y0) {
            row[x] = Some(color);
        }
    }
}

fn fill_color(fill: &Fill, x: f32) -> Rgb {
    match *fill {
        Fill::Solid(color) => color,
        Fill::Split {
            boundary_x,
            played,
            remaining,
        } => {
            if x < boundary_x {
                played
            } else {
                remaining
            }
        }
    }
}

fn terminal_color(rgb: Rgb) -> Color {
    Color::Rgb(
        (rgb.r * 255.0) as u8,
        (rgb.g * 255.0) as u8,
        (rgb.b * 255.0) as u8,
    )
}
