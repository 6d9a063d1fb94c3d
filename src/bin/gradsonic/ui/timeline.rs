//! Timeline widget - one row per gradient axis with the visible window marked

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use gradsonic::Channel;

use super::{PreviewInit, View};

const LABEL_WIDTH: u16 = 5;

/// Render block occupancy per axis over the whole sequence, with the
/// visible window underlined.
pub fn render_timeline(frame: &mut Frame, area: Rect, init: &PreviewInit, view: &View) {
    if area.height < 2 || area.width <= LABEL_WIDTH + 4 || init.total_duration <= 0.0 {
        return;
    }

    let width = (area.width - LABEL_WIDTH) as usize;
    let seconds_per_char = init.total_duration / width as f64;
    let column_time = |col: usize| (col as f64 + 0.5) * seconds_per_char;

    let mut lines = Vec::with_capacity(Channel::ALL.len() + 1);
    for channel in Channel::ALL {
        let mut cells = String::with_capacity(width);
        for col in 0..width {
            let t = column_time(col);
            // Blocks are half-open; zero-length blocks never claim a cell
            let cell = init
                .blocks
                .iter()
                .find(|span| span.start <= t && t < span.end)
                .map_or(' ', |span| if span.drives(channel) { '▓' } else { '░' });
            cells.push(cell);
        }
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:<width$}", channel.name(), width = LABEL_WIDTH as usize),
                Style::default().fg(Color::White),
            ),
            Span::styled(cells, Style::default().fg(Color::Cyan)),
        ]));
    }

    let view_start = init.sample_time(view.offset);
    let view_end = init.sample_time(view.end());
    let cursor: String = (0..width)
        .map(|col| {
            let t = column_time(col);
            if view_start <= t && t < view_end {
                '▔'
            } else {
                ' '
            }
        })
        .collect();
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(LABEL_WIDTH as usize)),
        Span::styled(cursor, Style::default().fg(Color::Yellow)),
    ]));

    frame.render_widget(Paragraph::new(lines), area);
}
