//! Waveform widget

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

use super::PreviewInit;

/// Most points handed to the chart; longer views are decimated
const MAX_POINTS: usize = 4096;

/// Render `samples` (starting at sample `offset`) against absolute time.
pub fn render_waveform(
    frame: &mut Frame,
    area: Rect,
    init: &PreviewInit,
    samples: &[f64],
    offset: usize,
) {
    let title = format!(" Waveform [{}] ", init.grad_unit);
    let block = Block::default().title(title).borders(Borders::ALL);

    let unit = init.time_unit;
    let stride = samples.len().div_ceil(MAX_POINTS).max(1);
    let data: Vec<(f64, f64)> = samples
        .iter()
        .enumerate()
        .step_by(stride)
        .map(|(i, &sample)| (unit.from_seconds(init.sample_time(offset + i)), sample))
        .collect();

    let start = unit.from_seconds(init.sample_time(offset));
    let end = unit.from_seconds(init.sample_time(offset + samples.len()));
    let peak = gradsonic::io::peak(samples).max(f64::MIN_POSITIVE);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([start, end])
                .labels(vec![format!("{start:.3}"), format!("{end:.3} {unit}")])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-peak, peak])
                .labels(vec![format!("{:.3}", -peak), format!("{peak:.3}")])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
