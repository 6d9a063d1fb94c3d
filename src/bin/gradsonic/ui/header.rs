//! Header bar - rate, durations, visible window and level stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{PreviewInit, View};

/// Level statistics of the visible samples
pub struct SignalStats {
    pub peak: f64,
    pub rms: f64,
}

impl SignalStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = gradsonic::io::peak(samples);
        let rms = (samples.iter().map(|&x| x * x).sum::<f64>() / samples.len() as f64).sqrt();
        Self { peak, rms }
    }
}

pub fn render_header(
    frame: &mut Frame,
    area: Rect,
    init: &PreviewInit,
    view: &View,
    stats: &SignalStats,
) {
    let block = Block::default()
        .title(format!(" gradsonic - {} ", init.title))
        .borders(Borders::ALL);

    let unit = init.time_unit;
    let view_start = unit.from_seconds(init.sample_time(view.offset));
    let view_end = unit.from_seconds(init.sample_time(view.end()));

    let line = Line::from(vec![
        Span::styled(
            format!(" {:.1}kHz  ", init.rate as f64 / 1000.0),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(
                "Sequence {:.3} {unit}  ",
                unit.from_seconds(init.total_duration)
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("View {view_start:.3}..{view_end:.3} {unit}  "),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("{}/{} samples  ", view.len, view.total()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!(
                "Peak: {:.3}  RMS: {:.3} {}",
                stats.peak, stats.rms, init.grad_unit
            ),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
