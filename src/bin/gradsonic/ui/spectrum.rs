//! Spectrum of the visible window
//!
//! Hann-windowed FFT read out at log-spaced frequencies. Gradient waveforms
//! live mostly below a few kHz, so the axis starts at 10 Hz.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// FFT length; shorter views are zero-padded, longer ones decimated
pub const FFT_LEN: usize = 2048;
/// Number of frequency points to display
const SPECTRUM_BINS: usize = 64;
const MIN_FREQ: f64 = 10.0;
const FLOOR_DB: f64 = -120.0;

pub struct SpectrumAnalyzer {
    window: Vec<f64>,
    fft: Arc<dyn Fft<f64>>,
    scratch: Vec<Complex<f64>>,
    rate: f64,
    /// (frequency_hz, magnitude_db) of the last update
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(rate: u32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(FFT_LEN);
        let denom = (FFT_LEN - 1) as f64;
        let window = (0..FFT_LEN)
            .map(|i| 0.5 * (1.0 - (std::f64::consts::TAU * i as f64 / denom).cos()))
            .collect();

        Self {
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); FFT_LEN],
            rate: rate as f64,
            spectrum: Vec::with_capacity(SPECTRUM_BINS),
        }
    }

    /// Recompute from `samples`.
    ///
    /// A view longer than [`FFT_LEN`] is decimated, which lowers the
    /// effective rate (and so the highest displayed frequency) accordingly.
    pub fn update(&mut self, samples: &[f64]) {
        self.spectrum.clear();
        if samples.is_empty() {
            return;
        }

        let stride = samples.len().div_ceil(FFT_LEN);
        let rate = self.rate / stride as f64;
        let mut used = 0;
        for (slot, sample) in self.scratch.iter_mut().zip(samples.iter().step_by(stride)) {
            *slot = Complex::new(*sample, 0.0);
            used += 1;
        }
        for slot in &mut self.scratch[used..] {
            *slot = Complex::new(0.0, 0.0);
        }
        // Window only the occupied part so zero padding stays silent
        let denom = (used.max(2) - 1) as f64;
        for (i, slot) in self.scratch[..used].iter_mut().enumerate() {
            let w = if used == FFT_LEN {
                self.window[i]
            } else {
                0.5 * (1.0 - (std::f64::consts::TAU * i as f64 / denom).cos())
            };
            slot.re *= w;
        }

        self.fft.process(&mut self.scratch);

        let nyquist = rate / 2.0;
        if nyquist <= MIN_FREQ {
            return;
        }
        let ratio = nyquist / MIN_FREQ;
        let half = FFT_LEN / 2;
        for i in 0..SPECTRUM_BINS {
            let freq = MIN_FREQ * ratio.powf(i as f64 / (SPECTRUM_BINS - 1) as f64);
            let index = ((freq * FFT_LEN as f64 / rate).round() as usize).min(half - 1);
            let bin = self.scratch[index];
            let power = bin.norm_sqr().max(1e-12);
            self.spectrum.push((freq, (10.0 * power.log10()).max(FLOOR_DB)));
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Render the spectrum with a log frequency axis.
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let points: Vec<(f64, f64)> = spectrum.iter().map(|&(f, db)| (f.log10(), db)).collect();
    let max_log = points.last().map_or(MIN_FREQ.log10() + 1.0, |p| p.0);
    let max_db = points.iter().map(|p| p.1).fold(FLOOR_DB, f64::max);
    let top = (max_db / 10.0).ceil() * 10.0 + 10.0;

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([MIN_FREQ.log10(), max_log])
                .labels(vec![
                    format!("{MIN_FREQ:.0}Hz"),
                    format!("{:.0}Hz", 10f64.powf(max_log)),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([top - 100.0, top])
                .labels(vec![format!("{:.0}", top - 100.0), format!("{top:.0}dB")])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
