//! End-to-end rendering: options in, samples out.

use crate::config::{GradientUnit, GridPolicy, ListenConfig, TimeUnit};
use crate::error::Result;
use crate::io::{AudioSink, WavSink};
use crate::render::{assemble, Resampler};
use crate::sequence::{Channel, DurationCache, Timeline};
use crate::system::SystemConstants;

/// Result of [`listen`]: the uniformly sampled signal plus what it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub samples: Vec<f64>,
    /// Sample rate in Hz
    pub rate: u32,
    /// Absolute time span of the assembled breakpoints, in seconds
    pub window: Option<(f64, f64)>,
    pub breakpoints: usize,
    pub time_unit: TimeUnit,
    pub grad_unit: GradientUnit,
}

impl Rendered {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the signal in seconds.
    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / self.rate as f64
    }

    /// Length of the signal in the configured display unit.
    pub fn display_duration(&self) -> f64 {
        self.time_unit.from_seconds(self.duration())
    }

    /// Breakpoint span in the configured display unit.
    pub fn display_window(&self) -> Option<(f64, f64)> {
        self.window.map(|(start, end)| {
            (
                self.time_unit.from_seconds(start),
                self.time_unit.from_seconds(end),
            )
        })
    }
}

/// Render the gradient waveform of `timeline` and deliver it.
///
/// Options are validated before the timeline is read. When `config.play` is
/// set and a sink is given, the sink receives `(samples, rate)`; when
/// `config.save_path` is set, `seq.wav` is written into that directory.
/// A window that overlaps no block renders an empty signal.
pub fn listen<T, S>(
    timeline: &T,
    system: &S,
    config: &ListenConfig,
    sink: Option<&mut dyn AudioSink>,
) -> Result<Rendered>
where
    T: Timeline,
    S: SystemConstants,
{
    let (scale, rate) = config.resolve(system)?;
    if config.time_range.is_inverted() {
        log::debug!(
            "Time range [{}, {}] is inverted, nothing to render",
            config.time_range.start,
            config.time_range.end
        );
    }

    let breakpoints = assemble(timeline, &Channel::ALL, config.time_range, scale);
    if config.grid == GridPolicy::Global && !breakpoints.is_monotonic() {
        log::warn!(
            "Breakpoints overlap in time (several channels per block?); \
             the global grid interpolates them in assembly order, consider the per-segment grid"
        );
    }

    let samples = Resampler::new(rate, config.grid).run(&breakpoints);
    let rendered = Rendered {
        window: breakpoints.span(),
        breakpoints: breakpoints.len(),
        samples,
        rate,
        time_unit: config.time_disp,
        grad_unit: config.grad_disp,
    };

    if let Some((start, end)) = rendered.display_window() {
        log::info!(
            "Rendered {} samples at {rate} Hz covering {start}..{end} {} ({})",
            rendered.samples.len(),
            config.time_disp,
            config.grad_disp
        );
    } else {
        log::info!("No blocks in the requested time range");
    }

    if config.play {
        match sink {
            Some(sink) => sink.consume(&rendered.samples, rate)?,
            None => log::debug!("No audio sink given, skipping playback"),
        }
    }

    if let Some(dir) = &config.save_path {
        WavSink::in_dir(dir).consume(&rendered.samples, rate)?;
    }

    Ok(rendered)
}

/// Method-call sugar over any [`Timeline`].
pub trait ListenExt: Timeline + Sized {
    fn listen(
        &self,
        system: &impl SystemConstants,
        config: &ListenConfig,
        sink: Option<&mut dyn AudioSink>,
    ) -> Result<Rendered> {
        listen(self, system, config, sink)
    }

    /// Total duration through `cache`; see [`DurationCache::update`].
    fn duration_update(&self, cache: &mut DurationCache<Self::Key>, append_only: bool) -> f64 {
        cache.update(self, append_only)
    }
}

impl<T: Timeline> ListenExt for T {}
