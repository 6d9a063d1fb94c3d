use super::assemble::Breakpoints;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Resampling Breakpoints
======================

Breakpoints are sparse: a trapezoid is five points no matter how long it
lasts. Audio wants one value every 1/rate seconds. We lay a uniform grid over
the breakpoint span and read each grid point off the piecewise-linear curve.

Vocabulary
----------

  grid            Query times start + i/rate for i in 0..count, where
                  count = floor(span * rate). The span end is excluded.

  flat            Queries outside the breakpoint range return the nearest
  extrapolation   boundary amplitude, never a continued slope.

  tie             Two breakpoints at the same time (shared block boundary,
                  zero-length ramp). The later one wins for queries at or after
                  that time, so a step is taken at the tie.


Grid Policies
-------------

  Global        One grid over [min(times), max(times)). Simple, but the grid
                phase is fixed by the first breakpoint, so segment edges that
                fall between grid lines get smeared by up to one sample.

      |----seg A----|--seg B--|
      x   x   x   x   x   x   x        one grid for everything

  PerSegment    Each block-channel segment gets its own grid starting at the
                start of its block; the results are concatenated. Block edges
                always land on a grid line. A descriptor delay is rendered as
                leading samples at the first amplitude, for trapezoids and
                sampled shapes alike. Gaps between segments are not rendered.

      |----seg A----|--seg B--|
      x   x   x   x |x   x   x         grid restarts at every segment

Sampling at the reciprocal of the gradient raster time puts every raster
aligned breakpoint on a grid line under either policy.
*/

/// Guards `floor(span * rate)` against products like 39.999999999 for a
/// span that is exactly 40 samples long.
const GRID_EPSILON: f64 = 1e-9;

/// How the uniform query grid is laid over the breakpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum GridPolicy {
    /// One grid spanning every breakpoint.
    #[default]
    Global,
    /// One grid per block-channel segment, concatenated.
    PerSegment,
}

/// Number of grid points covering `[start, end)` at `rate`.
pub fn grid_len(start: f64, end: f64, rate: u32) -> usize {
    let span = end - start;
    if !(span > 0.0) {
        return 0;
    }
    (span * rate as f64 + GRID_EPSILON).floor() as usize
}

/// Grid point `index` of a grid starting at `start`.
#[inline]
pub fn grid_time(start: f64, index: usize, rate: u32) -> f64 {
    start + index as f64 / rate as f64
}

/// Piecewise-linear value of the breakpoint curve at `t`.
///
/// `times` must be non-decreasing. Queries before the first or after the last
/// breakpoint return the boundary amplitude. Empty input yields 0.
pub fn interpolate(times: &[f64], amplitudes: &[f64], t: f64) -> f64 {
    debug_assert_eq!(times.len(), amplitudes.len());

    // Index of the first breakpoint strictly after t
    let right = times.partition_point(|&bt| bt <= t);
    if right == 0 {
        return amplitudes.first().copied().unwrap_or(0.0);
    }
    if right == times.len() {
        return amplitudes[right - 1];
    }

    let left = right - 1;
    let (t0, t1) = (times[left], times[right]);
    let (a0, a1) = (amplitudes[left], amplitudes[right]);
    let width = t1 - t0;
    if !(width > 0.0) {
        // Only reachable when the times were not sorted.
        return a0;
    }
    a0 + (a1 - a0) * (t - t0) / width
}

/// Resample on one global grid over `[min(times), max(times))`.
///
/// Empty breakpoints give an empty signal.
pub fn resample(times: &[f64], amplitudes: &[f64], rate: u32) -> Vec<f64> {
    match times.iter().copied().reduce(f64::min) {
        Some(start) => resample_from(start, times, amplitudes, rate),
        None => Vec::new(),
    }
}

/// Resample on a grid over `[start, max(times))`.
fn resample_from(start: f64, times: &[f64], amplitudes: &[f64], rate: u32) -> Vec<f64> {
    let end = times.iter().copied().fold(start, f64::max);
    let count = grid_len(start, end, rate);
    (0..count)
        .map(|i| interpolate(times, amplitudes, grid_time(start, i, rate)))
        .collect()
}

/// Resample every segment on a grid from its block start and concatenate
/// the results.
pub fn resample_segments(breakpoints: &Breakpoints, rate: u32) -> Vec<f64> {
    let mut out = Vec::new();
    for segment in &breakpoints.segments {
        let times = breakpoints.segment_times(segment);
        let amplitudes = breakpoints.segment_amplitudes(segment);
        let Some(first) = times.first() else {
            continue;
        };
        out.extend(resample_from(segment.start.min(*first), times, amplitudes, rate));
    }
    out
}

/// Resampling settings bundled for the listen pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resampler {
    pub rate: u32,
    pub policy: GridPolicy,
}

impl Resampler {
    pub fn new(rate: u32, policy: GridPolicy) -> Self {
        Self { rate, policy }
    }

    pub fn run(&self, breakpoints: &Breakpoints) -> Vec<f64> {
        match self.policy {
            GridPolicy::Global => {
                resample(&breakpoints.times, &breakpoints.amplitudes, self.rate)
            }
            GridPolicy::PerSegment => resample_segments(breakpoints, self.rate),
        }
    }

    /// Time of output sample `index` under the global policy.
    pub fn sample_time(&self, breakpoints: &Breakpoints, index: usize) -> Option<f64> {
        let (start, _) = breakpoints.span()?;
        Some(grid_time(start, index, self.rate))
    }
}
