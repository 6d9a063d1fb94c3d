//! Waveform reconstruction from block descriptors.
//!
//! The pipeline runs in three steps. Each channel descriptor is expanded into
//! explicit (time, amplitude) breakpoints, the breakpoints of every block in
//! the requested window are concatenated on one absolute time axis, and the
//! result is resampled onto a uniform grid by linear interpolation. All of it
//! is a pure computation over in-memory vectors.

/// Timeline walk that collects breakpoints for a time window.
pub mod assemble;
/// Trapezoid and arbitrary-shape descriptors to breakpoints.
pub mod expand;
/// Uniform-grid resampling with flat extrapolation.
pub mod resample;

pub use assemble::{assemble, Breakpoints, Segment};
pub use expand::{expand, expand_into};
pub use resample::{interpolate, resample, resample_segments, GridPolicy, Resampler};
