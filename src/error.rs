//! Error types shared across the crate.

use std::path::PathBuf;

use crate::sequence::Channel;

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level error returned by [`crate::listen`] and the loaders.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// A listen option failed validation. Raised before the timeline is touched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid time range: expected exactly 2 values, got {0}")]
    TimeRangeArity(usize),
    #[error("Invalid time range: value {0} is not a number")]
    TimeRangeNotANumber(usize),
    #[error("Unsupported time unit '{0}' (expected one of: s, ms, us)")]
    TimeUnit(String),
    #[error("Unsupported gradient unit '{0}' (expected one of: kHz/m, mT/m)")]
    GradientUnit(String),
    #[error("Invalid sample rate {0}: must be a positive integer")]
    Rate(u32),
    #[error("Invalid raster time {0}: must be positive and finite")]
    RasterTime(f64),
    #[error("Invalid gyromagnetic ratio {0}: must be non-zero and finite")]
    Gamma(f64),
    #[error("Failed to parse listen config: {0}")]
    Parse(String),
    #[error("Failed to read listen config {path}: {message}")]
    Read { path: PathBuf, message: String },
}

/// Failure while handing rendered samples to an audio sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("WAV export failed: {0}")]
    Wav(#[from] hound::Error),
    #[error("No default output device available")]
    NoDevice,
    #[error("Audio device error: {0}")]
    Device(String),
}

/// Failure while loading a timeline description.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read timeline {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[cfg(feature = "serde")]
    #[error("Failed to parse timeline: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Block {id} has a negative or non-finite duration {duration}")]
    Duration { id: u64, duration: f64 },
    #[error("Block {id} reuses an id already present in the timeline")]
    DuplicateId { id: u64 },
    #[error("Block {id} {channel}: tt has {tt} entries but waveform has {waveform}")]
    ShapeLength {
        id: u64,
        channel: Channel,
        tt: usize,
        waveform: usize,
    },
    #[error("Block {id} {channel}: time {value} is negative, non-finite or out of order")]
    DescriptorTime { id: u64, channel: Channel, value: f64 },
}
