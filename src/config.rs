//! Listen options: time window, display units, sample rate and grid policy.
//!
//! Every option is validated up front. A bad value is reported as a
//! [`ConfigError`] naming the parameter before any block is visited.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::system::SystemConstants;
use crate::DEFAULT_RATE;

pub use crate::render::GridPolicy;

/// Window of absolute timeline time to render, in seconds.
///
/// Inclusive on both ends. An inverted window (`start > end`) overlaps
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<f64>", into = "[f64; 2]"))]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The whole timeline: `[0, inf]`.
    pub fn all() -> Self {
        Self::new(0.0, f64::INFINITY)
    }

    /// Build from a loosely typed list of values, as given on a command line
    /// or in a config file.
    pub fn from_values(values: &[f64]) -> Result<Self, ConfigError> {
        let [start, end] = values else {
            return Err(ConfigError::TimeRangeArity(values.len()));
        };
        if let Some(index) = values.iter().position(|v| v.is_nan()) {
            return Err(ConfigError::TimeRangeNotANumber(index));
        }
        Ok(Self::new(*start, *end))
    }

    pub fn is_inverted(&self) -> bool {
        self.start > self.end
    }

    /// Interval overlap test for a block spanning `[block_start, block_end]`.
    #[inline]
    pub fn overlaps(&self, block_start: f64, block_end: f64) -> bool {
        !self.is_inverted() && self.start <= block_end && block_start <= self.end
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::all()
    }
}

impl TryFrom<Vec<f64>> for TimeRange {
    type Error = ConfigError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::from_values(&values)
    }
}

impl From<TimeRange> for [f64; 2] {
    fn from(range: TimeRange) -> Self {
        [range.start, range.end]
    }
}

/// Unit used when reporting times. Never changes the rendered signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeUnit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "s"))]
    Seconds,
    #[cfg_attr(feature = "serde", serde(rename = "ms"))]
    Milliseconds,
    #[cfg_attr(feature = "serde", serde(rename = "us"))]
    Microseconds,
}

impl TimeUnit {
    /// Multiplier from seconds to this unit.
    pub fn factor(&self) -> f64 {
        match self {
            TimeUnit::Seconds => 1.0,
            TimeUnit::Milliseconds => 1e3,
            TimeUnit::Microseconds => 1e6,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            TimeUnit::Seconds => "s",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Microseconds => "us",
        }
    }

    pub fn from_seconds(&self, seconds: f64) -> f64 {
        seconds * self.factor()
    }
}

impl FromStr for TimeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s" => Ok(TimeUnit::Seconds),
            "ms" => Ok(TimeUnit::Milliseconds),
            "us" => Ok(TimeUnit::Microseconds),
            other => Err(ConfigError::TimeUnit(other.to_string())),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Unit the rendered amplitudes are expressed in.
///
/// Descriptor amplitudes are stored in Hz/m; this picks the multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GradientUnit {
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "kHz/m"))]
    KilohertzPerMeter,
    #[cfg_attr(feature = "serde", serde(rename = "mT/m"))]
    MilliteslaPerMeter,
}

impl GradientUnit {
    /// Multiplier from Hz/m to this unit.
    pub fn scale(&self, system: &impl SystemConstants) -> Result<f64, ConfigError> {
        match self {
            GradientUnit::KilohertzPerMeter => Ok(1e-3),
            GradientUnit::MilliteslaPerMeter => {
                let gamma = system.gamma();
                if !gamma.is_finite() || gamma == 0.0 {
                    return Err(ConfigError::Gamma(gamma));
                }
                Ok(1e3 / gamma)
            }
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            GradientUnit::KilohertzPerMeter => "kHz/m",
            GradientUnit::MilliteslaPerMeter => "mT/m",
        }
    }
}

impl FromStr for GradientUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kHz/m" => Ok(GradientUnit::KilohertzPerMeter),
            "mT/m" => Ok(GradientUnit::MilliteslaPerMeter),
            other => Err(ConfigError::GradientUnit(other.to_string())),
        }
    }
}

impl fmt::Display for GradientUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// Where the output sample rate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum RateSource {
    /// Use [`ListenConfig::rate`].
    #[default]
    Fixed,
    /// Use the reciprocal of the system gradient raster time.
    Raster,
}

impl RateSource {
    pub fn resolve(&self, rate: u32, system: &impl SystemConstants) -> Result<u32, ConfigError> {
        match self {
            RateSource::Fixed if rate == 0 => Err(ConfigError::Rate(rate)),
            RateSource::Fixed => Ok(rate),
            RateSource::Raster => system.raster_rate(),
        }
    }
}

/// Everything [`crate::listen`] needs to know besides the timeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct ListenConfig {
    pub time_range: TimeRange,
    pub time_disp: TimeUnit,
    pub grad_disp: GradientUnit,
    /// Output sample rate in Hz when `rate_source` is `Fixed`
    pub rate: u32,
    pub rate_source: RateSource,
    pub grid: GridPolicy,
    /// Caller promise for duration queries; see [`crate::DurationCache`]
    pub append_only: bool,
    /// Hand the samples to the sink passed to `listen`
    pub play: bool,
    /// Directory receiving `seq.wav`
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub save_path: Option<PathBuf>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            time_range: TimeRange::all(),
            time_disp: TimeUnit::default(),
            grad_disp: GradientUnit::default(),
            rate: DEFAULT_RATE,
            rate_source: RateSource::default(),
            grid: GridPolicy::default(),
            append_only: true,
            play: true,
            save_path: None,
        }
    }
}

impl ListenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_range(mut self, start: f64, end: f64) -> Self {
        self.time_range = TimeRange::new(start, end);
        self
    }

    pub fn rate(mut self, rate: u32) -> Self {
        self.rate = rate;
        self
    }

    pub fn grid(mut self, grid: GridPolicy) -> Self {
        self.grid = grid;
        self
    }

    pub fn rate_source(mut self, source: RateSource) -> Self {
        self.rate_source = source;
        self
    }

    pub fn time_disp(mut self, unit: TimeUnit) -> Self {
        self.time_disp = unit;
        self
    }

    pub fn grad_disp(mut self, unit: GradientUnit) -> Self {
        self.grad_disp = unit;
        self
    }

    pub fn play(mut self, play: bool) -> Self {
        self.play = play;
        self
    }

    pub fn save_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    /// Check every option against `system` and return the resolved
    /// `(amplitude_scale, rate)` pair.
    pub fn resolve(&self, system: &impl SystemConstants) -> Result<(f64, u32), ConfigError> {
        if self.time_range.start.is_nan() {
            return Err(ConfigError::TimeRangeNotANumber(0));
        }
        if self.time_range.end.is_nan() {
            return Err(ConfigError::TimeRangeNotANumber(1));
        }
        let rate = self.rate_source.resolve(self.rate, system)?;
        let scale = self.grad_disp.scale(system)?;
        Ok((scale, rate))
    }
}

#[cfg(feature = "serde")]
impl ListenConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}
