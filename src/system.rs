//! Scanner constants consumed by the render pipeline.
//!
//! Only two numbers matter here: the gyromagnetic ratio, which converts
//! gradient amplitudes from Hz/m to mT/m, and the gradient raster time, the
//! smallest addressable time step of a waveform. Everything that lands on a
//! breakpoint is a multiple of the raster time, so sampling at its reciprocal
//! puts every breakpoint exactly on a grid line.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Proton gyromagnetic ratio in Hz/T.
pub const PROTON_GAMMA: f64 = 42.576e6;
/// Default gradient raster time in seconds.
pub const DEFAULT_GRAD_RASTER_TIME: f64 = 10e-6;

/// Source of the constants the core needs from the scanner description.
pub trait SystemConstants {
    /// Gyromagnetic ratio in Hz/T.
    fn gamma(&self) -> f64;

    /// Minimum addressable gradient time step in seconds.
    fn grad_raster_time(&self) -> f64;

    /// Sample rate whose grid lines coincide with every raster point.
    fn raster_rate(&self) -> Result<u32, ConfigError> {
        let raster = self.grad_raster_time();
        if !(raster.is_finite() && raster > 0.0) {
            return Err(ConfigError::RasterTime(raster));
        }
        let rate = (1.0 / raster).round();
        if rate < 1.0 || rate > u32::MAX as f64 {
            return Err(ConfigError::RasterTime(raster));
        }
        Ok(rate as u32)
    }
}

/// Plain-data system description.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct SystemLimits {
    pub gamma: f64,
    pub grad_raster_time: f64,
}

impl SystemLimits {
    pub fn new(gamma: f64, grad_raster_time: f64) -> Self {
        Self {
            gamma,
            grad_raster_time,
        }
    }
}

impl Default for SystemLimits {
    fn default() -> Self {
        Self {
            gamma: PROTON_GAMMA,
            grad_raster_time: DEFAULT_GRAD_RASTER_TIME,
        }
    }
}

impl SystemConstants for SystemLimits {
    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn grad_raster_time(&self) -> f64 {
        self.grad_raster_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_raster_rate_is_100_khz() {
        assert_eq!(SystemLimits::default().raster_rate(), Ok(100_000));
    }

    #[test]
    fn zero_raster_time_is_rejected() {
        let system = SystemLimits::new(PROTON_GAMMA, 0.0);
        assert_eq!(system.raster_rate(), Err(ConfigError::RasterTime(0.0)));
    }
}
