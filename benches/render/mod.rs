mod assemble;
mod duration;
mod resample;

pub use assemble::{bench_assemble, bench_expand};
pub use duration::bench_duration;
pub use resample::bench_resample;

use gradsonic::sequence::{ArbitraryShape, Trapezoid};
use gradsonic::{Block, BlockTimeline, Channel};

const RASTER: f64 = 10e-6;

/// One repetition of the benchmark pattern (four blocks).
pub fn pattern() -> [Block; 4] {
    let readout: Vec<f64> = (0..256)
        .map(|i| 1e5 * (std::f64::consts::TAU * i as f64 / 256.0).sin())
        .collect();
    [
        Block::new(2e-3).with_channel(Channel::Z, Trapezoid::new(8e4, 2e-4, 1.5e-3, 2e-4)),
        Block::new(1e-3).with_channel(Channel::Y, Trapezoid::new(-2e4, 1e-4, 7e-4, 1e-4)),
        Block::new(3e-3).with_channel(
            Channel::X,
            ArbitraryShape::from_samples(readout, RASTER, 0.0, 0.0).with_delay(2e-4),
        ),
        Block::new(5e-4),
    ]
}

/// A timeline of `blocks` blocks cycling through [`pattern`].
pub fn timeline(blocks: usize) -> BlockTimeline {
    BlockTimeline::from_blocks(pattern().into_iter().cycle().take(blocks))
}
