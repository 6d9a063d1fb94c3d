//! Build a small spin-echo-like sequence in code and render it offline.
//!
//! Run with: cargo run --example offline_render -- [output-dir]
//!
//! Blocks are appended until the sequence reaches the target duration, with
//! the running total tracked incrementally. The result goes to a buffer and,
//! if a directory is given, to `seq.wav` inside it.

use gradsonic::io::BufferSink;
use gradsonic::sequence::{ArbitraryShape, Trapezoid};
use gradsonic::{
    Block, BlockTimeline, Channel, DurationCache, GridPolicy, ListenConfig, ListenExt,
    RateSource, SystemConstants, SystemLimits, TimeUnit,
};

const TARGET_DURATION: f64 = 0.25;

fn main() -> gradsonic::Result<()> {
    env_logger::init();

    let system = SystemLimits::default();
    let raster = system.grad_raster_time();

    // Half-sine readout lobe on the raster
    let samples = 200;
    let lobe: Vec<f64> = (0..samples)
        .map(|i| 4e5 * (std::f64::consts::PI * (i as f64 + 0.5) / samples as f64).sin())
        .collect();

    let mut timeline = BlockTimeline::new();
    let mut cache = DurationCache::new();
    let mut repetitions = 0;
    while timeline.duration_update(&mut cache, true) < TARGET_DURATION {
        let phase = 1e5 * (1.0 - repetitions as f64 / 8.0);
        timeline.push(
            Block::new(3e-3).with_channel(Channel::Z, Trapezoid::new(5e5, 2e-4, 2.5e-3, 2e-4)),
        );
        timeline.push(
            Block::new(1e-3)
                .with_channel(Channel::Y, Trapezoid::new(phase, 2e-4, 6e-4, 2e-4))
                .with_channel(Channel::Z, Trapezoid::new(-5e5, 2e-4, 6e-4, 2e-4)),
        );
        timeline.push(Block::new(2.2e-3).with_channel(
            Channel::X,
            ArbitraryShape::from_samples(lobe.clone(), raster, 0.0, 0.0).with_delay(1e-4),
        ));
        timeline.push(Block::new(10e-3));
        repetitions += 1;
    }
    println!(
        "Built {repetitions} repetitions, {:.1} ms",
        TimeUnit::Milliseconds.from_seconds(cache.total().unwrap_or_default())
    );

    let mut config = ListenConfig::new()
        .rate_source(RateSource::Raster)
        .grid(GridPolicy::PerSegment)
        .time_disp(TimeUnit::Milliseconds);
    if let Some(dir) = std::env::args().nth(1) {
        config = config.save_path(dir);
    }

    let mut sink = BufferSink::new();
    let rendered = timeline.listen(&system, &config, Some(&mut sink))?;
    println!(
        "Rendered {} samples at {} Hz ({:.1} ms), peak {:.3} {}",
        sink.samples.len(),
        sink.rate,
        rendered.display_duration(),
        gradsonic::io::peak(&sink.samples),
        rendered.grad_unit,
    );

    Ok(())
}
