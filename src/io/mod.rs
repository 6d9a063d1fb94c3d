// Purpose - hand rendered samples to the outside world

#[cfg(feature = "rtrb")]
pub mod playback;
pub mod wav;

#[cfg(feature = "rtrb")]
pub use playback::PlaybackSink;
pub use wav::WavSink;

use crate::error::SinkError;

/// Receiver for a rendered signal.
///
/// The render core never performs I/O; whoever calls [`crate::listen`]
/// decides where the samples go by passing a sink.
pub trait AudioSink {
    fn consume(&mut self, samples: &[f64], rate: u32) -> Result<(), SinkError>;
}

/// In-memory sink that keeps the last signal it received.
#[derive(Debug, Default)]
pub struct BufferSink {
    pub samples: Vec<f64>,
    pub rate: u32,
    /// Number of signals received
    pub deliveries: usize,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for BufferSink {
    fn consume(&mut self, samples: &[f64], rate: u32) -> Result<(), SinkError> {
        self.samples.clear();
        self.samples.extend_from_slice(samples);
        self.rate = rate;
        self.deliveries += 1;
        Ok(())
    }
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn consume(&mut self, samples: &[f64], rate: u32) -> Result<(), SinkError> {
        (**self).consume(samples, rate)
    }
}

/// Largest absolute sample value, 0 for an empty or silent signal.
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0, |peak: f64, s| peak.max(s.abs()))
}

/// Convert to `f32`, scaling so the loudest sample sits at full scale when
/// `normalize` is set. Silence stays silence.
pub fn to_f32(samples: &[f64], normalize: bool) -> Vec<f32> {
    let gain = match peak(samples) {
        p if normalize && p > 0.0 => 1.0 / p,
        _ => 1.0,
    };
    samples.iter().map(|s| (s * gain) as f32).collect()
}
