use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};

use super::{to_f32, AudioSink};
use crate::error::SinkError;

/// Ring buffer length in samples between the feeder and the device callback.
const RING_CAPACITY: usize = 16_384;
/// How long the feeder sleeps while the ring buffer is full.
const FEED_INTERVAL: Duration = Duration::from_millis(5);
/// Extra time to let the device flush its own buffers after the ring empties.
const DRAIN_TAIL: Duration = Duration::from_millis(150);
/// Slack on top of the signal length before a stalled device is given up on.
const STALL_MARGIN: Duration = Duration::from_secs(2);

/// Plays the signal on the default output device and blocks until done.
///
/// The stream is opened at the render rate; a device that cannot run at that
/// rate is reported as an error rather than resampled. Mono is copied to
/// every device channel.
#[derive(Debug, Clone)]
pub struct PlaybackSink {
    normalize: bool,
}

impl PlaybackSink {
    /// Peak-normalized playback, so gradient units never clip the device.
    pub fn new() -> Self {
        Self { normalize: true }
    }

    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

impl Default for PlaybackSink {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioSink for PlaybackSink {
    fn consume(&mut self, samples: &[f64], rate: u32) -> Result<(), SinkError> {
        if samples.is_empty() {
            log::info!("Nothing to play");
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(SinkError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|err| SinkError::Device(err.to_string()))?;
        let channels = supported.channels() as usize;
        let config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let signal = to_f32(samples, self.normalize);
        let (mut producer, mut consumer) = RingBuffer::<f32>::new(RING_CAPACITY);
        let failed = Arc::new(AtomicBool::new(false));
        let failed_flag = Arc::clone(&failed);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    // Underruns and the end of the signal play as silence
                    for frame in data.chunks_mut(channels) {
                        let sample = consumer.pop().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                move |err| {
                    log::error!("Audio stream error: {err}");
                    failed_flag.store(true, Ordering::Release);
                },
                None,
            )
            .map_err(|err| SinkError::Device(err.to_string()))?;
        stream
            .play()
            .map_err(|err| SinkError::Device(err.to_string()))?;

        let length =
            Duration::from_secs_f64((signal.len() + RING_CAPACITY) as f64 / rate.max(1) as f64);
        log::info!(
            "Playing {} samples at {rate} Hz ({:.2}s) on {channels} channels",
            signal.len(),
            signal.len() as f64 / rate as f64
        );

        let result = feed(
            &mut producer,
            &signal,
            RING_CAPACITY,
            &failed,
            Instant::now() + length + STALL_MARGIN,
        );
        if result.is_ok() {
            std::thread::sleep(DRAIN_TAIL);
        }
        drop(stream);

        result
    }
}

/// Push `signal` through the ring buffer and wait until the consumer has
/// drained it. Gives up once `failed` is raised or `deadline` passes.
fn feed(
    producer: &mut Producer<f32>,
    signal: &[f32],
    capacity: usize,
    failed: &AtomicBool,
    deadline: Instant,
) -> Result<(), SinkError> {
    let check = || {
        if failed.load(Ordering::Acquire) {
            Err(SinkError::Device("output stream failed".into()))
        } else if Instant::now() >= deadline {
            Err(SinkError::Device("output stream stalled".into()))
        } else {
            Ok(())
        }
    };

    let mut written = 0;
    while written < signal.len() {
        check()?;
        let free = producer.slots().min(signal.len() - written);
        if free == 0 {
            std::thread::sleep(FEED_INTERVAL);
            continue;
        }
        for &sample in &signal[written..written + free] {
            // Cannot fail: `free` slots were reported available
            let _ = producer.push(sample);
        }
        written += free;
    }

    while producer.slots() < capacity {
        check()?;
        std::thread::sleep(FEED_INTERVAL);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_when_the_consumer_keeps_up() {
        let (mut producer, mut consumer) = RingBuffer::<f32>::new(64);
        let signal: Vec<f32> = (0..1000).map(|i| i as f32).collect();
        let failed = AtomicBool::new(false);

        let reader = std::thread::spawn(move || {
            let mut received = Vec::new();
            while received.len() < 1000 {
                match consumer.pop() {
                    Ok(sample) => received.push(sample),
                    Err(_) => std::thread::yield_now(),
                }
            }
            received
        });

        let deadline = Instant::now() + Duration::from_secs(10);
        feed(&mut producer, &signal, 64, &failed, deadline).unwrap();
        assert_eq!(reader.join().unwrap(), signal);
    }

    #[test]
    fn stream_error_stops_feeding() {
        let (mut producer, _consumer) = RingBuffer::<f32>::new(64);
        let failed = AtomicBool::new(true);
        let deadline = Instant::now() + Duration::from_secs(10);

        let err = feed(&mut producer, &[0.5; 16], 64, &failed, deadline).unwrap_err();
        assert!(matches!(err, SinkError::Device(_)));
    }

    #[test]
    fn stalled_consumer_times_out() {
        let (mut producer, _consumer) = RingBuffer::<f32>::new(64);
        let failed = AtomicBool::new(false);
        let start = Instant::now();
        let deadline = start + Duration::from_millis(50);

        // Twice the ring size never fits while nothing is popped
        let err = feed(&mut producer, &[0.5; 128], 64, &failed, deadline).unwrap_err();
        assert!(matches!(err, SinkError::Device(_)));
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn drain_wait_is_bounded_too() {
        let (mut producer, _consumer) = RingBuffer::<f32>::new(64);
        let failed = AtomicBool::new(false);
        let deadline = Instant::now() + Duration::from_millis(50);

        // Fits in the ring, but is never drained
        let err = feed(&mut producer, &[0.5; 8], 64, &failed, deadline).unwrap_err();
        assert!(matches!(err, SinkError::Device(_)));
    }
}
