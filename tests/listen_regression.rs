//! End-to-end checks: timeline description in, samples and files out.

use float_cmp::approx_eq;
use gradsonic::io::{BufferSink, WavSink};
use gradsonic::render::{assemble, Resampler};
use gradsonic::sequence::Trapezoid;
use gradsonic::{
    listen, Block, BlockTimeline, Channel, ConfigError, Error, GradientUnit, GridPolicy,
    ListenConfig, ListenExt, LoadError, SystemLimits, TimeRange, TimeUnit,
};

const SEQUENCE_JSON: &str = r#"{
    "blocks": [
        { "id": 1, "duration": 4.0,
          "gx": { "type": "trap", "amplitude": 2.0, "rise_time": 1.0, "flat_time": 2.0, "fall_time": 1.0 } },
        { "id": 2, "duration": 1.0 },
        { "id": 3, "duration": 2.0,
          "gz": { "type": "grad", "delay": 0.0, "tt": [0.5, 1.5], "waveform": [1.0, 3.0],
                  "first": 0.0, "last": 0.0, "shape_duration": 2.0 } }
    ]
}"#;

fn trapezoid_timeline() -> BlockTimeline {
    BlockTimeline::from_blocks([
        Block::new(4.0).with_channel(Channel::X, Trapezoid::new(2.0, 1.0, 2.0, 1.0))
    ])
}

/// With mT/m display this gives an amplitude scale of exactly 1, so samples
/// read back in descriptor units.
struct UnitGamma;

impl gradsonic::SystemConstants for UnitGamma {
    fn gamma(&self) -> f64 {
        1e3
    }

    fn grad_raster_time(&self) -> f64 {
        0.1
    }
}

fn unit_config() -> ListenConfig {
    ListenConfig::new()
        .grad_disp(GradientUnit::MilliteslaPerMeter)
        .rate(10)
}

#[test]
fn trapezoid_renders_to_expected_samples() {
    let config = unit_config();
    let mut sink = BufferSink::new();

    let rendered = listen(&trapezoid_timeline(), &UnitGamma, &config, Some(&mut sink)).unwrap();

    let breakpoints = assemble(&trapezoid_timeline(), &Channel::ALL, TimeRange::all(), 1.0);
    assert_eq!(breakpoints.times, vec![0.0, 0.0, 1.0, 3.0, 4.0]);
    assert_eq!(breakpoints.amplitudes, vec![0.0, 0.0, 2.0, 2.0, 0.0]);

    assert_eq!(rendered.samples.len(), 40);
    assert!(approx_eq!(f64, rendered.samples[20], 2.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, rendered.samples[35], 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, rendered.samples[5], 1.0, epsilon = 1e-12));
    assert_eq!(sink.samples, rendered.samples);
    assert_eq!(sink.rate, 10);
}

#[test]
fn window_past_the_end_is_empty_not_an_error() {
    let timeline = BlockTimeline::from_blocks((0..10).map(|_| Block::new(1.0)));
    let config = ListenConfig::new().time_range(20.0, 30.0).rate(10);
    let mut sink = BufferSink::new();

    let rendered = listen(&timeline, &SystemLimits::default(), &config, Some(&mut sink)).unwrap();
    assert!(rendered.is_empty());
    assert_eq!(rendered.window, None);
    assert!(sink.samples.is_empty());
}

#[test]
fn inverted_window_is_empty() {
    let config = ListenConfig::new().time_range(3.0, 1.0).rate(10).play(false);
    let rendered = trapezoid_timeline()
        .listen(&SystemLimits::default(), &config, None)
        .unwrap();
    assert!(rendered.is_empty());
}

#[test]
fn window_selects_whole_blocks() {
    let timeline = BlockTimeline::from_json_str(SEQUENCE_JSON).unwrap();
    let config = unit_config().time_range(4.5, 6.0).play(false);

    let rendered = timeline.listen(&UnitGamma, &config, None).unwrap();

    // Block 2 has no channels; block 3 starts at 5 and is kept whole
    assert_eq!(rendered.window, Some((5.0, 7.0)));
    assert_eq!(rendered.samples.len(), 20);
    assert!(approx_eq!(f64, rendered.samples[5], 1.0, epsilon = 1e-12));
    assert!(approx_eq!(f64, rendered.samples[10], 2.0, epsilon = 1e-12));
}

#[test]
fn global_and_per_segment_agree_on_aligned_segments() {
    let timeline = BlockTimeline::from_json_str(SEQUENCE_JSON).unwrap();
    let breakpoints = assemble(&timeline, &Channel::ALL, TimeRange::all(), 1.0);

    let global = Resampler::new(10, GridPolicy::Global).run(&breakpoints);
    let segments = Resampler::new(10, GridPolicy::PerSegment).run(&breakpoints);

    // Global covers the 1 s gap between the segments as well
    assert_eq!(global.len(), 70);
    assert_eq!(segments.len(), 60);
    assert_eq!(&global[..40], &segments[..40]);
    for (g, s) in global[50..].iter().zip(&segments[40..]) {
        assert!(approx_eq!(f64, *g, *s, epsilon = 1e-12));
    }
}

#[test]
fn saves_wav_into_directory() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out");
    let config = unit_config().play(false).save_path(&target);

    let rendered = listen(&trapezoid_timeline(), &UnitGamma, &config, None).unwrap();

    let mut reader = hound::WavReader::open(target.join("seq.wav")).unwrap();
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 10);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_format, hound::SampleFormat::Float);
    let samples: Vec<f32> = reader.samples::<f32>().map(Result::unwrap).collect();
    assert_eq!(samples.len(), rendered.samples.len());
    assert!(approx_eq!(f32, samples[20], 2.0, epsilon = 1e-6));
}

#[test]
fn normalized_wav_peaks_at_full_scale() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loud.wav");
    let rendered = trapezoid_timeline()
        .listen(&UnitGamma, &unit_config().play(false), None)
        .unwrap();

    let mut sink = WavSink::new(&path).normalize(true);
    gradsonic::io::AudioSink::consume(&mut sink, &rendered.samples, rendered.rate).unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    let peak = reader
        .into_samples::<f32>()
        .map(Result::unwrap)
        .fold(0.0f32, |acc, s| acc.max(s.abs()));
    assert!(approx_eq!(f32, peak, 1.0, epsilon = 1e-6));
}

#[test]
fn invalid_config_fails_before_delivery() {
    let mut sink = BufferSink::new();
    let mut system = SystemLimits::default();
    system.gamma = 0.0;

    let err = listen(
        &trapezoid_timeline(),
        &system,
        &unit_config(),
        Some(&mut sink),
    )
    .unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Gamma(_))));
    assert_eq!(sink.deliveries, 0);
}

#[test]
fn display_units_only_affect_reporting() {
    let seconds = unit_config().play(false);
    let millis = seconds.clone().time_disp(TimeUnit::Milliseconds);

    let a = trapezoid_timeline().listen(&UnitGamma, &seconds, None).unwrap();
    let b = trapezoid_timeline().listen(&UnitGamma, &millis, None).unwrap();
    assert_eq!(a.samples, b.samples);
    assert_eq!(b.display_window(), Some((0.0, 4000.0)));
}

#[test]
fn json_round_trip_preserves_rendering() {
    let timeline = BlockTimeline::from_json_str(SEQUENCE_JSON).unwrap();
    let reloaded = BlockTimeline::from_json_str(&timeline.to_json_string().unwrap()).unwrap();
    let config = unit_config().play(false);

    let a = timeline.listen(&UnitGamma, &config, None).unwrap();
    let b = reloaded.listen(&UnitGamma, &config, None).unwrap();
    assert_eq!(a.samples, b.samples);
}

#[test]
fn load_rejects_bad_timelines() {
    let negative = r#"{ "blocks": [ { "id": 7, "duration": -1.0 } ] }"#;
    assert!(matches!(
        BlockTimeline::from_json_str(negative),
        Err(LoadError::Duration { id: 7, .. })
    ));

    let duplicate = r#"{ "blocks": [ { "id": 1, "duration": 1.0 }, { "id": 1, "duration": 2.0 } ] }"#;
    assert!(matches!(
        BlockTimeline::from_json_str(duplicate),
        Err(LoadError::DuplicateId { id: 1 })
    ));

    let mismatched = r#"{ "blocks": [ { "id": 3, "duration": 2.0,
        "gy": { "type": "grad", "tt": [0.5, 1.5], "waveform": [1.0],
                "first": 0.0, "last": 0.0, "shape_duration": 2.0 } } ] }"#;
    assert!(matches!(
        BlockTimeline::from_json_str(mismatched),
        Err(LoadError::ShapeLength { id: 3, channel: Channel::Y, tt: 2, waveform: 1 })
    ));

    let negative_rise = r#"{ "blocks": [ { "id": 4, "duration": 1.0,
        "gx": { "type": "trap", "amplitude": 1.0, "rise_time": -5.0, "flat_time": 0.1, "fall_time": 0.1 } } ] }"#;
    assert!(matches!(
        BlockTimeline::from_json_str(negative_rise),
        Err(LoadError::DescriptorTime { id: 4, channel: Channel::X, value }) if value == -5.0
    ));

    let decreasing = r#"{ "blocks": [ { "id": 5, "duration": 2.0,
        "gz": { "type": "grad", "tt": [1.5, 0.5], "waveform": [1.0, 3.0],
                "first": 0.0, "last": 0.0, "shape_duration": 2.0 } } ] }"#;
    assert!(matches!(
        BlockTimeline::from_json_str(decreasing),
        Err(LoadError::DescriptorTime { id: 5, channel: Channel::Z, value }) if value == 0.5
    ));

    let missing = tempfile::tempdir().unwrap().path().join("nope.json");
    assert!(matches!(
        BlockTimeline::load(&missing),
        Err(LoadError::Read { .. })
    ));
}

#[test]
fn config_file_drives_listen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("listen.toml");
    std::fs::write(
        &path,
        "time-range = [0.0, 4.0]\nrate = 10\ngrid = \"per-segment\"\nplay = false\n",
    )
    .unwrap();

    let config = ListenConfig::load(&path).unwrap();
    let timeline = BlockTimeline::from_json_str(SEQUENCE_JSON).unwrap();
    let rendered = timeline.listen(&UnitGamma, &config, None).unwrap();

    // Block 3 starts at 5, outside the window
    assert_eq!(rendered.samples.len(), 40);
}
