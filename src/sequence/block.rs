use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the three orthogonal gradient axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Channel {
    X,
    Y,
    Z,
}

impl Channel {
    /// Fixed order in which channels are visited when assembling a timeline.
    pub const ALL: [Channel; 3] = [Channel::X, Channel::Y, Channel::Z];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::X => "gx",
            Channel::Y => "gy",
            Channel::Z => "gz",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Closed-form ramp/flat/ramp pulse.
///
/// Amplitude is in Hz/m; all times are in seconds relative to the start of
/// the owning block.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Trapezoid {
    pub amplitude: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub delay: f64,
    pub rise_time: f64,
    pub flat_time: f64,
    pub fall_time: f64,
}

impl Trapezoid {
    pub fn new(amplitude: f64, rise_time: f64, flat_time: f64, fall_time: f64) -> Self {
        Self {
            amplitude,
            delay: 0.0,
            rise_time,
            flat_time,
            fall_time,
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// Time from the block start to the end of the fall ramp.
    pub fn end_time(&self) -> f64 {
        self.delay + self.rise_time + self.flat_time + self.fall_time
    }
}

/// Explicitly sampled gradient shape.
///
/// `tt` and `waveform` must have the same length. The curve runs from
/// `first` at `delay` through the interior samples to `last` at
/// `delay + shape_duration`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ArbitraryShape {
    #[cfg_attr(feature = "serde", serde(default))]
    pub delay: f64,
    pub tt: Vec<f64>,
    pub waveform: Vec<f64>,
    pub first: f64,
    pub last: f64,
    pub shape_duration: f64,
}

impl ArbitraryShape {
    /// Build a shape from interior samples spaced `raster` apart, centered on
    /// raster cells the way sampled gradients are usually stored.
    pub fn from_samples(waveform: Vec<f64>, raster: f64, first: f64, last: f64) -> Self {
        let tt = (0..waveform.len())
            .map(|i| (i as f64 + 0.5) * raster)
            .collect();
        let shape_duration = waveform.len() as f64 * raster;
        Self {
            delay: 0.0,
            tt,
            waveform,
            first,
            last,
            shape_duration,
        }
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn end_time(&self) -> f64 {
        self.delay + self.shape_duration
    }
}

/// Gradient description for a single channel of a block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum ChannelDescriptor {
    #[cfg_attr(feature = "serde", serde(rename = "trap"))]
    Trapezoid(Trapezoid),
    #[cfg_attr(feature = "serde", serde(rename = "grad"))]
    ArbitraryShape(ArbitraryShape),
}

impl ChannelDescriptor {
    pub fn delay(&self) -> f64 {
        match self {
            ChannelDescriptor::Trapezoid(trap) => trap.delay,
            ChannelDescriptor::ArbitraryShape(shape) => shape.delay,
        }
    }

    /// Span covered by the expanded breakpoints, measured from the block start.
    pub fn end_time(&self) -> f64 {
        match self {
            ChannelDescriptor::Trapezoid(trap) => trap.end_time(),
            ChannelDescriptor::ArbitraryShape(shape) => shape.end_time(),
        }
    }

    /// Check that the descriptor expands to a non-decreasing run of finite
    /// breakpoint times with one amplitude per time.
    pub fn validate(&self) -> Result<(), DescriptorFault> {
        match self {
            ChannelDescriptor::Trapezoid(trap) => {
                for value in [trap.delay, trap.rise_time, trap.flat_time, trap.fall_time] {
                    if !(value.is_finite() && value >= 0.0) {
                        return Err(DescriptorFault::Time(value));
                    }
                }
                Ok(())
            }
            ChannelDescriptor::ArbitraryShape(shape) => {
                if shape.tt.len() != shape.waveform.len() {
                    return Err(DescriptorFault::ShapeLength {
                        tt: shape.tt.len(),
                        waveform: shape.waveform.len(),
                    });
                }
                if !(shape.delay.is_finite() && shape.delay >= 0.0) {
                    return Err(DescriptorFault::Time(shape.delay));
                }
                let mut previous = 0.0;
                for &t in shape.tt.iter().chain(std::iter::once(&shape.shape_duration)) {
                    if !(t.is_finite() && t >= previous) {
                        return Err(DescriptorFault::Time(t));
                    }
                    previous = t;
                }
                Ok(())
            }
        }
    }
}

/// Why a descriptor cannot be expanded into breakpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DescriptorFault {
    /// `tt` and `waveform` differ in length.
    ShapeLength { tt: usize, waveform: usize },
    /// A time is negative, non-finite or earlier than the one before it.
    Time(f64),
}

impl From<Trapezoid> for ChannelDescriptor {
    fn from(trap: Trapezoid) -> Self {
        ChannelDescriptor::Trapezoid(trap)
    }
}

impl From<ArbitraryShape> for ChannelDescriptor {
    fn from(shape: ArbitraryShape) -> Self {
        ChannelDescriptor::ArbitraryShape(shape)
    }
}

/// A single timed event: a duration plus an optional descriptor per axis.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Block {
    /// Block duration in seconds
    pub duration: f64,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub gx: Option<ChannelDescriptor>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub gy: Option<ChannelDescriptor>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub gz: Option<ChannelDescriptor>,
}

impl Block {
    /// An empty block (delay or wait) of the given duration.
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    /// Attach a descriptor to one channel, replacing any previous one.
    pub fn with_channel(mut self, channel: Channel, descriptor: impl Into<ChannelDescriptor>) -> Self {
        *self.slot_mut(channel) = Some(descriptor.into());
        self
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelDescriptor> {
        match channel {
            Channel::X => self.gx.as_ref(),
            Channel::Y => self.gy.as_ref(),
            Channel::Z => self.gz.as_ref(),
        }
    }

    /// Present channels in the fixed [`Channel::ALL`] order.
    pub fn channels(&self) -> impl Iterator<Item = (Channel, &ChannelDescriptor)> {
        Channel::ALL
            .into_iter()
            .filter_map(move |ch| self.channel(ch).map(|desc| (ch, desc)))
    }

    fn slot_mut(&mut self, channel: Channel) -> &mut Option<ChannelDescriptor> {
        match channel {
            Channel::X => &mut self.gx,
            Channel::Y => &mut self.gy,
            Channel::Z => &mut self.gz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_follow_fixed_order() {
        let block = Block::new(1.0)
            .with_channel(Channel::Z, Trapezoid::new(1.0, 0.1, 0.1, 0.1))
            .with_channel(Channel::X, Trapezoid::new(2.0, 0.1, 0.1, 0.1));

        let order: Vec<_> = block.channels().map(|(ch, _)| ch).collect();
        assert_eq!(order, vec![Channel::X, Channel::Z]);
    }

    #[test]
    fn trapezoid_end_time_includes_delay() {
        let trap = Trapezoid::new(1.0, 1.0, 2.0, 1.0).with_delay(0.5);
        assert_eq!(trap.end_time(), 4.5);
    }

    #[test]
    fn sampled_shape_spans_whole_raster_cells() {
        let shape = ArbitraryShape::from_samples(vec![1.0, 2.0, 3.0, 4.0], 0.5, 0.0, 0.0);
        assert_eq!(shape.tt, vec![0.25, 0.75, 1.25, 1.75]);
        assert_eq!(shape.shape_duration, 2.0);
    }

    #[test]
    fn well_formed_descriptors_validate() {
        let trap: ChannelDescriptor = Trapezoid::new(1.0, 0.1, 0.0, 0.1).with_delay(0.2).into();
        assert_eq!(trap.validate(), Ok(()));

        let shape: ChannelDescriptor =
            ArbitraryShape::from_samples(vec![1.0, 2.0], 0.5, 0.0, 0.0).into();
        assert_eq!(shape.validate(), Ok(()));
    }

    #[test]
    fn negative_or_nan_trapezoid_times_are_faults() {
        let trap: ChannelDescriptor = Trapezoid::new(1.0, -5.0, 0.1, 0.1).into();
        assert_eq!(trap.validate(), Err(DescriptorFault::Time(-5.0)));

        let trap: ChannelDescriptor = Trapezoid::new(1.0, 0.1, 0.1, 0.1).with_delay(f64::NAN).into();
        assert!(matches!(trap.validate(), Err(DescriptorFault::Time(t)) if t.is_nan()));
    }

    #[test]
    fn shape_faults_name_the_problem() {
        let mut shape = ArbitraryShape::from_samples(vec![1.0, 2.0, 3.0], 1.0, 0.0, 0.0);
        shape.waveform.pop();
        assert_eq!(
            ChannelDescriptor::from(shape).validate(),
            Err(DescriptorFault::ShapeLength { tt: 3, waveform: 2 })
        );

        let mut shape = ArbitraryShape::from_samples(vec![1.0, 2.0, 3.0], 1.0, 0.0, 0.0);
        shape.tt[2] = 0.25;
        assert_eq!(
            ChannelDescriptor::from(shape).validate(),
            Err(DescriptorFault::Time(0.25))
        );

        // Interior samples past the end of the shape
        let mut shape = ArbitraryShape::from_samples(vec![1.0, 2.0], 1.0, 0.0, 0.0);
        shape.shape_duration = 1.0;
        assert_eq!(
            ChannelDescriptor::from(shape).validate(),
            Err(DescriptorFault::Time(1.0))
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn descriptor_tag_selects_variant() {
        let json = r#"{"type": "trap", "amplitude": 1.0, "rise_time": 0.1, "flat_time": 0.2, "fall_time": 0.1}"#;
        let desc: ChannelDescriptor = serde_json::from_str(json).unwrap();
        assert!(matches!(desc, ChannelDescriptor::Trapezoid(t) if t.delay == 0.0));

        let json = r#"{"type": "grad", "tt": [0.5], "waveform": [3.0], "first": 0.0, "last": 0.0, "shape_duration": 1.0}"#;
        let desc: ChannelDescriptor = serde_json::from_str(json).unwrap();
        assert!(matches!(desc, ChannelDescriptor::ArbitraryShape(_)));
    }
}
