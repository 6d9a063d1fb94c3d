use super::expand::expand_into;
use crate::config::TimeRange;
use crate::sequence::{Channel, Timeline};

/// Breakpoints of one block-channel pair inside [`Breakpoints`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Position of the owning block in timeline order
    pub block_index: usize,
    pub channel: Channel,
    /// Start time of the owning block
    pub start: f64,
    /// Index of the segment's first breakpoint
    pub offset: usize,
    /// Number of breakpoints in the segment
    pub len: usize,
}

/// Global breakpoint arrays, grouped block-then-channel.
///
/// Within a segment times are non-decreasing. Across segments they are
/// non-decreasing as long as every block carries at most one channel whose
/// span stays inside the block; ties at shared boundaries are expected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakpoints {
    pub times: Vec<f64>,
    pub amplitudes: Vec<f64>,
    pub segments: Vec<Segment>,
}

impl Breakpoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Earliest and latest breakpoint time, `None` when empty.
    pub fn span(&self) -> Option<(f64, f64)> {
        let first = *self.times.first()?;
        Some(
            self.times
                .iter()
                .fold((first, first), |(lo, hi), &t| (lo.min(t), hi.max(t))),
        )
    }

    /// True if `times` never decreases, the precondition for global resampling.
    pub fn is_monotonic(&self) -> bool {
        self.times.windows(2).all(|pair| pair[0] <= pair[1])
    }

    pub fn segment_times(&self, segment: &Segment) -> &[f64] {
        &self.times[segment.offset..segment.offset + segment.len]
    }

    pub fn segment_amplitudes(&self, segment: &Segment) -> &[f64] {
        &self.amplitudes[segment.offset..segment.offset + segment.len]
    }
}

/// Collect the breakpoints of every block overlapping `range`.
///
/// Block start times are a running sum of durations over the whole timeline,
/// so excluded blocks still shift everything after them. A block is included
/// when `range.start <= block_end && block_start <= range.end`; the window
/// does not clip breakpoints of included blocks.
pub fn assemble<T: Timeline>(
    timeline: &T,
    channels: &[Channel],
    range: TimeRange,
    amplitude_scale: f64,
) -> Breakpoints {
    let mut out = Breakpoints::new();
    let mut block_start = 0.0;
    let mut included = 0usize;

    for (block_index, key) in timeline.keys().enumerate() {
        let Some(block) = timeline.block(key) else {
            continue;
        };
        let block_end = block_start + block.duration;

        if range.overlaps(block_start, block_end) {
            included += 1;
            for &channel in channels {
                let Some(descriptor) = block.channel(channel) else {
                    continue;
                };
                let offset = out.times.len();
                let len = expand_into(
                    descriptor,
                    block_start,
                    amplitude_scale,
                    &mut out.times,
                    &mut out.amplitudes,
                );
                out.segments.push(Segment {
                    block_index,
                    channel,
                    start: block_start,
                    offset,
                    len,
                });
            }
        }

        block_start = block_end;
    }

    log::debug!(
        "Assembled {} breakpoints from {included} blocks in [{}, {}]",
        out.len(),
        range.start,
        range.end
    );
    out
}
