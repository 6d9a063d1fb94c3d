//! Preview state
//!
//! Everything the widgets need is computed once after rendering; the only
//! thing that changes while the preview is open is the [`View`].

use gradsonic::{BlockTimeline, Channel, GradientUnit, Rendered, TimeUnit};

/// Smallest number of samples the view can zoom in to
const MIN_VIEW_LEN: usize = 64;

/// Static information shown by the preview
#[derive(Clone, Debug)]
pub struct PreviewInit {
    /// Shown in the header (usually the timeline file name)
    pub title: String,
    /// Sample rate of the rendered signal in Hz
    pub rate: u32,
    pub time_unit: TimeUnit,
    pub grad_unit: GradientUnit,
    /// Start of the first sample, in seconds
    pub origin: f64,
    /// Total sequence duration in seconds
    pub total_duration: f64,
    pub blocks: Vec<BlockSpan>,
}

/// Absolute extent of one block and which axes it drives
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockSpan {
    pub start: f64,
    pub end: f64,
    pub active: [bool; 3],
}

impl BlockSpan {
    pub fn drives(&self, channel: Channel) -> bool {
        self.active[channel as usize]
    }
}

impl PreviewInit {
    pub fn new(timeline: &BlockTimeline, rendered: &Rendered, title: String) -> Self {
        let mut start = 0.0;
        let blocks = timeline
            .iter()
            .map(|(_, block)| {
                let mut active = [false; 3];
                for (channel, _) in block.channels() {
                    active[channel as usize] = true;
                }
                let span = BlockSpan {
                    start,
                    end: start + block.duration,
                    active,
                };
                start = span.end;
                span
            })
            .collect();

        Self {
            title,
            rate: rendered.rate,
            time_unit: rendered.time_unit,
            grad_unit: rendered.grad_unit,
            origin: rendered.window.map_or(0.0, |(start, _)| start),
            total_duration: start,
            blocks,
        }
    }

    /// Absolute time of sample `index`, in seconds.
    ///
    /// Exact for the global grid; for per-segment rendering it places the
    /// concatenated segments back to back from the start of the window, which
    /// ignores the delay of the first segment.
    pub fn sample_time(&self, index: usize) -> f64 {
        self.origin + index as f64 / self.rate as f64
    }
}

/// Visible slice of the rendered signal, in samples
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct View {
    pub offset: usize,
    pub len: usize,
    total: usize,
}

impl View {
    /// Show the whole signal.
    pub fn full(total: usize) -> Self {
        Self {
            offset: 0,
            len: total,
            total,
        }
    }

    /// Length of the whole signal
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Move by a quarter of the visible length, negative to the left.
    pub fn scroll(&mut self, direction: isize) {
        let step = (self.len / 4).max(1);
        self.offset = if direction < 0 {
            self.offset.saturating_sub(step)
        } else {
            (self.offset + step).min(self.total - self.len)
        };
    }

    /// Halve the visible length around its centre.
    pub fn zoom_in(&mut self) {
        let len = (self.len / 2).max(MIN_VIEW_LEN.min(self.total));
        self.offset += (self.len - len) / 2;
        self.len = len;
    }

    /// Double the visible length around its centre, up to the whole signal.
    pub fn zoom_out(&mut self) {
        let len = (self.len * 2).min(self.total);
        let centre = self.offset + self.len / 2;
        self.offset = centre.saturating_sub(len / 2).min(self.total - len);
        self.len = len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_keeps_view_inside_signal() {
        let mut view = View::full(1000);
        view.zoom_in();
        assert_eq!((view.offset, view.len), (250, 500));

        view.scroll(1);
        assert_eq!(view.offset, 375);
        for _ in 0..10 {
            view.scroll(1);
        }
        assert_eq!(view.end(), 1000);

        view.zoom_out();
        assert_eq!(view, View::full(1000));
    }

    #[test]
    fn zoom_in_stops_at_minimum() {
        let mut view = View::full(100);
        for _ in 0..8 {
            view.zoom_in();
        }
        assert_eq!(view.len, MIN_VIEW_LEN);
        assert!(view.end() <= 100);

        let mut tiny = View::full(10);
        tiny.zoom_in();
        assert_eq!(tiny.len, 10);
    }

    #[test]
    fn scroll_left_saturates() {
        let mut view = View::full(100);
        view.scroll(-1);
        assert_eq!(view.offset, 0);
    }
}
