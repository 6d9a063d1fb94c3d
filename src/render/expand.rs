use crate::sequence::{ArbitraryShape, ChannelDescriptor, Trapezoid};

/// Expand one descriptor into absolute breakpoints.
///
/// `block_start` is the absolute start time of the owning block and
/// `amplitude_scale` the unit conversion applied to every amplitude.
pub fn expand(
    descriptor: &ChannelDescriptor,
    block_start: f64,
    amplitude_scale: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut times = Vec::new();
    let mut amplitudes = Vec::new();
    expand_into(
        descriptor,
        block_start,
        amplitude_scale,
        &mut times,
        &mut amplitudes,
    );
    (times, amplitudes)
}

/// Append the breakpoints of `descriptor` to `times` and `amplitudes`.
///
/// Returns the number of breakpoints appended.
pub fn expand_into(
    descriptor: &ChannelDescriptor,
    block_start: f64,
    amplitude_scale: f64,
    times: &mut Vec<f64>,
    amplitudes: &mut Vec<f64>,
) -> usize {
    match descriptor {
        ChannelDescriptor::Trapezoid(trap) => {
            expand_trapezoid(trap, block_start, amplitude_scale, times, amplitudes)
        }
        ChannelDescriptor::ArbitraryShape(shape) => {
            expand_shape(shape, block_start, amplitude_scale, times, amplitudes)
        }
    }
}

// 0 -> delay -> +rise -> +flat -> +fall, amplitude 0, 0, A, A, 0
fn expand_trapezoid(
    trap: &Trapezoid,
    block_start: f64,
    amplitude_scale: f64,
    times: &mut Vec<f64>,
    amplitudes: &mut Vec<f64>,
) -> usize {
    let peak = trap.amplitude * amplitude_scale;
    let ramp_up = trap.delay + trap.rise_time;
    let ramp_down = ramp_up + trap.flat_time;
    let end = ramp_down + trap.fall_time;

    times.extend(
        [0.0, trap.delay, ramp_up, ramp_down, end]
            .iter()
            .map(|t| block_start + t),
    );
    amplitudes.extend([0.0, 0.0, peak, peak, 0.0]);
    5
}

fn expand_shape(
    shape: &ArbitraryShape,
    block_start: f64,
    amplitude_scale: f64,
    times: &mut Vec<f64>,
    amplitudes: &mut Vec<f64>,
) -> usize {
    // Mismatched lengths are an upstream fault and are not repaired here.
    debug_assert_eq!(
        shape.tt.len(),
        shape.waveform.len(),
        "arbitrary shape needs one time offset per sample"
    );

    let offset = block_start + shape.delay;
    times.push(offset);
    times.extend(shape.tt.iter().map(|t| offset + t));
    times.push(offset + shape.shape_duration);

    amplitudes.push(shape.first * amplitude_scale);
    amplitudes.extend(shape.waveform.iter().map(|a| a * amplitude_scale));
    amplitudes.push(shape.last * amplitude_scale);

    shape.tt.len() + 2
}
