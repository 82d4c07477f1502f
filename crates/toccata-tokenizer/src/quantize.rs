//! Nearest-bucket quantization over precomputed ladders.

use crate::config::TokenizerConfig;

/// Snaps values onto the time and velocity ladders derived from
/// configuration. Ladders are ascending, start at zero, and never change
/// after construction.
#[derive(Debug, Clone)]
pub struct Quantizer {
    time_steps: Vec<u32>,
    velocity_steps: Vec<u8>,
    pub velocity_step: u8,
    pub max_velocity: u8,
    pub min_time_step: u32,
    pub max_time_step: u32,
}

impl Quantizer {
    pub fn new(config: &TokenizerConfig) -> Quantizer {
        let min_step = config.time_quantization.min_step;
        let time_steps: Vec<u32> = (0..config.time_quantization.num_steps)
            .map(|i| i * min_step)
            .collect();

        let step = config.velocity_quantization.step;
        let velocity_steps: Vec<u8> = (0..=(127 / step)).map(|i| i * step).collect();

        Quantizer {
            max_time_step: time_steps.last().copied().unwrap_or(0),
            min_time_step: min_step,
            max_velocity: velocity_steps.last().copied().unwrap_or(0),
            velocity_step: step,
            time_steps,
            velocity_steps,
        }
    }

    /// Nearest time bucket in milliseconds. May return 0 for a non-zero
    /// input; callers decide whether a zero is meaningful.
    pub fn quantize_time(&self, ms: u32) -> u32 {
        find_closest(ms, &self.time_steps)
    }

    /// Nearest velocity bucket. A non-zero velocity never collapses to the
    /// zero bucket; it floors at the smallest non-zero step instead.
    pub fn quantize_velocity(&self, velocity: u8) -> u8 {
        let quantized = find_closest(velocity, &self.velocity_steps);
        if quantized == 0 && velocity != 0 {
            self.velocity_step
        } else {
            quantized
        }
    }

    pub fn time_steps(&self) -> &[u32] {
        &self.time_steps
    }

    pub fn velocity_steps(&self) -> &[u8] {
        &self.velocity_steps
    }
}

/// Binary search for the ladder element closest to `n`.
///
/// The candidate is only replaced on a strictly smaller distance, and the
/// search narrows left whenever the probe is not below the target, so equal
/// distances keep whichever candidate the probe sequence saw first. That
/// probe order is part of the function's contract; callers rely on it being
/// stable.
fn find_closest<T>(n: T, sorted: &[T]) -> T
where
    T: Copy + Default,
    i64: From<T>,
{
    let target = i64::from(n);
    let mut left: isize = 0;
    let mut right: isize = sorted.len() as isize - 1;
    let mut closest: Option<T> = None;

    while left <= right {
        let mid = ((left + right) / 2) as usize;
        let candidate = sorted[mid];
        let diff = (i64::from(candidate) - target).abs();
        let best = closest.map_or(i64::MAX, |c| (i64::from(c) - target).abs());
        if diff < best {
            closest = Some(candidate);
        }

        if i64::from(candidate) < target {
            left = mid as isize + 1;
        } else {
            right = mid as isize - 1;
        }
    }

    closest.unwrap_or_default()
}
