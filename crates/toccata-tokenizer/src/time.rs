//! Tick/time conversion across a piecewise-constant tempo map.

use toccata_midi::{TempoEvent, DEFAULT_TEMPO};

/// Seconds spanned by `ticks` at a fixed tempo (microseconds per beat).
fn ticks_to_seconds(ticks: u32, tempo: u32, ticks_per_beat: u32) -> f64 {
    ticks as f64 * (tempo as f64 * 1e-6 / ticks_per_beat as f64)
}

/// Ticks spanned by `ms` at a fixed tempo, truncated to a whole tick.
pub fn ms_to_ticks(ms: u32, tempo: u32, ticks_per_beat: u32) -> u32 {
    let scale = tempo as f64 * 1e-6 / ticks_per_beat as f64;
    (ms as f64 * 1e-3 / scale) as u32
}

/// Elapsed real time between two tick positions, in whole milliseconds.
///
/// Accumulates the real-time length of every tempo segment intersecting
/// `[start_tick, end_tick)`, extrapolating past the map's last entry at the
/// last tempo. Rounding happens once, on the final sum.
pub fn duration_ms(
    start_tick: u32,
    end_tick: u32,
    tempos: &[TempoEvent],
    ticks_per_beat: u32,
) -> u32 {
    if end_tick <= start_tick {
        return 0;
    }
    if tempos.is_empty() {
        let seconds = ticks_to_seconds(end_tick - start_tick, DEFAULT_TEMPO, ticks_per_beat);
        return (seconds * 1e3).round() as u32;
    }

    // Last entry with tick <= start_tick, or the first entry when the map
    // starts after start_tick.
    let mut idx = 0;
    for (i, msg) in tempos.iter().enumerate() {
        idx = i;
        if start_tick <= msg.tick {
            break;
        }
    }
    if idx > 0 {
        idx -= 1;
    }

    // curr_tick and the segment loop are set up so that a single-entry tempo
    // map skips the loop entirely and only the extrapolation below runs.
    let mut seconds = 0.0f64;
    let mut curr_tick = start_tick;

    for pair in tempos[idx..].windows(2) {
        let (curr, next) = (pair[0], pair[1]);
        let delta = if end_tick < next.tick {
            end_tick - curr_tick
        } else {
            next.tick - curr_tick
        };
        seconds += ticks_to_seconds(delta, curr.tempo, ticks_per_beat);

        if end_tick < next.tick {
            break;
        }
        curr_tick = next.tick;
    }

    // Ticks past the final tempo entry run at the final tempo
    if let Some(last) = tempos.last() {
        if end_tick > last.tick {
            seconds += ticks_to_seconds(end_tick - curr_tick, last.tempo, ticks_per_beat);
        }
    }

    (seconds * 1e3).round() as u32
}
