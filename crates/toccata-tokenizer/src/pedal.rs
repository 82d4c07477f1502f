//! Sustain pedal interval extraction.

use std::collections::HashMap;
use toccata_midi::PedalEvent;

/// Collapse pedal on/off events into non-overlapping hold intervals per
/// channel. Redundant presses and releases are ignored; a pedal still down
/// at the end of the stream closes at `final_tick`. Intervals are appended
/// in close order, and zero-length holds are dropped.
pub fn pedal_intervals(
    pedals: &[PedalEvent],
    final_tick: u32,
) -> HashMap<u8, Vec<(u32, u32)>> {
    let mut intervals: HashMap<u8, Vec<(u32, u32)>> = HashMap::new();
    let mut down_since: HashMap<u8, u32> = HashMap::new();

    for pedal in pedals {
        if pedal.down {
            down_since.entry(pedal.channel).or_insert(pedal.tick);
        } else if let Some(start) = down_since.remove(&pedal.channel) {
            if pedal.tick > start {
                intervals.entry(pedal.channel).or_default().push((start, pedal.tick));
            }
        }
    }

    for (channel, start) in down_since {
        if final_tick > start {
            intervals.entry(channel).or_default().push((start, final_tick));
        }
    }

    intervals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pedal(channel: u8, tick: u32, down: bool) -> PedalEvent {
        PedalEvent { channel, tick, down }
    }

    #[test]
    fn test_basic_intervals() {
        let events = vec![
            pedal(0, 100, true),
            pedal(0, 500, false),
            pedal(0, 600, true),
            pedal(0, 900, false),
        ];
        let intervals = pedal_intervals(&events, 1000);
        assert_eq!(intervals[&0], vec![(100, 500), (600, 900)]);
    }

    #[test]
    fn test_redundant_events_ignored() {
        let events = vec![
            // Release with nothing held
            pedal(0, 50, false),
            pedal(0, 100, true),
            // Second press while held keeps the original start
            pedal(0, 200, true),
            pedal(0, 500, false),
        ];
        let intervals = pedal_intervals(&events, 1000);
        assert_eq!(intervals[&0], vec![(100, 500)]);
    }

    #[test]
    fn test_open_interval_closes_at_final_tick() {
        let events = vec![pedal(0, 100, true)];
        let intervals = pedal_intervals(&events, 750);
        assert_eq!(intervals[&0], vec![(100, 750)]);
    }

    #[test]
    fn test_channels_tracked_independently() {
        let events = vec![
            pedal(0, 100, true),
            pedal(1, 150, true),
            pedal(0, 300, false),
            pedal(1, 400, false),
        ];
        let intervals = pedal_intervals(&events, 1000);
        assert_eq!(intervals[&0], vec![(100, 300)]);
        assert_eq!(intervals[&1], vec![(150, 400)]);
    }

    #[test]
    fn test_zero_length_holds_dropped() {
        let events = vec![pedal(0, 100, true), pedal(0, 100, false)];
        let intervals = pedal_intervals(&events, 1000);
        assert!(intervals.is_empty());

        // Pedal pressed exactly at the final tick
        let events = vec![pedal(0, 1000, true)];
        let intervals = pedal_intervals(&events, 1000);
        assert!(intervals.is_empty());
    }

    #[test]
    fn test_no_events() {
        assert!(pedal_intervals(&[], 1000).is_empty());
    }
}
