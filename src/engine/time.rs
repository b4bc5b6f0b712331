//! Canonical slot grid and minutes-since-midnight arithmetic.
//!
//! The service day is a sequence of fixed-width slots from `open_hour` to
//! `close_hour`, where the close may exceed 24 to represent overnight
//! service without date rollover in the slot index.

use chrono::{DateTime, Duration, FixedOffset, Timelike};

/// Generate every slot start between `open_hour` and `close_hour`, as
/// minutes since midnight. Deterministic and pure; both the opening and the
/// closing boundary appear in the grid.
pub fn generate_slots(open_hour: u32, close_hour: u32, step_minutes: u32) -> Vec<u32> {
    debug_assert!(step_minutes > 0, "slot width must be positive");
    debug_assert!(open_hour < close_hour, "open hour must precede close hour");
    let mut slots = Vec::new();
    for h in open_hour..=close_hour {
        for m in (0..60).step_by(step_minutes as usize) {
            // Stop at close_hour:00 exactly.
            if h == close_hour && m > 0 {
                continue;
            }
            slots.push(h * 60 + m);
        }
    }
    slots
}

/// Resolve a slot (minutes since midnight, possibly >= 1440 for overnight
/// service) to an absolute timestamp on `reference`'s calendar day.
pub fn slot_to_timestamp(
    slot_minutes: u32,
    reference: DateTime<FixedOffset>,
) -> DateTime<FixedOffset> {
    midnight_of(reference) + Duration::minutes(slot_minutes as i64)
}

/// Minutes since midnight of the timestamp's own calendar day, in [0, 1440).
pub fn minutes_since_midnight(ts: DateTime<FixedOffset>) -> u32 {
    ts.hour() * 60 + ts.minute()
}

/// `HH:MM` label for a slot; hours wrap at 24 so overnight slots read as
/// early-morning times.
pub fn minutes_to_label(minutes: u32) -> String {
    format!("{:02}:{:02}", (minutes / 60) % 24, minutes % 60)
}

pub(crate) fn midnight_of(ts: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    // Fixed offsets have no gaps, so zeroing the time components cannot fail.
    ts.with_hour(0)
        .and_then(|t| t.with_minute(0))
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tz() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn slots_include_both_boundaries() {
        let slots = generate_slots(11, 24, 15);
        assert_eq!(slots.first(), Some(&(11 * 60)));
        assert_eq!(slots.last(), Some(&(24 * 60)));
        // 13 full hours of 4 slots each, plus the closing boundary.
        assert_eq!(slots.len(), 13 * 4 + 1);
    }

    #[test]
    fn slots_are_strictly_increasing_by_step() {
        let slots = generate_slots(11, 24, 15);
        for pair in slots.windows(2) {
            assert_eq!(pair[1] - pair[0], 15);
        }
    }

    #[test]
    fn overnight_close_extends_past_midnight() {
        let slots = generate_slots(18, 26, 30);
        assert_eq!(slots.last(), Some(&(26 * 60)));
        assert!(slots.contains(&(25 * 60)));
    }

    #[test]
    fn slot_generation_is_deterministic() {
        assert_eq!(generate_slots(11, 24, 15), generate_slots(11, 24, 15));
    }

    #[test]
    fn slot_to_timestamp_lands_on_reference_day() {
        let reference = tz().with_ymd_and_hms(2025, 10, 15, 9, 30, 0).unwrap();
        let ts = slot_to_timestamp(20 * 60 + 15, reference);
        assert_eq!(ts, tz().with_ymd_and_hms(2025, 10, 15, 20, 15, 0).unwrap());
    }

    #[test]
    fn overnight_slot_rolls_into_next_day() {
        let reference = tz().with_ymd_and_hms(2025, 10, 15, 12, 0, 0).unwrap();
        let ts = slot_to_timestamp(25 * 60, reference);
        assert_eq!(ts, tz().with_ymd_and_hms(2025, 10, 16, 1, 0, 0).unwrap());
    }

    #[test]
    fn minutes_since_midnight_uses_local_clock() {
        let ts = tz().with_ymd_and_hms(2025, 10, 15, 20, 45, 10).unwrap();
        assert_eq!(minutes_since_midnight(ts), 20 * 60 + 45);
        let midnight = tz().with_ymd_and_hms(2025, 10, 15, 0, 0, 0).unwrap();
        assert_eq!(minutes_since_midnight(midnight), 0);
    }

    #[test]
    fn labels_wrap_at_midnight() {
        assert_eq!(minutes_to_label(11 * 60), "11:00");
        assert_eq!(minutes_to_label(20 * 60 + 5), "20:05");
        assert_eq!(minutes_to_label(24 * 60), "00:00");
        assert_eq!(minutes_to_label(25 * 60 + 30), "01:30");
    }
}
