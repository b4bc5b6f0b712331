use serde::{Deserialize, Serialize};

/// Scheduling configuration supplied by the host application.
///
/// `close_hour` may exceed 24 (e.g. 26 for a 2 AM close) to represent
/// overnight service without date rollover in the slot index; 24 means
/// midnight of the next calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// First service hour of the day.
    pub open_hour: u32,
    /// Last service hour; the closing boundary itself is a valid booking end.
    pub close_hour: u32,
    /// Width of a time slot in minutes.
    pub slot_minutes: u32,
    /// Duration applied to new bookings when none is given.
    pub default_duration_minutes: i64,
    pub min_duration_minutes: i64,
    pub max_duration_minutes: i64,
    /// Assumed turn time when estimating waits and promoting from the
    /// waitlist.
    pub average_dining_minutes: i64,
    /// Offsets (minutes) probed on both sides of a requested time by the
    /// alternative-slot search.
    pub search_windows_minutes: Vec<i64>,
    /// Permit bookings whose start time has already passed (retroactive
    /// editing).
    pub allow_past: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            open_hour: 11,
            close_hour: 24,
            slot_minutes: 15,
            default_duration_minutes: 90,
            min_duration_minutes: 30,
            max_duration_minutes: 360,
            average_dining_minutes: 90,
            search_windows_minutes: vec![15, 30, 60],
            allow_past: false,
        }
    }
}
