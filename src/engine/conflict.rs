//! Conflict detection and booking validation.
//!
//! Overlap is half-open: a booking ending exactly when another starts is
//! not a conflict. Cancelled and finished bookings never block.

use chrono::{DateTime, Duration, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::config::ScheduleConfig;
use crate::model::{Booking, Span, Table};

use super::EngineError;

/// Find a booking on `table_id` whose interval overlaps the probe.
///
/// Returns the first match; any conflict already rejects the operation, so
/// callers needing every conflict must filter themselves. `exclude` must
/// carry the booking's own id when revalidating a move or resize, so the
/// booking is never checked against its prior interval.
pub fn find_conflict(
    bookings: &[Booking],
    table_id: Ulid,
    start: DateTime<FixedOffset>,
    duration_minutes: i64,
    exclude: Option<Ulid>,
) -> Option<Ulid> {
    debug_assert!(duration_minutes > 0, "probe duration must be positive");
    let probe = Span::from_start(start, duration_minutes);
    bookings
        .iter()
        .find(|b| {
            exclude != Some(b.id)
                && b.table_id == table_id
                && b.blocks()
                && b.span().overlaps(&probe)
        })
        .map(|b| b.id)
}

/// Whether `[start, start + duration)` falls outside the service window.
///
/// Boundaries are inclusive: starting exactly at `open_hour:00` or ending
/// exactly at `close_hour:00` is inside. When the end crosses into the next
/// calendar day its hour gains 24, so a window closing at 24 (or later)
/// admits intervals that run up to that boundary.
pub fn is_outside_service_hours(
    start: DateTime<FixedOffset>,
    duration_minutes: i64,
    open_hour: u32,
    close_hour: u32,
) -> bool {
    let end = start + Duration::minutes(duration_minutes);
    let start_hour = start.hour() as f64 + start.minute() as f64 / 60.0;
    let mut end_hour = end.hour() as f64 + end.minute() as f64 / 60.0;
    if end.date_naive() != start.date_naive() {
        end_hour += 24.0;
    }
    start_hour < open_hour as f64 || end_hour > close_hour as f64
}

/// Whether `start` already passed. `allow_past` suppresses the check for
/// retroactive edits.
pub fn is_in_the_past(
    start: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    allow_past: bool,
) -> bool {
    !allow_past && start < now
}

/// Full gate for creating, moving or resizing a booking: conflict, service
/// window, past-time and capacity bounds of the target table, in that
/// order. Every rejection is a business outcome the caller can surface.
#[allow(clippy::too_many_arguments)]
pub fn check_booking(
    tables: &[Table],
    bookings: &[Booking],
    table_id: Ulid,
    party_size: u32,
    start: DateTime<FixedOffset>,
    duration_minutes: i64,
    exclude: Option<Ulid>,
    now: DateTime<FixedOffset>,
    config: &ScheduleConfig,
) -> Result<(), EngineError> {
    let table = tables
        .iter()
        .find(|t| t.id == table_id)
        .ok_or(EngineError::NotFound(table_id))?;

    if let Some(conflicting) = find_conflict(bookings, table_id, start, duration_minutes, exclude) {
        return Err(EngineError::Conflict(conflicting));
    }
    if is_outside_service_hours(start, duration_minutes, config.open_hour, config.close_hour) {
        return Err(EngineError::OutsideServiceHours {
            open_hour: config.open_hour,
            close_hour: config.close_hour,
        });
    }
    if is_in_the_past(start, now, config.allow_past) {
        return Err(EngineError::InThePast);
    }
    if !table.capacity.fits(party_size) {
        return Err(EngineError::CapacityMismatch {
            party_size,
            min: table.capacity.min,
            max: table.capacity.max,
        });
    }
    Ok(())
}

/// Reject durations the engine cannot schedule. Non-positive durations are
/// a caller bug; out-of-range ones are a policy rejection, but both travel
/// the same way so the store has one gate.
pub fn validate_duration(duration_minutes: i64, config: &ScheduleConfig) -> Result<(), EngineError> {
    if duration_minutes < config.min_duration_minutes
        || duration_minutes > config.max_duration_minutes
    {
        return Err(EngineError::InvalidDuration(duration_minutes));
    }
    Ok(())
}

/// Aggregated per-booking validation flags, recomputed from the live
/// collection on every read. Drives warning badges in the host UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub has_conflict: bool,
    pub conflict_with: Option<Ulid>,
    pub outside_hours: bool,
    pub is_past: bool,
    pub message: Option<String>,
}

pub fn validate_booking(
    booking: &Booking,
    bookings: &[Booking],
    now: DateTime<FixedOffset>,
    config: &ScheduleConfig,
) -> Validation {
    let conflict_with = find_conflict(
        bookings,
        booking.table_id,
        booking.start_time,
        booking.duration_minutes,
        Some(booking.id),
    );
    let outside_hours = is_outside_service_hours(
        booking.start_time,
        booking.duration_minutes,
        config.open_hour,
        config.close_hour,
    );
    let is_past = is_in_the_past(booking.start_time, now, config.allow_past);

    let message = if let Some(id) = conflict_with {
        bookings
            .iter()
            .find(|b| b.id == id)
            .map(|b| format!("conflicts with {}'s booking", b.customer.name))
    } else if outside_hours {
        Some(format!(
            "outside service hours ({}:00 - {}:00)",
            config.open_hour, config.close_hour
        ))
    } else if is_past {
        Some("start time has already passed".to_string())
    } else {
        None
    };

    Validation {
        has_conflict: conflict_with.is_some(),
        conflict_with,
        outside_hours,
        is_past,
        message,
    }
}
