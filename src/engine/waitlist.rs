//! Waitlist prioritization, wait-time estimation and auto-promotion.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::config::ScheduleConfig;
use crate::model::{
    Booking, BookingStatus, Customer, Priority, Table, WaitlistEntry, WaitlistPriority,
    WaitlistStatus,
};

use super::conflict::find_conflict;
use super::time::midnight_of;

/// Bounded "very long" estimate when no matching table frees up today, so
/// UIs can render a finite label.
pub const WAIT_SENTINEL_MINUTES: u32 = 999;

// Queue-position penalty policy: VIP estimates grow roughly half as fast as
// standard ones. Tunable, not structural.
const POSITION_PENALTY_MINUTES: u32 = 15;
const VIP_PRIORITY_DIVISOR: u32 = 2;

fn suits_entry(table: &Table, entry: &WaitlistEntry) -> bool {
    table.capacity.fits(entry.party_size)
        && entry
            .preferred_sector
            .is_none_or(|sector_id| table.sector_id == sector_id)
}

/// Earliest time from `from` (exclusive of nothing, scanning in slot
/// increments) at which the table can host an average-length seating,
/// bounded by the end of the calendar day.
fn next_available_time(
    table: &Table,
    bookings: &[Booking],
    from: DateTime<FixedOffset>,
    config: &ScheduleConfig,
) -> Option<DateTime<FixedOffset>> {
    let end_of_day = midnight_of(from) + Duration::days(1);
    let step = Duration::minutes(config.slot_minutes as i64);

    let mut current = from;
    while current < end_of_day {
        if find_conflict(
            bookings,
            table.id,
            current,
            config.average_dining_minutes,
            None,
        )
        .is_none()
        {
            return Some(current);
        }
        current += step;
    }
    None
}

/// Estimate the wait in minutes for one entry against the live booking set.
///
/// The base is the soonest any capacity/sector-matching table frees up for
/// an average dining duration; on top comes a queue-position penalty of
/// `15 x position` for standard entries and `15 x floor(position / 2)` for
/// VIPs, where position is the zero-based rank among `Waiting` entries in
/// enqueue order. No matching table today yields the 999 sentinel.
pub fn estimate_wait_minutes(
    entry: &WaitlistEntry,
    waitlist: &[WaitlistEntry],
    tables: &[Table],
    bookings: &[Booking],
    now: DateTime<FixedOffset>,
    config: &ScheduleConfig,
) -> u32 {
    let suitable: Vec<&Table> = tables.iter().filter(|t| suits_entry(t, entry)).collect();
    if suitable.is_empty() {
        return WAIT_SENTINEL_MINUTES;
    }

    let mut min_wait: Option<u32> = None;
    for table in suitable {
        if let Some(available_at) = next_available_time(table, bookings, now, config) {
            let wait_minutes = (available_at - now).num_minutes().max(0) as u32;
            min_wait = Some(min_wait.map_or(wait_minutes, |w| w.min(wait_minutes)));
        }
    }

    let Some(base) = min_wait else {
        return WAIT_SENTINEL_MINUTES;
    };

    let position = waitlist
        .iter()
        .filter(|e| e.status == WaitlistStatus::Waiting)
        .position(|e| e.id == entry.id)
        .unwrap_or(0) as u32;
    let penalty = match entry.priority {
        WaitlistPriority::Vip => position / VIP_PRIORITY_DIVISOR * POSITION_PENALTY_MINUTES,
        WaitlistPriority::Standard => position * POSITION_PENALTY_MINUTES,
    };

    let estimate = base + penalty;
    tracing::debug!(entry = %entry.id, base, penalty, "wait estimate");
    estimate
}

/// Recompute estimates for every `Waiting` entry. Derived values only;
/// nothing is stored.
pub fn calculate_wait_times(
    waitlist: &[WaitlistEntry],
    tables: &[Table],
    bookings: &[Booking],
    now: DateTime<FixedOffset>,
    config: &ScheduleConfig,
) -> Vec<(Ulid, u32)> {
    waitlist
        .iter()
        .filter(|e| e.status == WaitlistStatus::Waiting)
        .map(|e| {
            (
                e.id,
                estimate_wait_minutes(e, waitlist, tables, bookings, now, config),
            )
        })
        .collect()
}

/// Stable ordering by status rank, then VIP before standard, then earlier
/// enqueue first. This is both the display order and the de-facto service
/// order.
pub fn sort_by_priority(entries: &mut [WaitlistEntry]) {
    entries.sort_by_key(|e| {
        (
            e.status.rank(),
            e.priority != WaitlistPriority::Vip,
            e.added_at,
        )
    });
}

/// Ranked `Waiting` entries that could take `table` at `available_time`:
/// capacity and preferred-sector match, and the table has no conflict for
/// an average-length seating at that time. The caller notifies the head.
pub fn find_promotion_candidates(
    waitlist: &[WaitlistEntry],
    table: &Table,
    available_time: DateTime<FixedOffset>,
    bookings: &[Booking],
    config: &ScheduleConfig,
) -> Vec<Ulid> {
    let mut candidates: Vec<&WaitlistEntry> = waitlist
        .iter()
        .filter(|e| {
            e.status == WaitlistStatus::Waiting
                && suits_entry(table, e)
                && find_conflict(
                    bookings,
                    table.id,
                    available_time,
                    config.average_dining_minutes,
                    None,
                )
                .is_none()
        })
        .collect();

    candidates.sort_by_key(|e| (e.priority != WaitlistPriority::Vip, e.added_at));
    candidates.into_iter().map(|e| e.id).collect()
}

/// Build the confirmed booking a promoted entry turns into. The entry's
/// own status change (to `Seated`) is the store's transaction.
pub fn convert_to_booking(
    entry: &WaitlistEntry,
    table_id: Ulid,
    start: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
    config: &ScheduleConfig,
) -> Booking {
    let notes = match &entry.notes {
        Some(n) => format!("converted from waitlist; {n}"),
        None => "converted from waitlist".to_string(),
    };
    Booking {
        id: Ulid::new(),
        table_id,
        customer: Customer {
            name: entry.customer.name.clone(),
            phone: entry.customer.phone.clone(),
            email: entry.customer.email.clone(),
        },
        party_size: entry.party_size,
        start_time: start,
        duration_minutes: config.average_dining_minutes,
        status: BookingStatus::Confirmed,
        priority: match entry.priority {
            WaitlistPriority::Vip => Priority::Vip,
            WaitlistPriority::Standard => Priority::Standard,
        },
        notes: Some(notes),
        source: None,
        created_at: now,
        updated_at: now,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistStats {
    pub total_waiting: usize,
    /// Mean enqueue-to-notification time of seated entries, minutes.
    pub average_wait_minutes: u32,
    /// Longest wait currently accrued by a `Waiting` entry, minutes.
    pub longest_wait_minutes: u32,
    pub vip_count: usize,
    /// Share of all entries that ended up seated, percent.
    pub conversion_rate_percent: u32,
}

pub fn waitlist_stats(waitlist: &[WaitlistEntry], now: DateTime<FixedOffset>) -> WaitlistStats {
    let waiting: Vec<&WaitlistEntry> = waitlist
        .iter()
        .filter(|e| e.status == WaitlistStatus::Waiting)
        .collect();
    let seated: Vec<&WaitlistEntry> = waitlist
        .iter()
        .filter(|e| e.status == WaitlistStatus::Seated)
        .collect();

    let average_wait_minutes = if seated.is_empty() {
        0
    } else {
        let total: i64 = seated
            .iter()
            .filter_map(|e| e.notified_at.map(|at| (at - e.added_at).num_minutes()))
            .sum();
        (total as f64 / seated.len() as f64).round() as u32
    };

    let longest_wait_minutes = waiting
        .iter()
        .map(|e| (now - e.added_at).num_minutes().max(0) as u32)
        .max()
        .unwrap_or(0);

    let vip_count = waiting
        .iter()
        .filter(|e| e.priority == WaitlistPriority::Vip)
        .count();

    let conversion_rate_percent = if waitlist.is_empty() {
        0
    } else {
        (seated.len() as f64 / waitlist.len() as f64 * 100.0).round() as u32
    };

    WaitlistStats {
        total_waiting: waiting.len(),
        average_wait_minutes,
        longest_wait_minutes,
        vip_count,
        conversion_rate_percent,
    }
}
