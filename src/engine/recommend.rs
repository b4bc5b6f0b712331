//! Table recommendation scoring and alternative-slot search.
//!
//! A greedy single-pass scorer, not a global optimum assignment:
//! recommendations are advisory and a human picks the final table.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::{Booking, Table};

use super::conflict::find_conflict;

// Heuristic policy weights, preserved from production behavior. Tunable,
// not structural.
const PERFECT_SCORE: i32 = 100;
const WASTE_PENALTY_PER_SEAT: i32 = 5;
const SECTOR_MATCH_BONUS: i32 = 10;
const UTILIZATION_BONUS: i32 = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecommendation {
    pub table_id: Ulid,
    /// 0-100, higher is a better fit.
    pub score: u8,
    /// Human-readable justification for the ranking.
    pub reason: String,
    /// True when the clamped score reaches exactly 100.
    pub is_optimal: bool,
}

/// Rank every table that can host `party_size` at the requested time,
/// best fit first. Tables with a conflict or a capacity mismatch are
/// omitted entirely. The sort is stable: ties keep catalog order.
pub fn recommend_tables(
    tables: &[Table],
    bookings: &[Booking],
    party_size: u32,
    start: DateTime<FixedOffset>,
    duration_minutes: i64,
    preferred_sector: Option<Ulid>,
) -> Vec<TableRecommendation> {
    let mut recommendations = Vec::new();

    for table in tables {
        if find_conflict(bookings, table.id, start, duration_minutes, None).is_some() {
            continue;
        }
        if !table.capacity.fits(party_size) {
            continue;
        }

        let sector_match = preferred_sector == Some(table.sector_id);
        let score = table_score(table, party_size, sector_match);
        recommendations.push(TableRecommendation {
            table_id: table.id,
            score,
            reason: recommendation_reason(table, party_size, sector_match),
            is_optimal: i32::from(score) == PERFECT_SCORE,
        });
    }

    recommendations.sort_by(|a, b| b.score.cmp(&a.score));
    recommendations
}

fn table_score(table: &Table, party_size: u32, sector_match: bool) -> u8 {
    let wasted_seats = (table.capacity.max - party_size) as i32;
    let mut score = PERFECT_SCORE - wasted_seats * WASTE_PENALTY_PER_SEAT;

    if sector_match {
        score += SECTOR_MATCH_BONUS;
    }

    let utilization_percent = party_size * 100 / table.capacity.max;
    if utilization_percent >= 80 {
        score += UTILIZATION_BONUS;
    }

    score.clamp(0, PERFECT_SCORE) as u8
}

fn recommendation_reason(table: &Table, party_size: u32, sector_match: bool) -> String {
    let wasted_seats = table.capacity.max - party_size;
    let utilization_percent = party_size * 100 / table.capacity.max;

    let mut reason = format!("seats {}-{}", table.capacity.min, table.capacity.max);
    if wasted_seats == 0 {
        reason.push_str(" (perfect fit)");
    } else if wasted_seats <= 2 {
        reason.push_str(&format!(
            " ({wasted_seats} spare seat{})",
            if wasted_seats > 1 { "s" } else { "" }
        ));
    } else {
        reason.push_str(&format!(" ({utilization_percent}% utilization)"));
    }
    if sector_match {
        reason.push_str(", preferred sector");
    }
    reason
}

/// One viable probe on the widened time axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAlternative {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// Signed distance from the requested time; negative probes are earlier.
    pub offset_minutes: i64,
    pub available: Vec<TableRecommendation>,
    /// Sum of max capacities across the available tables.
    pub total_capacity: u32,
}

/// Probe `requested_start ± w` for every window `w`, keeping probes with at
/// least one available table, ordered closest-to-requested first (earlier
/// probe before later on a tied magnitude, by iteration order).
///
/// Probes are not clipped to the service window: an out-of-hours probe is
/// the caller's to filter when wiring into the create flow.
pub fn find_alternative_slots(
    tables: &[Table],
    bookings: &[Booking],
    party_size: u32,
    requested_start: DateTime<FixedOffset>,
    duration_minutes: i64,
    windows_minutes: &[i64],
) -> Vec<SlotAlternative> {
    let mut alternatives = Vec::new();

    for &window in windows_minutes {
        for offset in [-window, window] {
            let probe_start = requested_start + Duration::minutes(offset);
            let available = recommend_tables(
                tables,
                bookings,
                party_size,
                probe_start,
                duration_minutes,
                None,
            );
            if available.is_empty() {
                continue;
            }

            let total_capacity = available
                .iter()
                .filter_map(|rec| tables.iter().find(|t| t.id == rec.table_id))
                .map(|t| t.capacity.max)
                .sum();

            alternatives.push(SlotAlternative {
                start_time: probe_start,
                end_time: probe_start + Duration::minutes(duration_minutes),
                offset_minutes: offset,
                available,
                total_capacity,
            });
        }
    }

    alternatives.sort_by_key(|alt| alt.offset_minutes.abs());
    alternatives
}

/// Point-in-time availability overview for a requested interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityStats {
    pub total_tables: usize,
    pub available_tables: usize,
    pub occupancy_percent: u32,
    /// Seats reachable right now across the free tables.
    pub available_capacity: u32,
}

pub fn availability_stats(
    tables: &[Table],
    bookings: &[Booking],
    start: DateTime<FixedOffset>,
    duration_minutes: i64,
) -> AvailabilityStats {
    let mut available_tables = 0usize;
    let mut available_capacity = 0u32;

    for table in tables {
        if find_conflict(bookings, table.id, start, duration_minutes, None).is_none() {
            available_tables += 1;
            available_capacity += table.capacity.max;
        }
    }

    let occupancy_percent = if tables.is_empty() {
        0
    } else {
        let occupied = tables.len() - available_tables;
        (occupied as f64 / tables.len() as f64 * 100.0).round() as u32
    };

    AvailabilityStats {
        total_tables: tables.len(),
        available_tables,
        occupancy_percent,
        available_capacity,
    }
}
