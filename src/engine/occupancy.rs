//! Time-bucketed occupancy analytics over the booking set.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::config::ScheduleConfig;
use crate::model::{Booking, Sector, Table};

use super::conflict::find_conflict;
use super::time::{generate_slots, minutes_to_label, slot_to_timestamp};

// Utilization score policy: reward slots in the 70-90% band, penalize
// slots under 50%. Tunable, not structural.
const OPTIMAL_BAND_LOW: u32 = 70;
const OPTIMAL_BAND_HIGH: u32 = 90;
const LOW_OCCUPANCY_THRESHOLD: u32 = 50;
const LOW_SLOT_PENALTY: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyStatus {
    Low,
    Medium,
    High,
    Full,
}

impl OccupancyStatus {
    pub fn from_percent(percent: u32) -> Self {
        if percent >= 100 {
            OccupancyStatus::Full
        } else if percent >= 90 {
            OccupancyStatus::High
        } else if percent >= 70 {
            OccupancyStatus::Medium
        } else {
            OccupancyStatus::Low
        }
    }
}

/// Occupancy of one slot of the service-day grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotCapacity {
    /// Slot start, minutes since midnight.
    pub slot_minutes: u32,
    pub label: String,
    pub total_tables: usize,
    pub occupied_tables: usize,
    pub available_tables: usize,
    pub occupancy_percent: u32,
    /// Sum of max capacities across all tables.
    pub total_capacity: u32,
    /// Party sizes seated during this slot.
    pub used_capacity: u32,
    pub status: OccupancyStatus,
}

/// Per-slot occupancy for `date`'s service day. A table counts as occupied
/// at a slot when any active booking overlaps a probe of the slot's own
/// width.
pub fn hourly_capacity(
    tables: &[Table],
    bookings: &[Booking],
    date: DateTime<FixedOffset>,
    config: &ScheduleConfig,
) -> Vec<SlotCapacity> {
    let day_bookings = bookings_on(bookings, date);
    let total_capacity: u32 = tables.iter().map(|t| t.capacity.max).sum();
    let slots = generate_slots(config.open_hour, config.close_hour, config.slot_minutes);

    let mut capacity_data = Vec::with_capacity(slots.len());
    for slot in slots {
        let probe_start = slot_to_timestamp(slot, date);

        let mut occupied = 0usize;
        let mut used_capacity = 0u32;
        for table in tables {
            if let Some(conflicting) = find_conflict(
                &day_bookings,
                table.id,
                probe_start,
                config.slot_minutes as i64,
                None,
            ) {
                occupied += 1;
                if let Some(booking) = day_bookings.iter().find(|b| b.id == conflicting) {
                    used_capacity += booking.party_size;
                }
            }
        }

        let occupancy_percent = if tables.is_empty() {
            0
        } else {
            (occupied as f64 / tables.len() as f64 * 100.0).round() as u32
        };

        capacity_data.push(SlotCapacity {
            slot_minutes: slot,
            label: minutes_to_label(slot),
            total_tables: tables.len(),
            occupied_tables: occupied,
            available_tables: tables.len() - occupied,
            occupancy_percent,
            total_capacity,
            used_capacity,
            status: OccupancyStatus::from_percent(occupancy_percent),
        });
    }

    capacity_data
}

/// Bookings starting on `date`'s calendar day, past and future alike.
fn bookings_on(bookings: &[Booking], date: DateTime<FixedOffset>) -> Vec<Booking> {
    let day = date.date_naive();
    bookings
        .iter()
        .filter(|b| b.start_time.date_naive() == day)
        .cloned()
        .collect()
}

/// How well a day's occupancy curve uses the room: the fraction of slots in
/// the optimal band scores up, the fraction of near-empty slots scores
/// down, clamped to 0-100.
pub fn utilization_score(hourly: &[SlotCapacity]) -> u32 {
    if hourly.is_empty() {
        return 0;
    }
    let optimal = hourly
        .iter()
        .filter(|s| {
            s.occupancy_percent >= OPTIMAL_BAND_LOW && s.occupancy_percent <= OPTIMAL_BAND_HIGH
        })
        .count();
    let low = hourly
        .iter()
        .filter(|s| s.occupancy_percent < LOW_OCCUPANCY_THRESHOLD)
        .count();

    let optimal_ratio = optimal as f64 / hourly.len() as f64;
    let low_ratio = low as f64 / hourly.len() as f64;
    (optimal_ratio * 100.0 - low_ratio * LOW_SLOT_PENALTY)
        .round()
        .clamp(0.0, 100.0) as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorStats {
    pub sector_id: Ulid,
    pub name: String,
    pub total_tables: usize,
    pub average_occupancy_percent: u32,
    pub peak_slot_label: String,
    pub peak_occupancy_percent: u32,
    pub utilization_score: u32,
}

/// Per-sector occupancy, busiest sector first. Reuses the per-slot
/// computation restricted to each sector's table subset.
pub fn sector_capacity(
    tables: &[Table],
    bookings: &[Booking],
    date: DateTime<FixedOffset>,
    sectors: &[Sector],
    config: &ScheduleConfig,
) -> Vec<SectorStats> {
    let mut stats = Vec::new();

    for sector in sectors {
        let sector_tables: Vec<Table> = tables
            .iter()
            .filter(|t| t.sector_id == sector.id)
            .cloned()
            .collect();
        if sector_tables.is_empty() {
            continue;
        }

        let hourly = hourly_capacity(&sector_tables, bookings, date, config);
        let average = (hourly.iter().map(|s| s.occupancy_percent).sum::<u32>() as f64
            / hourly.len() as f64)
            .round() as u32;
        // First peak wins on ties.
        let peak = hourly
            .iter()
            .reduce(|best, s| if s.occupancy_percent > best.occupancy_percent { s } else { best })
            .expect("slot grid is never empty");

        stats.push(SectorStats {
            sector_id: sector.id,
            name: sector.name.clone(),
            total_tables: sector_tables.len(),
            average_occupancy_percent: average,
            peak_slot_label: peak.label.clone(),
            peak_occupancy_percent: peak.occupancy_percent,
            utilization_score: utilization_score(&hourly),
        });
    }

    stats.sort_by(|a, b| b.average_occupancy_percent.cmp(&a.average_occupancy_percent));
    stats
}

/// Headline metrics for one service day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyKpis {
    pub total_bookings: usize,
    pub average_occupancy_percent: u32,
    pub peak_occupancy_percent: u32,
    pub peak_slot_label: String,
    pub utilization_score: u32,
    /// Bookings per table, times 10 (one implied decimal).
    pub turns_per_table_tenths: u32,
    pub busiest_sector: Option<String>,
}

pub fn daily_kpis(
    tables: &[Table],
    bookings: &[Booking],
    date: DateTime<FixedOffset>,
    sectors: &[Sector],
    config: &ScheduleConfig,
) -> DailyKpis {
    let day_bookings = bookings_on(bookings, date);
    let hourly = hourly_capacity(tables, &day_bookings, date, config);
    let sector_stats = sector_capacity(tables, &day_bookings, date, sectors, config);

    let average = if hourly.is_empty() {
        0
    } else {
        (hourly.iter().map(|s| s.occupancy_percent).sum::<u32>() as f64 / hourly.len() as f64)
            .round() as u32
    };
    let (peak_label, peak_percent) = hourly
        .iter()
        .reduce(|best, s| if s.occupancy_percent > best.occupancy_percent { s } else { best })
        .map(|s| (s.label.clone(), s.occupancy_percent))
        .unwrap_or_default();

    let turns_per_table_tenths = if tables.is_empty() {
        0
    } else {
        (day_bookings.len() as f64 / tables.len() as f64 * 10.0).round() as u32
    };

    DailyKpis {
        total_bookings: day_bookings.len(),
        average_occupancy_percent: average,
        peak_occupancy_percent: peak_percent,
        peak_slot_label: peak_label,
        utilization_score: utilization_score(&hourly),
        turns_per_table_tenths,
        busiest_sector: sector_stats.first().map(|s| s.name.clone()),
    }
}
