use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unix milliseconds — used for interval arithmetic only.
pub type Ms = i64;

/// Half-open interval `[start, end)` over epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Ms,
    pub end: Ms,
}

impl Span {
    pub fn new(start: Ms, end: Ms) -> Self {
        debug_assert!(start < end, "Span start must be before end");
        Self { start, end }
    }

    /// Span covering `duration_minutes` starting at an absolute timestamp.
    pub fn from_start(start: DateTime<FixedOffset>, duration_minutes: i64) -> Self {
        let start_ms = start.timestamp_millis();
        Self::new(start_ms, start_ms + duration_minutes * 60_000)
    }

    pub fn duration_ms(&self) -> Ms {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains_instant(&self, t: Ms) -> bool {
        self.start <= t && t < self.end
    }
}

/// Inclusive party-size bounds of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacity {
    pub min: u32,
    pub max: u32,
}

impl Capacity {
    pub fn new(min: u32, max: u32) -> Self {
        debug_assert!(min >= 1 && min <= max, "Capacity bounds must satisfy 1 <= min <= max");
        Self { min, max }
    }

    pub fn fits(&self, party_size: u32) -> bool {
        self.min <= party_size && party_size <= self.max
    }
}

/// A named grouping of tables. Used for filtering and preference scoring
/// only — conflicts are always per-table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: Ulid,
    pub name: String,
    pub sort_order: u32,
}

/// A schedulable physical table. Immutable for the engine's purposes:
/// capacity and sector never change within a scheduling decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: Ulid,
    pub sector_id: Ulid,
    pub name: String,
    pub capacity: Capacity,
    pub sort_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Seated,
    Finished,
    NoShow,
    Cancelled,
}

impl BookingStatus {
    /// Whether a booking in this status occupies its table for conflict
    /// purposes. `Cancelled` and `Finished` never block.
    pub fn blocks(self) -> bool {
        !matches!(self, BookingStatus::Cancelled | BookingStatus::Finished)
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Finished | BookingStatus::NoShow | BookingStatus::Cancelled
        )
    }

    /// Closed transition table for the booking lifecycle.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Seated)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (Seated, Finished)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Standard,
    Vip,
    LargeGroup,
}

/// Where a booking came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Phone,
    Web,
    WalkIn,
    App,
}

/// A time-boxed assignment of a party to a table. The interval is
/// `[start_time, start_time + duration_minutes)`; the end is derived,
/// never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: Ulid,
    pub table_id: Ulid,
    pub customer: Customer,
    pub party_size: u32,
    pub start_time: DateTime<FixedOffset>,
    pub duration_minutes: i64,
    pub status: BookingStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<BookingSource>,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
}

impl Booking {
    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.start_time + Duration::minutes(self.duration_minutes)
    }

    pub fn span(&self) -> Span {
        Span::from_start(self.start_time, self.duration_minutes)
    }

    pub fn blocks(&self) -> bool {
        self.status.blocks()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitlistStatus {
    Waiting,
    Notified,
    Seated,
    Cancelled,
    NoShow,
}

impl WaitlistStatus {
    /// Closed transition table:
    /// `Waiting → Notified → Seated`, with side exits
    /// `Waiting|Notified → Cancelled` and `Notified → NoShow`.
    /// No transition leaves a terminal state.
    pub fn can_transition_to(self, next: WaitlistStatus) -> bool {
        use WaitlistStatus::*;
        matches!(
            (self, next),
            (Waiting, Notified)
                | (Waiting, Cancelled)
                | (Notified, Seated)
                | (Notified, Cancelled)
                | (Notified, NoShow)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            WaitlistStatus::Seated | WaitlistStatus::Cancelled | WaitlistStatus::NoShow
        )
    }

    /// Display/service ordering rank: `Waiting < Notified < Seated <
    /// Cancelled < NoShow`.
    pub fn rank(self) -> u8 {
        match self {
            WaitlistStatus::Waiting => 0,
            WaitlistStatus::Notified => 1,
            WaitlistStatus::Seated => 2,
            WaitlistStatus::Cancelled => 3,
            WaitlistStatus::NoShow => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaitlistPriority {
    Standard,
    Vip,
}

/// A queued request for a future table assignment. The estimated wait is
/// recomputed from the live booking set on every read, never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitlistEntry {
    pub id: Ulid,
    pub customer: Customer,
    pub party_size: u32,
    pub preferred_time: DateTime<FixedOffset>,
    pub added_at: DateTime<FixedOffset>,
    pub priority: WaitlistPriority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_sector: Option<Ulid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub status: WaitlistStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notified_at: Option<DateTime<FixedOffset>>,
}
