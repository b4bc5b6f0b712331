//! In-memory canonical collections and the single mutation point.
//!
//! The engine itself is pure; `Store` is the owning side that applies
//! verdicts. Every booking mutation is revalidated through the same
//! conflict and service-window gate that governs creation, and every
//! mutation produces a new booking generation so undo/redo is a plain
//! index move. Single-threaded by design: the caller serializes access.

use chrono::{DateTime, FixedOffset};
use ulid::Ulid;

use crate::config::ScheduleConfig;
use crate::engine::conflict::{check_booking, validate_booking, validate_duration, Validation};
use crate::engine::waitlist::{
    calculate_wait_times, convert_to_booking, find_promotion_candidates,
};
use crate::engine::EngineError;
use crate::model::{
    Booking, BookingStatus, Sector, Table, WaitlistEntry, WaitlistStatus,
};
use crate::notify::Notification;

/// Two enqueues of the same customer/time inside this window are treated
/// as a double-submitted form, not a legitimate repeat visit.
const DUPLICATE_WINDOW_MS: i64 = 5_000;

pub struct Store {
    config: ScheduleConfig,
    sectors: Vec<Sector>,
    tables: Vec<Table>,
    bookings: Vec<Booking>,
    waitlist: Vec<WaitlistEntry>,
    /// Booking generations for undo/redo; `history_index` points at the
    /// generation currently live in `bookings`.
    history: Vec<Vec<Booking>>,
    history_index: usize,
}

impl Store {
    pub fn new(config: ScheduleConfig) -> Self {
        Self {
            config,
            sectors: Vec::new(),
            tables: Vec::new(),
            bookings: Vec::new(),
            waitlist: Vec::new(),
            history: vec![Vec::new()],
            history_index: 0,
        }
    }

    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    // ── Catalog ──────────────────────────────────────────────

    pub fn add_sector(&mut self, sector: Sector) {
        self.sectors.push(sector);
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub fn table(&self, id: Ulid) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn sector_name(&self, id: Ulid) -> Option<&str> {
        self.sectors
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
    }

    // ── Bookings ─────────────────────────────────────────────

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn booking(&self, id: Ulid) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn bookings_for_table(&self, table_id: Ulid) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.table_id == table_id)
            .collect()
    }

    pub fn bookings_with_status(&self, status: BookingStatus) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|b| b.status == status)
            .collect()
    }

    fn push_generation(&mut self) {
        self.history.truncate(self.history_index + 1);
        self.history.push(self.bookings.clone());
        self.history_index = self.history.len() - 1;
    }

    /// Validate and commit a new booking.
    pub fn create_booking(
        &mut self,
        booking: Booking,
        now: DateTime<FixedOffset>,
    ) -> Result<Ulid, EngineError> {
        validate_duration(booking.duration_minutes, &self.config)?;
        check_booking(
            &self.tables,
            &self.bookings,
            booking.table_id,
            booking.party_size,
            booking.start_time,
            booking.duration_minutes,
            None,
            now,
            &self.config,
        )?;

        let id = booking.id;
        tracing::info!(booking = %id, table = %booking.table_id, "booking created");
        self.bookings.push(booking);
        self.push_generation();
        Ok(id)
    }

    /// Reassign a booking to another table and/or start time, revalidated
    /// against everything but itself.
    pub fn move_booking(
        &mut self,
        id: Ulid,
        new_table_id: Ulid,
        new_start: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> Result<(), EngineError> {
        let pos = self
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or(EngineError::NotFound(id))?;
        let (party_size, duration) = {
            let b = &self.bookings[pos];
            (b.party_size, b.duration_minutes)
        };
        check_booking(
            &self.tables,
            &self.bookings,
            new_table_id,
            party_size,
            new_start,
            duration,
            Some(id),
            now,
            &self.config,
        )?;

        let b = &mut self.bookings[pos];
        b.table_id = new_table_id;
        b.start_time = new_start;
        b.updated_at = now;
        tracing::info!(booking = %id, table = %new_table_id, "booking moved");
        self.push_generation();
        Ok(())
    }

    /// Change a booking's interval in place (drag-resize), revalidated
    /// against everything but itself.
    pub fn resize_booking(
        &mut self,
        id: Ulid,
        new_start: DateTime<FixedOffset>,
        new_duration_minutes: i64,
        now: DateTime<FixedOffset>,
    ) -> Result<(), EngineError> {
        validate_duration(new_duration_minutes, &self.config)?;
        let pos = self
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or(EngineError::NotFound(id))?;
        let (table_id, party_size) = {
            let b = &self.bookings[pos];
            (b.table_id, b.party_size)
        };
        check_booking(
            &self.tables,
            &self.bookings,
            table_id,
            party_size,
            new_start,
            new_duration_minutes,
            Some(id),
            now,
            &self.config,
        )?;

        let b = &mut self.bookings[pos];
        b.start_time = new_start;
        b.duration_minutes = new_duration_minutes;
        b.updated_at = now;
        tracing::info!(booking = %id, "booking resized");
        self.push_generation();
        Ok(())
    }

    /// Drive the booking lifecycle. Illegal transitions (including any
    /// exit from a terminal status) are rejected.
    pub fn set_booking_status(
        &mut self,
        id: Ulid,
        status: BookingStatus,
        now: DateTime<FixedOffset>,
    ) -> Result<(), EngineError> {
        let b = self
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or(EngineError::NotFound(id))?;
        if !b.status.can_transition_to(status) {
            return Err(EngineError::InvalidBookingTransition {
                from: b.status,
                to: status,
            });
        }
        b.status = status;
        b.updated_at = now;
        tracing::info!(booking = %id, ?status, "booking status changed");
        self.push_generation();
        Ok(())
    }

    /// Physically remove a booking. Distinct from cancelling, which is a
    /// terminal status, not removal.
    pub fn delete_booking(&mut self, id: Ulid) -> Result<(), EngineError> {
        let pos = self
            .bookings
            .iter()
            .position(|b| b.id == id)
            .ok_or(EngineError::NotFound(id))?;
        self.bookings.remove(pos);
        tracing::info!(booking = %id, "booking deleted");
        self.push_generation();
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.history_index -= 1;
        self.bookings = self.history[self.history_index].clone();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.history_index += 1;
        self.bookings = self.history[self.history_index].clone();
        true
    }

    /// Recomputed validation flags for one booking.
    pub fn validate(&self, id: Ulid, now: DateTime<FixedOffset>) -> Result<Validation, EngineError> {
        let booking = self.booking(id).ok_or(EngineError::NotFound(id))?;
        Ok(validate_booking(booking, &self.bookings, now, &self.config))
    }

    // ── Waitlist ─────────────────────────────────────────────

    pub fn waitlist(&self) -> &[WaitlistEntry] {
        &self.waitlist
    }

    pub fn entry(&self, id: Ulid) -> Option<&WaitlistEntry> {
        self.waitlist.iter().find(|e| e.id == id)
    }

    pub fn waiting_entries(&self) -> Vec<&WaitlistEntry> {
        self.waitlist
            .iter()
            .filter(|e| e.status == WaitlistStatus::Waiting)
            .collect()
    }

    /// Enqueue a waitlist entry. Rejected as a duplicate when another
    /// entry shares customer name, phone and preferred time and was added
    /// within the duplicate window — a guard against double-submitted
    /// forms, not against legitimate repeat visits.
    pub fn enqueue(&mut self, entry: WaitlistEntry) -> Result<Ulid, EngineError> {
        if let Some(existing) = self.waitlist.iter().find(|e| {
            e.id == entry.id
                || (e.customer.name == entry.customer.name
                    && e.customer.phone == entry.customer.phone
                    && e.preferred_time == entry.preferred_time
                    && (e.added_at - entry.added_at).num_milliseconds().abs()
                        < DUPLICATE_WINDOW_MS)
        }) {
            tracing::warn!(entry = %entry.id, existing = %existing.id, "duplicate waitlist entry ignored");
            return Err(EngineError::DuplicateEntry(existing.id));
        }

        let id = entry.id;
        tracing::info!(entry = %id, party_size = entry.party_size, "waitlist entry added");
        self.waitlist.push(entry);
        Ok(id)
    }

    /// Step an entry through the closed waitlist state machine.
    pub fn transition_entry(
        &mut self,
        id: Ulid,
        next: WaitlistStatus,
        now: DateTime<FixedOffset>,
    ) -> Result<(), EngineError> {
        let entry = self
            .waitlist
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(EngineError::NotFound(id))?;
        if !entry.status.can_transition_to(next) {
            return Err(EngineError::InvalidWaitlistTransition {
                from: entry.status,
                to: next,
            });
        }
        entry.status = next;
        if next == WaitlistStatus::Notified {
            entry.notified_at = Some(now);
        }
        tracing::info!(entry = %id, ?next, "waitlist entry transitioned");
        Ok(())
    }

    /// Offer a freed table to an entry: compose the simulated notification
    /// and move the entry to `Notified`.
    pub fn notify_entry(
        &mut self,
        id: Ulid,
        table_id: Ulid,
        available_time: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> Result<Notification, EngineError> {
        let table = self
            .table(table_id)
            .ok_or(EngineError::NotFound(table_id))?
            .clone();
        let sector_name = self
            .sector_name(table.sector_id)
            .unwrap_or("main room")
            .to_string();
        let entry = self.entry(id).ok_or(EngineError::NotFound(id))?.clone();

        self.transition_entry(id, WaitlistStatus::Notified, now)?;
        Ok(crate::notify::table_ready(
            &entry,
            &table,
            &sector_name,
            available_time,
            now,
        ))
    }

    /// Convert a notified entry into a confirmed booking on the freed
    /// table. The booking passes the full create gate; on success the
    /// entry is `Seated`.
    pub fn promote_entry(
        &mut self,
        id: Ulid,
        table_id: Ulid,
        start: DateTime<FixedOffset>,
        now: DateTime<FixedOffset>,
    ) -> Result<Ulid, EngineError> {
        let entry = self.entry(id).ok_or(EngineError::NotFound(id))?;
        if !entry.status.can_transition_to(WaitlistStatus::Seated) {
            return Err(EngineError::InvalidWaitlistTransition {
                from: entry.status,
                to: WaitlistStatus::Seated,
            });
        }

        let booking = convert_to_booking(entry, table_id, start, now, &self.config);
        let booking_id = self.create_booking(booking, now)?;
        self.transition_entry(id, WaitlistStatus::Seated, now)?;
        tracing::info!(entry = %id, booking = %booking_id, "waitlist entry promoted");
        Ok(booking_id)
    }

    /// Ranked `Waiting` entries able to take a freed table.
    pub fn promotion_candidates(
        &self,
        table_id: Ulid,
        available_time: DateTime<FixedOffset>,
    ) -> Result<Vec<Ulid>, EngineError> {
        let table = self.table(table_id).ok_or(EngineError::NotFound(table_id))?;
        Ok(find_promotion_candidates(
            &self.waitlist,
            table,
            available_time,
            &self.bookings,
            &self.config,
        ))
    }

    /// Fresh wait estimates for every `Waiting` entry, derived from the
    /// live booking set.
    pub fn wait_times(&self, now: DateTime<FixedOffset>) -> Vec<(Ulid, u32)> {
        calculate_wait_times(&self.waitlist, &self.tables, &self.bookings, now, &self.config)
    }
}
