//! Simulated notification side effects. Messages are composed and logged;
//! no real transport is wired up.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::{Table, WaitlistEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationChannel {
    Sms,
    Email,
    Push,
}

/// Record of a simulated send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Ulid,
    pub entry_id: Ulid,
    pub channel: NotificationChannel,
    pub message: String,
    pub sent_at: DateTime<FixedOffset>,
}

/// Compose and "send" the table-ready SMS for a waitlist entry.
pub fn table_ready(
    entry: &WaitlistEntry,
    table: &Table,
    sector_name: &str,
    available_time: DateTime<FixedOffset>,
    now: DateTime<FixedOffset>,
) -> Notification {
    let guests = if entry.party_size == 1 { "guest" } else { "guests" };
    let message = format!(
        "Hi {}! Your table for {} {guests} is ready. {} ({sector_name}) available at {}. \
         Please confirm your arrival.",
        entry.customer.name,
        entry.party_size,
        table.name,
        available_time.format("%H:%M"),
    );

    tracing::info!(
        entry = %entry.id,
        phone = %entry.customer.phone,
        table = %table.name,
        "waitlist notification sent"
    );

    Notification {
        id: Ulid::new(),
        entry_id: entry.id,
        channel: NotificationChannel::Sms,
        message,
        sent_at: now,
    }
}
