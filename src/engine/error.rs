use ulid::Ulid;

use crate::model::{BookingStatus, WaitlistStatus};

/// Engine outcomes that reject an operation. Business rejections
/// (`Conflict`, `OutsideServiceHours`, `InThePast`, `CapacityMismatch`) are
/// expected results the caller turns into user-facing messages, not faults;
/// the remaining variants indicate a caller bug against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Overlapping active booking on the same table.
    Conflict(Ulid),
    OutsideServiceHours { open_hour: u32, close_hour: u32 },
    InThePast,
    CapacityMismatch { party_size: u32, min: u32, max: u32 },
    NotFound(Ulid),
    /// A matching waitlist entry was enqueued within the duplicate window.
    DuplicateEntry(Ulid),
    InvalidBookingTransition { from: BookingStatus, to: BookingStatus },
    InvalidWaitlistTransition { from: WaitlistStatus, to: WaitlistStatus },
    InvalidDuration(i64),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Conflict(id) => write!(f, "conflict with booking: {id}"),
            EngineError::OutsideServiceHours { open_hour, close_hour } => {
                write!(f, "outside service hours ({open_hour}:00 - {close_hour}:00)")
            }
            EngineError::InThePast => write!(f, "start time has already passed"),
            EngineError::CapacityMismatch { party_size, min, max } => {
                write!(f, "party of {party_size} does not fit capacity {min}-{max}")
            }
            EngineError::NotFound(id) => write!(f, "not found: {id}"),
            EngineError::DuplicateEntry(id) => {
                write!(f, "duplicate of waitlist entry: {id}")
            }
            EngineError::InvalidBookingTransition { from, to } => {
                write!(f, "invalid booking transition: {from:?} -> {to:?}")
            }
            EngineError::InvalidWaitlistTransition { from, to } => {
                write!(f, "invalid waitlist transition: {from:?} -> {to:?}")
            }
            EngineError::InvalidDuration(minutes) => {
                write!(f, "invalid duration: {minutes} minutes")
            }
        }
    }
}

impl std::error::Error for EngineError {}
