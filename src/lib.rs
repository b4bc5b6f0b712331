//! mesa: a reservation scheduling and resource-assignment engine for
//! table-service venues.
//!
//! The core is a set of pure functions in [`engine`] that operate on
//! immutable snapshots: conflict detection over half-open intervals,
//! service-window validation, table recommendation scoring, alternative
//! slot search, waitlist estimation and promotion, and occupancy
//! analytics. [`store::Store`] owns the canonical collections and is the
//! single mutation point; every write goes through the same validation
//! gate, and booking history supports undo/redo.
//!
//! All time handling is explicit: functions that depend on the current
//! instant take `now` as a parameter and never read the wall clock.

pub mod config;
pub mod engine;
pub mod model;
pub mod notify;
pub mod store;

pub use config::ScheduleConfig;
pub use engine::EngineError;
pub use model::{Booking, BookingStatus, Capacity, Sector, Span, Table, WaitlistEntry};
pub use store::Store;
