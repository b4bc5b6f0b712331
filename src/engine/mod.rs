//! The scheduling engine: pure functions over immutable snapshots of the
//! table catalog, booking set and waitlist. Every operation returns a new
//! verdict or derived value without mutating its inputs; the owning
//! application serializes mutations against its own collections.

pub mod conflict;
mod error;
pub mod occupancy;
pub mod recommend;
pub mod time;
pub mod waitlist;


pub use error::EngineError;
