//! Service layer orchestrating the attendance pipeline.
//!
//! [`AttendanceEngine`] ties the pure calculations to the storage
//! collaborators and the event publisher.

mod clock;
mod engine;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{AttendanceEngine, GeneratedWorkDay};
