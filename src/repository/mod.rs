//! Storage collaborators for the Attendance Engine.
//!
//! The engine reaches its backing store only through the traits in this
//! module. [`MemoryStore`] implements all of them in memory.

mod error;
mod memory;
mod traits;

pub use error::{RepositoryError, RepositoryResult};
pub use memory::MemoryStore;
pub use traits::{
    DeviceRegistry, EmployeeDirectory, PunchRepository, RawAttendanceRepository, WorkDayCalendar,
};
