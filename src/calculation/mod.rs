//! Calculation logic for the Attendance Engine.
//!
//! This module contains the pure functions of the attendance pipeline:
//! device record decoding, punch direction classification, daily window
//! reconstruction, worked and away hours, and workday unit aggregation.
//! None of them touch storage.

mod daily_window;
mod device_record;
mod punch_classifier;
mod workday_units;
mod worked_hours;

pub use daily_window::reconstruct_daily_window;
pub use device_record::{DEVICE_RECORD_LEN, decode_device_record, decode_time};
pub use punch_classifier::{ClassificationContext, classify_direction};
pub use workday_units::{aggregate_payroll, daily_credit, record_credit, workday_units};
pub use worked_hours::{attendance_status, clock_hours, hours_out};
