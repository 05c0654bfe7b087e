//! Core data models for the Attendance Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod daily_window;
mod employee;
mod payroll;
mod punch;
mod raw_attendance;
mod work_day;

pub use daily_window::DailyWindow;
pub use employee::Employee;
pub use payroll::{PayrollReport, PayrollReportRow};
pub use punch::{NewPunch, PunchDirection, PunchRecord, RawDeviceEvent};
pub use raw_attendance::{
    AttendanceStatus, NewRawAttendance, RawAttendanceRecord, RawAttendanceUpdate,
    parse_clock_time,
};
pub use work_day::{DayType, WorkDay};

/// Badge number reported by terminals (an employee's registration number).
pub type BadgeId = u64;
/// Employee directory identifier.
pub type EmployeeId = u64;
/// Company identifier.
pub type CompanyId = u64;
/// Work day identifier.
pub type WorkDayId = u64;
/// Punch log identifier.
pub type PunchId = u64;
/// Raw attendance record identifier.
pub type RawAttendanceId = u64;
