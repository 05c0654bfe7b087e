//! Raw attendance record model.
//!
//! A raw attendance record is the persisted per-employee, per-work-day
//! attendance entry that payroll aggregation reads.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CompanyId, EmployeeId, RawAttendanceId, WorkDayId};

/// Attendance outcome for a work day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Both ends of the window are known and time was worked.
    Present,
    /// Anything else.
    Absent,
}

/// The computed attendance entry for one employee on one work day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAttendanceRecord {
    /// Store-assigned identifier.
    pub id: RawAttendanceId,
    /// Work day the record belongs to.
    pub work_day_id: WorkDayId,
    /// Company of the employee at generation time.
    pub company_id: CompanyId,
    /// Employee the record belongs to.
    pub employee_id: EmployeeId,
    /// Display name snapshot.
    pub employee_name: String,
    /// Position/qualification snapshot.
    pub position: Option<String>,
    /// Check-in time of day.
    pub start_at: Option<NaiveTime>,
    /// Check-out time of day.
    pub end_at: Option<NaiveTime>,
    /// Elapsed hours between start and end.
    pub total_hours: Option<Decimal>,
    /// Hours spent away between OUT and the following IN.
    pub total_hours_out: Option<Decimal>,
    /// Attendance outcome.
    pub status: AttendanceStatus,
    /// Free-text notes.
    pub notes: String,
    /// When set, the daily credit is not capped.
    pub calculate_overtime: bool,
    /// When set, the lunch deduction is applied.
    pub calculate_lunch_hour: bool,
}

/// A raw attendance record before the store assigns its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRawAttendance {
    /// Work day the record belongs to.
    pub work_day_id: WorkDayId,
    /// Company of the employee at generation time.
    pub company_id: CompanyId,
    /// Employee the record belongs to.
    pub employee_id: EmployeeId,
    /// Display name snapshot.
    pub employee_name: String,
    /// Position/qualification snapshot.
    pub position: Option<String>,
    /// Check-in time of day.
    pub start_at: Option<NaiveTime>,
    /// Check-out time of day.
    pub end_at: Option<NaiveTime>,
    /// Elapsed hours between start and end.
    pub total_hours: Option<Decimal>,
    /// Hours spent away.
    pub total_hours_out: Option<Decimal>,
    /// Attendance outcome.
    pub status: AttendanceStatus,
}

impl NewRawAttendance {
    /// Attaches an identifier, filling notes and policy flags with their defaults.
    pub fn into_record(self, id: RawAttendanceId) -> RawAttendanceRecord {
        RawAttendanceRecord {
            id,
            work_day_id: self.work_day_id,
            company_id: self.company_id,
            employee_id: self.employee_id,
            employee_name: self.employee_name,
            position: self.position,
            start_at: self.start_at,
            end_at: self.end_at,
            total_hours: self.total_hours,
            total_hours_out: self.total_hours_out,
            status: self.status,
            notes: String::new(),
            calculate_overtime: false,
            calculate_lunch_hour: true,
        }
    }
}

/// A partial change to a raw attendance record. `None` leaves a field as is.
///
/// Times are given as text; only the leading `HH:MM` is read, and a value that
/// does not parse clears the stored time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAttendanceUpdate {
    /// New check-in time of day.
    #[serde(default)]
    pub start_at: Option<String>,
    /// New check-out time of day.
    #[serde(default)]
    pub end_at: Option<String>,
    /// New notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// New status.
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    /// New overtime flag.
    #[serde(default)]
    pub calculate_overtime: Option<bool>,
    /// New lunch flag.
    #[serde(default)]
    pub calculate_lunch_hour: Option<bool>,
}

/// Parses the leading `HH:MM` of a clock string.
///
/// ```
/// use attendance_engine::models::parse_clock_time;
/// use chrono::NaiveTime;
///
/// assert_eq!(parse_clock_time("07:45:59"), NaiveTime::from_hms_opt(7, 45, 0));
/// assert_eq!(parse_clock_time("7:45"), None);
/// ```
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let head = value.get(..5)?;
    NaiveTime::parse_from_str(head, "%H:%M").ok()
}
