//! Request types for the Attendance Engine API.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{CompanyId, DayType};

/// Request body for `POST /attendance-logs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLogRequest {
    /// Serial number of the reporting terminal.
    pub serial_number: String,
    /// Hex-encoded device record.
    pub hex_data: String,
}

/// Query string of `GET /employees/:id/daily-window`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyWindowQuery {
    /// Calendar date of the window.
    pub date: NaiveDate,
}

/// Request body for `POST /workdays`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkDayRequest {
    /// Date of the work day; must be in the past.
    pub date: NaiveDate,
    /// Kind of day, `workday` when omitted.
    #[serde(default = "default_day_type")]
    pub day_type: DayType,
}

fn default_day_type() -> DayType {
    DayType::Workday
}

/// Query string of `GET /reports/payroll`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollReportQuery {
    /// Company to report on.
    pub company_id: CompanyId,
    /// First date of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the range (inclusive).
    pub end_date: NaiveDate,
    /// Overrides the configured report deadline.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}
