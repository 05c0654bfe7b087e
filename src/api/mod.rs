//! HTTP API module for the Attendance Engine.
//!
//! This module exposes punch ingestion, daily windows, work-day generation,
//! raw attendance edits and payroll reports as JSON endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AttendanceLogRequest, CreateWorkDayRequest, DailyWindowQuery, PayrollReportQuery};
pub use response::{ApiError, ApiErrorResponse};
pub use state::AppState;
