//! Collaborator traits the engine consumes.
//!
//! Each trait is a narrow view over the backing store. Implementations must
//! be `Send + Sync` so the engine can share them across request tasks.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::error::RepositoryResult;
use crate::models::{
    BadgeId, CompanyId, DayType, Employee, EmployeeId, NewPunch, NewRawAttendance, PunchDirection,
    PunchId, PunchRecord, RawAttendanceId, RawAttendanceRecord, WorkDay, WorkDayId,
};

/// Storage for the punch log.
#[async_trait]
pub trait PunchRepository: Send + Sync {
    /// Appends a punch and returns it with its assigned identifier.
    async fn append_punch(&self, punch: NewPunch) -> RepositoryResult<PunchRecord>;

    /// Sets the direction of an existing punch.
    async fn set_direction(
        &self,
        punch_id: PunchId,
        direction: PunchDirection,
    ) -> RepositoryResult<()>;

    /// Returns the badge's latest punch, classified or not.
    async fn last_punch(&self, badge_id: BadgeId) -> RepositoryResult<Option<PunchRecord>>;

    /// Returns the badge's latest punch that carries a direction.
    async fn last_classified_punch(
        &self,
        badge_id: BadgeId,
    ) -> RepositoryResult<Option<PunchRecord>>;

    /// Returns the earliest IN punch of the badge on `date`.
    async fn first_in_of_day(
        &self,
        badge_id: BadgeId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<PunchRecord>>;

    /// Returns the badge's punches with `start <= timestamp <= end`, ordered by time.
    async fn punches_between(
        &self,
        badge_id: BadgeId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<PunchRecord>>;
}

/// Storage for raw attendance records.
#[async_trait]
pub trait RawAttendanceRepository: Send + Sync {
    /// Inserts a record, or replaces the computed fields of the existing
    /// record for the same work day and employee. Notes and policy flags of
    /// an existing record are kept.
    async fn upsert_raw_attendance(
        &self,
        record: NewRawAttendance,
    ) -> RepositoryResult<RawAttendanceRecord>;

    /// Returns a record by identifier.
    async fn raw_attendance(
        &self,
        id: RawAttendanceId,
    ) -> RepositoryResult<Option<RawAttendanceRecord>>;

    /// Overwrites a stored record.
    async fn save_raw_attendance(&self, record: &RawAttendanceRecord) -> RepositoryResult<()>;

    /// Returns the records of one work day, ordered by employee id.
    async fn raw_attendance_for_work_day(
        &self,
        work_day_id: WorkDayId,
    ) -> RepositoryResult<Vec<RawAttendanceRecord>>;

    /// Returns a company's records whose work day date lies in `start..=end`.
    async fn raw_attendance_for_company(
        &self,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RawAttendanceRecord>>;
}

/// The work-day calendar.
#[async_trait]
pub trait WorkDayCalendar: Send + Sync {
    /// Creates a work day. A date holds at most one work day.
    async fn create_work_day(&self, date: NaiveDate, day_type: DayType)
    -> RepositoryResult<WorkDay>;

    /// Returns a work day by identifier.
    async fn work_day(&self, id: WorkDayId) -> RepositoryResult<Option<WorkDay>>;

    /// Returns the work day on `date`, if one exists.
    async fn work_day_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<WorkDay>>;
}

/// The employee/company directory.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Returns an employee by identifier.
    async fn employee(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>>;

    /// Returns every employee, ordered by identifier.
    async fn employees(&self) -> RepositoryResult<Vec<Employee>>;
}

/// Registry of known punch terminals.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// Registers `serial_number` if it is unknown. Returns true when a new
    /// device was registered.
    async fn ensure_device(&self, serial_number: &str) -> RepositoryResult<bool>;
}
