//! In-memory store implementation.
//!
//! [`MemoryStore`] implements every collaborator trait over `HashMap`s and
//! `Vec`s behind a single lock. It backs the tests and local development,
//! and documents the semantics a relational implementation must match.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::error::{RepositoryError, RepositoryResult};
use super::traits::{
    DeviceRegistry, EmployeeDirectory, PunchRepository, RawAttendanceRepository, WorkDayCalendar,
};
use crate::models::{
    BadgeId, CompanyId, DayType, Employee, EmployeeId, NewPunch, NewRawAttendance, PunchDirection,
    PunchId, PunchRecord, RawAttendanceId, RawAttendanceRecord, WorkDay, WorkDayId,
};

/// In-memory implementation of all store traits.
///
/// Cloning shares the underlying data.
///
/// # Example
///
/// ```
/// use attendance_engine::models::Employee;
/// use attendance_engine::repository::{EmployeeDirectory, MemoryStore};
///
/// # tokio_test_block(async {
/// let store = MemoryStore::new();
/// store.add_employee(Employee {
///     id: 1,
///     company_id: 1,
///     registration_number: "2001".to_string(),
///     first_name: "Ana".to_string(),
///     last_name: "Lima".to_string(),
///     qualification: "Welder".to_string(),
/// });
/// assert_eq!(store.employees().await.unwrap().len(), 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Runtime::new().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<MemoryData>>,
}

#[derive(Default)]
struct MemoryData {
    punches: BTreeMap<PunchId, PunchRecord>,
    raw_attendances: BTreeMap<RawAttendanceId, RawAttendanceRecord>,
    work_days: BTreeMap<WorkDayId, WorkDay>,
    employees: BTreeMap<EmployeeId, Employee>,
    devices: HashSet<String>,

    next_punch_id: PunchId,
    next_raw_attendance_id: RawAttendanceId,
    next_work_day_id: WorkDayId,

    // Failure injection
    offline: bool,
    upserts_before_failure: Option<usize>,
    report_latency: Duration,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a directory employee.
    pub fn add_employee(&self, employee: Employee) {
        if let Ok(mut data) = self.data.write() {
            data.employees.insert(employee.id, employee);
        }
    }

    /// Returns the registered device serial numbers.
    pub fn devices(&self) -> Vec<String> {
        let mut devices: Vec<String> = self
            .data
            .read()
            .map(|d| d.devices.iter().cloned().collect())
            .unwrap_or_default();
        devices.sort();
        devices
    }

    /// Makes every subsequent call fail with a connection error, or recover.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut data) = self.data.write() {
            data.offline = offline;
        }
    }

    /// Lets `count` more raw attendance upserts succeed, then fails the rest.
    pub fn fail_upserts_after(&self, count: usize) {
        if let Ok(mut data) = self.data.write() {
            data.upserts_before_failure = Some(count);
        }
    }

    /// Delays every company range query by `latency`.
    pub fn set_report_latency(&self, latency: Duration) {
        if let Ok(mut data) = self.data.write() {
            data.report_latency = latency;
        }
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, MemoryData>> {
        let data = self
            .data
            .read()
            .map_err(|_| RepositoryError::Internal("store lock poisoned".to_string()))?;
        if data.offline {
            return Err(RepositoryError::Connection("store is offline".to_string()));
        }
        Ok(data)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, MemoryData>> {
        let data = self
            .data
            .write()
            .map_err(|_| RepositoryError::Internal("store lock poisoned".to_string()))?;
        if data.offline {
            return Err(RepositoryError::Connection("store is offline".to_string()));
        }
        Ok(data)
    }
}

impl MemoryData {
    fn badge_punches(&self, badge_id: BadgeId) -> impl Iterator<Item = &PunchRecord> {
        self.punches.values().filter(move |p| p.badge_id == badge_id)
    }
}

fn punch_order(p: &PunchRecord) -> (NaiveDateTime, PunchId) {
    (p.timestamp, p.id)
}

#[async_trait]
impl PunchRepository for MemoryStore {
    async fn append_punch(&self, punch: NewPunch) -> RepositoryResult<PunchRecord> {
        let mut data = self.write()?;
        data.next_punch_id += 1;
        let record = PunchRecord {
            id: data.next_punch_id,
            badge_id: punch.badge_id,
            timestamp: punch.timestamp,
            direction: punch.direction,
            serial_number: punch.serial_number,
            uid: punch.uid,
            status: punch.status,
            punch_hint: punch.punch_hint,
        };
        data.punches.insert(record.id, record.clone());
        Ok(record)
    }

    async fn set_direction(
        &self,
        punch_id: PunchId,
        direction: PunchDirection,
    ) -> RepositoryResult<()> {
        let mut data = self.write()?;
        let punch = data
            .punches
            .get_mut(&punch_id)
            .ok_or_else(|| RepositoryError::Query(format!("punch {} does not exist", punch_id)))?;
        punch.direction = Some(direction);
        Ok(())
    }

    async fn last_punch(&self, badge_id: BadgeId) -> RepositoryResult<Option<PunchRecord>> {
        let data = self.read()?;
        Ok(data.badge_punches(badge_id).max_by_key(|p| punch_order(p)).cloned())
    }

    async fn last_classified_punch(
        &self,
        badge_id: BadgeId,
    ) -> RepositoryResult<Option<PunchRecord>> {
        let data = self.read()?;
        Ok(data
            .badge_punches(badge_id)
            .filter(|p| p.direction.is_some())
            .max_by_key(|p| punch_order(p))
            .cloned())
    }

    async fn first_in_of_day(
        &self,
        badge_id: BadgeId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<PunchRecord>> {
        let data = self.read()?;
        Ok(data
            .badge_punches(badge_id)
            .filter(|p| p.timestamp.date() == date && p.is(PunchDirection::In))
            .min_by_key(|p| punch_order(p))
            .cloned())
    }

    async fn punches_between(
        &self,
        badge_id: BadgeId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> RepositoryResult<Vec<PunchRecord>> {
        let data = self.read()?;
        let mut punches: Vec<PunchRecord> = data
            .badge_punches(badge_id)
            .filter(|p| p.timestamp >= start && p.timestamp <= end)
            .cloned()
            .collect();
        punches.sort_by_key(punch_order);
        Ok(punches)
    }
}

#[async_trait]
impl RawAttendanceRepository for MemoryStore {
    async fn upsert_raw_attendance(
        &self,
        record: NewRawAttendance,
    ) -> RepositoryResult<RawAttendanceRecord> {
        let mut data = self.write()?;

        if let Some(remaining) = data.upserts_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(RepositoryError::Query(
                    "raw attendance write rejected".to_string(),
                ));
            }
            *remaining -= 1;
        }

        let existing = data
            .raw_attendances
            .values()
            .find(|r| r.work_day_id == record.work_day_id && r.employee_id == record.employee_id)
            .map(|r| (r.id, r.notes.clone(), r.calculate_overtime, r.calculate_lunch_hour));

        let stored = match existing {
            Some((id, notes, calculate_overtime, calculate_lunch_hour)) => RawAttendanceRecord {
                notes,
                calculate_overtime,
                calculate_lunch_hour,
                ..record.into_record(id)
            },
            None => {
                data.next_raw_attendance_id += 1;
                record.into_record(data.next_raw_attendance_id)
            }
        };

        data.raw_attendances.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn raw_attendance(
        &self,
        id: RawAttendanceId,
    ) -> RepositoryResult<Option<RawAttendanceRecord>> {
        let data = self.read()?;
        Ok(data.raw_attendances.get(&id).cloned())
    }

    async fn save_raw_attendance(&self, record: &RawAttendanceRecord) -> RepositoryResult<()> {
        let mut data = self.write()?;
        match data.raw_attendances.get_mut(&record.id) {
            Some(stored) => {
                *stored = record.clone();
                Ok(())
            }
            None => Err(RepositoryError::Query(format!(
                "raw attendance {} does not exist",
                record.id
            ))),
        }
    }

    async fn raw_attendance_for_work_day(
        &self,
        work_day_id: WorkDayId,
    ) -> RepositoryResult<Vec<RawAttendanceRecord>> {
        let data = self.read()?;
        let mut records: Vec<RawAttendanceRecord> = data
            .raw_attendances
            .values()
            .filter(|r| r.work_day_id == work_day_id)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.employee_id);
        Ok(records)
    }

    async fn raw_attendance_for_company(
        &self,
        company_id: CompanyId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RepositoryResult<Vec<RawAttendanceRecord>> {
        let latency = self.read()?.report_latency;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let data = self.read()?;
        let in_range: HashMap<WorkDayId, NaiveDate> = data
            .work_days
            .values()
            .filter(|w| w.date >= start && w.date <= end)
            .map(|w| (w.id, w.date))
            .collect();

        Ok(data
            .raw_attendances
            .values()
            .filter(|r| r.company_id == company_id && in_range.contains_key(&r.work_day_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WorkDayCalendar for MemoryStore {
    async fn create_work_day(
        &self,
        date: NaiveDate,
        day_type: DayType,
    ) -> RepositoryResult<WorkDay> {
        let mut data = self.write()?;
        if data.work_days.values().any(|w| w.date == date) {
            return Err(RepositoryError::Conflict(format!(
                "work day for {} already exists",
                date
            )));
        }
        data.next_work_day_id += 1;
        let work_day = WorkDay {
            id: data.next_work_day_id,
            date,
            day_type,
        };
        data.work_days.insert(work_day.id, work_day.clone());
        Ok(work_day)
    }

    async fn work_day(&self, id: WorkDayId) -> RepositoryResult<Option<WorkDay>> {
        let data = self.read()?;
        Ok(data.work_days.get(&id).cloned())
    }

    async fn work_day_by_date(&self, date: NaiveDate) -> RepositoryResult<Option<WorkDay>> {
        let data = self.read()?;
        Ok(data.work_days.values().find(|w| w.date == date).cloned())
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn employee(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>> {
        let data = self.read()?;
        Ok(data.employees.get(&id).cloned())
    }

    async fn employees(&self) -> RepositoryResult<Vec<Employee>> {
        let data = self.read()?;
        Ok(data.employees.values().cloned().collect())
    }
}

#[async_trait]
impl DeviceRegistry for MemoryStore {
    async fn ensure_device(&self, serial_number: &str) -> RepositoryResult<bool> {
        let mut data = self.write()?;
        Ok(data.devices.insert(serial_number.to_string()))
    }
}
