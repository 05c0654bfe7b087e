//! The attendance engine.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::clock::{Clock, SystemClock};
use crate::calculation::{
    ClassificationContext, aggregate_payroll, attendance_status, clock_hours,
    decode_device_record, hours_out, reconstruct_daily_window,
};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{AttendanceEvent, EventPublisher, NullPublisher};
use crate::models::{
    BadgeId, CompanyId, DailyWindow, DayType, Employee, EmployeeId, NewPunch, NewRawAttendance,
    PayrollReport, PunchRecord, RawAttendanceId, RawDeviceEvent, RawAttendanceRecord, RawAttendanceUpdate,
    WorkDay, WorkDayId, parse_clock_time,
};
use crate::repository::{
    DeviceRegistry, EmployeeDirectory, PunchRepository, RawAttendanceRepository, WorkDayCalendar,
};

/// A newly created work day and the attendance generated for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedWorkDay {
    /// The created work day.
    pub work_day: WorkDay,
    /// One record per employee with a window on that date.
    pub records: Vec<RawAttendanceRecord>,
}

/// Orchestrates decoding, classification, workday generation and payroll.
///
/// The engine holds no attendance state of its own apart from one lock per
/// badge, which serializes classification of a single employee's punches.
pub struct AttendanceEngine {
    punches: Arc<dyn PunchRepository>,
    raw_attendance: Arc<dyn RawAttendanceRepository>,
    calendar: Arc<dyn WorkDayCalendar>,
    directory: Arc<dyn EmployeeDirectory>,
    devices: Arc<dyn DeviceRegistry>,
    publisher: Arc<dyn EventPublisher>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    badge_locks: Mutex<HashMap<BadgeId, Arc<tokio::sync::Mutex<()>>>>,
}

impl AttendanceEngine {
    /// Creates an engine over a store that implements every collaborator.
    ///
    /// Events go nowhere and "today" comes from the system clock until
    /// [`with_publisher`](Self::with_publisher) and
    /// [`with_clock`](Self::with_clock) say otherwise.
    pub fn new<S>(store: Arc<S>, config: EngineConfig) -> Self
    where
        S: PunchRepository
            + RawAttendanceRepository
            + WorkDayCalendar
            + EmployeeDirectory
            + DeviceRegistry
            + 'static,
    {
        Self {
            punches: store.clone(),
            raw_attendance: store.clone(),
            calendar: store.clone(),
            directory: store.clone(),
            devices: store,
            publisher: Arc::new(NullPublisher),
            clock: Arc::new(SystemClock),
            config,
            badge_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replaces the event publisher.
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Replaces the clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decodes a terminal record, classifies its direction and stores it.
    ///
    /// Unknown terminals are registered on first sight. The punch is
    /// classified against the badge's last classified punch; a trailing
    /// punch stored without a direction is classified first.
    pub async fn decode_and_classify(
        &self,
        serial_number: &str,
        hex_payload: &str,
    ) -> EngineResult<PunchRecord> {
        let serial_number = serial_number.trim();
        if serial_number.is_empty() {
            return Err(EngineError::validation(
                "serial_number",
                "must not be blank",
            ));
        }

        let event = decode_device_record(serial_number, hex_payload)?;

        if self.devices.ensure_device(serial_number).await? {
            info!(serial_number = %serial_number, "Registered unknown device");
        }

        let badge_id = event.badge_id;
        let lock = self.badge_lock(badge_id);
        let appended = {
            let _guard = lock.lock().await;
            self.classify_and_append(event).await
        };
        self.release_badge_lock(badge_id, lock);
        let record = appended?;

        info!(
            badge_id = badge_id,
            punch_id = record.id,
            serial_number = %record.serial_number,
            direction = ?record.direction,
            "Punch recorded"
        );

        self.publish(AttendanceEvent::PunchRecorded(record.clone()));
        Ok(record)
    }

    /// Reconstructs the daily window of an employee on `date`.
    ///
    /// Returns `Ok(None)` when the employee has no window that day.
    pub async fn reconstruct_daily_window(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> EngineResult<Option<DailyWindow>> {
        let employee = self
            .directory
            .employee(employee_id)
            .await?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))?;
        let badge_id = employee
            .badge_id()
            .ok_or_else(|| EngineError::not_found("badge", &employee.registration_number))?;

        let (window, _) = self.load_window(badge_id, date).await?;
        Ok(window)
    }

    /// Creates a work day for a past date and generates its attendance.
    ///
    /// A date has at most one work day. Creating a date that already has one
    /// keeps the existing work day, including its day type, and regenerates
    /// its attendance.
    pub async fn create_work_day(
        &self,
        date: NaiveDate,
        day_type: DayType,
    ) -> EngineResult<GeneratedWorkDay> {
        self.ensure_past(date)?;

        let work_day = match self.calendar.work_day_by_date(date).await? {
            Some(existing) => {
                info!(
                    work_day_id = existing.id,
                    date = %date,
                    "Work day exists; regenerating attendance"
                );
                existing
            }
            None => {
                let created = self.calendar.create_work_day(date, day_type).await?;
                info!(work_day_id = created.id, date = %date, "Work day created");
                created
            }
        };

        let records = self.generate_workday_attendance(work_day.id).await?;
        Ok(GeneratedWorkDay { work_day, records })
    }

    /// Generates one raw attendance record per employee with a window on the
    /// work day's date.
    ///
    /// Records are upserted by work day and employee, so running generation
    /// again refreshes the computed fields in place. The first store failure
    /// aborts the run; records written before it are kept.
    pub async fn generate_workday_attendance(
        &self,
        work_day_id: WorkDayId,
    ) -> EngineResult<Vec<RawAttendanceRecord>> {
        let work_day = self.work_day(work_day_id).await?;
        self.ensure_past(work_day.date)?;

        let started = Instant::now();
        let employees = self.directory.employees().await?;
        info!(
            work_day_id = work_day_id,
            date = %work_day.date,
            employees = employees.len(),
            "Generating work day attendance"
        );

        let mut records = Vec::new();
        for employee in &employees {
            let Some(badge_id) = employee.badge_id() else {
                debug!(
                    employee_id = employee.id,
                    registration_number = %employee.registration_number,
                    "Skipping employee without a badge number"
                );
                continue;
            };

            let (window, punches) = match self.load_window(badge_id, work_day.date).await {
                Ok(loaded) => loaded,
                Err(err) => {
                    error!(
                        work_day_id = work_day_id,
                        employee_id = employee.id,
                        error = %err,
                        "Failed to load punches; aborting generation"
                    );
                    return Err(err);
                }
            };
            let Some(window) = window else {
                continue;
            };

            let new_record = attendance_for(work_day_id, employee, &window, &punches);
            match self.raw_attendance.upsert_raw_attendance(new_record).await {
                Ok(record) => records.push(record),
                Err(err) => {
                    error!(
                        work_day_id = work_day_id,
                        employee_id = employee.id,
                        written = records.len(),
                        error = %err,
                        "Failed to store raw attendance; aborting generation"
                    );
                    return Err(err.into());
                }
            }
        }

        info!(
            work_day_id = work_day_id,
            records = records.len(),
            duration_us = started.elapsed().as_micros(),
            "Work day attendance generated"
        );

        self.publish(AttendanceEvent::WorkDayGenerated {
            work_day_id,
            records: records.len(),
        });
        Ok(records)
    }

    /// Applies a partial change to a raw attendance record.
    ///
    /// Times are read as `HH:MM`; a time that does not parse is cleared.
    /// Whenever a time is supplied, total hours are recomputed from the
    /// resulting start and end, and cleared if either is missing.
    pub async fn update_raw_attendance(
        &self,
        id: RawAttendanceId,
        update: RawAttendanceUpdate,
    ) -> EngineResult<RawAttendanceRecord> {
        let mut record = self
            .raw_attendance
            .raw_attendance(id)
            .await?
            .ok_or_else(|| EngineError::not_found("raw attendance", id))?;

        let times_changed = update.start_at.is_some() || update.end_at.is_some();
        if let Some(start_at) = update.start_at {
            record.start_at = parse_clock_time(&start_at);
        }
        if let Some(end_at) = update.end_at {
            record.end_at = parse_clock_time(&end_at);
        }
        if times_changed {
            record.total_hours = recompute_total(record.start_at, record.end_at);
        }
        if let Some(notes) = update.notes {
            record.notes = notes;
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(calculate_overtime) = update.calculate_overtime {
            record.calculate_overtime = calculate_overtime;
        }
        if let Some(calculate_lunch_hour) = update.calculate_lunch_hour {
            record.calculate_lunch_hour = calculate_lunch_hour;
        }

        self.raw_attendance.save_raw_attendance(&record).await?;
        info!(
            raw_attendance_id = id,
            work_day_id = record.work_day_id,
            employee_id = record.employee_id,
            "Raw attendance updated"
        );

        self.publish(AttendanceEvent::RawAttendanceUpdated(record.clone()));
        Ok(record)
    }

    /// Returns a work day.
    pub async fn work_day(&self, id: WorkDayId) -> EngineResult<WorkDay> {
        self.calendar
            .work_day(id)
            .await?
            .ok_or_else(|| EngineError::not_found("work day", id))
    }

    /// Returns the raw attendance of a work day, ordered by employee.
    pub async fn raw_attendance_for_work_day(
        &self,
        work_day_id: WorkDayId,
    ) -> EngineResult<Vec<RawAttendanceRecord>> {
        self.work_day(work_day_id).await?;
        Ok(self
            .raw_attendance
            .raw_attendance_for_work_day(work_day_id)
            .await?)
    }

    /// Aggregates a company's attendance between `start_date` and
    /// `end_date` (inclusive) into workday units per employee.
    ///
    /// The whole report fails with [`EngineError::DeadlineExceeded`] if it
    /// does not finish within `deadline`, or the configured report deadline
    /// when `None`.
    pub async fn generate_payroll_report(
        &self,
        company_id: CompanyId,
        start_date: NaiveDate,
        end_date: NaiveDate,
        deadline: Option<Duration>,
    ) -> EngineResult<PayrollReport> {
        if company_id == 0 {
            return Err(EngineError::validation("company_id", "is required"));
        }
        if start_date > end_date {
            return Err(EngineError::validation(
                "start_date",
                format!("{} is after end date {}", start_date, end_date),
            ));
        }

        let deadline =
            deadline.unwrap_or_else(|| Duration::from_millis(self.config.reports.deadline_ms));
        let started = Instant::now();

        let rows = tokio::time::timeout(deadline, async {
            let records = self
                .raw_attendance
                .raw_attendance_for_company(company_id, start_date, end_date)
                .await?;
            Ok::<_, EngineError>(aggregate_payroll(&records, &self.config.payroll))
        })
        .await
        .map_err(|_| {
            warn!(
                company_id = company_id,
                timeout_ms = deadline.as_millis() as u64,
                "Payroll report exceeded its deadline"
            );
            EngineError::DeadlineExceeded {
                operation: "payroll report",
                timeout_ms: deadline.as_millis() as u64,
            }
        })??;

        info!(
            company_id = company_id,
            start_date = %start_date,
            end_date = %end_date,
            rows = rows.len(),
            duration_us = started.elapsed().as_micros(),
            "Payroll report generated"
        );

        Ok(PayrollReport {
            company_id,
            start_date,
            end_date,
            rows,
        })
    }

    /// Classifies and stores one punch. Callers hold the badge lock.
    async fn classify_and_append(&self, event: RawDeviceEvent) -> EngineResult<PunchRecord> {
        let badge_id = event.badge_id;
        let context = self.classification_context(badge_id).await?;
        let first_in = self.first_in_for(&context).await?;
        let direction = context.classify(
            event.timestamp,
            first_in,
            self.config.classification.max_shift_hours,
        );
        debug!(
            badge_id = badge_id,
            timestamp = %event.timestamp,
            direction = %direction,
            "Classified punch"
        );

        Ok(self
            .punches
            .append_punch(NewPunch::from_event(event, direction))
            .await?)
    }

    fn badge_lock(&self, badge_id: BadgeId) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .badge_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(badge_id).or_default().clone()
    }

    /// Drops the badge's lock entry once no other task holds or awaits it.
    fn release_badge_lock(&self, badge_id: BadgeId, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .badge_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // One reference in the map, one in `lock`.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&badge_id);
        }
    }

    async fn classification_context(
        &self,
        badge_id: BadgeId,
    ) -> EngineResult<ClassificationContext> {
        let last = self.punches.last_punch(badge_id).await?;

        match last {
            Some(pending) if pending.direction.is_none() => {
                let prior = self.punches.last_classified_punch(badge_id).await?;
                let mut context = ClassificationContext::new(badge_id, prior);
                let first_in = self.first_in_for(&context).await?;
                let direction = context.classify(
                    pending.timestamp,
                    first_in,
                    self.config.classification.max_shift_hours,
                );

                self.punches.set_direction(pending.id, direction).await?;
                debug!(
                    badge_id = badge_id,
                    punch_id = pending.id,
                    direction = %direction,
                    "Backfilled direction of preceding punch"
                );

                context.record(PunchRecord {
                    direction: Some(direction),
                    ..pending
                });
                Ok(context)
            }
            last => Ok(ClassificationContext::new(badge_id, last)),
        }
    }

    async fn first_in_for(
        &self,
        context: &ClassificationContext,
    ) -> EngineResult<Option<NaiveDateTime>> {
        let Some(date) = context.first_in_lookup_date() else {
            return Ok(None);
        };
        let first_in = self
            .punches
            .first_in_of_day(context.badge_id(), date)
            .await?;
        Ok(first_in.map(|p| p.timestamp))
    }

    async fn load_window(
        &self,
        badge_id: BadgeId,
        date: NaiveDate,
    ) -> EngineResult<(Option<DailyWindow>, Vec<PunchRecord>)> {
        let next_day = date
            .checked_add_days(Days::new(1))
            .ok_or_else(|| EngineError::validation("date", "is out of range"))?;
        let start = date.and_time(NaiveTime::MIN);
        let end = next_day.and_hms_opt(23, 59, 59).unwrap_or(start);

        let punches = self.punches.punches_between(badge_id, start, end).await?;
        let window = reconstruct_daily_window(badge_id, date, &punches);
        Ok((window, punches))
    }

    fn ensure_past(&self, date: NaiveDate) -> EngineResult<()> {
        let today = self.clock.today();
        if date >= today {
            return Err(EngineError::validation(
                "date",
                format!("work day {} must be before {}", date, today),
            ));
        }
        Ok(())
    }

    fn publish(&self, event: AttendanceEvent) {
        let topic = event.topic();
        if let Err(err) = self.publisher.publish(event) {
            warn!(topic = topic, error = %err, "Failed to publish event");
        }
    }
}

fn attendance_for(
    work_day_id: WorkDayId,
    employee: &Employee,
    window: &DailyWindow,
    punches: &[PunchRecord],
) -> NewRawAttendance {
    let (total_hours, total_hours_out) = match (window.check_in, window.check_out) {
        (Some(check_in), Some(check_out)) => (
            Some(clock_hours(check_in.time(), check_out.time())),
            Some(hours_out(punches, check_in, check_out)),
        ),
        _ => (None, None),
    };

    NewRawAttendance {
        work_day_id,
        company_id: employee.company_id,
        employee_id: employee.id,
        employee_name: employee.display_name(),
        position: employee.position(),
        start_at: window.check_in.map(|t| t.time()),
        end_at: window.check_out.map(|t| t.time()),
        total_hours,
        total_hours_out,
        status: attendance_status(window.check_in, window.check_out),
    }
}

fn recompute_total(start_at: Option<NaiveTime>, end_at: Option<NaiveTime>) -> Option<Decimal> {
    Some(clock_hours(start_at?, end_at?))
}
