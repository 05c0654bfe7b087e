//! Workday unit aggregation for payroll.
//!
//! Each raw attendance record is turned into a daily credit of net hours:
//!
//! ```text
//! net          = total_hours - total_hours_out - (lunch_deduction if lunch flag)
//! daily_credit = net                 if net <= hours_per_workday or overtime flag
//!              = hours_per_workday   otherwise
//! ```
//!
//! and an employee's credits over a range become workday units:
//!
//! ```text
//! units = round((sum(daily_credit) / hours_per_workday) / increment) * increment
//! ```
//!
//! with midpoints rounded away from zero.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PayrollPolicy;
use crate::models::{EmployeeId, PayrollReportRow, RawAttendanceRecord};

/// Computes the daily credit of one record.
///
/// Returns `None` when the record has no total hours or no away hours, in
/// which case it contributes nothing to the employee's sum.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::daily_credit;
/// use attendance_engine::config::PayrollPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PayrollPolicy::default();
/// let credit = daily_credit(Some(Decimal::new(95, 1)), Some(Decimal::ZERO), true, false, &policy);
/// assert_eq!(credit, Some(Decimal::new(85, 1)));
/// ```
pub fn daily_credit(
    total_hours: Option<Decimal>,
    total_hours_out: Option<Decimal>,
    calculate_lunch_hour: bool,
    calculate_overtime: bool,
    policy: &PayrollPolicy,
) -> Option<Decimal> {
    let lunch = if calculate_lunch_hour {
        policy.lunch_deduction_hours
    } else {
        Decimal::ZERO
    };
    let net = total_hours? - total_hours_out? - lunch;

    if net > policy.hours_per_workday && !calculate_overtime {
        Some(policy.hours_per_workday)
    } else {
        Some(net)
    }
}

/// Daily credit of a stored record.
pub fn record_credit(record: &RawAttendanceRecord, policy: &PayrollPolicy) -> Option<Decimal> {
    daily_credit(
        record.total_hours,
        record.total_hours_out,
        record.calculate_lunch_hour,
        record.calculate_overtime,
        policy,
    )
}

/// Converts summed daily credit into rounded workday units.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::workday_units;
/// use attendance_engine::config::PayrollPolicy;
/// use rust_decimal::Decimal;
///
/// let policy = PayrollPolicy::default();
/// assert_eq!(workday_units(Decimal::from(18), &policy), Decimal::from(2));
/// assert_eq!(workday_units(Decimal::new(205, 1), &policy), Decimal::new(25, 1));
/// ```
pub fn workday_units(total_credit: Decimal, policy: &PayrollPolicy) -> Decimal {
    let steps = total_credit / policy.hours_per_workday / policy.rounding_increment;
    (steps.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * policy.rounding_increment)
        .normalize()
}

/// Aggregates records into one payroll row per employee, ordered by employee id.
///
/// Employees whose records all lack hours still get a row with zero units.
/// The name on each row is the smallest name snapshot among the
/// employee's records.
pub fn aggregate_payroll(
    records: &[RawAttendanceRecord],
    policy: &PayrollPolicy,
) -> Vec<PayrollReportRow> {
    let mut per_employee: BTreeMap<EmployeeId, (String, Decimal)> = BTreeMap::new();

    for record in records {
        let credit = record_credit(record, policy).unwrap_or(Decimal::ZERO);
        per_employee
            .entry(record.employee_id)
            .and_modify(|(name, total)| {
                if record.employee_name < *name {
                    *name = record.employee_name.clone();
                }
                *total += credit;
            })
            .or_insert_with(|| (record.employee_name.clone(), credit));
    }

    per_employee
        .into_iter()
        .map(|(employee_id, (employee_name, total))| PayrollReportRow {
            employee_id,
            employee_name,
            work_days: workday_units(total, policy),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttendanceStatus;
    use proptest::prelude::*;

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    fn policy() -> PayrollPolicy {
        PayrollPolicy::default()
    }

    fn record(employee_id: u64, total: Option<Decimal>, out: Option<Decimal>) -> RawAttendanceRecord {
        RawAttendanceRecord {
            id: 0,
            work_day_id: 1,
            company_id: 1,
            employee_id,
            employee_name: format!("Employee {}", employee_id),
            position: None,
            start_at: None,
            end_at: None,
            total_hours: total,
            total_hours_out: out,
            status: AttendanceStatus::Present,
            notes: String::new(),
            calculate_overtime: false,
            calculate_lunch_hour: true,
        }
    }

    #[test]
    fn test_under_cap_with_lunch() {
        let credit = daily_credit(Some(dec(95, 1)), Some(Decimal::ZERO), true, false, &policy());
        assert_eq!(credit, Some(dec(85, 1)));
    }

    #[test]
    fn test_over_cap_without_overtime_is_capped() {
        // 12h - 0h - 1h lunch = 11h net.
        let credit = daily_credit(Some(dec(12, 0)), Some(Decimal::ZERO), true, false, &policy());
        assert_eq!(credit, Some(dec(9, 0)));
    }

    #[test]
    fn test_over_cap_with_overtime_is_uncapped() {
        let credit = daily_credit(Some(dec(12, 0)), Some(Decimal::ZERO), true, true, &policy());
        assert_eq!(credit, Some(dec(11, 0)));
    }

    #[test]
    fn test_lunch_flag_off_skips_deduction() {
        let credit = daily_credit(Some(dec(8, 0)), Some(dec(5, 1)), false, false, &policy());
        assert_eq!(credit, Some(dec(75, 1)));
    }

    #[test]
    fn test_exactly_at_cap_is_kept() {
        let credit = daily_credit(Some(dec(10, 0)), Some(Decimal::ZERO), true, false, &policy());
        assert_eq!(credit, Some(dec(9, 0)));
    }

    #[test]
    fn test_missing_hours_contribute_nothing() {
        assert_eq!(daily_credit(None, Some(Decimal::ZERO), true, false, &policy()), None);
        assert_eq!(daily_credit(Some(dec(9, 0)), None, true, false, &policy()), None);
    }

    #[test]
    fn test_negative_net_is_not_clamped() {
        let credit = daily_credit(Some(dec(5, 1)), Some(Decimal::ZERO), true, false, &policy());
        assert_eq!(credit, Some(dec(-5, 1)));
    }

    #[test]
    fn test_two_capped_days_make_two_units() {
        let records = vec![
            record(10, Some(dec(12, 0)), Some(Decimal::ZERO)),
            record(10, Some(dec(13, 0)), Some(dec(1, 0))),
        ];

        let rows = aggregate_payroll(&records, &policy());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].work_days, dec(2, 0));
    }

    #[test]
    fn test_units_round_to_nearest_half() {
        // 8.5 / 9 = 0.944 -> 1.0
        assert_eq!(workday_units(dec(85, 1), &policy()), dec(1, 0));
        // 6 / 9 = 0.667 -> 0.5
        assert_eq!(workday_units(dec(6, 0), &policy()), dec(5, 1));
        // 6.75 / 9 = 0.75 -> midpoint rounds away from zero -> 1.0
        assert_eq!(workday_units(dec(675, 2), &policy()), dec(1, 0));
        assert_eq!(workday_units(Decimal::ZERO, &policy()), Decimal::ZERO);
    }

    #[test]
    fn test_rows_are_per_employee_and_ordered() {
        let records = vec![
            record(20, Some(dec(10, 0)), Some(Decimal::ZERO)),
            record(10, Some(dec(10, 0)), Some(Decimal::ZERO)),
            record(20, Some(dec(10, 0)), Some(Decimal::ZERO)),
        ];

        let rows = aggregate_payroll(&records, &policy());
        let ids: Vec<u64> = rows.iter().map(|r| r.employee_id).collect();
        assert_eq!(ids, vec![10, 20]);
        assert_eq!(rows[0].work_days, dec(1, 0));
        assert_eq!(rows[1].work_days, dec(2, 0));
    }

    #[test]
    fn test_employee_without_hours_still_listed() {
        let records = vec![record(30, None, None)];
        let rows = aggregate_payroll(&records, &policy());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].work_days, Decimal::ZERO);
    }

    #[test]
    fn test_smallest_name_snapshot_wins() {
        let mut first = record(10, Some(dec(10, 0)), Some(Decimal::ZERO));
        first.employee_name = "Maria Souza".to_string();
        let mut second = first.clone();
        second.employee_name = "Maria Silva".to_string();

        let rows = aggregate_payroll(&[first, second], &policy());
        assert_eq!(rows[0].employee_name, "Maria Silva");
    }

    proptest! {
        #[test]
        fn prop_units_are_multiples_of_increment(minutes in 0i64..(31 * 24 * 60)) {
            let credit = Decimal::from(minutes) / Decimal::from(60);
            let units = workday_units(credit, &policy());
            prop_assert_eq!((units / dec(5, 1)).fract(), Decimal::ZERO);
        }

        #[test]
        fn prop_capped_credit_never_exceeds_workday(total in 0i64..(24 * 60), out in 0i64..(4 * 60)) {
            let total = Decimal::from(total) / Decimal::from(60);
            let out = Decimal::from(out) / Decimal::from(60);
            let credit = daily_credit(Some(total), Some(out), true, false, &policy()).unwrap();
            prop_assert!(credit <= Decimal::from(9));
        }
    }
}
