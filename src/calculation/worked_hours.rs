//! Worked and away hours for a daily window.

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;

use crate::models::{AttendanceStatus, PunchDirection, PunchRecord};

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Elapsed hours from `start` to `end` by clock time.
///
/// Only hours and minutes are read. An `end` earlier than `start` is taken
/// to be on the next day.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::clock_hours;
/// use chrono::NaiveTime;
/// use rust_decimal::Decimal;
///
/// let start = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
/// let end = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
/// assert_eq!(clock_hours(start, end), Decimal::from(8));
/// ```
pub fn clock_hours(start: NaiveTime, end: NaiveTime) -> Decimal {
    let to_minutes = |t: NaiveTime| i64::from(t.hour() * 60 + t.minute());

    let mut minutes = to_minutes(end) - to_minutes(start);
    if minutes < 0 {
        minutes += MINUTES_PER_DAY;
    }

    Decimal::from(minutes) / Decimal::from(60)
}

/// Time spent away between `check_in` and `check_out`, in hours.
///
/// Punches in the inclusive range are walked in time order; every IN that
/// directly follows an OUT contributes the gap between the two.
pub fn hours_out(
    punches: &[PunchRecord],
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Decimal {
    let mut in_range: Vec<&PunchRecord> = punches
        .iter()
        .filter(|p| p.timestamp >= check_in && p.timestamp <= check_out)
        .collect();
    in_range.sort_by_key(|p| (p.timestamp, p.id));

    let (seconds, _) = in_range.into_iter().fold(
        (0i64, None::<&PunchRecord>),
        |(total, previous), punch| {
            let gap = match previous {
                Some(prev) if prev.is(PunchDirection::Out) && punch.is(PunchDirection::In) => {
                    (punch.timestamp - prev.timestamp).num_seconds()
                }
                _ => 0,
            };
            (total + gap, Some(punch))
        },
    );

    Decimal::from(seconds) / Decimal::from(3600)
}

/// Attendance status for a window.
///
/// Present only when both ends are known and the clock span is positive.
pub fn attendance_status(
    check_in: Option<NaiveDateTime>,
    check_out: Option<NaiveDateTime>,
) -> AttendanceStatus {
    match (check_in, check_out) {
        (Some(start), Some(end)) if clock_hours(start.time(), end.time()) > Decimal::ZERO => {
            AttendanceStatus::Present
        }
        _ => AttendanceStatus::Absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn log(entries: &[(&str, PunchDirection)]) -> Vec<PunchRecord> {
        entries.iter()
            .enumerate()
            .map(|(i, (at, direction))| PunchRecord {
                id: i as u64 + 1,
                badge_id: 2001,
                timestamp: t(at),
                direction: Some(*direction),
                serial_number: "SN".to_string(),
                uid: 1,
                status: 1,
                punch_hint: 0,
            })
            .collect()
    }

    use PunchDirection::{In, Out};

    #[test]
    fn test_clock_hours_same_day() {
        assert_eq!(clock_hours(hm(8, 0), hm(17, 0)), Decimal::from(9));
        assert_eq!(clock_hours(hm(8, 0), hm(17, 30)), Decimal::new(95, 1));
    }

    #[test]
    fn test_clock_hours_wraps_past_midnight() {
        assert_eq!(clock_hours(hm(22, 0), hm(6, 0)), Decimal::from(8));
        assert_eq!(clock_hours(hm(23, 45), hm(0, 15)), Decimal::new(5, 1));
    }

    #[test]
    fn test_clock_hours_ignores_seconds() {
        let start = NaiveTime::from_hms_opt(8, 0, 59).unwrap();
        let end = NaiveTime::from_hms_opt(9, 0, 1).unwrap();
        assert_eq!(clock_hours(start, end), Decimal::ONE);
    }

    #[test]
    fn test_clock_hours_equal_times_is_zero() {
        assert_eq!(clock_hours(hm(8, 0), hm(8, 0)), Decimal::ZERO);
    }

    #[test]
    fn test_hours_out_single_lunch() {
        let punches = log(&[
            ("2026-01-15 08:00:00", In),
            ("2026-01-15 12:30:00", Out),
            ("2026-01-15 13:00:00", In),
            ("2026-01-15 17:00:00", Out),
        ]);

        let away = hours_out(&punches, t("2026-01-15 08:00:00"), t("2026-01-15 17:00:00"));
        assert_eq!(away, Decimal::new(5, 1));
    }

    #[test]
    fn test_hours_out_sums_multiple_breaks() {
        let punches = log(&[
            ("2026-01-15 08:00:00", In),
            ("2026-01-15 10:00:00", Out),
            ("2026-01-15 10:15:00", In),
            ("2026-01-15 12:00:00", Out),
            ("2026-01-15 13:00:00", In),
            ("2026-01-15 17:00:00", Out),
        ]);

        let away = hours_out(&punches, t("2026-01-15 08:00:00"), t("2026-01-15 17:00:00"));
        assert_eq!(away, Decimal::new(125, 2));
    }

    #[test]
    fn test_hours_out_ignores_punches_outside_window() {
        let punches = log(&[
            ("2026-01-15 06:00:00", Out),
            ("2026-01-15 08:00:00", In),
            ("2026-01-15 17:00:00", Out),
            ("2026-01-15 18:00:00", In),
        ]);

        let away = hours_out(&punches, t("2026-01-15 08:00:00"), t("2026-01-15 17:00:00"));
        assert_eq!(away, Decimal::ZERO);
    }

    #[test]
    fn test_hours_out_ignores_out_out_and_in_in() {
        let punches = log(&[
            ("2026-01-15 08:00:00", In),
            ("2026-01-15 09:00:00", In),
            ("2026-01-15 12:00:00", Out),
            ("2026-01-15 12:10:00", Out),
            ("2026-01-15 12:40:00", In),
            ("2026-01-15 17:00:00", Out),
        ]);

        let away = hours_out(&punches, t("2026-01-15 08:00:00"), t("2026-01-15 17:00:00"));
        assert_eq!(away, Decimal::new(5, 1));
    }

    #[test]
    fn test_hours_out_across_midnight() {
        let punches = log(&[
            ("2026-01-15 22:00:00", In),
            ("2026-01-15 23:45:00", Out),
            ("2026-01-16 00:15:00", In),
            ("2026-01-16 06:00:00", Out),
        ]);

        let away = hours_out(&punches, t("2026-01-15 22:00:00"), t("2026-01-16 06:00:00"));
        assert_eq!(away, Decimal::new(5, 1));
    }

    #[test]
    fn test_status_present_and_absent() {
        let start = Some(t("2026-01-15 08:00:00"));
        let end = Some(t("2026-01-15 17:00:00"));

        assert_eq!(attendance_status(start, end), AttendanceStatus::Present);
        assert_eq!(attendance_status(start, None), AttendanceStatus::Absent);
        assert_eq!(attendance_status(None, end), AttendanceStatus::Absent);
        assert_eq!(attendance_status(start, start), AttendanceStatus::Absent);
    }
}
