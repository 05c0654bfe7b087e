//! Daily window reconstruction.
//!
//! Derives one check-in/check-out pair per badge per calendar date from the
//! ordered punch log. A day that ends on an unmatched IN borrows the first
//! OUT of the following date, which is how overnight shifts close.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{BadgeId, DailyWindow, PunchDirection, PunchRecord};

/// Reconstructs the window for `badge_id` on `date`.
///
/// `punches` must contain the badge's punches for `date` and the following
/// date; punches on any other date are ignored, and order does not matter.
///
/// Check-in is the earliest IN of the date. Check-out is:
/// - the earliest OUT of the following date, when the date's last punch is
///   its last IN and such an OUT exists
/// - the date's last OUT, when the last punch is not the last IN
/// - absent otherwise, including when the date has no IN at all
///
/// Returns `None` when neither end is known.
///
/// # Example
///
/// ```
/// use attendance_engine::calculation::reconstruct_daily_window;
/// use attendance_engine::models::{PunchDirection, PunchRecord};
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let punch = |id, at: &str, direction| PunchRecord {
///     id,
///     badge_id: 2001,
///     timestamp: NaiveDateTime::parse_from_str(at, "%Y-%m-%d %H:%M").unwrap(),
///     direction: Some(direction),
///     serial_number: "SN".to_string(),
///     uid: 1,
///     status: 1,
///     punch_hint: 0,
/// };
/// let punches = vec![
///     punch(1, "2026-01-15 22:00", PunchDirection::In),
///     punch(2, "2026-01-16 06:00", PunchDirection::Out),
/// ];
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
/// let window = reconstruct_daily_window(2001, date, &punches).unwrap();
/// assert!(window.spills_overnight());
/// ```
pub fn reconstruct_daily_window(
    badge_id: BadgeId,
    date: NaiveDate,
    punches: &[PunchRecord],
) -> Option<DailyWindow> {
    let on_date = || punches.iter().filter(move |p| p.timestamp.date() == date);
    let times_on_date = |direction: PunchDirection| {
        on_date()
            .filter(move |p| p.is(direction))
            .map(|p| p.timestamp)
    };

    let last_punch = on_date().map(|p| p.timestamp).max()?;
    let first_in = times_on_date(PunchDirection::In).min();
    let last_in = times_on_date(PunchDirection::In).max();
    let last_out = times_on_date(PunchDirection::Out).max();

    let check_out = match last_in {
        None => None,
        Some(last_in) if last_in == last_punch => next_day_first_out(punches, date),
        Some(_) => last_out,
    };

    if first_in.is_none() && check_out.is_none() {
        return None;
    }

    Some(DailyWindow {
        badge_id,
        date,
        check_in: first_in,
        check_out,
    })
}

fn next_day_first_out(punches: &[PunchRecord], date: NaiveDate) -> Option<NaiveDateTime> {
    let next = date.succ_opt()?;
    punches
        .iter()
        .filter(|p| p.timestamp.date() == next && p.is(PunchDirection::Out))
        .map(|p| p.timestamp)
        .min()
}
