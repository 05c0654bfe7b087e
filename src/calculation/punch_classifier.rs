//! Punch direction classification.
//!
//! Terminals do not reliably report whether a punch is a clock-in or a
//! clock-out, so direction is inferred from the employee's own history:
//!
//! - no earlier punch, or the earlier punch is OUT: the new punch is IN
//! - the earlier punch is IN: the new punch is OUT if it falls within
//!   `max_shift_hours` of that day's first IN, otherwise a new shift is
//!   assumed to have started and the punch is IN
//!
//! Classification of a punch depends only on the punches before it, so a
//! single employee's punches must be classified one at a time in timestamp
//! order. [`ClassificationContext`] carries that ordering: it is built per
//! employee and advanced with [`ClassificationContext::record`].

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::models::{BadgeId, PunchDirection, PunchRecord};

/// Applies the direction rule.
///
/// # Arguments
///
/// * `prior` - Direction and time of the immediately preceding classified punch
/// * `first_in_of_prior_day` - First IN on the calendar day of `prior`, when `prior` is IN
/// * `at` - Time of the punch being classified
/// * `max_shift_hours` - Longest shift that still closes with an OUT
///
/// # Examples
///
/// ```
/// use attendance_engine::calculation::classify_direction;
/// use attendance_engine::models::PunchDirection;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let t = |s| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap();
/// let twelve = Decimal::from(12);
///
/// assert_eq!(classify_direction(None, None, t("2026-01-15 08:00"), twelve), PunchDirection::In);
///
/// let prior = Some((PunchDirection::In, t("2026-01-15 08:00")));
/// let first_in = Some(t("2026-01-15 08:00"));
/// assert_eq!(classify_direction(prior, first_in, t("2026-01-15 17:00"), twelve), PunchDirection::Out);
/// assert_eq!(classify_direction(prior, first_in, t("2026-01-16 08:00"), twelve), PunchDirection::In);
/// ```
pub fn classify_direction(
    prior: Option<(PunchDirection, NaiveDateTime)>,
    first_in_of_prior_day: Option<NaiveDateTime>,
    at: NaiveDateTime,
    max_shift_hours: Decimal,
) -> PunchDirection {
    match prior {
        None | Some((PunchDirection::Out, _)) => PunchDirection::In,
        Some((PunchDirection::In, prior_time)) => {
            // The day's first IN is normally present; a store that lost it
            // falls back to the prior punch itself.
            let shift_start = first_in_of_prior_day.unwrap_or(prior_time);
            let elapsed_hours =
                Decimal::from((at - shift_start).num_seconds()) / Decimal::from(3600);

            if elapsed_hours <= max_shift_hours {
                PunchDirection::Out
            } else {
                PunchDirection::In
            }
        }
    }
}

/// The classification state for one employee: their last classified punch.
///
/// Holding a `&mut ClassificationContext` is what allows a punch to be
/// classified, which keeps one employee's classifications sequential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationContext {
    badge_id: BadgeId,
    last_punch: Option<PunchRecord>,
}

impl ClassificationContext {
    /// Creates a context from the employee's last classified punch.
    ///
    /// A `last_punch` without a direction is treated as absent.
    pub fn new(badge_id: BadgeId, last_punch: Option<PunchRecord>) -> Self {
        Self {
            badge_id,
            last_punch: last_punch.filter(|p| p.direction.is_some()),
        }
    }

    /// Returns the badge this context belongs to.
    pub fn badge_id(&self) -> BadgeId {
        self.badge_id
    }

    /// Returns the last classified punch, if any.
    pub fn last_punch(&self) -> Option<&PunchRecord> {
        self.last_punch.as_ref()
    }

    /// Returns the date whose first IN the rule needs, if any.
    ///
    /// Only an IN prior punch requires the lookup.
    pub fn first_in_lookup_date(&self) -> Option<NaiveDate> {
        self.last_punch
            .as_ref()
            .filter(|p| p.is(PunchDirection::In))
            .map(|p| p.timestamp.date())
    }

    /// Classifies a punch at `at` against this context.
    pub fn classify(
        &self,
        at: NaiveDateTime,
        first_in_of_prior_day: Option<NaiveDateTime>,
        max_shift_hours: Decimal,
    ) -> PunchDirection {
        let prior = self
            .last_punch
            .as_ref()
            .and_then(|p| p.direction.map(|d| (d, p.timestamp)));

        classify_direction(prior, first_in_of_prior_day, at, max_shift_hours)
    }

    /// Advances the context past a newly classified punch.
    pub fn record(&mut self, punch: PunchRecord) {
        debug_assert_eq!(punch.badge_id, self.badge_id);
        if punch.direction.is_some() {
            self.last_punch = Some(punch);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn twelve() -> Decimal {
        Decimal::from(12)
    }

    fn punch(id: u64, at: &str, direction: Option<PunchDirection>) -> PunchRecord {
        PunchRecord {
            id,
            badge_id: 2001,
            timestamp: t(at),
            direction,
            serial_number: "SN".to_string(),
            uid: 1,
            status: 1,
            punch_hint: 0,
        }
    }

    #[test]
    fn test_first_ever_punch_is_in() {
        assert_eq!(
            classify_direction(None, None, t("2026-01-15 08:00:00"), twelve()),
            PunchDirection::In
        );
    }

    #[test]
    fn test_after_out_is_always_in() {
        let prior = Some((PunchDirection::Out, t("2026-01-15 17:00:00")));
        for at in [
            "2026-01-15 17:00:01",
            "2026-01-15 18:00:00",
            "2026-01-20 08:00:00",
        ] {
            assert_eq!(
                classify_direction(prior, None, t(at), twelve()),
                PunchDirection::In,
                "punch at {}",
                at
            );
        }
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let prior = Some((PunchDirection::In, t("2026-01-15 13:00:00")));
        let first_in = Some(t("2026-01-15 08:00:00"));

        assert_eq!(
            classify_direction(prior, first_in, t("2026-01-15 20:00:00"), twelve()),
            PunchDirection::Out
        );
        assert_eq!(
            classify_direction(prior, first_in, t("2026-01-15 20:00:01"), twelve()),
            PunchDirection::In
        );
    }

    #[test]
    fn test_elapsed_is_measured_from_first_in_not_prior() {
        // Prior IN at 19:00 but the day started at 06:00: 14h elapsed.
        let prior = Some((PunchDirection::In, t("2026-01-15 19:00:00")));
        let first_in = Some(t("2026-01-15 06:00:00"));
        assert_eq!(
            classify_direction(prior, first_in, t("2026-01-15 20:00:00"), twelve()),
            PunchDirection::In
        );
    }

    #[test]
    fn test_overnight_out_within_threshold() {
        let prior = Some((PunchDirection::In, t("2026-01-15 22:00:00")));
        let first_in = Some(t("2026-01-15 22:00:00"));
        assert_eq!(
            classify_direction(prior, first_in, t("2026-01-16 06:00:00"), twelve()),
            PunchDirection::Out
        );
    }

    #[test]
    fn test_missing_first_in_falls_back_to_prior() {
        let prior = Some((PunchDirection::In, t("2026-01-15 08:00:00")));
        assert_eq!(
            classify_direction(prior, None, t("2026-01-15 10:00:00"), twelve()),
            PunchDirection::Out
        );
    }

    #[test]
    fn test_configurable_threshold() {
        let prior = Some((PunchDirection::In, t("2026-01-15 08:00:00")));
        let first_in = Some(t("2026-01-15 08:00:00"));
        assert_eq!(
            classify_direction(prior, first_in, t("2026-01-15 17:00:00"), Decimal::from(8)),
            PunchDirection::In
        );
    }

    #[test]
    fn test_context_ignores_unclassified_seed() {
        let ctx = ClassificationContext::new(2001, Some(punch(1, "2026-01-15 08:00:00", None)));
        assert!(ctx.last_punch().is_none());
        assert_eq!(ctx.first_in_lookup_date(), None);
    }

    #[test]
    fn test_context_only_asks_for_first_in_after_in() {
        let after_out = ClassificationContext::new(
            2001,
            Some(punch(1, "2026-01-15 17:00:00", Some(PunchDirection::Out))),
        );
        assert_eq!(after_out.first_in_lookup_date(), None);

        let after_in = ClassificationContext::new(
            2001,
            Some(punch(1, "2026-01-15 08:00:00", Some(PunchDirection::In))),
        );
        assert_eq!(
            after_in.first_in_lookup_date(),
            NaiveDate::from_ymd_opt(2026, 1, 15)
        );
    }

    #[test]
    fn test_context_sequence_alternates() {
        let mut ctx = ClassificationContext::new(2001, None);
        let times = [
            "2026-01-15 08:00:00",
            "2026-01-15 12:30:00",
            "2026-01-15 13:00:00",
            "2026-01-15 17:00:00",
        ];
        let mut first_in = None;
        let mut directions = Vec::new();

        for (i, at) in times.iter().enumerate() {
            let direction = ctx.classify(t(at), first_in, twelve());
            if direction == PunchDirection::In && first_in.is_none() {
                first_in = Some(t(at));
            }
            directions.push(direction);
            ctx.record(punch(i as u64 + 1, at, Some(direction)));
        }

        assert_eq!(
            directions,
            vec![
                PunchDirection::In,
                PunchDirection::Out,
                PunchDirection::In,
                PunchDirection::Out
            ]
        );
        assert_eq!(ctx.last_punch().unwrap().id, 4);
    }
}
