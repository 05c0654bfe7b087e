//! Daily window model.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::BadgeId;

/// The reconstructed check-in/check-out pair for one badge on one date.
///
/// The check-out may fall on the following calendar date when the shift
/// crosses midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWindow {
    /// Badge number the window belongs to.
    pub badge_id: BadgeId,
    /// Calendar date of the window.
    pub date: NaiveDate,
    /// Earliest IN punch of the date.
    pub check_in: Option<NaiveDateTime>,
    /// Closing OUT punch, possibly borrowed from the next date.
    pub check_out: Option<NaiveDateTime>,
}

impl DailyWindow {
    /// Returns true when both ends of the window are known.
    pub fn is_complete(&self) -> bool {
        self.check_in.is_some() && self.check_out.is_some()
    }

    /// Returns true when the check-out was borrowed from a later date.
    pub fn spills_overnight(&self) -> bool {
        self.check_out.is_some_and(|out| out.date() > self.date)
    }
}
