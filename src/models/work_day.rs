//! Work day model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::WorkDayId;

/// The kind of calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    /// A regular working day.
    Workday,
    /// A scheduled day off.
    Free,
    /// A public holiday.
    Holiday,
}

/// A calendar work day for which attendance is generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkDay {
    /// Store-assigned identifier.
    pub id: WorkDayId,
    /// The calendar date.
    pub date: NaiveDate,
    /// The kind of day.
    pub day_type: DayType,
}
