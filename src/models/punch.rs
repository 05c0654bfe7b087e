//! Punch models.
//!
//! This module defines the decoded device event and the persisted punch
//! record with its classified direction.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{BadgeId, PunchId};

/// The engine's inferred direction for a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PunchDirection {
    /// Clocking in.
    In,
    /// Clocking out.
    Out,
}

impl PunchDirection {
    /// Returns the stored label for this direction.
    ///
    /// ```
    /// use attendance_engine::models::PunchDirection;
    ///
    /// assert_eq!(PunchDirection::In.as_str(), "IN");
    /// assert_eq!(PunchDirection::Out.as_str(), "OUT");
    /// ```
    pub fn as_str(&self) -> &'static str {
        match self {
            PunchDirection::In => "IN",
            PunchDirection::Out => "OUT",
        }
    }
}

impl std::fmt::Display for PunchDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A punch decoded from a terminal payload, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDeviceEvent {
    /// Serial number of the terminal that reported the punch.
    pub serial_number: String,
    /// Terminal-local user tag.
    pub uid: u16,
    /// Badge number, matched against employee registration numbers.
    pub badge_id: BadgeId,
    /// Status byte reported by the terminal.
    pub status: u8,
    /// Direction hint reported by the terminal. Not trusted for classification.
    pub punch_hint: u8,
    /// Decoded event time (terminal local time).
    pub timestamp: NaiveDateTime,
}

/// A persisted punch with its classified direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PunchRecord {
    /// Store-assigned identifier.
    pub id: PunchId,
    /// Badge number of the employee who punched.
    pub badge_id: BadgeId,
    /// Event time.
    pub timestamp: NaiveDateTime,
    /// Classified direction; `None` only for records imported without one.
    pub direction: Option<PunchDirection>,
    /// Originating terminal serial number.
    pub serial_number: String,
    /// Terminal-local user tag.
    pub uid: u16,
    /// Status byte reported by the terminal.
    pub status: u8,
    /// Raw direction hint reported by the terminal.
    pub punch_hint: u8,
}

impl PunchRecord {
    /// Returns true if this punch is classified as `direction`.
    pub fn is(&self, direction: PunchDirection) -> bool {
        self.direction == Some(direction)
    }
}

/// A punch ready to be appended to the punch log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPunch {
    /// Badge number of the employee who punched.
    pub badge_id: BadgeId,
    /// Event time.
    pub timestamp: NaiveDateTime,
    /// Classified direction.
    pub direction: Option<PunchDirection>,
    /// Originating terminal serial number.
    pub serial_number: String,
    /// Terminal-local user tag.
    pub uid: u16,
    /// Status byte reported by the terminal.
    pub status: u8,
    /// Raw direction hint reported by the terminal.
    pub punch_hint: u8,
}

impl NewPunch {
    /// Builds a classified punch from a decoded device event.
    pub fn from_event(event: RawDeviceEvent, direction: PunchDirection) -> Self {
        Self {
            badge_id: event.badge_id,
            timestamp: event.timestamp,
            direction: Some(direction),
            serial_number: event.serial_number,
            uid: event.uid,
            status: event.status,
            punch_hint: event.punch_hint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&PunchDirection::In).unwrap(), "\"IN\"");
        let out: PunchDirection = serde_json::from_str("\"OUT\"").unwrap();
        assert_eq!(out, PunchDirection::Out);
    }

    #[test]
    fn test_new_punch_keeps_device_fields() {
        let event = RawDeviceEvent {
            serial_number: "CQZ7232260044".to_string(),
            uid: 47,
            badge_id: 2001,
            status: 1,
            punch_hint: 0,
            timestamp: NaiveDateTime::parse_from_str("2024-03-15 08:30:15", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
        };
        let punch = NewPunch::from_event(event.clone(), PunchDirection::In);
        assert_eq!(punch.badge_id, 2001);
        assert_eq!(punch.uid, 47);
        assert_eq!(punch.serial_number, event.serial_number);
        assert_eq!(punch.direction, Some(PunchDirection::In));
    }
}
