//! Employee model as provided by the employee directory.

use serde::{Deserialize, Serialize};

use super::{BadgeId, CompanyId, EmployeeId};

/// An employee known to the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Directory identifier.
    pub id: EmployeeId,
    /// Company the employee belongs to.
    pub company_id: CompanyId,
    /// Registration number; terminals report it as the badge id.
    pub registration_number: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Qualification or position.
    pub qualification: String,
}

impl Employee {
    /// Returns the display name snapshot stored on attendance records.
    ///
    /// ```
    /// use attendance_engine::models::Employee;
    ///
    /// let employee = Employee {
    ///     id: 1,
    ///     company_id: 1,
    ///     registration_number: "2001".to_string(),
    ///     first_name: "Ana".to_string(),
    ///     last_name: "Lima".to_string(),
    ///     qualification: "Welder".to_string(),
    /// };
    /// assert_eq!(employee.display_name(), "Ana Lima");
    /// ```
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the badge number terminals report for this employee.
    ///
    /// The registration number must read back exactly as the decimal badge
    /// number, so `"02001"` never matches badge `2001`.
    pub fn badge_id(&self) -> Option<BadgeId> {
        let badge: BadgeId = self.registration_number.parse().ok()?;
        (badge.to_string() == self.registration_number).then_some(badge)
    }

    /// Returns the position snapshot, or `None` when no qualification is set.
    pub fn position(&self) -> Option<String> {
        (!self.qualification.is_empty()).then(|| self.qualification.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee(registration_number: &str) -> Employee {
        Employee {
            id: 7,
            company_id: 1,
            registration_number: registration_number.to_string(),
            first_name: "Rui".to_string(),
            last_name: "Costa".to_string(),
            qualification: String::new(),
        }
    }

    #[test]
    fn test_badge_id_requires_canonical_number() {
        assert_eq!(employee("2001").badge_id(), Some(2001));
        assert_eq!(employee("02001").badge_id(), None);
        assert_eq!(employee("A-17").badge_id(), None);
    }

    #[test]
    fn test_empty_qualification_has_no_position() {
        assert_eq!(employee("1").position(), None);
    }
}
