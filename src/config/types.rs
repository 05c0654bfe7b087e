//! Configuration types for attendance policy.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML policy file. Every field has a default, so
//! an empty file yields the stock policy.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Punch classification policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassificationPolicy {
    /// Maximum hours between the first IN of a day and a new punch for that
    /// punch to still close the shift as OUT.
    pub max_shift_hours: Decimal,
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self {
            max_shift_hours: Decimal::from(12),
        }
    }
}

/// Payroll normalization policy.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PayrollPolicy {
    /// Net hours that make up one workday unit, also the daily cap when
    /// overtime is not enabled.
    pub hours_per_workday: Decimal,
    /// Hours deducted when a record has its lunch flag set.
    pub lunch_deduction_hours: Decimal,
    /// Workday units are rounded to the nearest multiple of this value.
    pub rounding_increment: Decimal,
}

impl Default for PayrollPolicy {
    fn default() -> Self {
        Self {
            hours_per_workday: Decimal::from(9),
            lunch_deduction_hours: Decimal::ONE,
            rounding_increment: Decimal::new(5, 1),
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Default deadline for payroll report generation, in milliseconds.
    pub deadline_ms: u64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self { deadline_ms: 30_000 }
    }
}

/// The complete engine configuration loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Punch classification policy.
    pub classification: ClassificationPolicy,
    /// Payroll normalization policy.
    pub payroll: PayrollPolicy,
    /// Report generation settings.
    pub reports: ReportSettings,
}

impl EngineConfig {
    /// Returns the name of the first policy value that is not strictly
    /// positive, if any.
    pub(crate) fn first_non_positive(&self) -> Option<&'static str> {
        let checks = [
            (
                "classification.max_shift_hours",
                self.classification.max_shift_hours,
            ),
            ("payroll.hours_per_workday", self.payroll.hours_per_workday),
            (
                "payroll.rounding_increment",
                self.payroll.rounding_increment,
            ),
        ];
        if let Some((name, _)) = checks.iter().find(|(_, v)| *v <= Decimal::ZERO) {
            return Some(name);
        }
        if self.payroll.lunch_deduction_hours < Decimal::ZERO {
            return Some("payroll.lunch_deduction_hours");
        }
        if self.reports.deadline_ms == 0 {
            return Some("reports.deadline_ms");
        }
        None
    }
}
