//! Payroll report models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{CompanyId, EmployeeId};

/// One employee's workday units over a report range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReportRow {
    /// Employee the row belongs to.
    pub employee_id: EmployeeId,
    /// Display name snapshot.
    pub employee_name: String,
    /// Rounded workday units.
    pub work_days: Decimal,
}

/// A complete payroll report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollReport {
    /// Company the report covers.
    pub company_id: CompanyId,
    /// First date of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the range (inclusive).
    pub end_date: NaiveDate,
    /// One row per employee, ordered by employee id.
    pub rows: Vec<PayrollReportRow>,
}
