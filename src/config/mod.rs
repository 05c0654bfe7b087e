//! Configuration loading and management for the Attendance Engine.
//!
//! This module loads the policy constants (shift threshold, workday length,
//! lunch deduction, rounding) and report settings from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use attendance_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/attendance.yaml").unwrap();
//! println!("Shift threshold: {}h", config.config().classification.max_shift_hours);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ClassificationPolicy, EngineConfig, PayrollPolicy, ReportSettings};
