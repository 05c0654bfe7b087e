//! Attendance Reconstruction Engine
//!
//! This crate turns raw punch events emitted by biometric terminals into
//! payroll-usable workday units: it decodes device records, infers IN/OUT
//! direction, reconstructs daily check-in/check-out windows, computes worked
//! and away hours, and aggregates fractional workday credit per employee.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod repository;
pub mod service;
