//! Monitoring Data Model
//!
//! Records supplied by the monitoring backend. They are read-only snapshots:
//! the view layer borrows them and never mutates them.
//!
//! - **patient**: `Patient`, `ConnectionStatus`
//! - **alert**: `Alert`, `Severity`
//! - **vitals**: shared heart-rate / oxygen thresholds
//! - **lenient**: forgiving field decoders for loosely typed JSON

pub mod alert;
pub mod lenient;
pub mod patient;
pub mod vitals;

pub use alert::{Alert, Severity};
pub use patient::{initials, ConnectionStatus, Patient};
pub use vitals::{
    classify_heart_rate, classify_oxygen, expected_alert, VitalReading, VitalStatus,
};
