//! Monitoring Backend API
//!
//! Client side of the REST backend that owns patients, alerts and telemetry.
//!
//! # Endpoints
//!
//! ## Patients
//! - `GET /patients` - List all patients
//! - `POST /patients` - Create a patient
//! - `PUT /patients/:id` - Update a patient
//! - `DELETE /patients/:id` - Delete a patient
//!
//! ## Alerts
//! - `GET /alerts` - List all alerts
//!
//! ## Dashboard
//! - `GET /dashboard/stats` - Headline counters
//!
//! ## Telemetry
//! - `POST /telemetry` - Submit a device reading
//!
//! # Example
//!
//! ```rust,no_run
//! use vitalwatch::api::{ClientConfig, HttpMonitorApi, MonitorApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpMonitorApi::new(ClientConfig::default())?;
//!     let patients = api.list_patients().await?;
//!     println!("{} patients", patients.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod dto;
pub mod error;

pub use client::{ClientConfig, HttpMonitorApi, MonitorApi};
pub use dto::{PatientInput, ServerStats, TelemetryRequest, TelemetryResponse};
pub use error::{ApiError, ApiResult};
