//! # VitalWatch
//!
//! Patient vital-sign monitoring dashboard core: searchable, filterable,
//! sortable and paginated views over patients and alerts, kept consistent
//! with persisted display preferences, on top of a REST monitoring backend.
//!
//! ## Features
//!
//! - **Derived views**: one engine filters, sorts, paginates and groups any
//!   collection from a typed field registry
//! - **Persisted preferences**: page size, visible columns, density and theme
//!   survive restarts
//! - **CSV export**: the whole filtered set, in the visible columns
//! - **Dashboard**: headline counters and vitals distribution from one
//!   shared set of thresholds
//! - **Telemetry simulation**: validated device readings with a live preview
//!
//! ## Modules
//!
//! - [`derive`]: Derived view engine and view-state controller
//! - [`views`]: Patient and alert view definitions
//! - [`prefs`]: Preference store
//! - [`api`]: Monitoring backend client
//! - [`session`]: Everything wired together for one operator
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vitalwatch::api::{ClientConfig, HttpMonitorApi};
//! use vitalwatch::prefs::FilePreferenceStore;
//! use vitalwatch::session::MonitorSession;
//! use vitalwatch::timefmt::DisplayZone;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = HttpMonitorApi::new(ClientConfig::default())?;
//!     let prefs = Arc::new(FilePreferenceStore::open(FilePreferenceStore::default_path()));
//!     let mut session = MonitorSession::new(api, prefs, DisplayZone::local());
//!
//!     session.refresh().await?;
//!     session.patient_controller().set_filter("status", "Online");
//!
//!     let view = session.patient_view();
//!     println!(
//!         "Showing {}-{} of {} patients",
//!         view.from_index(),
//!         view.to_index(),
//!         view.total_count()
//!     );
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod dashboard;
pub mod derive;
pub mod logging;
pub mod model;
pub mod notify;
pub mod prefs;
pub mod session;
pub mod telemetry;
pub mod timefmt;
pub mod views;

// Re-export top-level types for convenience
pub use model::{Alert, ConnectionStatus, Patient, Severity, VitalReading, VitalStatus};

pub use derive::{
    derive_view, reduce, to_csv, DerivedView, SortDirection, SortSpec, ViewConfig,
    ViewController, ViewIntent, ViewState,
};

pub use views::ViewKind;

pub use prefs::{
    ColumnVisibility, Density, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore,
    PreferenceStoreExt, Theme,
};

pub use api::{
    ApiError, ApiResult, ClientConfig, HttpMonitorApi, MonitorApi, PatientInput, ServerStats,
};

pub use dashboard::DashboardStats;

pub use telemetry::{FormMessage, Preset, TelemetryDraft, TelemetryError};

pub use notify::{Toast, ToastKind, ToastQueue};

pub use session::{MonitorSession, SessionError, SessionResult};

pub use config::{Config, ConfigError, LoggingConfig};
