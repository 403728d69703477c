//! Monitoring Session
//!
//! One operator's working state: the latest patient and alert snapshots, a
//! view controller per table, persisted display preferences and the toast
//! queue, all driven against a [`MonitorApi`].
//!
//! Snapshots are replaced wholesale on every refresh. Mutations go to the
//! backend first and are followed by a refetch; nothing is patched locally.

use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiError, MonitorApi, PatientInput, ServerStats};
use crate::dashboard::DashboardStats;
use crate::derive::{to_csv, DerivedView, ExportError, ViewController};
use crate::model::{Alert, Patient};
use crate::notify::ToastQueue;
use crate::prefs::{ColumnVisibility, Density, PreferenceStore, Theme};
use crate::telemetry::{outcome_message, FormMessage, TelemetryDraft};
use crate::timefmt::DisplayZone;
use crate::views::{alerts, patients, ViewKind};

/// Session errors
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Patient name is required")]
    MissingName,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Operator session over a monitoring backend
pub struct MonitorSession<A> {
    api: A,
    prefs: Arc<dyn PreferenceStore>,
    zone: DisplayZone,

    patients: Option<Vec<Patient>>,
    alerts: Option<Vec<Alert>>,
    server_stats: Option<ServerStats>,

    patient_view: ViewController<Patient>,
    alert_view: ViewController<Alert>,

    columns: ColumnVisibility,
    density: Density,
    theme: Theme,

    toasts: ToastQueue,
}

impl<A: MonitorApi> MonitorSession<A> {
    /// New session; preferences are rehydrated, snapshots start unloaded
    pub fn new(api: A, prefs: Arc<dyn PreferenceStore>, zone: DisplayZone) -> Self {
        let patient_view = ViewController::new(Arc::new(patients::view_config()), prefs.clone());
        let alert_view = ViewController::new(
            Arc::new(alerts::view_config(zone, zone.today())),
            prefs.clone(),
        );

        let columns = patients::load_columns(prefs.as_ref());
        let density = Density::load(prefs.as_ref(), patients::VIEW_NAME);
        let theme = Theme::load(prefs.as_ref());

        Self {
            api,
            prefs,
            zone,
            patients: None,
            alerts: None,
            server_stats: None,
            patient_view,
            alert_view,
            columns,
            density,
            theme,
            toasts: ToastQueue::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn zone(&self) -> DisplayZone {
        self.zone
    }

    /// Latest patient snapshot; `None` until the first successful load
    pub fn patients(&self) -> Option<&[Patient]> {
        self.patients.as_deref()
    }

    pub fn alerts(&self) -> Option<&[Alert]> {
        self.alerts.as_deref()
    }

    pub fn server_stats(&self) -> Option<&ServerStats> {
        self.server_stats.as_ref()
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.toasts
    }

    pub fn toasts_mut(&mut self) -> &mut ToastQueue {
        &mut self.toasts
    }

    /// Refetch patients, alerts and backend counters concurrently.
    ///
    /// Each snapshot is replaced only when its own request succeeds. A failed
    /// stats request is tolerated since the dashboard can aggregate locally;
    /// the first collection failure is returned after raising a toast.
    pub async fn refresh(&mut self) -> SessionResult<()> {
        let (patient_list, alert_list, stats) = tokio::join!(
            self.api.list_patients(),
            self.api.list_alerts(),
            self.api.dashboard_stats()
        );

        // Date labels depend on the current day
        self.alert_view
            .replace_config(Arc::new(alerts::view_config(self.zone, self.zone.today())));

        match stats {
            Ok(stats) => self.server_stats = Some(stats),
            Err(e) => tracing::debug!(error = %e, "Dashboard stats unavailable"),
        }

        let mut first_error = None;

        match patient_list {
            Ok(list) => {
                tracing::debug!(count = list.len(), "Loaded patients");
                self.patients = Some(list);
            }
            Err(e) => {
                self.toasts.error(format!("Error loading patients: {}", e));
                first_error = first_error.or(Some(e));
            }
        }

        match alert_list {
            Ok(list) => {
                tracing::debug!(count = list.len(), "Loaded alerts");
                self.alerts = Some(list);
            }
            Err(e) => {
                self.toasts.error(format!("Error loading alerts: {}", e));
                first_error = first_error.or(Some(e));
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Create (`editing` is `None`) or update a patient, then refetch.
    ///
    /// Backend failures are returned to the caller so the form can stay open.
    pub async fn save_patient(
        &mut self,
        editing: Option<&str>,
        input: &PatientInput,
    ) -> SessionResult<()> {
        let input = input.validated().ok_or(SessionError::MissingName)?;

        match editing {
            Some(patient_id) => self.api.update_patient(patient_id, &input).await?,
            None => self.api.create_patient(&input).await?,
        }

        self.refresh_quietly().await;
        self.toasts.success(if editing.is_some() {
            "Patient updated"
        } else {
            "Patient added"
        });
        Ok(())
    }

    /// Delete a patient; the outcome is reported as a toast either way
    pub async fn delete_patient(&mut self, patient_id: &str) -> SessionResult<()> {
        match self.api.delete_patient(patient_id).await {
            Ok(()) => {
                self.refresh_quietly().await;
                self.toasts.success("Patient deleted");
                Ok(())
            }
            Err(e) => {
                tracing::error!(patient_id, error = %e, "Delete failed");
                self.toasts.error(format!("Error deleting patient: {}", e));
                Err(e.into())
            }
        }
    }

    /// Validate and submit a simulated reading; returns the form message
    ///
    /// The draft is cleared after the backend accepts it and kept as typed
    /// otherwise, so a failed send can be retried.
    pub async fn send_telemetry(&mut self, draft: &mut TelemetryDraft) -> FormMessage {
        let request = match draft.validate() {
            Ok(request) => request,
            Err(e) => return FormMessage::error(e),
        };

        let result = self.api.send_telemetry(&request).await;
        match &result {
            Ok(_) => {
                draft.reset();
                self.refresh_quietly().await;
            }
            Err(e) => {
                tracing::error!(patient_id = %request.patient_id, error = %e, "Telemetry failed");
                self.toasts.error(format!("Error sending telemetry: {}", e));
            }
        }
        outcome_message(&result)
    }

    async fn refresh_quietly(&mut self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Refresh after mutation failed");
        }
    }

    pub fn patient_controller(&mut self) -> &mut ViewController<Patient> {
        &mut self.patient_view
    }

    pub fn alert_controller(&mut self) -> &mut ViewController<Alert> {
        &mut self.alert_view
    }

    /// Current page of the patient table
    pub fn patient_view(&mut self) -> DerivedView<'_, Patient> {
        self.patient_view.derive(self.patients.as_deref())
    }

    /// Current page of the alert feed
    pub fn alert_view(&mut self) -> DerivedView<'_, Alert> {
        self.alert_view.derive(self.alerts.as_deref())
    }

    /// CSV of the whole filtered and sorted collection.
    ///
    /// Patients export their visible columns; alerts export a fixed set.
    pub fn export(&mut self, kind: ViewKind) -> SessionResult<String> {
        let zone = self.zone;
        let csv = match kind {
            ViewKind::Patients => {
                let visible = self.columns.visible();
                let view = self.patient_view.derive(self.patients.as_deref());
                to_csv(view.filtered(), &visible, &patients::csv_layout(zone))?
            }
            ViewKind::Alerts => {
                let view = self.alert_view.derive(self.alerts.as_deref());
                to_csv(view.filtered(), alerts::CSV_COLUMNS, &alerts::csv_layout(zone))?
            }
        };
        tracing::info!(view = kind.name(), bytes = csv.len(), "Exported view");
        Ok(csv)
    }

    /// Aggregates for the dashboard tab
    pub fn dashboard(&self) -> DashboardStats {
        DashboardStats::compute(
            self.patients.as_deref().unwrap_or(&[]),
            self.alerts.as_deref().unwrap_or(&[]),
            self.server_stats.as_ref(),
        )
    }

    pub fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    /// Show or hide a patient column and persist the choice
    pub fn toggle_column(&mut self, column: &str) -> bool {
        if !self.columns.toggle(column) {
            return false;
        }
        if !patients::save_columns(self.prefs.as_ref(), &self.columns) {
            tracing::warn!(column, "Failed to persist column visibility");
        }
        true
    }

    pub fn density(&self) -> Density {
        self.density
    }

    pub fn toggle_density(&mut self) -> Density {
        self.density = self.density.toggled();
        if !self.density.save(self.prefs.as_ref(), patients::VIEW_NAME) {
            tracing::warn!("Failed to persist density");
        }
        self.density
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if !self.theme.save(self.prefs.as_ref()) {
            tracing::warn!("Failed to persist theme");
        }
        self.theme
    }
}
