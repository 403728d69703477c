//! Dashboard Aggregates
//!
//! Headline counters, chart series and the recent-critical list computed from
//! the current patient and alert snapshots. Backend counters, when present and
//! non-zero, win over the locally computed headline values.

use serde::Serialize;

use crate::api::ServerStats;
use crate::model::{classify_heart_rate, classify_oxygen, Alert, Patient, VitalStatus};

/// How many high-severity alerts the dashboard lists
pub const RECENT_CRITICAL_LIMIT: usize = 5;

/// Patients per classification bucket for one vital
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VitalBuckets {
    pub critical: usize,
    pub warning: usize,
    pub normal: usize,
    pub no_data: usize,
}

impl VitalBuckets {
    fn add(&mut self, status: VitalStatus) {
        match status {
            VitalStatus::Critical => self.critical += 1,
            VitalStatus::Warning => self.warning += 1,
            VitalStatus::Normal => self.normal += 1,
            VitalStatus::NoData => self.no_data += 1,
        }
    }
}

/// Data behind the vitals bar chart
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VitalsDistribution {
    pub heart_rate: VitalBuckets,
    pub oxygen: VitalBuckets,
}

/// Counters above the alert feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertSummary {
    /// High-severity alerts
    pub critical: usize,
    pub unresolved: usize,
    pub total: usize,
}

impl AlertSummary {
    pub fn compute(alerts: &[Alert]) -> Self {
        Self {
            critical: alerts.iter().filter(|a| a.is_critical()).count(),
            unresolved: alerts.iter().filter(|a| !a.resolved).count(),
            total: alerts.len(),
        }
    }
}

/// Everything the dashboard tab renders
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_patients: u64,
    pub active_patients: u64,
    pub offline_patients: u64,
    /// Patients with a critical heart rate or oxygen level
    pub critical_patients: u64,
    pub unresolved_alerts: u64,
    pub resolved_alerts: u64,
    /// Rounded mean; missing readings count as 0
    pub avg_heart_rate: i64,
    pub avg_oxygen_level: i64,
    pub vitals: VitalsDistribution,
    /// Most recent high-severity alerts, newest first
    pub recent_critical: Vec<Alert>,
    pub alert_summary: AlertSummary,
}

impl DashboardStats {
    /// Aggregate the snapshots, preferring non-zero backend counters
    pub fn compute(patients: &[Patient], alerts: &[Alert], server: Option<&ServerStats>) -> Self {
        let total = patients.len() as u64;
        let active = patients.iter().filter(|p| p.is_online()).count() as u64;

        let mut vitals = VitalsDistribution::default();
        let mut critical_patients = 0u64;
        for patient in patients {
            let hr = classify_heart_rate(patient.heart_rate).status;
            let o2 = classify_oxygen(patient.oxygen_level).status;
            vitals.heart_rate.add(hr);
            vitals.oxygen.add(o2);
            if hr == VitalStatus::Critical || o2 == VitalStatus::Critical {
                critical_patients += 1;
            }
        }

        let alert_summary = AlertSummary::compute(alerts);
        let unresolved = alert_summary.unresolved as u64;
        let resolved = (alert_summary.total as u64).saturating_sub(unresolved);

        let server = server.copied().unwrap_or_default();
        let prefer = |remote: u64, local: u64| if remote > 0 { remote } else { local };

        Self {
            total_patients: prefer(server.total_patients, total),
            active_patients: prefer(server.active_patients, active),
            offline_patients: total.saturating_sub(active),
            critical_patients: prefer(server.critical_alerts_today, critical_patients),
            unresolved_alerts: prefer(server.unresolved_alerts, unresolved),
            resolved_alerts: resolved,
            avg_heart_rate: rounded_mean(patients.iter().map(|p| p.heart_rate.unwrap_or(0))),
            avg_oxygen_level: rounded_mean(patients.iter().map(|p| p.oxygen_level.unwrap_or(0))),
            vitals,
            recent_critical: recent_critical(alerts, RECENT_CRITICAL_LIMIT),
            alert_summary,
        }
    }
}

/// Newest `limit` high-severity alerts
pub fn recent_critical(alerts: &[Alert], limit: usize) -> Vec<Alert> {
    let mut critical: Vec<&Alert> = alerts.iter().filter(|a| a.is_critical()).collect();
    critical.sort_by_key(|a| std::cmp::Reverse(a.timestamp_millis()));
    critical.into_iter().take(limit).cloned().collect()
}

fn rounded_mean(values: impl ExactSizeIterator<Item = i64>) -> i64 {
    let count = values.len();
    if count == 0 {
        return 0;
    }
    // Saturated readings would overflow an integer sum
    let sum: f64 = values.map(|v| v as f64).sum();
    (sum / count as f64).round() as i64
}
