//! Data Transfer Objects
//!
//! Request and response bodies exchanged with the monitoring backend.
//! Responses decode leniently: every field has a default.

use serde::{Deserialize, Serialize};

use crate::model::lenient;
use crate::model::Patient;

// ============================================
// PATIENT DTOs
// ============================================

/// Body of a create or update patient request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    /// Only sent on create; the backend assigns one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub medical_conditions: String,
}

impl PatientInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: request a specific identifier
    pub fn id(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = Some(patient_id.into());
        self
    }

    /// Builder: set age
    pub fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Builder: set gender
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = gender.into();
        self
    }

    /// Builder: set medical conditions
    pub fn conditions(mut self, conditions: impl Into<String>) -> Self {
        self.medical_conditions = conditions.into();
        self
    }

    /// Prefill an edit form from an existing record
    pub fn from_patient(patient: &Patient) -> Self {
        Self {
            patient_id: None,
            name: patient.name.clone(),
            age: patient.age,
            gender: patient.gender.clone(),
            medical_conditions: patient.medical_conditions.clone(),
        }
    }

    /// Trimmed copy; `None` when the name is blank
    pub fn validated(&self) -> Option<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self {
            patient_id: self
                .patient_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(String::from),
            name: name.to_string(),
            age: self.age,
            gender: self.gender.trim().to_string(),
            medical_conditions: self.medical_conditions.trim().to_string(),
        })
    }
}

// ============================================
// TELEMETRY DTOs
// ============================================

/// One simulated device reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryRequest {
    pub patient_id: String,
    pub heart_rate: i64,
    pub oxygen_level: i64,
}

/// Backend verdict on a reading
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryResponse {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub alert_triggered: bool,
    /// Description of the triggered alert
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub issue: Option<String>,
}

// ============================================
// DASHBOARD DTOs
// ============================================

/// Headline counters computed by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStats {
    #[serde(default, deserialize_with = "lenient_count")]
    pub total_patients: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub active_patients: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub critical_alerts_today: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub unresolved_alerts: u64,
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = lenient::opt_i64(deserializer)?;
    Ok(value.and_then(|v| u64::try_from(v).ok()).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patient_input_omits_missing_id() {
        let body = serde_json::to_value(PatientInput::new("Ada").age(36)).unwrap();
        assert_eq!(
            body,
            json!({"name": "Ada", "age": 36, "gender": "", "medical_conditions": ""})
        );

        let body = serde_json::to_value(PatientInput::new("Ada").id("P010")).unwrap();
        assert_eq!(body["patient_id"], "P010");
    }

    #[test]
    fn test_patient_input_validation() {
        assert!(PatientInput::new("   ").validated().is_none());

        let input = PatientInput::new("  Ada ").id("  ").gender(" Female ");
        let clean = input.validated().unwrap();
        assert_eq!(clean.name, "Ada");
        assert_eq!(clean.patient_id, None);
        assert_eq!(clean.gender, "Female");
    }

    #[test]
    fn test_telemetry_response_lenient() {
        let resp: TelemetryResponse =
            serde_json::from_value(json!({"alert_triggered": "true", "issue": "Low oxygen"})).unwrap();
        assert!(resp.alert_triggered);
        assert_eq!(resp.issue.as_deref(), Some("Low oxygen"));

        let resp: TelemetryResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(resp, TelemetryResponse::default());
    }

    #[test]
    fn test_server_stats_lenient() {
        let stats: ServerStats = serde_json::from_value(json!({
            "total_patients": "12",
            "active_patients": 9,
            "critical_alerts_today": -1,
        }))
        .unwrap();
        assert_eq!(stats.total_patients, 12);
        assert_eq!(stats.active_patients, 9);
        assert_eq!(stats.critical_alerts_today, 0);
        assert_eq!(stats.unresolved_alerts, 0);
    }
}
