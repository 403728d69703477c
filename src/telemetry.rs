//! Telemetry Test Form
//!
//! Draft state for simulating a device reading: presets, a live vital
//! preview, validation into a [`TelemetryRequest`] and the message shown once
//! the backend answers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::{ApiError, TelemetryRequest, TelemetryResponse};
use crate::model::{classify_heart_rate, classify_oxygen, expected_alert, Severity, VitalReading};
use crate::notify::ToastKind;

/// Accepted heart-rate range (bpm)
pub const HEART_RATE_RANGE: (i64, i64) = (30, 200);
/// Accepted oxygen range (%)
pub const OXYGEN_RANGE: (i64, i64) = (70, 100);

/// Simulated device state shown on the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Maintenance => "maintenance",
        }
    }
}

/// Quick-fill vitals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Normal,
    Warning,
    Critical,
}

impl Preset {
    /// (heart rate, oxygen) filled in by the preset
    pub fn values(&self) -> (i64, i64) {
        match self {
            Preset::Normal => (75, 98),
            Preset::Warning => (105, 92),
            Preset::Critical => (45, 85),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Normal => "normal",
            Preset::Warning => "warning",
            Preset::Critical => "critical",
        };
        f.write_str(name)
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Preset::Normal),
            "warning" => Ok(Preset::Warning),
            "critical" => Ok(Preset::Critical),
            other => Err(format!("Unknown preset: {}", other)),
        }
    }
}

/// Why a draft cannot be submitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Please select a patient")]
    MissingPatient,

    #[error("Heart rate must be a number")]
    InvalidHeartRate,

    #[error("Heart rate must be between {min} and {max} bpm")]
    HeartRateOutOfRange { min: i64, max: i64 },

    #[error("Oxygen level must be a number")]
    InvalidOxygen,

    #[error("Oxygen level must be between {min} and {max}%")]
    OxygenOutOfRange { min: i64, max: i64 },
}

/// Form field values as typed by the operator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryDraft {
    pub patient_id: String,
    pub heart_rate: String,
    pub oxygen_level: String,
    pub device_status: DeviceStatus,
}

impl TelemetryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: choose the patient
    pub fn patient(mut self, patient_id: impl Into<String>) -> Self {
        self.patient_id = patient_id.into();
        self
    }

    /// Builder: set both vitals from numbers
    pub fn vitals(mut self, heart_rate: i64, oxygen_level: i64) -> Self {
        self.heart_rate = heart_rate.to_string();
        self.oxygen_level = oxygen_level.to_string();
        self
    }

    /// Fill both vitals from a preset, keeping the patient
    pub fn apply_preset(&mut self, preset: Preset) {
        let (hr, o2) = preset.values();
        self.heart_rate = hr.to_string();
        self.oxygen_level = o2.to_string();
    }

    /// Back to the empty form
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn parsed_heart_rate(&self) -> Option<i64> {
        parse_int(&self.heart_rate)
    }

    pub fn parsed_oxygen(&self) -> Option<i64> {
        parse_int(&self.oxygen_level)
    }

    /// Live classification of what has been typed so far
    pub fn preview(&self) -> (VitalReading, VitalReading) {
        (
            classify_heart_rate(self.parsed_heart_rate()),
            classify_oxygen(self.parsed_oxygen()),
        )
    }

    /// Alert the backend is expected to raise for these values
    pub fn expected_alert(&self) -> Option<Severity> {
        expected_alert(self.parsed_heart_rate(), self.parsed_oxygen())
    }

    /// Check the draft and build the request body
    pub fn validate(&self) -> Result<TelemetryRequest, TelemetryError> {
        let patient_id = self.patient_id.trim();
        if patient_id.is_empty() {
            return Err(TelemetryError::MissingPatient);
        }

        let heart_rate = self
            .parsed_heart_rate()
            .ok_or(TelemetryError::InvalidHeartRate)?;
        let (min, max) = HEART_RATE_RANGE;
        if !(min..=max).contains(&heart_rate) {
            return Err(TelemetryError::HeartRateOutOfRange { min, max });
        }

        let oxygen_level = self.parsed_oxygen().ok_or(TelemetryError::InvalidOxygen)?;
        let (min, max) = OXYGEN_RANGE;
        if !(min..=max).contains(&oxygen_level) {
            return Err(TelemetryError::OxygenOutOfRange { min, max });
        }

        Ok(TelemetryRequest {
            patient_id: patient_id.to_string(),
            heart_rate,
            oxygen_level,
        })
    }
}

/// Whole-number field; fractional input truncates
fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

/// Inline message under the form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormMessage {
    pub kind: ToastKind,
    pub text: String,
}

impl FormMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl fmt::Display) -> Self {
        Self {
            kind: ToastKind::Error,
            text: format!("Error: {}", text),
        }
    }
}

/// Message for a backend answer
pub fn outcome_message(result: &Result<TelemetryResponse, ApiError>) -> FormMessage {
    match result {
        Ok(response) if response.alert_triggered => FormMessage::success(format!(
            "Data sent successfully! Alert triggered: {}",
            response.issue.as_deref().unwrap_or("")
        )),
        Ok(_) => FormMessage::success("Telemetry data sent successfully!"),
        Err(e) => FormMessage::error(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VitalStatus;

    #[test]
    fn test_presets_fill_vitals_only() {
        let mut draft = TelemetryDraft::new().patient("P001");
        draft.apply_preset(Preset::Critical);
        assert_eq!(draft.patient_id, "P001");
        assert_eq!((draft.heart_rate.as_str(), draft.oxygen_level.as_str()), ("45", "85"));
        assert_eq!(draft.expected_alert(), Some(Severity::High));

        draft.apply_preset(Preset::Warning);
        assert_eq!(draft.expected_alert(), Some(Severity::Medium));

        draft.apply_preset(Preset::Normal);
        assert_eq!(draft.expected_alert(), None);
    }

    #[test]
    fn test_preview_handles_partial_input() {
        let mut draft = TelemetryDraft::new();
        let (hr, o2) = draft.preview();
        assert_eq!(hr.status, VitalStatus::NoData);
        assert_eq!(o2.label, "No Data");

        draft.heart_rate = "130".to_string();
        draft.oxygen_level = "abc".to_string();
        let (hr, o2) = draft.preview();
        assert_eq!(hr.label, "Critical High");
        assert_eq!(o2.status, VitalStatus::NoData);
    }

    #[test]
    fn test_validate() {
        assert_eq!(
            TelemetryDraft::new().vitals(75, 98).validate(),
            Err(TelemetryError::MissingPatient)
        );

        let mut draft = TelemetryDraft::new().patient(" P001 ");
        assert_eq!(draft.validate(), Err(TelemetryError::InvalidHeartRate));

        draft.heart_rate = "250".to_string();
        draft.oxygen_level = "98".to_string();
        assert_eq!(
            draft.validate(),
            Err(TelemetryError::HeartRateOutOfRange { min: 30, max: 200 })
        );

        draft.heart_rate = "72.9".to_string();
        draft.oxygen_level = "69".to_string();
        assert!(matches!(
            draft.validate(),
            Err(TelemetryError::OxygenOutOfRange { .. })
        ));

        draft.oxygen_level = "100".to_string();
        assert_eq!(
            draft.validate(),
            Ok(TelemetryRequest {
                patient_id: "P001".to_string(),
                heart_rate: 72,
                oxygen_level: 100,
            })
        );
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut draft = TelemetryDraft::new().patient("P1").vitals(80, 97);
        draft.device_status = DeviceStatus::Maintenance;
        draft.reset();
        assert_eq!(draft, TelemetryDraft::default());
    }

    #[test]
    fn test_outcome_messages() {
        let triggered = Ok(TelemetryResponse {
            alert_triggered: true,
            issue: Some("Low oxygen".to_string()),
        });
        assert_eq!(
            outcome_message(&triggered).text,
            "Data sent successfully! Alert triggered: Low oxygen"
        );

        let quiet = Ok(TelemetryResponse::default());
        assert_eq!(outcome_message(&quiet).text, "Telemetry data sent successfully!");

        let failed = Err(ApiError::from_response(404, r#"{"detail": "Patient not found"}"#));
        let message = outcome_message(&failed);
        assert_eq!(message.kind, ToastKind::Error);
        assert_eq!(message.text, "Error: Patient not found");
    }

    #[test]
    fn test_preset_parse() {
        assert_eq!("Critical".parse::<Preset>(), Ok(Preset::Critical));
        assert!("panic".parse::<Preset>().is_err());
    }
}
