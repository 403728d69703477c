//! Alerts raised by the backend when telemetry crosses a threshold

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::lenient;

/// Alert urgency
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// All severities, most urgent first
    pub fn all() -> &'static [Severity] {
        &[Severity::High, Severity::Medium, Severity::Low]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }

    /// Case-insensitive parse
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Severity::High),
            "medium" => Some(Severity::Medium),
            "low" => Some(Severity::Low),
            _ => None,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Severity::parse(&s),
        _ => None,
    })
}

/// An alert about one patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    #[serde(default, deserialize_with = "lenient::string")]
    pub alert_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub patient_id: String,
    /// Denormalized copy of the patient's name
    #[serde(default, deserialize_with = "lenient::string")]
    pub patient_name: String,
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity_level: Option<Severity>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub issue_detected: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub resolved: bool,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub datetime: Option<DateTime<Utc>>,
}

impl Alert {
    /// Create an unresolved alert with no severity or timestamp
    pub fn new(
        alert_id: impl Into<String>,
        patient_id: impl Into<String>,
        patient_name: impl Into<String>,
    ) -> Self {
        Self {
            alert_id: alert_id.into(),
            patient_id: patient_id.into(),
            patient_name: patient_name.into(),
            severity_level: None,
            issue_detected: String::new(),
            message: None,
            resolved: false,
            datetime: None,
        }
    }

    /// Builder: set severity
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity_level = Some(severity);
        self
    }

    /// Builder: set detected issue
    pub fn issue(mut self, issue: impl Into<String>) -> Self {
        self.issue_detected = issue.into();
        self
    }

    /// Builder: set message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Builder: mark resolved
    pub fn resolved(mut self, resolved: bool) -> Self {
        self.resolved = resolved;
        self
    }

    /// Builder: set raise time
    pub fn at(mut self, datetime: DateTime<Utc>) -> Self {
        self.datetime = Some(datetime);
        self
    }

    /// Severity text, empty when unknown
    pub fn severity_str(&self) -> &'static str {
        self.severity_level.map(|s| s.as_str()).unwrap_or("")
    }

    pub fn is_critical(&self) -> bool {
        self.severity_level == Some(Severity::High)
    }

    /// Raise time in epoch milliseconds, 0 when missing
    pub fn timestamp_millis(&self) -> i64 {
        self.datetime.map(|dt| dt.timestamp_millis()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_alert() {
        let alert: Alert = serde_json::from_value(json!({
            "alert_id": 17,
            "patient_id": "P001",
            "patient_name": "Ada Lovelace",
            "severity_level": "HIGH",
            "issue_detected": "Low oxygen",
            "message": "SpO2 at 85%",
            "resolved": false,
            "datetime": "2024-01-15T10:30:00"
        }))
        .unwrap();

        assert_eq!(alert.alert_id, "17");
        assert_eq!(alert.severity_level, Some(Severity::High));
        assert!(alert.is_critical());
        assert_eq!(alert.message.as_deref(), Some("SpO2 at 85%"));
        assert!(alert.timestamp_millis() > 0);
    }

    #[test]
    fn test_decode_sparse_alert() {
        let alert: Alert = serde_json::from_value(json!({
            "alert_id": "A9",
            "severity_level": "urgent",
            "message": "",
            "datetime": "garbage"
        }))
        .unwrap();

        assert_eq!(alert.severity_level, None);
        assert_eq!(alert.severity_str(), "");
        assert_eq!(alert.message, None);
        assert!(!alert.resolved);
        assert_eq!(alert.timestamp_millis(), 0);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse(" Medium "), Some(Severity::Medium));
        assert_eq!(Severity::parse("critical"), None);
        assert_eq!(Severity::Low.to_string(), "low");
    }
}
