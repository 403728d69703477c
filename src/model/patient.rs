//! Patient records as returned by the monitoring backend

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::lenient;

/// Liveness of a patient's monitoring device
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Online,
    #[default]
    Offline,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Online => "Online",
            ConnectionStatus::Offline => "Offline",
        }
    }

    /// Case-insensitive parse; anything but "online" is offline
    pub fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("online") {
            ConnectionStatus::Online
        } else {
            ConnectionStatus::Offline
        }
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConnectionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => ConnectionStatus::parse(&s),
            _ => ConnectionStatus::Offline,
        })
    }
}

/// A monitored patient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Unique identifier (e.g. "P001")
    #[serde(default, deserialize_with = "lenient::string")]
    pub patient_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_u32")]
    pub age: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub gender: String,
    /// Free-text conditions
    #[serde(default, deserialize_with = "lenient::string")]
    pub medical_conditions: String,
    /// Beats per minute
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub heart_rate: Option<i64>,
    /// SpO2 percent
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub oxygen_level: Option<i64>,
    #[serde(default)]
    pub connection_status: ConnectionStatus,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub last_reading: Option<DateTime<Utc>>,
}

impl Patient {
    /// Create a patient with only identity fields set
    pub fn new(patient_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            name: name.into(),
            age: None,
            gender: String::new(),
            medical_conditions: String::new(),
            heart_rate: None,
            oxygen_level: None,
            connection_status: ConnectionStatus::Offline,
            last_reading: None,
        }
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

    /// Builder: set both vitals
    pub fn vitals(mut self, heart_rate: i64, oxygen_level: i64) -> Self {
        self.heart_rate = Some(heart_rate);
        self.oxygen_level = Some(oxygen_level);
        self
    }

    /// Builder: set connection status
    pub fn status(mut self, status: ConnectionStatus) -> Self {
        self.connection_status = status;
        self
    }

    /// Builder: set last reading time
    pub fn last_reading(mut self, at: DateTime<Utc>) -> Self {
        self.last_reading = Some(at);
        self
    }

    pub fn is_online(&self) -> bool {
        self.connection_status == ConnectionStatus::Online
    }

    /// Up to two uppercase initials, "PT" when the name is blank
    pub fn initials(&self) -> String {
        initials(&self.name)
    }
}

/// Up to two uppercase initials of a display name, "PT" when blank
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if initials.is_empty() {
        "PT".to_string()
    } else {
        initials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_record() {
        let patient: Patient = serde_json::from_value(json!({
            "patient_id": "P001",
            "name": "Ada Lovelace",
            "age": 36,
            "gender": "Female",
            "medical_conditions": "Hypertension, Asthma",
            "heart_rate": 72,
            "oxygen_level": 97,
            "connection_status": "Online",
            "last_reading": "2024-01-15T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(patient.patient_id, "P001");
        assert_eq!(patient.age, Some(36));
        assert_eq!(patient.heart_rate, Some(72));
        assert!(patient.is_online());
        assert!(patient.last_reading.is_some());
    }

    #[test]
    fn test_decode_sparse_record() {
        let patient: Patient = serde_json::from_value(json!({
            "patient_id": "P002",
            "name": "Grace Hopper",
            "heart_rate": null,
            "connection_status": "ONLINE",
            "last_reading": null
        }))
        .unwrap();

        assert_eq!(patient.heart_rate, None);
        assert_eq!(patient.oxygen_level, None);
        assert_eq!(patient.medical_conditions, "");
        assert_eq!(patient.connection_status, ConnectionStatus::Online);
        assert!(patient.last_reading.is_none());
    }

    #[test]
    fn test_unknown_status_is_offline() {
        let patient: Patient =
            serde_json::from_value(json!({"patient_id": "P3", "connection_status": "paused"}))
                .unwrap();
        assert_eq!(patient.connection_status, ConnectionStatus::Offline);
    }

    #[test]
    fn test_initials() {
        assert_eq!(initials("Ada Lovelace"), "AL");
        assert_eq!(initials("  grace  brewster hopper "), "GB");
        assert_eq!(initials("Cher"), "C");
        assert_eq!(initials("   "), "PT");
        assert_eq!(initials(""), "PT");
    }
}
