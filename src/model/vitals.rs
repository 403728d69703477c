//! Vital-sign classification
//!
//! One set of thresholds drives tile styling, dashboard counts and the
//! telemetry preview. Critical bounds match the backend's alert triggers:
//!
//! | Vital       | Critical        | Warning                  | Normal     |
//! |-------------|-----------------|--------------------------|------------|
//! | Heart rate  | < 50 or > 120   | 50–59 or 101–120         | 60–100     |
//! | Oxygen (%)  | < 90            | 90–94                    | ≥ 95       |

use serde::Serialize;

use super::alert::Severity;

pub const HEART_RATE_CRITICAL_LOW: i64 = 50;
pub const HEART_RATE_NORMAL_LOW: i64 = 60;
pub const HEART_RATE_NORMAL_HIGH: i64 = 100;
pub const HEART_RATE_CRITICAL_HIGH: i64 = 120;

pub const OXYGEN_CRITICAL_LOW: i64 = 90;
pub const OXYGEN_NORMAL_LOW: i64 = 95;

/// Coarse status used for styling and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalStatus {
    Normal,
    Warning,
    Critical,
    NoData,
}

impl VitalStatus {
    /// Style class name
    pub fn as_str(&self) -> &'static str {
        match self {
            VitalStatus::Normal => "normal",
            VitalStatus::Warning => "warning",
            VitalStatus::Critical => "critical",
            VitalStatus::NoData => "no_data",
        }
    }
}

/// Status plus the human label shown next to a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VitalReading {
    pub status: VitalStatus,
    pub label: &'static str,
}

impl VitalReading {
    const fn new(status: VitalStatus, label: &'static str) -> Self {
        Self { status, label }
    }
}

/// Classify a heart rate in beats per minute
pub fn classify_heart_rate(bpm: Option<i64>) -> VitalReading {
    match bpm {
        None => VitalReading::new(VitalStatus::NoData, "No Data"),
        Some(v) if v < HEART_RATE_CRITICAL_LOW => {
            VitalReading::new(VitalStatus::Critical, "Critical Low")
        }
        Some(v) if v < HEART_RATE_NORMAL_LOW => VitalReading::new(VitalStatus::Warning, "Low"),
        Some(v) if v <= HEART_RATE_NORMAL_HIGH => VitalReading::new(VitalStatus::Normal, "Normal"),
        Some(v) if v <= HEART_RATE_CRITICAL_HIGH => VitalReading::new(VitalStatus::Warning, "High"),
        Some(_) => VitalReading::new(VitalStatus::Critical, "Critical High"),
    }
}

/// Classify an oxygen saturation percentage
pub fn classify_oxygen(percent: Option<i64>) -> VitalReading {
    match percent {
        None => VitalReading::new(VitalStatus::NoData, "No Data"),
        Some(v) if v < OXYGEN_CRITICAL_LOW => VitalReading::new(VitalStatus::Critical, "Critical Low"),
        Some(v) if v < OXYGEN_NORMAL_LOW => VitalReading::new(VitalStatus::Warning, "Low"),
        Some(_) => VitalReading::new(VitalStatus::Normal, "Normal"),
    }
}

/// Severity of the alert the backend raises for a reading, if any.
///
/// High for a critical heart rate or oxygen, medium for oxygen 90-94.
/// A heart-rate warning alone raises nothing.
pub fn expected_alert(heart_rate: Option<i64>, oxygen: Option<i64>) -> Option<Severity> {
    let hr = classify_heart_rate(heart_rate).status;
    let o2 = classify_oxygen(oxygen).status;

    if hr == VitalStatus::Critical || o2 == VitalStatus::Critical {
        Some(Severity::High)
    } else if o2 == VitalStatus::Warning {
        Some(Severity::Medium)
    } else {
        None
    }
}
