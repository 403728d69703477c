//! Concrete Views
//!
//! The two instantiations of the derived view engine:
//! - **patients**: searchable patient table with status/gender filters,
//!   sortable columns, hideable columns and CSV export
//! - **alerts**: alert feed with severity/status filters, newest/oldest
//!   sort, date grouping and CSV export

pub mod alerts;
pub mod patients;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which collection a view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewKind {
    Patients,
    Alerts,
}

impl ViewKind {
    /// View name, also the preference-key prefix
    pub fn name(&self) -> &'static str {
        match self {
            ViewKind::Patients => patients::VIEW_NAME,
            ViewKind::Alerts => alerts::VIEW_NAME,
        }
    }

    /// Download name for an export of this view
    pub fn export_file_name(&self) -> String {
        format!("{}.csv", self.name())
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ViewKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "patients" => Ok(ViewKind::Patients),
            "alerts" => Ok(ViewKind::Alerts),
            other => Err(format!("Unknown view: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_kind_names() {
        assert_eq!(ViewKind::Patients.export_file_name(), "patients.csv");
        assert_eq!("Alerts".parse::<ViewKind>(), Ok(ViewKind::Alerts));
        assert!("vitals".parse::<ViewKind>().is_err());
    }
}
