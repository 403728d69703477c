//! Alert feed view
//!
//! Alerts sort by raise time only ("newest" or "oldest") and each page is
//! grouped under calendar-relative date labels in the display zone.

use std::borrow::Cow;

use chrono::NaiveDate;

use crate::derive::{CsvLayout, SortDirection, SortSpec, ViewConfig};
use crate::model::Alert;
use crate::timefmt::DisplayZone;

pub const VIEW_NAME: &str = "alerts";

pub const SORT_KEY: &str = "datetime";
pub const SEVERITY_OPTIONS: &[&str] = &["high", "medium", "low"];
pub const STATUS_OPTIONS: &[&str] = &["resolved", "unresolved"];

/// Exported columns in order
pub const CSV_COLUMNS: &[&str] = &[
    "alert_id",
    "patient_id",
    "patient_name",
    "severity_level",
    "issue_detected",
    "message",
    "resolved",
    "datetime",
];

/// Most recent first (the default)
pub fn newest() -> SortSpec {
    SortSpec::descending(SORT_KEY)
}

/// Oldest first
pub fn oldest() -> SortSpec {
    SortSpec::ascending(SORT_KEY)
}

/// Toolbar label for a sort
pub fn sort_label(sort: &SortSpec) -> &'static str {
    match sort.direction {
        SortDirection::Descending => "newest",
        SortDirection::Ascending => "oldest",
    }
}

/// Parse a toolbar sort label
pub fn parse_sort(label: &str) -> Option<SortSpec> {
    match label.trim().to_ascii_lowercase().as_str() {
        "newest" => Some(newest()),
        "oldest" => Some(oldest()),
        _ => None,
    }
}

fn patient_id(a: &Alert) -> Cow<'_, str> {
    Cow::Borrowed(&a.patient_id)
}

fn patient_name(a: &Alert) -> Cow<'_, str> {
    Cow::Borrowed(&a.patient_name)
}

fn issue(a: &Alert) -> Cow<'_, str> {
    Cow::Borrowed(&a.issue_detected)
}

fn message(a: &Alert) -> Cow<'_, str> {
    Cow::Borrowed(a.message.as_deref().unwrap_or(""))
}

fn severity(a: &Alert) -> Cow<'_, str> {
    Cow::Borrowed(a.severity_str())
}

fn resolution(a: &Alert) -> Cow<'_, str> {
    Cow::Borrowed(resolution_label(a.resolved))
}

fn raised_at(a: &Alert) -> Option<f64> {
    a.datetime.map(|t| t.timestamp_millis() as f64)
}

/// Status filter value for a resolved flag
pub fn resolution_label(resolved: bool) -> &'static str {
    if resolved {
        "resolved"
    } else {
        "unresolved"
    }
}

/// Search, filter, sort and grouping registry for alerts.
///
/// Date labels are relative to `today`, so the config is rebuilt when the
/// display day changes.
pub fn view_config(zone: DisplayZone, today: NaiveDate) -> ViewConfig<Alert> {
    ViewConfig::new(VIEW_NAME, newest())
        .search(patient_id)
        .search(patient_name)
        .search(issue)
        .search(message)
        .filter_ignore_case("severity", "Severity", SEVERITY_OPTIONS, severity)
        .filter("status", "Status", STATUS_OPTIONS, resolution)
        .sort_number(SORT_KEY, raised_at)
        .group_by(move |a: &Alert| zone.date_label(a.datetime, today))
}

/// Exportable columns; resolved renders as Yes/No and times in `zone`
pub fn csv_layout(zone: DisplayZone) -> CsvLayout<Alert> {
    CsvLayout::new()
        .column("alert_id", "Alert ID", |a: &Alert| a.alert_id.clone())
        .column("patient_id", "Patient ID", |a: &Alert| a.patient_id.clone())
        .column("patient_name", "Patient Name", |a: &Alert| {
            a.patient_name.clone()
        })
        .column("severity_level", "Severity", |a: &Alert| {
            a.severity_str().to_string()
        })
        .column("issue_detected", "Issue", |a: &Alert| a.issue_detected.clone())
        .column("message", "Message", |a: &Alert| {
            a.message.clone().unwrap_or_default()
        })
        .column("resolved", "Resolved", |a: &Alert| {
            let text = if a.resolved { "Yes" } else { "No" };
            text.to_string()
        })
        .column("datetime", "Datetime", move |a: &Alert| {
            a.datetime
                .map(|t| zone.format_datetime(t))
                .unwrap_or_default()
        })
}
