//! Patient table view

use std::borrow::Cow;

use crate::derive::{CsvLayout, SortSpec, ViewConfig};
use crate::model::Patient;
use crate::prefs::settings::columns_key;
use crate::prefs::{ColumnVisibility, PreferenceStore};
use crate::timefmt::DisplayZone;

pub const VIEW_NAME: &str = "patients";

/// Table columns in display order
pub const COLUMNS: &[&str] = &[
    "patient_id",
    "name",
    "age",
    "gender",
    "medical_conditions",
    "heart_rate",
    "oxygen_level",
    "last_reading",
    "status",
    "actions",
];

/// Columns that cannot be hidden
pub const LOCKED_COLUMNS: &[&str] = &["patient_id", "name", "status", "actions"];

pub const STATUS_OPTIONS: &[&str] = &["Online", "Offline"];
pub const GENDER_OPTIONS: &[&str] = &["Male", "Female", "Other"];

/// Header text for a column key
pub fn column_header(key: &str) -> &'static str {
    match key {
        "patient_id" => "Patient ID",
        "name" => "Name",
        "age" => "Age",
        "gender" => "Gender",
        "medical_conditions" => "Medical Conditions",
        "heart_rate" => "Heart Rate",
        "oxygen_level" => "Oxygen Level",
        "last_reading" => "Last Reading",
        "status" => "Status",
        "actions" => "Actions",
        _ => "",
    }
}

/// Numeric ordering key of an identifier: its digits read as one number,
/// 0 when there are none ("P-012" → 12, "ABC" → 0)
pub fn numeric_id(id: &str) -> f64 {
    let digits: String = id.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0.0)
}

fn patient_id(p: &Patient) -> Cow<'_, str> {
    Cow::Borrowed(&p.patient_id)
}

fn name(p: &Patient) -> Cow<'_, str> {
    Cow::Borrowed(&p.name)
}

fn gender(p: &Patient) -> Cow<'_, str> {
    Cow::Borrowed(&p.gender)
}

fn conditions(p: &Patient) -> Cow<'_, str> {
    Cow::Borrowed(&p.medical_conditions)
}

fn status(p: &Patient) -> Cow<'_, str> {
    Cow::Borrowed(p.connection_status.as_str())
}

fn id_number(p: &Patient) -> Option<f64> {
    Some(numeric_id(&p.patient_id))
}

fn age(p: &Patient) -> Option<f64> {
    p.age.map(f64::from)
}

fn heart_rate(p: &Patient) -> Option<f64> {
    p.heart_rate.map(|v| v as f64)
}

fn oxygen_level(p: &Patient) -> Option<f64> {
    p.oxygen_level.map(|v| v as f64)
}

fn last_reading(p: &Patient) -> Option<f64> {
    p.last_reading.map(|t| t.timestamp_millis() as f64)
}

/// Search, filter and sort registry for patients
pub fn view_config() -> ViewConfig<Patient> {
    ViewConfig::new(VIEW_NAME, SortSpec::ascending("patient_id"))
        .search(name)
        .search(patient_id)
        .filter("status", "Status", STATUS_OPTIONS, status)
        .filter("gender", "Gender", GENDER_OPTIONS, gender)
        .sort_number("patient_id", id_number)
        .sort_text("name", name)
        .sort_number("age", age)
        .sort_text("gender", gender)
        .sort_text("medical_conditions", conditions)
        .sort_number("heart_rate", heart_rate)
        .sort_number("oxygen_level", oxygen_level)
        .sort_number("last_reading", last_reading)
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Exportable columns; `actions` has no cell and is never exported
pub fn csv_layout(zone: DisplayZone) -> CsvLayout<Patient> {
    CsvLayout::new()
        .column("patient_id", column_header("patient_id"), |p: &Patient| {
            p.patient_id.clone()
        })
        .column("name", column_header("name"), |p: &Patient| p.name.clone())
        .column("age", column_header("age"), |p: &Patient| optional(p.age))
        .column("gender", column_header("gender"), |p: &Patient| p.gender.clone())
        .column(
            "medical_conditions",
            column_header("medical_conditions"),
            |p: &Patient| p.medical_conditions.clone(),
        )
        .column("heart_rate", column_header("heart_rate"), |p: &Patient| {
            optional(p.heart_rate)
        })
        .column("oxygen_level", column_header("oxygen_level"), |p: &Patient| {
            optional(p.oxygen_level)
        })
        .column("last_reading", column_header("last_reading"), move |p: &Patient| {
            p.last_reading
                .map(|t| zone.format_datetime(t))
                .unwrap_or_default()
        })
        .column("status", column_header("status"), |p: &Patient| {
            p.connection_status.to_string()
        })
}

/// Stored column visibility for the patient table
pub fn load_columns(store: &dyn PreferenceStore) -> ColumnVisibility {
    ColumnVisibility::load(store, &columns_key(VIEW_NAME), COLUMNS, LOCKED_COLUMNS)
}

pub fn save_columns(store: &dyn PreferenceStore, columns: &ColumnVisibility) -> bool {
    columns.save(store, &columns_key(VIEW_NAME))
}
