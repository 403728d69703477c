//! Typed accessors for the known preference keys

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PreferenceStore, PreferenceStoreExt};
use crate::derive::DEFAULT_PAGE_SIZE;

pub const THEME_KEY: &str = "theme";

/// Key holding the page size of a view (e.g. `patients_page_size`)
pub fn page_size_key(view: &str) -> String {
    format!("{}_page_size", view)
}

/// Key holding the table density of a view (e.g. `patients_density`)
pub fn density_key(view: &str) -> String {
    format!("{}_density", view)
}

/// Key holding the column visibility map of a view (e.g. `patients_columns`)
pub fn columns_key(view: &str) -> String {
    format!("{}_columns", view)
}

/// Persisted page size for a view; zero or garbage falls back to 10
pub fn load_page_size(store: &dyn PreferenceStore, view: &str) -> usize {
    match store.get_json::<usize>(&page_size_key(view), DEFAULT_PAGE_SIZE) {
        0 => DEFAULT_PAGE_SIZE,
        n => n,
    }
}

pub fn save_page_size(store: &dyn PreferenceStore, view: &str, page_size: usize) -> bool {
    store.set_string(&page_size_key(view), &page_size.to_string())
}

/// Table row density
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Density {
    #[default]
    Compact,
    Comfortable,
}

impl Density {
    pub fn as_str(&self) -> &'static str {
        match self {
            Density::Compact => "compact",
            Density::Comfortable => "comfortable",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "compact" => Some(Density::Compact),
            "comfortable" => Some(Density::Comfortable),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Density::Compact => Density::Comfortable,
            Density::Comfortable => Density::Compact,
        }
    }

    pub fn load(store: &dyn PreferenceStore, view: &str) -> Self {
        store
            .get_raw(&density_key(view))
            .and_then(|raw| Density::parse(&raw))
            .unwrap_or_default()
    }

    pub fn save(self, store: &dyn PreferenceStore, view: &str) -> bool {
        store.set_string(&density_key(view), self.as_str())
    }
}

/// UI colour theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn load(store: &dyn PreferenceStore) -> Self {
        store
            .get_raw(THEME_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default()
    }

    pub fn save(self, store: &dyn PreferenceStore) -> bool {
        store.set_string(THEME_KEY, self.as_str())
    }
}

/// Which table columns are shown.
///
/// Columns keep their declared order. Locked columns are always visible and
/// ignore toggles, whatever the stored map says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnVisibility {
    columns: Vec<(&'static str, bool)>,
    locked: &'static [&'static str],
}

impl ColumnVisibility {
    /// Every column visible
    pub fn all_visible(columns: &[&'static str], locked: &'static [&'static str]) -> Self {
        Self {
            columns: columns.iter().map(|&key| (key, true)).collect(),
            locked,
        }
    }

    /// Defaults overlaid with the stored map; unknown keys are ignored and a
    /// corrupt map yields the defaults
    pub fn load(
        store: &dyn PreferenceStore,
        key: &str,
        columns: &[&'static str],
        locked: &'static [&'static str],
    ) -> Self {
        let saved: BTreeMap<String, bool> = store.get_json(key, BTreeMap::new());
        let mut visibility = Self::all_visible(columns, locked);

        for (column, visible) in visibility.columns.iter_mut() {
            if let Some(&stored) = saved.get(*column) {
                *visible = stored || locked.iter().any(|l| *l == *column);
            }
        }
        visibility
    }

    pub fn save(&self, store: &dyn PreferenceStore, key: &str) -> bool {
        store.set_json(key, &self.to_map())
    }

    pub fn is_locked(&self, column: &str) -> bool {
        self.locked.iter().any(|&l| l == column)
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.columns
            .iter()
            .any(|(key, visible)| *key == column && *visible)
    }

    /// Flip a column; returns whether anything changed
    pub fn toggle(&mut self, column: &str) -> bool {
        if self.is_locked(column) {
            return false;
        }
        match self.columns.iter_mut().find(|(key, _)| *key == column) {
            Some((_, visible)) => {
                *visible = !*visible;
                true
            }
            None => false,
        }
    }

    /// Visible column keys in declared order
    pub fn visible(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|(_, visible)| *visible)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Every column with its flag, in declared order
    pub fn columns(&self) -> &[(&'static str, bool)] {
        &self.columns
    }

    pub fn to_map(&self) -> BTreeMap<String, bool> {
        self.columns
            .iter()
            .map(|(key, visible)| (key.to_string(), *visible))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::MemoryPreferenceStore;

    const COLUMNS: &[&str] = &["patient_id", "name", "age", "heart_rate", "actions"];
    const LOCKED: &[&str] = &["patient_id", "name", "actions"];

    #[test]
    fn test_page_size_fallbacks() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(load_page_size(&store, "patients"), 10);

        store.set_string("patients_page_size", "25");
        assert_eq!(load_page_size(&store, "patients"), 25);

        store.set_string("patients_page_size", "0");
        assert_eq!(load_page_size(&store, "patients"), 10);

        store.set_string("patients_page_size", "lots");
        assert_eq!(load_page_size(&store, "patients"), 10);
    }

    #[test]
    fn test_page_size_is_per_view() {
        let store = MemoryPreferenceStore::new();
        assert!(save_page_size(&store, "alerts", 50));
        assert_eq!(load_page_size(&store, "alerts"), 50);
        assert_eq!(load_page_size(&store, "patients"), 10);
    }

    #[test]
    fn test_density_and_theme_defaults() {
        let store = MemoryPreferenceStore::new();
        assert_eq!(Density::load(&store, "patients"), Density::Compact);
        assert_eq!(Theme::load(&store), Theme::Dark);

        store.set_string("theme", "purple");
        assert_eq!(Theme::load(&store), Theme::Dark);

        assert!(Theme::Dark.toggled().save(&store));
        assert_eq!(Theme::load(&store), Theme::Light);

        assert!(Density::Compact.toggled().save(&store, "patients"));
        assert_eq!(Density::load(&store, "patients"), Density::Comfortable);
    }

    #[test]
    fn test_columns_corrupt_json_falls_back_to_all_visible() {
        let store = MemoryPreferenceStore::new().with("patients_columns", "{\"age\": fals");
        let cols = ColumnVisibility::load(&store, "patients_columns", COLUMNS, LOCKED);
        assert_eq!(cols.visible(), COLUMNS.to_vec());
    }

    #[test]
    fn test_columns_merge_over_defaults() {
        let store = MemoryPreferenceStore::new().with(
            "patients_columns",
            r#"{"age": false, "unknown": false, "name": false}"#,
        );
        let cols = ColumnVisibility::load(&store, "patients_columns", COLUMNS, LOCKED);

        assert!(!cols.is_visible("age"));
        // Locked columns stay visible even if the stored map hides them
        assert!(cols.is_visible("name"));
        assert_eq!(cols.visible(), vec!["patient_id", "name", "heart_rate", "actions"]);
    }

    #[test]
    fn test_columns_toggle_and_persist() {
        let store = MemoryPreferenceStore::new();
        let mut cols = ColumnVisibility::load(&store, "patients_columns", COLUMNS, LOCKED);

        assert!(!cols.toggle("patient_id"));
        assert!(!cols.toggle("nope"));
        assert!(cols.toggle("heart_rate"));
        assert!(cols.save(&store, "patients_columns"));

        let reloaded = ColumnVisibility::load(&store, "patients_columns", COLUMNS, LOCKED);
        assert!(!reloaded.is_visible("heart_rate"));
        assert_eq!(reloaded, cols);
    }
}
