//! JSON-file preference store
//!
//! The whole store is one JSON object of string values, rewritten on every
//! change. A missing or corrupt file behaves as an empty store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde_json::Value;

use super::PreferenceStore;

/// Preferences persisted to a JSON file
#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open the store at `path`, loading whatever valid content is there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_entries(&path);
        tracing::debug!(path = ?path, count = entries.len(), "Opened preference store");

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Platform default location (`<config dir>/vitalwatch/preferences.json`)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join("vitalwatch").join("preferences.json"))
            .unwrap_or_else(|| PathBuf::from("./vitalwatch_preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of every stored entry
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries.read().map(|e| e.clone()).unwrap_or_default()
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> bool {
        let content = match serde_json::to_string_pretty(entries) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize preferences");
                return false;
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    tracing::warn!(path = ?parent, error = %e, "Failed to create preference directory");
                    return false;
                }
            }
        }

        match std::fs::write(&self.path, content) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Failed to write preferences");
                false
            }
        }
    }
}

fn load_entries(path: &Path) -> BTreeMap<String, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
        Err(e) => {
            tracing::warn!(path = ?path, error = %e, "Failed to read preferences, using defaults");
            return BTreeMap::new();
        }
    };

    let object = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(object)) => object,
        Ok(_) | Err(_) => {
            tracing::warn!(path = ?path, "Preference file is not a JSON object, using defaults");
            return BTreeMap::new();
        }
    };

    object
        .into_iter()
        .map(|(key, value)| {
            let raw = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, raw)
        })
        .collect()
}

impl PreferenceStore for FilePreferenceStore {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.entries.read().ok()?.get(key).cloned()
    }

    fn set_raw(&self, key: &str, value: String) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            return false;
        };
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> bool {
        let Ok(mut entries) = self.entries.write() else {
            return false;
        };
        if entries.remove(key).is_none() {
            return true;
        }
        self.persist(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::PreferenceStoreExt;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FilePreferenceStore::open(dir.path().join("prefs.json"));
        assert!(store.entries().is_empty());
        assert_eq!(store.get_string("theme", "dark"), "dark");
    }

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        {
            let store = FilePreferenceStore::open(&path);
            assert!(store.set_string("theme", "light"));
            assert!(store.set_json("alerts_page_size", &25usize));
        }

        let reopened = FilePreferenceStore::open(&path);
        assert_eq!(reopened.get_string("theme", "dark"), "light");
        assert_eq!(reopened.get_json::<usize>("alerts_page_size", 10), 25);
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{{{ definitely not json").unwrap();

        let store = FilePreferenceStore::open(&path);
        assert!(store.entries().is_empty());
        assert_eq!(store.get_json::<usize>("patients_page_size", 10), 10);
    }

    #[test]
    fn test_non_string_values_are_kept_as_json_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"patients_page_size": 50, "theme": "light"}"#).unwrap();

        let store = FilePreferenceStore::open(&path);
        assert_eq!(store.get_json::<usize>("patients_page_size", 10), 50);
        assert_eq!(store.get_string("theme", "dark"), "light");
    }

    #[test]
    fn test_write_failure_reports_false() {
        let dir = tempdir().unwrap();
        // The parent "directory" is a regular file, so writes must fail
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();

        let store = FilePreferenceStore::open(blocker.join("prefs.json"));
        assert!(!store.set_string("theme", "light"));
    }

    #[test]
    fn test_remove_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = FilePreferenceStore::open(&path);
        store.set_string("theme", "light");
        assert!(store.remove("theme"));

        let reopened = FilePreferenceStore::open(&path);
        assert!(reopened.get_raw("theme").is_none());
    }
}
