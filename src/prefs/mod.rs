//! Preference Store
//!
//! Durable per-key preferences that survive a restart: page size per view,
//! table density, visible columns and theme. Everything else about a view is
//! ephemeral.
//!
//! Values are stored as strings, the way browser local storage holds them.
//! Reads never fail: a missing or unparsable value yields the caller's
//! default. Writes are best-effort and report success as a `bool`.
//!
//! - **memory**: in-process store, used as the test fake
//! - **file**: JSON object file on disk
//! - **settings**: typed accessors for the known preference keys

mod file;
mod memory;
pub mod settings;

pub use file::FilePreferenceStore;
pub use memory::MemoryPreferenceStore;
pub use settings::{ColumnVisibility, Density, Theme};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Raw string key-value store with interior mutability so it can be shared
/// as `Arc<dyn PreferenceStore>`
pub trait PreferenceStore: Send + Sync {
    /// Stored value for `key`, if any
    fn get_raw(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`; `false` when the value could not be kept
    fn set_raw(&self, key: &str, value: String) -> bool;

    /// Remove `key`; `false` when removal could not be persisted
    fn remove(&self, key: &str) -> bool;
}

/// Typed helpers over any [`PreferenceStore`]
pub trait PreferenceStoreExt: PreferenceStore {
    /// Stored string or `default`
    fn get_string(&self, key: &str, default: &str) -> String {
        self.get_raw(key).unwrap_or_else(|| default.to_string())
    }

    /// Stored JSON value or `default` when missing or unparsable
    fn get_json<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.get_raw(key) else {
            return default;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring unparsable preference");
                default
            }
        }
    }

    fn set_string(&self, key: &str, value: &str) -> bool {
        self.set_raw(key, value.to_string())
    }

    /// Serialize and store; `false` if serialization or storage failed
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_raw(key, raw),
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to serialize preference");
                false
            }
        }
    }
}

impl<S: PreferenceStore + ?Sized> PreferenceStoreExt for S {}
