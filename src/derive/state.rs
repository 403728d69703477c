//! View state: the ephemeral criteria a view is derived from

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rows per page when nothing is persisted
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Page sizes offered by the page-size selector
pub const PAGE_SIZE_OPTIONS: [usize; 3] = [10, 25, 50];

/// Filter value meaning "no filter on this dimension"
pub const FILTER_ALL: &str = "all";

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

/// Sort key plus direction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub key: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Ascending)
    }

    pub fn descending(key: impl Into<String>) -> Self {
        Self::new(key, SortDirection::Descending)
    }
}

/// Everything that determines a derived view besides the records themselves.
///
/// Only `page_size` is persisted; the rest resets with the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_text: String,
    /// Non-default filter values keyed by dimension name
    pub filters: BTreeMap<String, String>,
    pub sort: SortSpec,
    /// 1-based requested page
    pub page: usize,
    pub page_size: usize,
}

impl ViewState {
    /// Fresh state with the given default sort
    pub fn new(sort: SortSpec) -> Self {
        Self {
            search_text: String::new(),
            filters: BTreeMap::new(),
            sort,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Builder: set page size (0 becomes the default)
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = normalize_page_size(page_size);
        self
    }

    /// Builder: set search text
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Builder: set a filter value
    pub fn with_filter(mut self, dimension: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        let dimension = dimension.into();
        if value == FILTER_ALL {
            self.filters.remove(&dimension);
        } else {
            self.filters.insert(dimension, value);
        }
        self
    }

    /// Builder: set requested page
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Current value of a filter dimension ("all" when unset)
    pub fn filter(&self, dimension: &str) -> &str {
        self.filters
            .get(dimension)
            .map(String::as_str)
            .unwrap_or(FILTER_ALL)
    }

    /// Lowercased, trimmed search text; `None` when blank
    pub fn search_query(&self) -> Option<String> {
        let trimmed = self.search_text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_lowercase())
        }
    }

    /// True when no search or filter narrows the records
    pub fn is_unfiltered(&self) -> bool {
        self.search_query().is_none() && self.filters.values().all(|v| v == FILTER_ALL)
    }
}

/// Zero page size is not meaningful; treat it as the default
pub fn normalize_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let state = ViewState::new(SortSpec::ascending("patient_id"));
        assert_eq!(state.page, 1);
        assert_eq!(state.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(state.filter("status"), FILTER_ALL);
        assert!(state.is_unfiltered());
    }

    #[test]
    fn test_search_query_trims_and_lowercases() {
        let state = ViewState::new(SortSpec::ascending("name")).with_search("  Ada L ");
        assert_eq!(state.search_query().as_deref(), Some("ada l"));

        let blank = ViewState::new(SortSpec::ascending("name")).with_search("   ");
        assert_eq!(blank.search_query(), None);
    }

    #[test]
    fn test_filter_all_removes_entry() {
        let state = ViewState::new(SortSpec::ascending("name"))
            .with_filter("status", "Online")
            .with_filter("status", FILTER_ALL);
        assert!(state.filters.is_empty());
    }

    #[test]
    fn test_direction_serde_names() {
        assert_eq!(
            serde_json::to_string(&SortDirection::Descending).unwrap(),
            "\"desc\""
        );
        assert_eq!(SortDirection::Ascending.flipped(), SortDirection::Descending);
    }

    #[test]
    fn test_zero_page_size_normalized() {
        let state = ViewState::new(SortSpec::ascending("name")).with_page_size(0);
        assert_eq!(state.page_size, DEFAULT_PAGE_SIZE);
    }
}
