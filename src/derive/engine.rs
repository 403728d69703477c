//! Filter → sort → paginate → group
//!
//! `derive_view` is a pure function of the records, the view state and the
//! config. It borrows the records, never mutates them, and is total: an
//! absent collection behaves as empty, missing fields project to ""
//! (or 0 for numeric sort keys), and unknown sort keys or filter dimensions
//! are ignored.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;

use super::config::{SortKind, ViewConfig};
use super::state::{normalize_page_size, SortDirection, SortSpec, ViewState, FILTER_ALL};

/// Which criterion an active-filter pill clears
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "dimension", rename_all = "snake_case")]
pub enum FilterKey {
    Search,
    Dimension(String),
}

/// One non-default criterion, as summarised above the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFilter {
    pub key: FilterKey,
    pub label: String,
}

/// A run of page items sharing a group label
#[derive(Debug, Clone, PartialEq)]
pub struct Group<'a, T> {
    pub label: String,
    pub items: Vec<&'a T>,
}

/// Pagination bounds for a filtered set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    /// Effective page, always within `1..=total_pages`
    pub page: usize,
    pub total_pages: usize,
    /// Half-open index range into the filtered set
    pub start: usize,
    pub end: usize,
}

impl PageWindow {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// 1-based index of the first item shown; 0 when empty
    pub fn from_index(&self) -> usize {
        if self.start == self.end {
            0
        } else {
            self.start + 1
        }
    }

    /// 1-based index of the last item shown; 0 when empty
    pub fn to_index(&self) -> usize {
        self.end
    }
}

/// Compute the page window for `total` items.
///
/// A zero page size is treated as the default; page 0 is treated as 1 and
/// pages past the end clamp to the last page.
pub fn paginate(total: usize, page: usize, page_size: usize) -> PageWindow {
    let page_size = normalize_page_size(page_size);
    let total_pages = total.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * page_size).min(total);
    let end = start.saturating_add(page_size).min(total);

    PageWindow {
        page,
        total_pages,
        start,
        end,
    }
}

/// Text ordering: case-insensitive first, raw text breaks ties
pub fn collate(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Result of deriving a view
#[derive(Debug, Clone)]
pub struct DerivedView<'a, T> {
    filtered: Vec<&'a T>,
    window: PageWindow,
    groups: Option<Vec<Group<'a, T>>>,
    active_filters: Vec<ActiveFilter>,
}

impl<'a, T> DerivedView<'a, T> {
    /// Items on the effective page, in sort order
    pub fn page_items(&self) -> &[&'a T] {
        &self.filtered[self.window.range()]
    }

    /// Every item that passed the filters, in sort order (the export set)
    pub fn filtered(&self) -> &[&'a T] {
        &self.filtered
    }

    pub fn total_count(&self) -> usize {
        self.filtered.len()
    }

    pub fn total_pages(&self) -> usize {
        self.window.total_pages
    }

    /// Effective page after clamping
    pub fn page(&self) -> usize {
        self.window.page
    }

    pub fn from_index(&self) -> usize {
        self.window.from_index()
    }

    pub fn to_index(&self) -> usize {
        self.window.to_index()
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Page items partitioned by group label, first-seen order; `None` for
    /// ungrouped views
    pub fn groups(&self) -> Option<&[Group<'a, T>]> {
        self.groups.as_deref()
    }

    pub fn active_filters(&self) -> &[ActiveFilter] {
        &self.active_filters
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Derive the rendered slice of `records` for `state`
pub fn derive_view<'a, T>(
    records: Option<&'a [T]>,
    state: &ViewState,
    config: &ViewConfig<T>,
) -> DerivedView<'a, T> {
    let records = records.unwrap_or(&[]);

    let mut filtered = filter_records(records, state, config);
    sort_records(&mut filtered, &state.sort, config);

    let window = paginate(filtered.len(), state.page, state.page_size);
    let groups = config
        .grouper()
        .map(|grouper| group_items(&filtered[window.range()], |r| grouper(r)));
    let active_filters = active_filters(state, config);

    tracing::trace!(
        view = config.name(),
        total = records.len(),
        matched = filtered.len(),
        page = window.page,
        total_pages = window.total_pages,
        "Derived view"
    );

    DerivedView {
        filtered,
        window,
        groups,
        active_filters,
    }
}

/// Keep records matching the search text and every active filter
pub fn filter_records<'a, T>(
    records: &'a [T],
    state: &ViewState,
    config: &ViewConfig<T>,
) -> Vec<&'a T> {
    let query = state.search_query();

    let dimensions: Vec<_> = state
        .filters
        .iter()
        .filter(|(_, value)| value.as_str() != FILTER_ALL)
        .filter_map(|(name, value)| match config.filter_dimension(name) {
            Some(dimension) => Some((dimension, value.as_str())),
            None => {
                tracing::debug!(view = config.name(), dimension = %name, "Ignoring unknown filter");
                None
            }
        })
        .collect();

    records
        .iter()
        .filter(|record| match &query {
            Some(q) => config
                .search_fields()
                .iter()
                .any(|field| field(*record).to_lowercase().contains(q.as_str())),
            None => true,
        })
        .filter(|record| {
            dimensions
                .iter()
                .all(|(dimension, value)| dimension.matcher.matches(*record, value))
        })
        .collect()
}

/// Stable sort by `sort.key`. Descending is the exact reverse of ascending.
pub fn sort_records<T>(items: &mut [&T], sort: &SortSpec, config: &ViewConfig<T>) {
    let Some(kind) = config.sort_kind(&sort.key) else {
        tracing::debug!(view = config.name(), key = %sort.key, "Ignoring unknown sort key");
        return;
    };

    match kind {
        SortKind::Text(project) => items.sort_by_cached_key(|record| {
            let raw = project(*record);
            (raw.to_lowercase(), raw.into_owned())
        }),
        SortKind::Number(project) => items.sort_by(|a, b| {
            project(*a)
                .unwrap_or(0.0)
                .total_cmp(&project(*b).unwrap_or(0.0))
        }),
    }

    if sort.direction == SortDirection::Descending {
        items.reverse();
    }
}

/// Partition `items` by label, keeping first-seen group order
pub fn group_items<'a, T>(items: &[&'a T], label: impl Fn(&T) -> String) -> Vec<Group<'a, T>> {
    let mut groups: Vec<Group<'a, T>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for &item in items {
        let key = label(item);
        match index.get(&key) {
            Some(&i) => groups[i].items.push(item),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push(Group {
                    label: key,
                    items: vec![item],
                });
            }
        }
    }
    groups
}

/// Summary pills for every non-default criterion
pub fn active_filters<T>(state: &ViewState, config: &ViewConfig<T>) -> Vec<ActiveFilter> {
    let mut pills = Vec::new();

    let search = state.search_text.trim();
    if !search.is_empty() {
        pills.push(ActiveFilter {
            key: FilterKey::Search,
            label: format!("Search: \"{}\"", search),
        });
    }

    // Config order, so pills stay put as filters change
    for dimension in config.filters() {
        let value = state.filter(dimension.name);
        if value != FILTER_ALL {
            pills.push(ActiveFilter {
                key: FilterKey::Dimension(dimension.name.to_string()),
                label: format!("{}: {}", dimension.label, value),
            });
        }
    }
    pills
}
