//! View-State Controller
//!
//! UI events become [`ViewIntent`]s. [`reduce`] applies one intent to a
//! [`ViewState`] and returns the next state without side effects;
//! [`ViewController`] wraps it, persists the page size and keeps the stored
//! page inside the bounds of the last derivation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::config::ViewConfig;
use super::engine::{derive_view, paginate, DerivedView};
use super::state::{normalize_page_size, SortDirection, SortSpec, ViewState, FILTER_ALL};
use crate::prefs::settings::{load_page_size, save_page_size};
use crate::prefs::PreferenceStore;

/// A user action on a view's toolbar, header or pager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ViewIntent {
    SetSearch { text: String },
    ClearSearch,
    SetFilter { dimension: String, value: String },
    ClearFilter { dimension: String },
    ResetAll,
    ToggleSort { key: String },
    SetSort { sort: SortSpec },
    SetPage { page: usize },
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    SetPageSize { page_size: usize },
}

impl ViewIntent {
    pub fn set_search(text: impl Into<String>) -> Self {
        ViewIntent::SetSearch { text: text.into() }
    }

    pub fn set_filter(dimension: impl Into<String>, value: impl Into<String>) -> Self {
        ViewIntent::SetFilter {
            dimension: dimension.into(),
            value: value.into(),
        }
    }

    pub fn clear_filter(dimension: impl Into<String>) -> Self {
        ViewIntent::ClearFilter {
            dimension: dimension.into(),
        }
    }

    pub fn toggle_sort(key: impl Into<String>) -> Self {
        ViewIntent::ToggleSort { key: key.into() }
    }

    pub fn set_page(page: usize) -> Self {
        ViewIntent::SetPage { page }
    }

    pub fn set_page_size(page_size: usize) -> Self {
        ViewIntent::SetPageSize { page_size }
    }

    /// True for intents that change which records match or their order
    pub fn resets_page(&self) -> bool {
        matches!(
            self,
            ViewIntent::SetSearch { .. }
                | ViewIntent::ClearSearch
                | ViewIntent::SetFilter { .. }
                | ViewIntent::ClearFilter { .. }
                | ViewIntent::ResetAll
                | ViewIntent::ToggleSort { .. }
                | ViewIntent::SetSort { .. }
        )
    }
}

/// What the reducer needs besides the state itself
pub struct ReduceContext<'c, T> {
    pub config: &'c ViewConfig<T>,
    /// Page count of the last derivation, if any
    pub total_pages: Option<usize>,
}

impl<'c, T> ReduceContext<'c, T> {
    pub fn new(config: &'c ViewConfig<T>, total_pages: Option<usize>) -> Self {
        Self {
            config,
            total_pages,
        }
    }

    fn clamp_page(&self, page: usize) -> usize {
        match self.total_pages {
            Some(total) => page.clamp(1, total.max(1)),
            None => page.max(1),
        }
    }
}

/// Apply `intent` to `state`.
///
/// Intents naming an unknown filter dimension or sort key leave the state
/// untouched.
pub fn reduce<T>(state: &ViewState, intent: &ViewIntent, ctx: &ReduceContext<'_, T>) -> ViewState {
    let config = ctx.config;
    let mut next = state.clone();

    match intent {
        ViewIntent::SetSearch { text } => {
            next.search_text = text.clone();
        }
        ViewIntent::ClearSearch => {
            next.search_text.clear();
        }
        ViewIntent::SetFilter { dimension, value } => {
            if config.filter_dimension(dimension).is_none() {
                tracing::debug!(view = config.name(), %dimension, "Ignoring filter on unknown dimension");
                return next;
            }
            if value == FILTER_ALL {
                next.filters.remove(dimension);
            } else {
                next.filters.insert(dimension.clone(), value.clone());
            }
        }
        ViewIntent::ClearFilter { dimension } => {
            if config.filter_dimension(dimension).is_none() {
                tracing::debug!(view = config.name(), %dimension, "Ignoring clear of unknown dimension");
                return next;
            }
            next.filters.remove(dimension);
        }
        ViewIntent::ResetAll => {
            next.search_text.clear();
            next.filters.clear();
            next.sort = config.default_sort().clone();
        }
        ViewIntent::ToggleSort { key } => {
            if !config.is_sortable(key) {
                tracing::debug!(view = config.name(), %key, "Ignoring toggle of unknown sort key");
                return next;
            }
            next.sort = if state.sort.key == *key {
                SortSpec::new(key.clone(), state.sort.direction.flipped())
            } else {
                SortSpec::new(key.clone(), SortDirection::Ascending)
            };
        }
        ViewIntent::SetSort { sort } => {
            if !config.is_sortable(&sort.key) {
                tracing::debug!(view = config.name(), key = %sort.key, "Ignoring unknown sort key");
                return next;
            }
            next.sort = sort.clone();
        }
        ViewIntent::SetPage { page } => {
            next.page = ctx.clamp_page(*page);
        }
        ViewIntent::NextPage => {
            next.page = ctx.clamp_page(state.page.saturating_add(1));
        }
        ViewIntent::PrevPage => {
            next.page = ctx.clamp_page(state.page.saturating_sub(1));
        }
        ViewIntent::FirstPage => {
            next.page = 1;
        }
        ViewIntent::LastPage => {
            if let Some(total) = ctx.total_pages {
                next.page = total.max(1);
            }
        }
        ViewIntent::SetPageSize { page_size } => {
            next.page_size = normalize_page_size(*page_size);
        }
    }

    if intent.resets_page() {
        next.page = 1;
    }
    next
}

/// Stateful controller for one view instance
pub struct ViewController<T> {
    config: Arc<ViewConfig<T>>,
    state: ViewState,
    prefs: Arc<dyn PreferenceStore>,
    /// Filtered count of the last derivation, while the criteria still hold
    matched: Option<usize>,
    total_pages: Option<usize>,
}

impl<T> ViewController<T> {
    /// Fresh ephemeral state with the page size rehydrated from `prefs`
    pub fn new(config: Arc<ViewConfig<T>>, prefs: Arc<dyn PreferenceStore>) -> Self {
        let page_size = load_page_size(prefs.as_ref(), config.name());
        let state = config.initial_state().with_page_size(page_size);
        tracing::debug!(view = config.name(), page_size, "View controller ready");

        Self {
            config,
            state,
            prefs,
            matched: None,
            total_pages: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn config(&self) -> &ViewConfig<T> {
        &self.config
    }

    /// Swap the config (e.g. after the display day rolls over), keeping state
    pub fn replace_config(&mut self, config: Arc<ViewConfig<T>>) {
        self.config = config;
    }

    /// Page count of the last derivation
    pub fn total_pages(&self) -> Option<usize> {
        self.total_pages
    }

    /// Apply an intent; page-size changes are persisted
    pub fn apply(&mut self, intent: ViewIntent) -> &ViewState {
        let ctx = ReduceContext::new(&*self.config, self.total_pages);
        let next = reduce(&self.state, &intent, &ctx);

        if let ViewIntent::SetPageSize { .. } = intent {
            if !save_page_size(self.prefs.as_ref(), self.config.name(), next.page_size) {
                tracing::warn!(view = self.config.name(), "Failed to persist page size");
            }
        }

        let previous = std::mem::replace(&mut self.state, next);
        self.refresh_page_bounds(&previous);
        &self.state
    }

    /// Keep the known page count in step with the state between derivations.
    ///
    /// New search text or filters make the old count meaningless; a new page
    /// size over the same criteria recomputes it and clamps the stored page.
    fn refresh_page_bounds(&mut self, previous: &ViewState) {
        if self.state.search_text != previous.search_text || self.state.filters != previous.filters {
            self.matched = None;
            self.total_pages = None;
        } else if self.state.page_size != previous.page_size {
            self.total_pages = self
                .matched
                .map(|count| paginate(count, 1, self.state.page_size).total_pages);
            if let Some(total) = self.total_pages {
                self.state.page = self.state.page.clamp(1, total);
            }
        }
    }

    /// Derive the view for `records` and pull the stored page into bounds
    pub fn derive<'a>(&mut self, records: Option<&'a [T]>) -> DerivedView<'a, T> {
        let view = derive_view(records, &self.state, &*self.config);
        self.matched = Some(view.total_count());
        self.total_pages = Some(view.total_pages());
        if self.state.page != view.page() {
            self.state.page = view.page();
        }
        view
    }

    pub fn set_search(&mut self, text: impl Into<String>) -> &ViewState {
        self.apply(ViewIntent::set_search(text))
    }

    pub fn set_filter(&mut self, dimension: &str, value: &str) -> &ViewState {
        self.apply(ViewIntent::set_filter(dimension, value))
    }

    pub fn clear_filter(&mut self, dimension: &str) -> &ViewState {
        self.apply(ViewIntent::clear_filter(dimension))
    }

    pub fn reset_all(&mut self) -> &ViewState {
        self.apply(ViewIntent::ResetAll)
    }

    pub fn toggle_sort(&mut self, key: &str) -> &ViewState {
        self.apply(ViewIntent::toggle_sort(key))
    }

    pub fn set_page(&mut self, page: usize) -> &ViewState {
        self.apply(ViewIntent::set_page(page))
    }

    pub fn set_page_size(&mut self, page_size: usize) -> &ViewState {
        self.apply(ViewIntent::set_page_size(page_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    use crate::derive::state::DEFAULT_PAGE_SIZE;
    use crate::prefs::{MemoryPreferenceStore, PreferenceStoreExt};

    #[derive(Debug)]
    struct Item {
        id: u32,
        kind: &'static str,
    }

    fn kind(i: &Item) -> Cow<'_, str> {
        Cow::Borrowed(i.kind)
    }

    fn id(i: &Item) -> Option<f64> {
        Some(i.id as f64)
    }

    fn config() -> Arc<ViewConfig<Item>> {
        Arc::new(
            ViewConfig::new("items", SortSpec::ascending("id"))
                .search(kind)
                .filter("kind", "Kind", &["a", "b"], kind)
                .sort_number("id", id)
                .sort_text("kind", kind),
        )
    }

    fn items(n: u32) -> Vec<Item> {
        (1..=n)
            .map(|id| Item {
                id,
                kind: if id % 2 == 0 { "a" } else { "b" },
            })
            .collect()
    }

    fn controller() -> ViewController<Item> {
        ViewController::new(config(), Arc::new(MemoryPreferenceStore::new()))
    }

    #[test]
    fn test_filter_change_resets_valid_page() {
        let records = items(30);
        let mut ctl = controller();
        ctl.derive(Some(&records[..]));
        ctl.set_page(3);
        assert_eq!(ctl.state().page, 3);

        ctl.set_filter("kind", "a");
        assert_eq!(ctl.state().page, 1);
        assert_eq!(ctl.state().filter("kind"), "a");
    }

    #[test]
    fn test_filter_all_equals_clear() {
        let mut ctl = controller();
        ctl.set_filter("kind", "a");
        ctl.set_filter("kind", FILTER_ALL);
        assert!(ctl.state().filters.is_empty());

        ctl.set_filter("kind", "b");
        ctl.clear_filter("kind");
        assert!(ctl.state().filters.is_empty());
    }

    #[test]
    fn test_unknown_dimension_is_ignored() {
        let mut ctl = controller();
        ctl.set_page(2);
        ctl.set_filter("colour", "red");
        assert!(ctl.state().filters.is_empty());
        assert_eq!(ctl.state().page, 2);
    }

    #[test]
    fn test_toggle_sort() {
        let mut ctl = controller();
        ctl.toggle_sort("id");
        assert_eq!(ctl.state().sort, SortSpec::descending("id"));
        ctl.toggle_sort("id");
        assert_eq!(ctl.state().sort, SortSpec::ascending("id"));

        ctl.toggle_sort("id");
        ctl.toggle_sort("kind");
        assert_eq!(ctl.state().sort, SortSpec::ascending("kind"));

        ctl.toggle_sort("weight");
        assert_eq!(ctl.state().sort, SortSpec::ascending("kind"));
    }

    #[test]
    fn test_set_page_clamps_to_known_bounds() {
        let records = items(25);
        let mut ctl = controller();
        ctl.derive(Some(&records[..]));

        assert_eq!(ctl.set_page(0).page, 1);
        assert_eq!(ctl.set_page(99).page, 3);
        assert_eq!(ctl.apply(ViewIntent::NextPage).page, 3);
        assert_eq!(ctl.apply(ViewIntent::PrevPage).page, 2);
        assert_eq!(ctl.apply(ViewIntent::FirstPage).page, 1);
        assert_eq!(ctl.apply(ViewIntent::LastPage).page, 3);
    }

    #[test]
    fn test_page_size_change_clamps_against_new_page_count() {
        let records = items(25);
        let mut ctl = controller();
        ctl.derive(Some(&records[..]));
        ctl.set_page(3);

        ctl.set_page_size(50);
        assert_eq!(ctl.total_pages(), Some(1));
        assert_eq!(ctl.state().page, 1);
        assert_eq!(ctl.set_page(2).page, 1);

        ctl.set_page_size(5);
        assert_eq!(ctl.total_pages(), Some(5));
        assert_eq!(ctl.apply(ViewIntent::LastPage).page, 5);

        let view = ctl.derive(Some(&records[..]));
        assert_eq!(view.page(), 5);
        assert_eq!(view.page_items().len(), 5);
    }

    #[test]
    fn test_criteria_change_forgets_stale_page_count() {
        let records = items(30);
        let mut ctl = controller();
        ctl.derive(Some(&records[..]));
        assert_eq!(ctl.total_pages(), Some(3));

        // Sorting keeps the matched set, so the count still holds
        ctl.toggle_sort("kind");
        assert_eq!(ctl.total_pages(), Some(3));

        ctl.set_filter("kind", "a");
        assert_eq!(ctl.total_pages(), None);
        // Unknown bounds: last page waits for the next derivation
        assert_eq!(ctl.apply(ViewIntent::LastPage).page, 1);

        ctl.derive(Some(&records[..]));
        assert_eq!(ctl.total_pages(), Some(2));
        assert_eq!(ctl.apply(ViewIntent::LastPage).page, 2);
    }

    #[test]
    fn test_page_size_persisted_and_rehydrated() {
        let prefs: Arc<dyn PreferenceStore> = Arc::new(MemoryPreferenceStore::new());
        let mut ctl = ViewController::new(config(), Arc::clone(&prefs));
        ctl.set_page_size(25);
        assert_eq!(prefs.get_string("items_page_size", ""), "25");

        let fresh = ViewController::new(config(), prefs);
        assert_eq!(fresh.state().page_size, 25);
        assert_eq!(fresh.state().page, 1);
    }

    #[test]
    fn test_zero_page_size_coerced() {
        let mut ctl = controller();
        assert_eq!(ctl.set_page_size(0).page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_reset_all_keeps_page_size() {
        let mut ctl = controller();
        ctl.set_page_size(50);
        ctl.set_search("b");
        ctl.set_filter("kind", "b");
        ctl.toggle_sort("kind");

        let state = ctl.reset_all().clone();
        assert_eq!(state.search_text, "");
        assert!(state.filters.is_empty());
        assert_eq!(state.sort, SortSpec::ascending("id"));
        assert_eq!(state.page, 1);
        assert_eq!(state.page_size, 50);
    }

    #[test]
    fn test_reduce_is_pure() {
        let config = config();
        let state = config.initial_state();
        let ctx = ReduceContext::new(config.as_ref(), Some(4));
        let next = reduce(&state, &ViewIntent::set_page(3), &ctx);

        assert_eq!(state.page, 1);
        assert_eq!(next.page, 3);
        assert_eq!(reduce(&state, &ViewIntent::set_page(3), &ctx), next);
    }

    #[test]
    fn test_intent_serde_shape() {
        let intent: ViewIntent =
            serde_json::from_str(r#"{"intent":"set_filter","dimension":"kind","value":"a"}"#).unwrap();
        assert_eq!(intent, ViewIntent::set_filter("kind", "a"));
    }

    #[test]
    fn test_out_of_range_page_pulled_down_on_derive() {
        let many = items(30);
        let few = items(4);
        let mut ctl = controller();
        ctl.derive(Some(&many[..]));
        ctl.set_page(3);

        // Collection shrinks on refresh without any intent
        let view = ctl.derive(Some(&few[..]));
        assert_eq!(view.page(), 1);
        assert_eq!(ctl.state().page, 1);
        assert_eq!(ctl.total_pages(), Some(1));
    }
}
