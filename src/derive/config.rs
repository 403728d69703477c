//! Per-entity view configuration
//!
//! A `ViewConfig<T>` registers, by name, the typed accessors the engine needs:
//! which fields are searched, which dimensions can be filtered, how each sort
//! key compares, and how page items are grouped. Names are resolved against
//! this registry when the view is derived; there is no dynamic field lookup.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::state::{SortSpec, ViewState, DEFAULT_PAGE_SIZE};

/// Text projection of a record; absent values project to ""
pub type TextFn<T> = for<'a> fn(&'a T) -> Cow<'a, str>;

/// Numeric projection of a record; `None` sorts as zero
pub type NumberFn<T> = fn(&T) -> Option<f64>;

/// Group label for a record
pub type Grouper<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;

/// How a sort key compares
pub enum SortKind<T> {
    /// Case-insensitive text, raw text as tiebreak
    Text(TextFn<T>),
    /// Numeric, missing values treated as 0
    Number(NumberFn<T>),
}

impl<T> Clone for SortKind<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SortKind<T> {}

/// A sortable column
pub struct SortField<T> {
    pub key: &'static str,
    pub kind: SortKind<T>,
}

/// How a filter value is compared with the record's projected text
pub enum FilterMatch<T> {
    Exact(TextFn<T>),
    IgnoreCase(TextFn<T>),
}

impl<T> FilterMatch<T> {
    pub fn matches(&self, record: &T, wanted: &str) -> bool {
        match self {
            FilterMatch::Exact(project) => project(record) == wanted,
            FilterMatch::IgnoreCase(project) => project(record).to_lowercase() == wanted.to_lowercase(),
        }
    }
}

/// A filterable dimension (e.g. patient status, alert severity)
pub struct FilterDimension<T> {
    /// Key used in `ViewState::filters`
    pub name: &'static str,
    /// Prefix shown in the active-filter summary
    pub label: &'static str,
    /// Values offered besides "all"
    pub options: Vec<&'static str>,
    pub matcher: FilterMatch<T>,
}

/// Everything the engine needs to know about one entity type
pub struct ViewConfig<T> {
    name: &'static str,
    search_fields: Vec<TextFn<T>>,
    filters: Vec<FilterDimension<T>>,
    sort_fields: Vec<SortField<T>>,
    default_sort: SortSpec,
    grouper: Option<Grouper<T>>,
}

impl<T> ViewConfig<T> {
    /// Empty config; `name` doubles as the preference-key prefix
    pub fn new(name: &'static str, default_sort: SortSpec) -> Self {
        Self {
            name,
            search_fields: Vec::new(),
            filters: Vec::new(),
            sort_fields: Vec::new(),
            default_sort,
            grouper: None,
        }
    }

    /// Builder: add a free-text search field
    pub fn search(mut self, field: TextFn<T>) -> Self {
        self.search_fields.push(field);
        self
    }

    /// Builder: add an exact-match filter dimension
    pub fn filter(
        self,
        name: &'static str,
        label: &'static str,
        options: &[&'static str],
        project: TextFn<T>,
    ) -> Self {
        self.dimension(FilterDimension {
            name,
            label,
            options: options.to_vec(),
            matcher: FilterMatch::Exact(project),
        })
    }

    /// Builder: add a case-insensitive filter dimension
    pub fn filter_ignore_case(
        self,
        name: &'static str,
        label: &'static str,
        options: &[&'static str],
        project: TextFn<T>,
    ) -> Self {
        self.dimension(FilterDimension {
            name,
            label,
            options: options.to_vec(),
            matcher: FilterMatch::IgnoreCase(project),
        })
    }

    fn dimension(mut self, dimension: FilterDimension<T>) -> Self {
        self.filters.retain(|d| d.name != dimension.name);
        self.filters.push(dimension);
        self
    }

    /// Builder: add a text sort key
    pub fn sort_text(self, key: &'static str, project: TextFn<T>) -> Self {
        self.sort_field(SortField {
            key,
            kind: SortKind::Text(project),
        })
    }

    /// Builder: add a numeric sort key
    pub fn sort_number(self, key: &'static str, project: NumberFn<T>) -> Self {
        self.sort_field(SortField {
            key,
            kind: SortKind::Number(project),
        })
    }

    fn sort_field(mut self, field: SortField<T>) -> Self {
        self.sort_fields.retain(|f| f.key != field.key);
        self.sort_fields.push(field);
        self
    }

    /// Builder: group page items by label
    pub fn group_by(mut self, grouper: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.grouper = Some(Arc::new(grouper));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn search_fields(&self) -> &[TextFn<T>] {
        &self.search_fields
    }

    pub fn filters(&self) -> &[FilterDimension<T>] {
        &self.filters
    }

    pub fn filter_dimension(&self, name: &str) -> Option<&FilterDimension<T>> {
        self.filters.iter().find(|d| d.name == name)
    }

    pub fn sort_fields(&self) -> &[SortField<T>] {
        &self.sort_fields
    }

    pub fn sort_kind(&self, key: &str) -> Option<SortKind<T>> {
        self.sort_fields.iter().find(|f| f.key == key).map(|f| f.kind)
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.sort_kind(key).is_some()
    }

    pub fn default_sort(&self) -> &SortSpec {
        &self.default_sort
    }

    pub fn grouper(&self) -> Option<&Grouper<T>> {
        self.grouper.as_ref()
    }

    /// Fresh state for this view with the default sort and page size
    pub fn initial_state(&self) -> ViewState {
        ViewState::new(self.default_sort.clone()).with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl<T> fmt::Debug for ViewConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewConfig")
            .field("name", &self.name)
            .field("search_fields", &self.search_fields.len())
            .field(
                "filters",
                &self.filters.iter().map(|d| d.name).collect::<Vec<_>>(),
            )
            .field(
                "sort_fields",
                &self.sort_fields.iter().map(|f| f.key).collect::<Vec<_>>(),
            )
            .field("default_sort", &self.default_sort)
            .field("grouped", &self.grouper.is_some())
            .finish()
    }
}
