//! Derived View Engine
//!
//! Turns a raw collection plus view state into exactly what a table renders:
//!
//! ```text
//! records ──► filter ──► sort ──► paginate ──► group
//!               │          │          │           │
//!          search text  SortSpec  page/size   date label
//!          + filters
//! ```
//!
//! - **state**: `ViewState`, `SortSpec`, page-size constants
//! - **config**: `ViewConfig<T>`, the per-entity registry of typed accessors
//! - **engine**: `derive_view` and its stages
//! - **export**: CSV serialization of the filtered set
//! - **controller**: `ViewIntent`, the pure `reduce` and `ViewController`

pub mod config;
pub mod controller;
pub mod engine;
pub mod export;
pub mod state;

pub use config::{FilterDimension, FilterMatch, Grouper, NumberFn, SortField, SortKind, TextFn, ViewConfig};
pub use controller::{reduce, ReduceContext, ViewController, ViewIntent};
pub use engine::{
    active_filters, collate, derive_view, paginate, ActiveFilter, DerivedView, FilterKey, Group,
    PageWindow,
};
pub use export::{to_csv, CsvColumn, CsvLayout, ExportError, ExportResult};
pub use state::{
    normalize_page_size, SortDirection, SortSpec, ViewState, DEFAULT_PAGE_SIZE, FILTER_ALL,
    PAGE_SIZE_OPTIONS,
};
