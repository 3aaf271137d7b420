use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::data::filter::{apply_filter, FilterSelection, FilteredView};
use crate::data::model::CategoryField;
use crate::data::prices::{key_metrics, load_price_file, KeyMetrics, PriceSeries};
use crate::data::snapshot::DashboardSnapshot;
use crate::session::{Session, SessionCache};

/// Environment variable overriding the sample sales file.
pub const SAMPLE_ENV: &str = "SALES_LENS_SAMPLE";
/// Environment variable overriding the sample price file.
pub const PRICES_ENV: &str = "SALES_LENS_PRICES";

const DEFAULT_SAMPLE: &str = "data/superstore.csv";
const DEFAULT_PRICES: &str = "data/prices.csv";

const REQUIRED_COLUMNS_HINT: &str = "The file must contain 'Order Date', 'Sales', 'Profit', \
     'Region', 'Category', 'Sub-Category', 'Segment' and 'State' columns.";

/// Categorical fields offered as sidebar filters.
pub const FILTER_FIELDS: [CategoryField; 3] = [
    CategoryField::Region,
    CategoryField::Category,
    CategoryField::Segment,
];

pub fn sample_path() -> PathBuf {
    std::env::var_os(SAMPLE_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SAMPLE))
}

pub fn sample_prices_path() -> PathBuf {
    std::env::var_os(PRICES_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PRICES))
}

// ---------------------------------------------------------------------------
// Load state
// ---------------------------------------------------------------------------

/// Outcome of the most recent load. A failed load never yields a table.
#[derive(Debug, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Failed(String),
    Loaded(Session),
}

impl LoadState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            LoadState::Loaded(s) => Some(s),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Sales,
    Prices,
}

/// Price view state: a loaded series and the chosen start date.
#[derive(Debug, Clone)]
pub struct PriceState {
    pub source: PathBuf,
    pub series: PriceSeries,
    pub start: NaiveDate,
}

impl PriceState {
    pub fn visible(&self) -> PriceSeries {
        self.series.since(self.start)
    }

    pub fn metrics(&self) -> Option<KeyMetrics> {
        key_metrics(&self.visible())
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub load: LoadState,

    /// Per-field filter selections.
    pub filters: FilterSelection,

    /// Everything derived from the current filters (recomputed on change).
    pub snapshot: DashboardSnapshot,

    /// Indices of records passing the current filters.
    pub visible_indices: Vec<usize>,

    pub cache: SessionCache,

    pub page: Page,
    pub show_raw_data: bool,

    pub prices: Option<PriceState>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Open a sales source through the cache and reset the filters.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(session) => self.set_session(session),
            Err(e) => {
                log::error!("Failed to load {}: {e}", path.display());
                self.load = LoadState::Failed(e.to_string());
                self.filters = FilterSelection::default();
                self.snapshot = DashboardSnapshot::default();
                self.visible_indices.clear();
                self.status_message = Some(if e.is_schema_error() {
                    format!("Error: {e}. {REQUIRED_COLUMNS_HINT}")
                } else {
                    format!("Error: {e}")
                });
            }
        }
    }

    /// Ingest a loaded session and initialise filters to "everything".
    pub fn set_session(&mut self, session: Session) {
        self.filters = FilterSelection::all(session.table());
        let dropped = session.table().dropped.total();
        self.status_message =
            (dropped > 0).then(|| format!("{dropped} rows skipped (unparsable date or amount)"));
        self.load = LoadState::Loaded(session);
        self.refilter();
    }

    /// Current filtered view, if a table is loaded.
    pub fn view(&self) -> Option<FilteredView<'_>> {
        self.load
            .session()
            .map(|s| apply_filter(s.table(), &self.filters))
    }

    /// Recompute the visible rows and every aggregate after a filter change.
    pub fn refilter(&mut self) {
        let (indices, snapshot) = match self.view() {
            Some(view) => (view.indices().to_vec(), DashboardSnapshot::compute(&view)),
            None => (Vec::new(), DashboardSnapshot::default()),
        };
        self.visible_indices = indices;
        self.snapshot = snapshot;
    }

    /// Toggle a single value in a field's filter.
    pub fn toggle_filter_value(&mut self, field: CategoryField, value: &str) {
        self.filters.toggle(field, value);
        self.refilter();
    }

    /// Select all values of a field.
    pub fn select_all(&mut self, field: CategoryField) {
        if let Some(session) = self.load.session() {
            let table = session.table();
            self.filters.select_all(table, field);
            self.refilter();
        }
    }

    /// Deselect all values of a field.
    pub fn select_none(&mut self, field: CategoryField) {
        self.filters.select_none(field);
        self.refilter();
    }

    /// Load a price export and default the start date to five years before its last bar.
    pub fn open_prices(&mut self, path: &Path) {
        match load_price_file(path) {
            Ok(series) => {
                log::info!("Loaded {} price bars from {}", series.len(), path.display());
                let start = series
                    .bars
                    .last()
                    .and_then(|b| b.date.checked_sub_months(chrono::Months::new(60)))
                    .or_else(|| series.first_date())
                    .unwrap_or_default();
                self.prices = Some(PriceState {
                    source: path.to_path_buf(),
                    series,
                    start,
                });
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load prices from {}: {e}", path.display());
                self.prices = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}
