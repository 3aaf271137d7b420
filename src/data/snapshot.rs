use serde::Serialize;

use super::aggregate::{group_sum, monthly_trend, summarize, AggregateResult, MonthlyPoint, SortOrder, Summary};
use super::filter::FilteredView;
use super::model::{CategoryField, ValueField};

/// Everything the dashboard shows for one filter selection.
///
/// Recomputed from scratch whenever the selection changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    /// Number of records passing the filter.
    pub rows: usize,
    pub summary: Summary,
    pub monthly: Vec<MonthlyPoint>,
    pub sales_by_category: AggregateResult,
    /// Ascending, so the largest loss is listed first.
    pub profit_by_sub_category: AggregateResult,
    pub sales_by_state: AggregateResult,
}

impl DashboardSnapshot {
    pub fn compute(view: &FilteredView<'_>) -> Self {
        DashboardSnapshot {
            rows: view.len(),
            summary: summarize(view.records()),
            monthly: monthly_trend(view.records()),
            sales_by_category: group_sum(
                view.records(),
                CategoryField::Category.into(),
                ValueField::Sales,
                SortOrder::Descending,
            ),
            profit_by_sub_category: group_sum(
                view.records(),
                CategoryField::SubCategory.into(),
                ValueField::Profit,
                SortOrder::Ascending,
            ),
            sales_by_state: group_sum(
                view.records(),
                CategoryField::State.into(),
                ValueField::Sales,
                SortOrder::Descending,
            ),
        }
    }

    /// No rows passed the filter. Valid, rendered as zeros.
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filter, FilterSelection};
    use crate::data::model::fixtures::east_west;

    #[test]
    fn snapshot_of_full_table() {
        let table = east_west();
        let snap = DashboardSnapshot::compute(&FilteredView::full(&table));
        assert_eq!(snap.rows, 2);
        assert_eq!(snap.summary.total_sales, 300);
        assert_eq!(snap.monthly.len(), 2);
        assert_eq!(snap.sales_by_category.get("Tech"), Some(300.0));
        assert_eq!(snap.profit_by_sub_category.total(), 10.0);
    }

    #[test]
    fn filtering_everything_out_gives_zeros() {
        let table = east_west();
        let mut sel = FilterSelection::all(&table);
        sel.select_none(CategoryField::Segment);
        let snap = DashboardSnapshot::compute(&apply_filter(&table, &sel));
        assert!(snap.is_empty());
        assert_eq!(snap.summary, Summary::default());
        assert!(snap.monthly.is_empty());
        assert!(snap.sales_by_state.is_empty());
    }
}
