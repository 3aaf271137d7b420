use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::model::{GroupField, Record, ValueField};

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

/// Scalar summary of a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    /// Sum of sales, truncated toward zero.
    pub total_sales: i64,
    /// Sum of profit, truncated toward zero.
    pub total_profit: i64,
    /// `100 * total_profit / total_sales`, or `0.0` when there are no sales.
    pub profit_margin_pct: f64,
}

/// Compute totals and margin. An empty input yields all zeros.
pub fn summarize<'a, I>(records: I) -> Summary
where
    I: IntoIterator<Item = &'a Record>,
{
    let (sales, profit) = records
        .into_iter()
        .fold((0.0_f64, 0.0_f64), |(s, p), r| (s + r.sales, p + r.profit));

    let total_sales = sales.trunc() as i64;
    let total_profit = profit.trunc() as i64;
    let profit_margin_pct = if total_sales > 0 {
        total_profit as f64 / total_sales as f64 * 100.0
    } else {
        0.0
    };

    Summary {
        total_sales,
        total_profit,
        profit_margin_pct,
    }
}

// ---------------------------------------------------------------------------
// Group-by sum
// ---------------------------------------------------------------------------

/// How to order the groups of an [`AggregateResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SortOrder {
    Ascending,
    Descending,
    /// Natural key order (chronological for month periods).
    Unsorted,
}

/// One group key and its summed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub key: String,
    pub value: f64,
}

/// Ordered group → sum mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResult {
    pub groups: Vec<GroupTotal>,
}

impl AggregateResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.groups.iter().find(|g| g.key == key).map(|g| g.value)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    /// Sum of every group.
    #[cfg(test)]
    pub fn total(&self) -> f64 {
        self.groups.iter().map(|g| g.value).sum()
    }
}

/// Group records by exact equality on `group`, summing `value` per group.
///
/// Sorted orders are stable over first-seen key order, so equal sums keep the
/// order in which their keys first appeared.
pub fn group_sum<'a, I>(records: I, group: GroupField, value: ValueField, order: SortOrder) -> AggregateResult
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut position: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<GroupTotal> = Vec::new();

    for rec in records {
        let key = rec.group_value(group);
        let idx = *position.entry(key).or_insert_with(|| {
            groups.push(GroupTotal {
                key: key.to_string(),
                value: 0.0,
            });
            groups.len() - 1
        });
        groups[idx].value += rec.value(value);
    }

    match order {
        SortOrder::Ascending => groups.sort_by(|a, b| a.value.total_cmp(&b.value)),
        SortOrder::Descending => groups.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortOrder::Unsorted => groups.sort_by(|a, b| a.key.cmp(&b.key)),
    }

    AggregateResult { groups }
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

/// Sales and profit for one month period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: String,
    pub sales: f64,
    pub profit: f64,
}

/// Sales and profit per month, in chronological order.
pub fn monthly_trend<'a, I>(records: I) -> Vec<MonthlyPoint>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut by_month: BTreeMap<&'a str, (f64, f64)> = BTreeMap::new();
    for rec in records {
        let entry = by_month.entry(rec.month.as_str()).or_default();
        entry.0 += rec.sales;
        entry.1 += rec.profit;
    }
    by_month
        .into_iter()
        .map(|(month, (sales, profit))| MonthlyPoint {
            month: month.to_string(),
            sales,
            profit,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply_filter, FilterSelection};
    use crate::data::model::fixtures::{east_west, record};
    use crate::data::model::CategoryField;

    #[test]
    fn summary_of_example_table() {
        let table = east_west();
        let s = summarize(&table.records);
        assert_eq!(s.total_sales, 300);
        assert_eq!(s.total_profit, 10);
        assert!((s.profit_margin_pct - 3.3333).abs() < 1e-3);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let s = summarize(std::iter::empty::<&Record>());
        assert_eq!(s, Summary::default());
        assert!(s.profit_margin_pct.is_finite());
    }

    #[test]
    fn losses_only_keep_margin_finite() {
        let rows = vec![record((2024, 1, 1), "East", "Tech", 0.4, -50.0)];
        let s = summarize(&rows);
        assert_eq!(s.total_sales, 0);
        assert_eq!(s.total_profit, -50);
        assert_eq!(s.profit_margin_pct, 0.0);
    }

    #[test]
    fn totals_truncate_toward_zero() {
        let rows = vec![
            record((2024, 1, 1), "East", "Tech", 10.9, -3.7),
            record((2024, 1, 2), "East", "Tech", 0.5, 0.1),
        ];
        let s = summarize(&rows);
        assert_eq!(s.total_sales, 11);
        assert_eq!(s.total_profit, -3);
    }

    #[test]
    fn filtered_summary() {
        let table = east_west();
        let view = apply_filter(&table, &FilterSelection::only(CategoryField::Region, ["East"]));
        assert_eq!(summarize(view.records()).total_sales, 100);
    }

    #[test]
    fn group_by_month() {
        let table = east_west();
        let res = group_sum(&table.records, GroupField::Month, ValueField::Sales, SortOrder::Unsorted);
        assert_eq!(res.keys().collect::<Vec<_>>(), ["2024-01", "2024-02"]);
        assert_eq!(res.get("2024-01"), Some(100.0));
        assert_eq!(res.get("2024-02"), Some(200.0));
    }

    #[test]
    fn unsorted_months_are_chronological_regardless_of_input_order() {
        let rows = vec![
            record((2024, 11, 1), "East", "Tech", 1.0, 0.0),
            record((2023, 2, 1), "East", "Tech", 1.0, 0.0),
            record((2024, 3, 1), "East", "Tech", 1.0, 0.0),
        ];
        let res = group_sum(&rows, GroupField::Month, ValueField::Sales, SortOrder::Unsorted);
        assert_eq!(res.keys().collect::<Vec<_>>(), ["2023-02", "2024-03", "2024-11"]);
    }

    #[test]
    fn sorted_orders_break_ties_by_first_seen() {
        let rows = vec![
            record((2024, 1, 1), "East", "Office", 5.0, 0.0),
            record((2024, 1, 1), "East", "Tech", 9.0, 0.0),
            record((2024, 1, 1), "East", "Furniture", 5.0, 0.0),
            record((2024, 1, 1), "East", "Apparel", 1.0, 0.0),
        ];
        let group = GroupField::Category(CategoryField::Category);
        let desc = group_sum(&rows, group, ValueField::Sales, SortOrder::Descending);
        assert_eq!(desc.keys().collect::<Vec<_>>(), ["Tech", "Office", "Furniture", "Apparel"]);
        let asc = group_sum(&rows, group, ValueField::Sales, SortOrder::Ascending);
        assert_eq!(asc.keys().collect::<Vec<_>>(), ["Apparel", "Office", "Furniture", "Tech"]);
    }

    #[test]
    fn ascending_profit_puts_losses_first() {
        let table = east_west();
        let res = group_sum(
            &table.records,
            CategoryField::Region.into(),
            ValueField::Profit,
            SortOrder::Ascending,
        );
        assert_eq!(res.groups[0], GroupTotal { key: "West".into(), value: -10.0 });
    }

    #[test]
    fn group_sum_is_additive_over_concatenation() {
        let t1 = vec![
            record((2024, 1, 1), "East", "Tech", 10.0, 1.0),
            record((2024, 2, 1), "West", "Furniture", 20.0, 2.0),
        ];
        let t2 = vec![
            record((2024, 1, 9), "East", "Tech", 5.0, 1.0),
            record((2024, 3, 1), "South", "Tech", 7.0, 1.0),
        ];
        let both: Vec<Record> = t1.iter().chain(t2.iter()).cloned().collect();
        let group = GroupField::Category(CategoryField::Region);

        let whole = group_sum(&both, group, ValueField::Sales, SortOrder::Unsorted);
        let a = group_sum(&t1, group, ValueField::Sales, SortOrder::Unsorted);
        let b = group_sum(&t2, group, ValueField::Sales, SortOrder::Unsorted);
        for key in whole.keys() {
            let parts = a.get(key).unwrap_or(0.0) + b.get(key).unwrap_or(0.0);
            assert_eq!(whole.get(key), Some(parts), "{key}");
        }
        assert_eq!(whole.total(), a.total() + b.total());
    }

    #[test]
    fn monthly_trend_sums_both_measures() {
        let rows = vec![
            record((2024, 2, 1), "East", "Tech", 10.0, 1.0),
            record((2024, 1, 5), "East", "Tech", 5.0, -2.0),
            record((2024, 2, 20), "West", "Tech", 1.0, 1.0),
        ];
        let trend = monthly_trend(&rows);
        assert_eq!(
            trend,
            vec![
                MonthlyPoint { month: "2024-01".into(), sales: 5.0, profit: -2.0 },
                MonthlyPoint { month: "2024-02".into(), sales: 11.0, profit: 2.0 },
            ]
        );
    }
}
