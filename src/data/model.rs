use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Field identifiers
// ---------------------------------------------------------------------------

/// A categorical column that can be filtered and grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum CategoryField {
    Region,
    Category,
    SubCategory,
    Segment,
    State,
}

impl CategoryField {
    pub const ALL: [CategoryField; 5] = [
        CategoryField::Region,
        CategoryField::Category,
        CategoryField::SubCategory,
        CategoryField::Segment,
        CategoryField::State,
    ];

    /// Normalized column name this field is read from.
    pub fn column(self) -> &'static str {
        match self {
            CategoryField::Region => "region",
            CategoryField::Category => "category",
            CategoryField::SubCategory => "sub_category",
            CategoryField::Segment => "segment",
            CategoryField::State => "state",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            CategoryField::Region => "Region",
            CategoryField::Category => "Category",
            CategoryField::SubCategory => "Sub-Category",
            CategoryField::Segment => "Segment",
            CategoryField::State => "State",
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A numeric column that can be summed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ValueField {
    Sales,
    Profit,
}

impl ValueField {
    pub fn label(self) -> &'static str {
        match self {
            ValueField::Sales => "Sales",
            ValueField::Profit => "Profit",
        }
    }
}

/// Anything a [`Record`] can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum GroupField {
    Month,
    Category(CategoryField),
}

impl From<CategoryField> for GroupField {
    fn from(field: CategoryField) -> Self {
        GroupField::Category(field)
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the source table
// ---------------------------------------------------------------------------

/// One transaction after schema mapping. Every field is typed and present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub order_date: NaiveDate,
    /// Year-month period derived from `order_date`, e.g. `"2024-03"`.
    pub month: String,
    pub region: String,
    pub category: String,
    pub sub_category: String,
    pub segment: String,
    pub state: String,
    pub sales: f64,
    pub profit: f64,
}

impl Record {
    /// Value of a categorical field.
    pub fn category_value(&self, field: CategoryField) -> &str {
        match field {
            CategoryField::Region => &self.region,
            CategoryField::Category => &self.category,
            CategoryField::SubCategory => &self.sub_category,
            CategoryField::Segment => &self.segment,
            CategoryField::State => &self.state,
        }
    }

    pub fn group_value(&self, field: GroupField) -> &str {
        match field {
            GroupField::Month => &self.month,
            GroupField::Category(c) => self.category_value(c),
        }
    }

    pub fn value(&self, field: ValueField) -> f64 {
        match field {
            ValueField::Sales => self.sales,
            ValueField::Profit => self.profit,
        }
    }
}

/// Format a date as its month period (`YYYY-MM`).
pub fn month_period(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

// ---------------------------------------------------------------------------
// Table – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Rows removed while mapping the raw source onto [`Record`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DropCounts {
    /// Order date missing or unparsable.
    pub bad_date: usize,
    /// Sales or profit missing or not a finite number.
    pub bad_number: usize,
}

impl DropCounts {
    pub fn total(&self) -> usize {
        self.bad_date + self.bad_number
    }
}

/// The full validated dataset with pre-computed category domains.
///
/// Immutable once built; filtering produces views over it.
#[derive(Debug, Clone)]
pub struct Table {
    /// All records in source order.
    pub records: Vec<Record>,
    /// For each categorical field, the sorted set of observed values.
    pub unique_values: BTreeMap<CategoryField, BTreeSet<String>>,
    /// Rows excluded during normalization.
    pub dropped: DropCounts,
}

impl Table {
    /// Build category domains from the loaded records.
    pub fn from_records(records: Vec<Record>, dropped: DropCounts) -> Self {
        let mut unique_values: BTreeMap<CategoryField, BTreeSet<String>> = CategoryField::ALL
            .iter()
            .map(|&f| (f, BTreeSet::new()))
            .collect();

        for rec in &records {
            for field in CategoryField::ALL {
                unique_values
                    .entry(field)
                    .or_default()
                    .insert(rec.category_value(field).to_string());
            }
        }

        Table {
            records,
            unique_values,
            dropped,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Observed values of a categorical field.
    pub fn domain(&self, field: CategoryField) -> Option<&BTreeSet<String>> {
        self.unique_values.get(&field)
    }
}
