use std::collections::{BTreeMap, BTreeSet};

use super::model::{CategoryField, Record, Table};

// ---------------------------------------------------------------------------
// Filter selection: which values are allowed per categorical field
// ---------------------------------------------------------------------------

/// Per-field selection state: maps field → set of allowed values.
///
/// A field absent from the map is unconstrained. A field mapped to an empty
/// set admits nothing. Fields combine with AND, values within a field with OR.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    allowed: BTreeMap<CategoryField, BTreeSet<String>>,
}

impl FilterSelection {
    /// A selection with every observed value of every field selected.
    pub fn all(table: &Table) -> Self {
        FilterSelection {
            allowed: table.unique_values.clone(),
        }
    }

    /// A selection that constrains a single field.
    pub fn only<I, S>(field: CategoryField, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sel = FilterSelection::default();
        sel.set(field, values.into_iter().map(Into::into).collect());
        sel
    }

    pub fn set(&mut self, field: CategoryField, values: BTreeSet<String>) {
        self.allowed.insert(field, values);
    }

    pub fn is_selected(&self, field: CategoryField, value: &str) -> bool {
        self.allowed
            .get(&field)
            .map_or(true, |set| set.contains(value))
    }

    /// Flip a single value in a field's allowed set.
    pub fn toggle(&mut self, field: CategoryField, value: &str) {
        let selected = self.allowed.entry(field).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Select every observed value of a field.
    pub fn select_all(&mut self, table: &Table, field: CategoryField) {
        if let Some(all_vals) = table.domain(field) {
            self.allowed.insert(field, all_vals.clone());
        }
    }

    /// Deselect every value of a field, which hides all rows.
    pub fn select_none(&mut self, field: CategoryField) {
        self.allowed.insert(field, BTreeSet::new());
    }

    /// Whether a record passes every field constraint.
    pub fn matches(&self, record: &Record) -> bool {
        self.allowed
            .iter()
            .all(|(&field, selected)| selected.contains(record.category_value(field)))
    }
}

// ---------------------------------------------------------------------------
// Filtered view
// ---------------------------------------------------------------------------

/// An order-preserving subset of a [`Table`], held as row indices.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    table: &'a Table,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    #[cfg(test)]
    pub fn full(table: &'a Table) -> Self {
        FilteredView {
            table,
            indices: (0..table.len()).collect(),
        }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Records in source order.
    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let records = &self.table.records;
        self.indices.iter().map(move |&i| &records[i])
    }
}

/// Return indices of records that pass the selection, in source order.
pub fn filtered_indices(table: &Table, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

/// Apply a selection to a table. The table itself is never modified.
pub fn apply_filter<'a>(table: &'a Table, selection: &FilterSelection) -> FilteredView<'a> {
    FilteredView {
        table,
        indices: filtered_indices(table, selection),
    }
}
