use chrono::{NaiveDate, NaiveDateTime};

use super::error::DataFormatError;
use super::model::{month_period, CategoryField, DropCounts, Record, Table};

// ---------------------------------------------------------------------------
// Raw table – what a loader hands over before any typing happens
// ---------------------------------------------------------------------------

/// A single untyped cell as read from CSV or a spreadsheet.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Text(String),
    Number(f64),
    /// Spreadsheets store dates natively; CSV never produces this.
    Date(NaiveDate),
    Empty,
}

impl RawCell {
    fn as_text(&self) -> String {
        match self {
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Date(d) => d.to_string(),
            RawCell::Empty => String::new(),
        }
    }
}

/// Header row plus data rows, exactly as the source presented them.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

// ---------------------------------------------------------------------------
// Column-name normalization
// ---------------------------------------------------------------------------

/// `"Order Date"` → `"order_date"`, `"Sub-Category"` → `"sub_category"`.
pub fn normalize_header(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Column positions for every field a [`Record`] needs.
#[derive(Debug, Clone)]
struct ColumnMap {
    date: usize,
    sales: usize,
    profit: usize,
    categories: Vec<(CategoryField, usize)>,
}

impl ColumnMap {
    fn resolve(headers: &[String]) -> Result<Self, DataFormatError> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let find = |name: &str| {
            normalized
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DataFormatError::MissingColumn(name.to_string()))
        };

        let date = normalized
            .iter()
            .position(|h| h.contains("order_date"))
            .ok_or(DataFormatError::MissingDateColumn)?;

        let sales = find("sales")?;
        let profit = find("profit")?;
        let categories = CategoryField::ALL
            .iter()
            .map(|&field| find(field.column()).map(|idx| (field, idx)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ColumnMap {
            date,
            sales,
            profit,
            categories,
        })
    }
}

// ---------------------------------------------------------------------------
// normalize: RawTable → Table
// ---------------------------------------------------------------------------

/// Map a raw table onto typed [`Record`]s.
///
/// Fails only when the header row cannot satisfy the schema. Rows with an
/// unparsable order date or a non-numeric sales/profit value are dropped and
/// counted in [`Table::dropped`]; row order is otherwise preserved.
pub fn normalize(raw: RawTable) -> Result<Table, DataFormatError> {
    let columns = ColumnMap::resolve(&raw.headers)?;
    let mut dropped = DropCounts::default();
    let mut records = Vec::with_capacity(raw.rows.len());

    for row in &raw.rows {
        let cell = |idx: usize| row.get(idx).unwrap_or(&RawCell::Empty);

        let Some(order_date) = parse_date_cell(cell(columns.date)) else {
            dropped.bad_date += 1;
            continue;
        };
        let (Some(sales), Some(profit)) = (
            parse_number_cell(cell(columns.sales)),
            parse_number_cell(cell(columns.profit)),
        ) else {
            dropped.bad_number += 1;
            continue;
        };

        let mut rec = Record {
            order_date,
            month: month_period(order_date),
            region: String::new(),
            category: String::new(),
            sub_category: String::new(),
            segment: String::new(),
            state: String::new(),
            sales,
            profit,
        };
        for &(field, idx) in &columns.categories {
            let value = cell(idx).as_text();
            match field {
                CategoryField::Region => rec.region = value,
                CategoryField::Category => rec.category = value,
                CategoryField::SubCategory => rec.sub_category = value,
                CategoryField::Segment => rec.segment = value,
                CategoryField::State => rec.state = value,
            }
        }
        records.push(rec);
    }

    if dropped.total() > 0 {
        log::warn!(
            "Dropped {} of {} rows ({} bad dates, {} bad amounts)",
            dropped.total(),
            raw.rows.len(),
            dropped.bad_date,
            dropped.bad_number
        );
    }

    Ok(Table::from_records(records, dropped))
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

const DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%b %d, %Y",
    "%d %b %Y",
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

/// Parse a date string using the accepted formats, month-first for slashed dates.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    // "Jan 2024" → first of the month
    NaiveDate::parse_from_str(&format!("1 {trimmed}"), "%d %b %Y").ok()
}

fn parse_date_cell(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date(d) => Some(*d),
        RawCell::Text(s) => parse_date(s),
        RawCell::Number(_) | RawCell::Empty => None,
    }
}

/// Parse an amount, tolerating whitespace, a leading `$` and thousands separators.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };
    let body = body.strip_prefix('$').unwrap_or(body);
    let cleaned: String = body.chars().filter(|&c| c != ',').collect();
    let v = cleaned.parse::<f64>().ok()?;
    let v = if negative { -v } else { v };
    v.is_finite().then_some(v)
}

fn parse_number_cell(cell: &RawCell) -> Option<f64> {
    match cell {
        RawCell::Number(n) => n.is_finite().then_some(*n),
        RawCell::Text(s) => parse_number(s),
        RawCell::Date(_) | RawCell::Empty => None,
    }
}
