use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;

use super::error::DataFormatError;
use super::loader::source_extension;
use super::schema::{normalize_header, parse_date, parse_number};

/// Window of the moving average shown next to the close price.
pub const MOVING_AVERAGE_WINDOW: usize = 50;

// ---------------------------------------------------------------------------
// Price series
// ---------------------------------------------------------------------------

/// One trading day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars sorted by date, oldest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PriceSeries {
    pub bars: Vec<PriceBar>,
    /// Rows dropped for an unparsable date or close.
    pub dropped: usize,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Bars on or after `start`.
    pub fn since(&self, start: NaiveDate) -> PriceSeries {
        PriceSeries {
            bars: self.bars.iter().filter(|b| b.date >= start).cloned().collect(),
            dropped: self.dropped,
        }
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a `Date,Open,High,Low,Close,Volume` export from disk.
pub fn load_price_file(path: &Path) -> Result<PriceSeries, DataFormatError> {
    let ext = source_extension(path)?;
    if ext != "csv" {
        return Err(DataFormatError::UnsupportedFormat(format!(".{ext}")));
    }
    load_price_reader(std::fs::File::open(path)?)
}

/// Load a price export from any reader. Open/high/low fall back to the close
/// and volume to zero when those columns are absent or unparsable.
pub fn load_price_reader<R: Read>(reader: R) -> Result<PriceSeries, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let col = |name: &str| headers.iter().position(|h| h == name);

    let date_idx = col("date").ok_or(DataFormatError::MissingDateColumn)?;
    let close_idx = col("close")
        .or_else(|| col("adj_close"))
        .ok_or_else(|| DataFormatError::MissingColumn("close".into()))?;
    let (open_idx, high_idx, low_idx, volume_idx) = (col("open"), col("high"), col("low"), col("volume"));

    let mut series = PriceSeries::default();
    for result in reader.records() {
        let record = result?;
        let field = |idx: Option<usize>| idx.and_then(|i| record.get(i)).and_then(parse_number);

        let (Some(date), Some(close)) = (
            record.get(date_idx).and_then(parse_date),
            field(Some(close_idx)),
        ) else {
            series.dropped += 1;
            continue;
        };

        series.bars.push(PriceBar {
            date,
            open: field(open_idx).unwrap_or(close),
            high: field(high_idx).unwrap_or(close),
            low: field(low_idx).unwrap_or(close),
            close,
            volume: field(volume_idx).map_or(0, |v| v.max(0.0) as u64),
        });
    }

    if series.is_empty() {
        return Err(DataFormatError::NoData);
    }
    series.bars.sort_by_key(|b| b.date);
    log::debug!("Loaded {} price bars ({} dropped)", series.len(), series.dropped);
    Ok(series)
}

// ---------------------------------------------------------------------------
// Indicators
// ---------------------------------------------------------------------------

/// Trailing simple moving average; `None` until `window` values are available.
pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        out.push((i + 1 >= window).then(|| sum / window as f64));
    }
    out
}

/// Fractional change from the previous value; `None` for the first value or
/// when the previous value is zero.
pub fn daily_returns(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 || values[i - 1] == 0.0 {
            out.push(None);
        } else {
            out.push(Some(values[i] / values[i - 1] - 1.0));
        }
    }
    out
}

/// Headline numbers for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KeyMetrics {
    pub last_close: f64,
    pub moving_avg: Option<f64>,
    pub latest_volume: u64,
    pub daily_return: Option<f64>,
}

/// Metrics for the latest bar, or `None` for an empty series.
pub fn key_metrics(series: &PriceSeries) -> Option<KeyMetrics> {
    let last = series.bars.last()?;
    let closes = series.closes();
    Some(KeyMetrics {
        last_close: last.close,
        moving_avg: moving_average(&closes, MOVING_AVERAGE_WINDOW)
            .last()
            .copied()
            .flatten(),
        latest_volume: last.volume,
        daily_return: daily_returns(&closes).last().copied().flatten(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_file;

    const EXPORT: &str = "\
Date,Open,High,Low,Close,Volume
2024-01-03,11,12,10,11.5,1000
2024-01-02,10,11,9,10,900
bad,1,1,1,1,1
2024-01-04,11.5,13,11,12.65,1500
";

    #[test]
    fn export_is_sorted_and_bad_rows_dropped() {
        let series = load_price_reader(EXPORT.as_bytes()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.dropped, 1);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
        assert_eq!(series.closes(), vec![10.0, 11.5, 12.65]);
    }

    #[test]
    fn missing_close_is_schema_error() {
        let err = load_price_reader("Date,Open\n2024-01-01,1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataFormatError::MissingColumn(c) if c == "close"));
    }

    #[test]
    fn empty_export_is_no_data() {
        let err = load_price_reader("Date,Close\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DataFormatError::NoData));
    }

    #[test]
    fn moving_average_waits_for_full_window() {
        let ma = moving_average(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(ma, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn returns_skip_first_and_zero_base() {
        let r = daily_returns(&[10.0, 11.0, 0.0, 5.0]);
        assert_eq!(r[0], None);
        assert!((r[1].unwrap() - 0.1).abs() < 1e-12);
        assert_eq!(r[2], Some(-1.0));
        assert_eq!(r[3], None);
    }

    #[test]
    fn key_metrics_on_short_series_have_no_average() {
        let series = load_price_reader(EXPORT.as_bytes()).unwrap();
        let m = key_metrics(&series).unwrap();
        assert_eq!(m.last_close, 12.65);
        assert_eq!(m.latest_volume, 1500);
        assert_eq!(m.moving_avg, None);
        assert!((m.daily_return.unwrap() - 0.1).abs() < 1e-9);
        assert!(key_metrics(&PriceSeries::default()).is_none());
    }

    #[test]
    fn price_files_are_checked_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("SPY.CSV");
        std::fs::write(&csv, EXPORT).unwrap();
        assert_eq!(load_price_file(&csv).unwrap().len(), 3);

        let bare = dir.path().join("SPY");
        std::fs::write(&bare, EXPORT).unwrap();
        let err = load_price_file(&bare).unwrap_err();
        assert_eq!(err.to_string(), load_file(&bare).unwrap_err().to_string());
        assert!(matches!(err, DataFormatError::UnsupportedFormat(msg) if msg == "file has no extension"));

        let xlsx = dir.path().join("SPY.xlsx");
        std::fs::write(&xlsx, EXPORT).unwrap();
        assert!(matches!(load_price_file(&xlsx).unwrap_err(), DataFormatError::UnsupportedFormat(ext) if ext == ".xlsx"));
    }

    #[test]
    fn since_restricts_range() {
        let series = load_price_reader(EXPORT.as_bytes()).unwrap();
        let recent = series.since(NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(recent.len(), 2);
    }
}
