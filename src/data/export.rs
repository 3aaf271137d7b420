use std::io::Write;

use anyhow::{Context, Result};

use super::filter::FilteredView;
use super::snapshot::DashboardSnapshot;

const CSV_HEADER: [&str; 9] = [
    "Order Date",
    "Month-Year",
    "Region",
    "Category",
    "Sub-Category",
    "Segment",
    "State",
    "Sales",
    "Profit",
];

/// Write the filtered rows as CSV, in view order.
pub fn write_filtered_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER).context("writing CSV header")?;
    for rec in view.records() {
        out.write_record([
            rec.order_date.to_string(),
            rec.month.clone(),
            rec.region.clone(),
            rec.category.clone(),
            rec.sub_category.clone(),
            rec.segment.clone(),
            rec.state.clone(),
            rec.sales.to_string(),
            rec.profit.to_string(),
        ])
        .context("writing CSV row")?;
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

/// Write KPIs and aggregates as pretty-printed JSON.
pub fn write_snapshot_json<W: Write>(snapshot: &DashboardSnapshot, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, snapshot).context("serializing dashboard snapshot")?;
    Ok(())
}
