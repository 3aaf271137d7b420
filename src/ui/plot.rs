use std::ops::RangeInclusive;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoints};

use crate::color::{sign_color, ColorMap};
use crate::data::aggregate::{AggregateResult, MonthlyPoint};
use crate::data::prices::{moving_average, PriceSeries, MOVING_AVERAGE_WINDOW};

const SALES_COLOR: Color32 = Color32::from_rgb(0x1f, 0x77, 0xb4);
const PROFIT_LINE_COLOR: Color32 = Color32::from_rgb(0xff, 0x7f, 0x0e);

/// Label for the grid mark at `pos` if it falls on an integer slot.
fn slot_label(labels: &[String], pos: f64) -> String {
    if (pos - pos.round()).abs() > 1e-6 || pos < -0.5 {
        return String::new();
    }
    labels.get(pos.round() as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Monthly trend (line chart)
// ---------------------------------------------------------------------------

/// Sales and profit per month, one x slot per month period.
pub fn monthly_trend(ui: &mut Ui, points: &[MonthlyPoint], height: f32) {
    let labels: Vec<String> = points.iter().map(|p| p.month.clone()).collect();
    let sales: PlotPoints = points
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.sales])
        .collect();
    let profit: PlotPoints = points
        .iter()
        .enumerate()
        .map(|(i, p)| [i as f64, p.profit])
        .collect();

    Plot::new("monthly_trend")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Month-Year")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| slot_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(sales).name("Sales").color(SALES_COLOR).width(2.0));
            plot_ui.line(Line::new(profit).name("Profit").color(PROFIT_LINE_COLOR).width(2.0));
        });
}

// ---------------------------------------------------------------------------
// Horizontal bar charts
// ---------------------------------------------------------------------------

/// How bars of a grouped chart are coloured.
pub enum BarColors<'a> {
    /// One colour per group key.
    ByKey(&'a ColorMap),
    /// Green for gains, red for losses.
    BySign,
}

/// Horizontal bars listed top-to-bottom in the result's order.
pub fn grouped_bars(ui: &mut Ui, id: &str, result: &AggregateResult, colors: BarColors<'_>, height: f32) {
    if result.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }
    let labels: Vec<String> = result.keys().map(str::to_string).collect();
    let bars: Vec<Bar> = result
        .groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let fill = match &colors {
                BarColors::ByKey(map) => map.color_for(&g.key),
                BarColors::BySign => sign_color(g.value),
            };
            Bar::new(-(i as f64), g.value)
                .name(&g.key)
                .fill(fill)
                .width(0.7)
        })
        .collect();

    Plot::new(id)
        .height(height)
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| slot_label(&labels, -mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Price chart
// ---------------------------------------------------------------------------

/// Close price and its moving average, x in days since the first bar.
pub fn price_chart(ui: &mut Ui, series: &PriceSeries) {
    let Some(first) = series.first_date() else {
        ui.label("No price data in the selected range.");
        return;
    };
    let day = |d: chrono::NaiveDate| (d - first).num_days() as f64;

    let close: PlotPoints = series.bars.iter().map(|b| [day(b.date), b.close]).collect();
    let ma: PlotPoints = series
        .bars
        .iter()
        .zip(moving_average(&series.closes(), MOVING_AVERAGE_WINDOW))
        .filter_map(|(b, avg)| avg.map(|v| [day(b.date), v]))
        .collect();

    Plot::new("price_chart")
        .legend(Legend::default())
        .y_axis_label("Price (USD)")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            first
                .checked_add_days(chrono::Days::new(mark.value.max(0.0) as u64))
                .map(|d| d.to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(close).name("Close").color(SALES_COLOR));
            plot_ui.line(
                Line::new(ma)
                    .name(format!("{MOVING_AVERAGE_WINDOW}-Day MA"))
                    .color(PROFIT_LINE_COLOR),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_only_on_integer_slots() {
        let labels = vec!["2024-01".to_string(), "2024-02".to_string()];
        assert_eq!(slot_label(&labels, 0.0), "2024-01");
        assert_eq!(slot_label(&labels, 1.0), "2024-02");
        assert_eq!(slot_label(&labels, 0.5), "");
        assert_eq!(slot_label(&labels, 2.0), "");
        assert_eq!(slot_label(&labels, -1.0), "");
    }
}
