use eframe::egui::{RichText, Ui};
use egui_extras::DatePickerButton;

use crate::color::sign_color;
use crate::state::AppState;
use crate::ui::dashboard::thousands;
use crate::ui::plot;

/// Render the price view: start-date picker, key metrics and the close chart.
pub fn price_view(ui: &mut Ui, state: &mut AppState) {
    let Some(prices) = state.prices.as_mut() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a daily price history to begin  (File → Open price history…)");
        });
        return;
    };

    let name = prices
        .source
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();
    ui.heading(format!("Analyzing: {name}"));

    ui.horizontal(|ui: &mut Ui| {
        ui.label("Start Date");
        ui.add(DatePickerButton::new(&mut prices.start).id_salt("price_start"));
    });
    ui.separator();

    let visible = prices.visible();
    match prices.metrics() {
        Some(m) => {
            ui.columns(4, |cols| {
                cols[0].label("Last Close Price");
                cols[0].label(RichText::new(format!("${:.2}", m.last_close)).size(22.0).strong());

                cols[1].label("50-Day Moving Avg");
                let ma = m.moving_avg.map_or("n/a".to_string(), |v| format!("${v:.2}"));
                cols[1].label(RichText::new(ma).size(22.0).strong());

                cols[2].label("Latest Volume");
                cols[2].label(
                    RichText::new(thousands(i64::try_from(m.latest_volume).unwrap_or(i64::MAX)))
                        .size(22.0)
                        .strong(),
                );

                cols[3].label("Daily Return");
                let text = match m.daily_return {
                    Some(r) => RichText::new(format!("{:.2}%", r * 100.0)).color(sign_color(r)),
                    None => RichText::new("n/a"),
                };
                cols[3].label(text.size(22.0).strong());
            });
        }
        None => {
            ui.label("No data found for the selected range.");
        }
    }
    ui.separator();

    ui.heading("Price Chart");
    plot::price_chart(ui, &visible);
}
