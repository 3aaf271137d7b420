use eframe::egui::{self, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::{sign_color, ColorMap};
use crate::data::aggregate::Summary;
use crate::data::model::{CategoryField, Table};
use crate::state::{AppState, LoadState};
use crate::ui::plot::{self, BarColors};

const CHART_HEIGHT: f32 = 260.0;

/// `1234567` → `"1,234,567"`.
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 {
        out.insert(0, '-');
    }
    out
}

// ---------------------------------------------------------------------------
// Central panel – sales dashboard
// ---------------------------------------------------------------------------

/// Render KPIs and charts for the current filter selection.
pub fn sales_dashboard(ui: &mut Ui, state: &mut AppState) {
    let session = match &state.load {
        LoadState::Loaded(session) => session,
        LoadState::Failed(msg) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(RichText::new(format!("Could not load data: {msg}")).color(egui::Color32::RED));
            });
            return;
        }
        LoadState::Idle => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file or the sample data to begin  (File → Open…)");
            });
            return;
        }
    };

    let snapshot = &state.snapshot;
    let category_colors = ColorMap::new(
        session
            .table()
            .domain(CategoryField::Category)
            .into_iter()
            .flatten(),
    );

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("📊 Dynamic Sales & Profitability Dashboard");
            ui.separator();

            kpi_row(ui, &snapshot.summary);
            if snapshot.is_empty() {
                ui.label("No rows match the current filters.");
            }
            ui.separator();

            ui.heading("Monthly Sales & Profit Trend");
            plot::monthly_trend(ui, &snapshot.monthly, CHART_HEIGHT);

            ui.columns(2, |cols| {
                cols[0].heading("Sales by Category");
                plot::grouped_bars(
                    &mut cols[0],
                    "sales_by_category",
                    &snapshot.sales_by_category,
                    BarColors::ByKey(&category_colors),
                    CHART_HEIGHT,
                );
                cols[1].heading("Profit by Sub-Category");
                plot::grouped_bars(
                    &mut cols[1],
                    "profit_by_sub_category",
                    &snapshot.profit_by_sub_category,
                    BarColors::BySign,
                    CHART_HEIGHT,
                );
            });

            ui.heading("Geographical Performance");
            plot::grouped_bars(
                ui,
                "sales_by_state",
                &snapshot.sales_by_state,
                BarColors::BySign,
                CHART_HEIGHT * 1.5,
            );

            ui.separator();
            ui.checkbox(&mut state.show_raw_data, "View Raw Data Table");
        });
}

fn kpi_row(ui: &mut Ui, summary: &Summary) {
    ui.columns(3, |cols| {
        kpi_card(&mut cols[0], "Total Sales", format!("US $ {}", thousands(summary.total_sales)), None);
        kpi_card(
            &mut cols[1],
            "Total Profit",
            format!("US $ {}", thousands(summary.total_profit)),
            Some(sign_color(summary.total_profit as f64)),
        );
        kpi_card(
            &mut cols[2],
            "Profit Margin",
            format!("{:.2}%", summary.profit_margin_pct),
            None,
        );
    });
}

fn kpi_card(ui: &mut Ui, title: &str, value: String, color: Option<egui::Color32>) {
    ui.group(|ui: &mut Ui| {
        ui.label(title);
        let mut text = RichText::new(value).size(24.0).strong();
        if let Some(c) = color {
            text = text.color(c);
        }
        ui.label(text);
    });
}

// ---------------------------------------------------------------------------
// Raw data window
// ---------------------------------------------------------------------------

/// Filtered rows in a virtualised table.
pub fn raw_data_window(ctx: &egui::Context, state: &mut AppState) {
    if !state.show_raw_data {
        return;
    }
    let Some(session) = state.load.session() else {
        return;
    };
    let table: &Table = session.table();
    let indices = &state.visible_indices;

    let mut open = state.show_raw_data;
    egui::Window::new(format!("Raw data – {} rows", indices.len()))
        .id(egui::Id::new("raw_data_window"))
        .open(&mut open)
        .default_size([900.0, 400.0])
        .show(ctx, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .columns(Column::auto().at_least(70.0), 7)
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    for title in [
                        "Order Date",
                        "Region",
                        "Category",
                        "Sub-Category",
                        "Segment",
                        "State",
                        "Sales",
                        "Profit",
                    ] {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, indices.len(), |mut row| {
                        let rec = &table.records[indices[row.index()]];
                        row.col(|ui: &mut Ui| {
                            ui.label(rec.order_date.to_string());
                        });
                        for field in [
                            CategoryField::Region,
                            CategoryField::Category,
                            CategoryField::SubCategory,
                            CategoryField::Segment,
                            CategoryField::State,
                        ] {
                            row.col(|ui: &mut Ui| {
                                ui.label(rec.category_value(field));
                            });
                        }
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", rec.sales));
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(RichText::new(format!("{:.2}", rec.profit)).color(sign_color(rec.profit)));
                        });
                    });
                });
        });
    state.show_raw_data = open;
}
