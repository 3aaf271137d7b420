use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::{write_filtered_csv, write_snapshot_json};
use crate::state::{sample_path, sample_prices_path, AppState, Page, FILTER_FIELDS};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard Filters");
    ui.separator();

    let Some(session) = state.load.session() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone the domains so we can mutate state inside the loop.
    let table = session.table();
    let domains: Vec<_> = FILTER_FIELDS
        .iter()
        .filter_map(|&field| table.domain(field).map(|vals| (field, vals.clone())))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (field, all_values) in &domains {
                let field = *field;
                let n_selected = all_values
                    .iter()
                    .filter(|v| state.filters.is_selected(field, v))
                    .count();
                let header_text = format!("Select {field}  ({n_selected}/{})", all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(field.label())
                    .default_open(true)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(field);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(field);
                            }
                        });

                        for val in all_values {
                            let mut checked = state.filters.is_selected(field, val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                state.toggle_filter_value(field, val);
                            }
                        }
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open sales file…").clicked() {
                open_sales_dialog(state);
                ui.close_menu();
            }
            if ui.button("Use sample Superstore data").clicked() {
                state.open(&sample_path());
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Open price history…").clicked() {
                open_prices_dialog(state);
                ui.close_menu();
            }
            if ui.button("Use sample price history").clicked() {
                state.open_prices(&sample_prices_path());
                ui.close_menu();
            }
            ui.separator();
            let loaded = state.load.session().is_some();
            if ui
                .add_enabled(loaded, egui::Button::new("Export filtered rows (CSV)…"))
                .clicked()
            {
                let result = export_filtered_rows(state);
                report(state, result);
                ui.close_menu();
            }
            if ui
                .add_enabled(loaded, egui::Button::new("Export summary (JSON)…"))
                .clicked()
            {
                let result = export_snapshot(state);
                report(state, result);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.selectable_value(&mut state.page, Page::Sales, "Sales & Profit");
        ui.selectable_value(&mut state.page, Page::Prices, "Stock Analyzer");
        ui.separator();

        if let Some(session) = state.load.session() {
            ui.label(format!(
                "{}: {} records loaded, {} visible",
                session.name(),
                session.table().len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_sales_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
        state.page = Page::Sales;
    }
}

pub fn open_prices_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open daily price history")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_prices(&path);
        state.page = Page::Prices;
    }
}

fn save_dialog(title: &str, default_name: &str, ext: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .set_file_name(default_name)
        .add_filter(ext.to_uppercase(), &[ext])
        .save_file()
}

fn export_filtered_rows(state: &AppState) -> Result<Option<PathBuf>> {
    let Some(view) = state.view() else {
        return Ok(None);
    };
    let Some(path) = save_dialog("Export filtered rows", "filtered.csv", "csv") else {
        return Ok(None);
    };
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_filtered_csv(&view, BufWriter::new(file))?;
    Ok(Some(path))
}

fn export_snapshot(state: &AppState) -> Result<Option<PathBuf>> {
    let Some(path) = save_dialog("Export summary", "summary.json", "json") else {
        return Ok(None);
    };
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    write_snapshot_json(&state.snapshot, BufWriter::new(file))?;
    Ok(Some(path))
}

fn report(state: &mut AppState, result: Result<Option<PathBuf>>) {
    match result {
        Ok(Some(path)) => {
            log::info!("Exported {}", path.display());
            state.status_message = None;
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}
