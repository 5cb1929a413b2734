use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::series_color;
use crate::fetch::{FetchCommand, FetchWorker};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection chain
// ---------------------------------------------------------------------------

/// Render the dataset → file → columns selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, worker: &FetchWorker) {
    ui.heading("Data selection");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if !state.flat() {
                dataset_combo(ui, state, worker);
            }

            if state.flat() || state.selection.dataset().is_some() {
                file_combo(ui, state, worker);
            }

            if state.selection.file().is_some() {
                column_checkboxes(ui, state);
            }

            ui.add_space(8.0);
            plot_button(ui, state, worker);
        });
}

fn dataset_combo(ui: &mut Ui, state: &mut AppState, worker: &FetchWorker) {
    ui.strong("Data type");
    let current = state.selection.dataset().unwrap_or("Select…").to_string();
    let types = state.data_types.clone();

    egui::ComboBox::from_id_salt("data_type")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for data_type in &types {
                if ui
                    .selectable_label(
                        state.selection.dataset() == Some(data_type.as_str()),
                        data_type,
                    )
                    .clicked()
                {
                    state.choose_dataset(data_type.clone());
                    worker.send(FetchCommand::ListFiles {
                        dataset: Some(data_type.clone()),
                    });
                }
            }
        });
    ui.separator();
}

fn file_combo(ui: &mut Ui, state: &mut AppState, worker: &FetchWorker) {
    ui.strong("File");
    let current = state.selection.file().unwrap_or("Select…").to_string();
    let files = state.files.clone();

    egui::ComboBox::from_id_salt("csv_file")
        .selected_text(&current)
        .show_ui(ui, |ui: &mut Ui| {
            for file in &files {
                if ui
                    .selectable_label(state.selection.file() == Some(file.as_str()), file)
                    .clicked()
                {
                    state.choose_file(file.clone());
                    worker.send(FetchCommand::ListColumns {
                        dataset: state.selection.dataset().map(str::to_string),
                        file: file.clone(),
                    });
                }
            }
        });
    ui.separator();
}

fn column_checkboxes(ui: &mut Ui, state: &mut AppState) {
    let n_selected = state.selection.columns().len();
    let n_total = state.columns.len();
    ui.strong(format!("Columns  ({n_selected}/{n_total})"));

    let columns = state.columns.clone();
    for column in &columns {
        let position = state.selection.columns().iter().position(|c| c == column);

        // Selected columns show their series colour.
        let mut text = RichText::new(column);
        if let Some(i) = position {
            text = text.color(series_color(i));
        }

        let mut checked = position.is_some();
        if ui.checkbox(&mut checked, text).changed() {
            state.toggle_column(column.clone());
        }
    }
}

fn plot_button(ui: &mut Ui, state: &mut AppState, worker: &FetchWorker) {
    let ready = state.selection.can_plot() && !state.in_flight;
    if ui
        .add_enabled(ready, egui::Button::new("Plot"))
        .clicked()
    {
        let dataset = state.selection.dataset().map(str::to_string);
        let file = state.selection.file().map(str::to_string);
        let columns = state.selection.columns().to_vec();
        if let (Some(file), Some(generation)) = (file, state.begin_plot()) {
            worker.send(FetchCommand::Assemble {
                generation,
                dataset,
                file,
                columns,
            });
        }
    }

    if state.in_flight {
        ui.horizontal(|ui: &mut Ui| {
            ui.spinner();
            ui.label("Fetching…");
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top status bar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState, worker: &FetchWorker, backend_label: &str) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Backend: {backend_label}"));

        ui.separator();

        if ui.button("Refresh").clicked() {
            if state.flat() {
                worker.send(FetchCommand::ListFiles { dataset: None });
            } else {
                worker.send(FetchCommand::ListDataTypes);
            }
        }

        ui.separator();

        if let Some(bundle) = state.selection.bundle() {
            ui.label(format!(
                "{} rows, {} series",
                bundle.len(),
                bundle.datasets.len()
            ));
            ui.separator();
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}
