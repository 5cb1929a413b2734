use chrono::DateTime;
use eframe::egui::Ui;
use egui_plot::{Line, Plot, PlotPoints};

use crate::data::model::LINE_WIDTH;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Series plot (central panel)
// ---------------------------------------------------------------------------

/// Render the assembled series in the central panel.
pub fn series_plot(ui: &mut Ui, state: &AppState) {
    let bundle = match state.selection.bundle() {
        Some(b) => b,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Pick a file and some columns, then hit Plot");
            });
            return;
        }
    };

    Plot::new("series_plot")
        .legend(egui_plot::Legend::default())
        .x_axis_label("Timestamp")
        .y_axis_label("Value")
        .x_axis_formatter(|mark, _range| format_timestamp(mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for dataset in &bundle.datasets {
                let points: PlotPoints = bundle
                    .timestamps
                    .iter()
                    .zip(dataset.values.iter())
                    .map(|(&x, &y)| [x, y])
                    .collect();

                // Solid stroke, no fill.
                let line = Line::new(points)
                    .name(&dataset.label)
                    .color(dataset.color)
                    .width(LINE_WIDTH);

                plot_ui.line(line);
            }
        });
}

/// Tick label for the time axis. Values in the plausible epoch-seconds range
/// render as wall-clock time (UTC); anything else is shown as-is.
fn format_timestamp(value: f64) -> String {
    if (1e8..4e10).contains(&value) {
        if let Some(dt) = DateTime::from_timestamp(value as i64, 0) {
            return dt.format("%m-%d %H:%M:%S").to_string();
        }
    }
    format!("{value:.0}")
}
