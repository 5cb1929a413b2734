use eframe::egui;

use crate::config::BackendConfig;
use crate::fetch::{FetchCommand, FetchResponse, FetchWorker};
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SkyplotApp {
    pub state: AppState,
    worker: FetchWorker,
    backend_label: String,
}

impl SkyplotApp {
    pub fn new(config: BackendConfig, ctx: &egui::Context) -> Self {
        let backend_label = config.base_url.clone();
        let flat = !config.dataset_dimension;
        let worker = FetchWorker::spawn(config, ctx.clone());

        // Kick off the initial listing.
        if flat {
            worker.send(FetchCommand::ListFiles { dataset: None });
        } else {
            worker.send(FetchCommand::ListDataTypes);
        }

        SkyplotApp {
            state: AppState::new(flat),
            worker,
            backend_label,
        }
    }

    fn apply_responses(&mut self) {
        for response in self.worker.drain() {
            match response {
                FetchResponse::DataTypes(result) => self.state.apply_data_types(result),
                FetchResponse::Files(result) => self.state.apply_files(result),
                FetchResponse::Columns(result) => self.state.apply_columns(result),
                FetchResponse::Bundle { generation, result } => {
                    self.state.apply_bundle(generation, result)
                }
            }
        }
    }
}

impl eframe::App for SkyplotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_responses();

        // ---- Top panel: backend + status ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.worker, &self.backend_label);
        });

        // ---- Left side panel: selection chain ----
        egui::SidePanel::left("selection_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.worker);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::series_plot(ui, &self.state);
        });
    }
}
