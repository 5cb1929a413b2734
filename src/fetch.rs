use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui;

use crate::config::BackendConfig;
use crate::data::assemble::{assemble, AssemblyError};
use crate::data::client::{ApiClient, ApiError};
use crate::data::model::ChartBundle;

// ---------------------------------------------------------------------------
// Fetch worker – bridges the egui loop and the async backend client
// ---------------------------------------------------------------------------

/// A catalog request issued by the UI.
#[derive(Debug, Clone)]
pub enum FetchCommand {
    ListDataTypes,
    ListFiles {
        dataset: Option<String>,
    },
    ListColumns {
        dataset: Option<String>,
        file: String,
    },
    Assemble {
        /// Tag echoed back with the result; stale generations are dropped on
        /// apply, not cancelled in flight.
        generation: u64,
        dataset: Option<String>,
        file: String,
        columns: Vec<String>,
    },
}

/// The matching results, delivered on the UI thread's receiver.
#[derive(Debug)]
pub enum FetchResponse {
    DataTypes(Result<Vec<String>, ApiError>),
    Files(Result<Vec<String>, ApiError>),
    Columns(Result<Vec<String>, ApiError>),
    Bundle {
        generation: u64,
        result: Result<ChartBundle, AssemblyError>,
    },
}

/// Handle to the worker thread. Commands go in over a channel; responses come
/// back over another and wake the UI via `request_repaint`.
pub struct FetchWorker {
    commands: Sender<FetchCommand>,
    responses: Receiver<FetchResponse>,
}

impl FetchWorker {
    /// Spawn the worker thread with its own tokio runtime.
    ///
    /// Each command runs as its own task, so a slow assembly does not hold up
    /// listing calls issued after it.
    pub fn spawn(config: BackendConfig, ctx: egui::Context) -> Self {
        let (command_tx, command_rx) = mpsc::channel::<FetchCommand>();
        let (response_tx, response_rx) = mpsc::channel::<FetchResponse>();

        thread::Builder::new()
            .name("skyplot-fetch".into())
            .spawn(move || run(config, command_rx, response_tx, ctx))
            .expect("failed to spawn fetch worker thread");

        FetchWorker {
            commands: command_tx,
            responses: response_rx,
        }
    }

    pub fn send(&self, command: FetchCommand) {
        if self.commands.send(command).is_err() {
            log::error!("fetch worker is gone, dropping command");
        }
    }

    /// Drain whatever responses have arrived since the last frame.
    pub fn drain(&self) -> impl Iterator<Item = FetchResponse> + '_ {
        self.responses.try_iter()
    }
}

fn run(
    config: BackendConfig,
    commands: Receiver<FetchCommand>,
    responses: Sender<FetchResponse>,
    ctx: egui::Context,
) {
    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to build fetch runtime: {e}");
            return;
        }
    };
    let client = ApiClient::new(config);

    // Exits when the UI side drops its command sender.
    while let Ok(command) = commands.recv() {
        let client = client.clone();
        let responses = responses.clone();
        let ctx = ctx.clone();
        runtime.spawn(async move {
            let response = handle(&client, command).await;
            if responses.send(response).is_ok() {
                ctx.request_repaint();
            }
        });
    }
}

async fn handle(client: &ApiClient, command: FetchCommand) -> FetchResponse {
    match command {
        FetchCommand::ListDataTypes => FetchResponse::DataTypes(client.list_data_types().await),
        FetchCommand::ListFiles { dataset } => {
            FetchResponse::Files(client.list_files(dataset.as_deref()).await)
        }
        FetchCommand::ListColumns { dataset, file } => {
            FetchResponse::Columns(client.list_columns(dataset.as_deref(), &file).await)
        }
        FetchCommand::Assemble {
            generation,
            dataset,
            file,
            columns,
        } => FetchResponse::Bundle {
            generation,
            result: assemble(client, dataset.as_deref(), &file, &columns).await,
        },
    }
}
