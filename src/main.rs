mod app;
mod color;
mod config;
mod data;
mod fetch;
mod state;
mod ui;

use anyhow::anyhow;
use clap::Parser;
use eframe::egui;

use app::SkyplotApp;
use config::BackendConfig;

const LOCAL_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Parser, Debug)]
#[command(name = "skyplot")]
#[command(about = "Explore remotely hosted flyover CSV data")]
struct Args {
    /// Backend preset
    #[arg(long, value_enum, default_value = "local")]
    backend: Preset,

    /// Override the preset's base URL
    #[arg(long)]
    base_url: Option<String>,

    /// The backend serves a flat file list without dataset types
    #[arg(long)]
    flat: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Preset {
    /// Local development server (Flask-style api/... routes)
    Local,
    /// Cloud functions deployment (one function per operation)
    Cloud,
}

fn build_config(args: &Args) -> anyhow::Result<BackendConfig> {
    let config = match args.backend {
        Preset::Local => BackendConfig::local(
            args.base_url
                .clone()
                .unwrap_or_else(|| LOCAL_BASE_URL.to_string()),
        ),
        Preset::Cloud => {
            let base_url = args
                .base_url
                .clone()
                .ok_or_else(|| anyhow!("--backend cloud requires --base-url"))?;
            BackendConfig::cloud(base_url)
        }
    };
    Ok(if args.flat { config.flat() } else { config })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = build_config(&args)?;
    log::info!("using backend at {}", config.base_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Skyplot – Flyover Data Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(SkyplotApp::new(config, &cc.egui_ctx)))),
    )
    .map_err(|e| anyhow!("eframe exited with an error: {e}"))
}
