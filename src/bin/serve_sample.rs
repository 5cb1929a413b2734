//! Sample catalog backend for local development.
//!
//! Serves the same four endpoints as the production data server, over
//! deterministic in-memory flyover data:
//!
//! ```text
//! cargo run --bin serve_sample -- --port 5000
//! cargo run                      # skyplot against http://127.0.0.1:5000
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Context;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "serve_sample")]
#[command(about = "Serve a deterministic sample flyover catalog")]
struct Args {
    #[arg(short, long, default_value_t = 5000)]
    port: u16,
}

// ---------------------------------------------------------------------------
// Catalog – data_type → filename → columns
// ---------------------------------------------------------------------------

/// One sample CSV: named columns, all with the same row count. The first
/// column is always `timestamp_`.
struct SampleFile {
    columns: Vec<(String, Vec<f64>)>,
}

impl SampleFile {
    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }
}

type Catalog = BTreeMap<String, BTreeMap<String, SampleFile>>;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const ROWS: usize = 600;
const EPOCH_START: f64 = 1_700_000_000.0;

fn waveform(
    rng: &mut SimpleRng,
    base: f64,
    swing: f64,
    period_s: f64,
    noise: f64,
) -> Vec<f64> {
    (0..ROWS)
        .map(|i| {
            let t = i as f64;
            base + swing * (t * std::f64::consts::TAU / period_s).sin() + rng.gauss(0.0, noise)
        })
        .collect()
}

fn timestamps() -> Vec<f64> {
    (0..ROWS).map(|i| EPOCH_START + i as f64).collect()
}

fn telemetry_file(rng: &mut SimpleRng, altitude_base: f64, speed_base: f64) -> SampleFile {
    SampleFile {
        columns: vec![
            ("timestamp_".into(), timestamps()),
            (
                "altitude".into(),
                waveform(rng, altitude_base, 300.0, 240.0, 4.0),
            ),
            ("speed".into(), waveform(rng, speed_base, 8.0, 90.0, 0.5)),
            ("battery_v".into(), waveform(rng, 12.6, 0.2, 600.0, 0.01)),
        ],
    }
}

fn fpga_file(rng: &mut SimpleRng, temp_base: f64) -> SampleFile {
    SampleFile {
        columns: vec![
            ("timestamp_".into(), timestamps()),
            (
                "core_temp".into(),
                waveform(rng, temp_base, 4.0, 300.0, 0.2),
            ),
            ("clock_jitter_ps".into(), waveform(rng, 12.0, 1.5, 30.0, 0.8)),
            ("vcc_int".into(), waveform(rng, 0.85, 0.01, 120.0, 0.002)),
        ],
    }
}

fn build_catalog() -> Catalog {
    let mut rng = SimpleRng::new(42);

    let mut telem = BTreeMap::new();
    telem.insert(
        "flight_001.csv".to_string(),
        telemetry_file(&mut rng, 1200.0, 42.0),
    );
    telem.insert(
        "flight_002.csv".to_string(),
        telemetry_file(&mut rng, 900.0, 55.0),
    );

    let mut fpga = BTreeMap::new();
    fpga.insert("capture_a.csv".to_string(), fpga_file(&mut rng, 45.0));
    fpga.insert("capture_b.csv".to_string(), fpga_file(&mut rng, 52.0));

    let mut catalog = Catalog::new();
    catalog.insert("telem".to_string(), telem);
    catalog.insert("fpga".to_string(), fpga);
    catalog
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FilesQuery {
    data_type: String,
}

#[derive(Debug, Deserialize)]
struct ColumnsQuery {
    data_type: String,
    filename: String,
}

#[derive(Debug, Deserialize)]
struct DataQuery {
    data_type: String,
    filename: String,
    column: String,
}

async fn data_types(State(catalog): State<Arc<Catalog>>) -> Json<Vec<String>> {
    Json(catalog.keys().cloned().collect())
}

async fn csv_files(
    State(catalog): State<Arc<Catalog>>,
    Query(query): Query<FilesQuery>,
) -> Response {
    match catalog.get(&query.data_type) {
        Some(files) => Json(files.keys().cloned().collect::<Vec<_>>()).into_response(),
        None => not_found("Data type not found"),
    }
}

async fn csv_columns(
    State(catalog): State<Arc<Catalog>>,
    Query(query): Query<ColumnsQuery>,
) -> Response {
    match lookup(&catalog, &query.data_type, &query.filename) {
        Some(file) => Json(file.column_names()).into_response(),
        None => not_found("File not found"),
    }
}

async fn csv_data(
    State(catalog): State<Arc<Catalog>>,
    Query(query): Query<DataQuery>,
) -> Response {
    let Some(file) = lookup(&catalog, &query.data_type, &query.filename) else {
        return not_found("File not found");
    };
    match file.column(&query.column) {
        Some(values) => Json(values.to_vec()).into_response(),
        None => not_found("Column not found"),
    }
}

fn lookup<'a>(catalog: &'a Catalog, data_type: &str, filename: &str) -> Option<&'a SampleFile> {
    catalog.get(data_type)?.get(filename)
}

fn not_found(message: &str) -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": message }))).into_response()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let catalog = Arc::new(build_catalog());
    let app = Router::new()
        .route("/api/data-types", get(data_types))
        .route("/api/csv-files", get(csv_files))
        .route("/api/csv-columns", get(csv_columns))
        .route("/api/csv-data", get(csv_data))
        .with_state(catalog);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port))
        .await
        .with_context(|| format!("binding port {}", args.port))?;
    log::info!(
        "serving sample catalog on http://{}",
        listener.local_addr().context("local addr")?
    );
    axum::serve(listener, app).await.context("serving")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_rows_are_aligned() {
        let catalog = build_catalog();
        assert_eq!(catalog.len(), 2);
        for files in catalog.values() {
            for file in files.values() {
                let rows = file.column("timestamp_").expect("timestamps").len();
                assert_eq!(rows, ROWS);
                for (_, values) in &file.columns {
                    assert_eq!(values.len(), rows);
                }
            }
        }
    }

    #[test]
    fn catalog_is_deterministic() {
        let a = build_catalog();
        let b = build_catalog();
        let altitude_a = a["telem"]["flight_001.csv"].column("altitude").expect("a");
        let altitude_b = b["telem"]["flight_001.csv"].column("altitude").expect("b");
        assert_eq!(altitude_a, altitude_b);
    }
}
