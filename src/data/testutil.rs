//! In-process catalog backend for exercising the client and assembler.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value as JsonValue};

/// Canned response body for one column.
#[derive(Debug, Clone)]
enum Body {
    Json(JsonValue),
    /// Served verbatim, for malformed-body cases.
    Raw(String),
}

/// A scripted backend speaking the local-preset routes.
///
/// Defaults to one small telemetry catalog; override pieces with the
/// builder methods. Every request's query parameters are recorded so tests
/// can assert on what was actually sent.
#[derive(Debug, Clone)]
pub struct MockBackend {
    data_types: Vec<String>,
    files: Vec<String>,
    columns: Vec<String>,
    values: HashMap<String, (u16, Body)>,
    seen: Arc<Mutex<Vec<(String, HashMap<String, String>)>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        MockBackend {
            data_types: vec!["Telemetry".into(), "FPGA".into()],
            files: vec!["flight_001.csv".into()],
            columns: vec!["timestamp_".into(), "altitude".into(), "speed".into()],
            values: HashMap::new(),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockBackend {
    pub fn with_files(mut self, files: &[&str]) -> Self {
        self.files = files.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_values(mut self, column: &str, status: u16, body: JsonValue) -> Self {
        self.values
            .insert(column.to_string(), (status, Body::Json(body)));
        self
    }

    pub fn with_raw_values(mut self, column: &str, status: u16, body: &str) -> Self {
        self.values
            .insert(column.to_string(), (status, Body::Raw(body.to_string())));
        self
    }

    /// Handle to the recorded (route, query) pairs; keep a clone before
    /// spawning.
    pub fn seen(&self) -> Arc<Mutex<Vec<(String, HashMap<String, String>)>>> {
        Arc::clone(&self.seen)
    }

    fn record(&self, route: &str, params: &HashMap<String, String>) {
        self.seen
            .lock()
            .expect("seen lock")
            .push((route.to_string(), params.clone()));
    }
}

/// Bind an ephemeral port, serve the mock, return the bound address.
pub async fn spawn_backend(mock: MockBackend) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");

    let app = Router::new()
        .route("/api/data-types", get(data_types))
        .route("/api/csv-files", get(csv_files))
        .route("/api/csv-columns", get(csv_columns))
        .route("/api/csv-data", get(csv_data))
        .with_state(mock);

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });

    addr
}

async fn data_types(
    State(mock): State<MockBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<String>> {
    mock.record("data-types", &params);
    Json(mock.data_types.clone())
}

async fn csv_files(
    State(mock): State<MockBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<String>> {
    mock.record("csv-files", &params);
    Json(mock.files.clone())
}

async fn csv_columns(
    State(mock): State<MockBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<String>> {
    mock.record("csv-columns", &params);
    Json(mock.columns.clone())
}

async fn csv_data(
    State(mock): State<MockBackend>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.record("csv-data", &params);

    let Some(column) = params.get("column") else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "missing 'column' parameter"})),
        )
            .into_response();
    };

    match mock.values.get(column) {
        Some((status, Body::Json(body))) => {
            (status_of(*status), Json(body.clone())).into_response()
        }
        Some((status, Body::Raw(body))) => (status_of(*status), body.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Column not found"})),
        )
            .into_response(),
    }
}

fn status_of(code: u16) -> StatusCode {
    StatusCode::from_u16(code).expect("valid status code")
}
