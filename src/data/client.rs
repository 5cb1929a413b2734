use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::config::BackendConfig;
use super::model::{coerce_number, coerce_timestamp, TIMESTAMP_COLUMN};

// ---------------------------------------------------------------------------
// Error taxonomy
// ---------------------------------------------------------------------------

/// Failure of a single catalog retrieval.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network / transport level failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Backend answered with a non-success status.
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    /// Body was not the expected JSON shape.
    #[error("malformed response from {url}: {detail}")]
    MalformedBody { url: String, detail: String },
}

// ---------------------------------------------------------------------------
// ApiClient – typed access to the four catalog operations
// ---------------------------------------------------------------------------

/// Async client for the catalog backend.
///
/// Cheap to clone (the underlying reqwest client is reference counted), so
/// concurrent retrievals share one connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: BackendConfig,
}

impl ApiClient {
    pub fn new(config: BackendConfig) -> Self {
        ApiClient {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// List the dataset categories. Flat backends have none to list, so no
    /// request is made.
    pub async fn list_data_types(&self) -> Result<Vec<String>, ApiError> {
        if !self.config.dataset_dimension {
            return Ok(Vec::new());
        }
        let url = self.config.url(&self.config.routes.data_types);
        self.get_string_array(&url, &[]).await
    }

    /// List the CSV files of one dataset category (`None` in flat mode).
    pub async fn list_files(&self, dataset: Option<&str>) -> Result<Vec<String>, ApiError> {
        let url = self.config.url(&self.config.routes.files);
        self.get_string_array(&url, &self.dataset_params(dataset))
            .await
    }

    /// List the columns of one file, including the reserved timestamp column.
    pub async fn list_columns(
        &self,
        dataset: Option<&str>,
        file: &str,
    ) -> Result<Vec<String>, ApiError> {
        let url = self.config.url(&self.config.routes.columns);
        let mut params = self.dataset_params(dataset);
        params.push(("filename", file.to_string()));
        self.get_string_array(&url, &params).await
    }

    /// Fetch one data column as numbers, aligned by row index.
    pub async fn column_values(
        &self,
        dataset: Option<&str>,
        file: &str,
        column: &str,
    ) -> Result<Vec<f64>, ApiError> {
        let (url, cells) = self.fetch_column(dataset, file, column).await?;
        coerce_cells(&url, cells, column, coerce_number)
    }

    /// Fetch the reserved timestamp column as epoch seconds.
    pub async fn timestamps(
        &self,
        dataset: Option<&str>,
        file: &str,
    ) -> Result<Vec<f64>, ApiError> {
        let (url, cells) = self.fetch_column(dataset, file, TIMESTAMP_COLUMN).await?;
        coerce_cells(&url, cells, TIMESTAMP_COLUMN, coerce_timestamp)
    }

    // -- request plumbing --

    fn dataset_params(&self, dataset: Option<&str>) -> Vec<(&'static str, String)> {
        match (self.config.dataset_dimension, dataset) {
            (true, Some(d)) => vec![("data_type", d.to_string())],
            _ => Vec::new(),
        }
    }

    async fn fetch_column(
        &self,
        dataset: Option<&str>,
        file: &str,
        column: &str,
    ) -> Result<(String, Vec<JsonValue>), ApiError> {
        let url = self.config.url(&self.config.routes.values);
        let mut params = self.dataset_params(dataset);
        params.push(("filename", file.to_string()));
        params.push(("column", column.to_string()));
        let cells = self.get_json_array(&url, &params).await?;
        Ok((url, cells))
    }

    async fn get_string_array(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<String>, ApiError> {
        let values = self.get_json_array(url, params).await?;
        values
            .into_iter()
            .map(|v| match v {
                JsonValue::String(s) => Ok(s),
                other => Err(ApiError::MalformedBody {
                    url: url.to_string(),
                    detail: format!("expected a string, got {other}"),
                }),
            })
            .collect()
    }

    async fn get_json_array(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<JsonValue>, ApiError> {
        let response = self
            .http
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let root: JsonValue =
            serde_json::from_str(&body).map_err(|e| ApiError::MalformedBody {
                url: url.to_string(),
                detail: e.to_string(),
            })?;

        match root {
            JsonValue::Array(values) => Ok(values),
            other => Err(ApiError::MalformedBody {
                url: url.to_string(),
                detail: format!("expected a JSON array, got {other}"),
            }),
        }
    }
}

fn coerce_cells(
    url: &str,
    cells: Vec<JsonValue>,
    column: &str,
    coerce: fn(&JsonValue) -> Option<f64>,
) -> Result<Vec<f64>, ApiError> {
    cells
        .iter()
        .enumerate()
        .map(|(row, cell)| {
            coerce(cell).ok_or_else(|| ApiError::MalformedBody {
                url: url.to_string(),
                detail: format!("column '{column}', row {row}: cannot read {cell} as a value"),
            })
        })
        .collect()
}
