// ---------------------------------------------------------------------------
// Backend configuration
// ---------------------------------------------------------------------------

/// Route names for the four catalog operations, joined onto the base URL.
///
/// The local development server exposes them under `api/...` paths; the cloud
/// deployment exposes one function per operation at the host root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    pub data_types: String,
    pub files: String,
    pub columns: String,
    pub values: String,
}

/// Where the catalog backend lives and how it is shaped.
///
/// One config covers every deployment variant: local vs. cloud differ only in
/// `base_url` and route names, and a backend without dataset categories is
/// expressed by turning `dataset_dimension` off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,

    pub routes: Routes,

    /// Whether files are partitioned into dataset types. When off, the
    /// `data_type` query parameter is never sent and the dataset selection
    /// step is skipped entirely.
    pub dataset_dimension: bool,
}

impl BackendConfig {
    /// Local development server preset.
    pub fn local(base_url: impl Into<String>) -> Self {
        BackendConfig {
            base_url: trim_trailing_slash(base_url.into()),
            routes: Routes {
                data_types: "api/data-types".into(),
                files: "api/csv-files".into(),
                columns: "api/csv-columns".into(),
                values: "api/csv-data".into(),
            },
            dataset_dimension: true,
        }
    }

    /// Cloud functions preset: one function per operation at the host root.
    pub fn cloud(base_url: impl Into<String>) -> Self {
        BackendConfig {
            base_url: trim_trailing_slash(base_url.into()),
            routes: Routes {
                data_types: "list_data_types".into(),
                files: "list_csv_files".into(),
                columns: "list_csv_columns".into(),
                values: "get_csv_data".into(),
            },
            dataset_dimension: true,
        }
    }

    /// Drop the dataset-type dimension (flat file list).
    pub fn flat(mut self) -> Self {
        self.dataset_dimension = false;
        self
    }

    /// Full URL for a route.
    pub fn url(&self, route: &str) -> String {
        format!("{}/{}", self.base_url, route)
    }
}

fn trim_trailing_slash(mut s: String) -> String {
    while s.ends_with('/') {
        s.pop();
    }
    s
}
