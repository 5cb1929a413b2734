use crate::data::assemble::AssemblyError;
use crate::data::client::ApiError;
use crate::data::model::{ChartBundle, TIMESTAMP_COLUMN};

// ---------------------------------------------------------------------------
// Selection state machine
// ---------------------------------------------------------------------------

/// Position in the dataset → file → columns → plotted selection chain.
///
/// Transitions consume the old state and return the new one; every transition
/// clears whatever sits downstream of the changed level, so a stale file,
/// column set or chart can never survive an upstream change. `dataset` is
/// `None` on flat backends, which skip the dataset level entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Nothing chosen yet (categorized backends start here).
    Empty,
    Dataset {
        dataset: Option<String>,
    },
    File {
        dataset: Option<String>,
        file: String,
    },
    Columns {
        dataset: Option<String>,
        file: String,
        /// Insertion order is preserved; it drives colours and bundle order.
        columns: Vec<String>,
    },
    Plotted {
        dataset: Option<String>,
        file: String,
        columns: Vec<String>,
        bundle: ChartBundle,
    },
}

impl Selection {
    /// Initial state. Flat backends have no dataset level to choose.
    pub fn start(flat: bool) -> Self {
        if flat {
            Selection::Dataset { dataset: None }
        } else {
            Selection::Empty
        }
    }

    pub fn choose_dataset(self, dataset: String) -> Self {
        Selection::Dataset {
            dataset: Some(dataset),
        }
    }

    pub fn choose_file(self, file: String) -> Self {
        Selection::File {
            dataset: self.dataset().map(str::to_string),
            file,
        }
    }

    /// Add the column if absent, remove it if present. Removing the last
    /// column falls back to the file stage.
    pub fn toggle_column(self, column: String) -> Self {
        let (dataset, file, mut columns) = match self {
            Selection::File { dataset, file } => (dataset, file, Vec::new()),
            Selection::Columns {
                dataset,
                file,
                columns,
            }
            | Selection::Plotted {
                dataset,
                file,
                columns,
                ..
            } => (dataset, file, columns),
            other => return other,
        };

        match columns.iter().position(|c| *c == column) {
            Some(i) => {
                columns.remove(i);
            }
            None => columns.push(column),
        }

        if columns.is_empty() {
            Selection::File { dataset, file }
        } else {
            Selection::Columns {
                dataset,
                file,
                columns,
            }
        }
    }

    /// Attach an assembled bundle. Only meaningful once columns are chosen;
    /// replotting replaces the previous bundle.
    pub fn with_bundle(self, bundle: ChartBundle) -> Self {
        match self {
            Selection::Columns {
                dataset,
                file,
                columns,
            }
            | Selection::Plotted {
                dataset,
                file,
                columns,
                ..
            } => Selection::Plotted {
                dataset,
                file,
                columns,
                bundle,
            },
            other => other,
        }
    }

    pub fn dataset(&self) -> Option<&str> {
        match self {
            Selection::Empty => None,
            Selection::Dataset { dataset }
            | Selection::File { dataset, .. }
            | Selection::Columns { dataset, .. }
            | Selection::Plotted { dataset, .. } => dataset.as_deref(),
        }
    }

    pub fn file(&self) -> Option<&str> {
        match self {
            Selection::File { file, .. }
            | Selection::Columns { file, .. }
            | Selection::Plotted { file, .. } => Some(file),
            _ => None,
        }
    }

    pub fn columns(&self) -> &[String] {
        match self {
            Selection::Columns { columns, .. } | Selection::Plotted { columns, .. } => columns,
            _ => &[],
        }
    }

    pub fn bundle(&self) -> Option<&ChartBundle> {
        match self {
            Selection::Plotted { bundle, .. } => Some(bundle),
            _ => None,
        }
    }

    /// Whether a plot may be requested from here.
    pub fn can_plot(&self) -> bool {
        !self.columns().is_empty()
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    flat: bool,

    /// Listed dataset categories (empty on flat backends).
    pub data_types: Vec<String>,

    /// Files of the chosen dataset.
    pub files: Vec<String>,

    /// Plottable columns of the chosen file (the timestamp column excluded).
    pub columns: Vec<String>,

    pub selection: Selection,

    /// Bumped on every selection change and plot request. An assembly result
    /// is applied only while its generation is still current, so a slow
    /// response can never overwrite a newer selection.
    generation: u64,

    /// Whether an assembly is in flight for the current generation.
    pub in_flight: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(flat: bool) -> Self {
        AppState {
            flat,
            data_types: Vec::new(),
            files: Vec::new(),
            columns: Vec::new(),
            selection: Selection::start(flat),
            generation: 0,
            in_flight: false,
            status_message: None,
        }
    }

    pub fn flat(&self) -> bool {
        self.flat
    }

    // -- selection transitions --

    pub fn choose_dataset(&mut self, dataset: String) {
        self.transition(|s| s.choose_dataset(dataset));
        self.files.clear();
        self.columns.clear();
    }

    pub fn choose_file(&mut self, file: String) {
        self.transition(|s| s.choose_file(file));
        self.columns.clear();
    }

    pub fn toggle_column(&mut self, column: String) {
        self.transition(|s| s.toggle_column(column));
    }

    /// Start a plot for the current selection. Returns the generation to tag
    /// the assembly with, or `None` when no columns are chosen.
    pub fn begin_plot(&mut self) -> Option<u64> {
        if !self.selection.can_plot() {
            return None;
        }
        self.generation += 1;
        self.in_flight = true;
        self.status_message = None;
        Some(self.generation)
    }

    fn transition(&mut self, f: impl FnOnce(Selection) -> Selection) {
        let old = std::mem::replace(&mut self.selection, Selection::Empty);
        self.selection = f(old);
        // Any change invalidates whatever is still in flight.
        self.generation += 1;
        self.in_flight = false;
        self.status_message = None;
    }

    // -- applying fetch results --

    pub fn apply_data_types(&mut self, result: Result<Vec<String>, ApiError>) {
        match result {
            Ok(types) => {
                log::info!("listed {} dataset types", types.len());
                self.data_types = types;
            }
            Err(e) => self.report(&e),
        }
    }

    pub fn apply_files(&mut self, result: Result<Vec<String>, ApiError>) {
        match result {
            Ok(files) => {
                log::info!("listed {} files", files.len());
                self.files = files;
            }
            Err(e) => self.report(&e),
        }
    }

    pub fn apply_columns(&mut self, result: Result<Vec<String>, ApiError>) {
        match result {
            Ok(columns) => {
                log::info!("listed {} columns", columns.len());
                self.columns = columns
                    .into_iter()
                    .filter(|c| c != TIMESTAMP_COLUMN)
                    .collect();
            }
            Err(e) => self.report(&e),
        }
    }

    /// Apply an assembly result, unless the selection moved on in the
    /// meantime.
    pub fn apply_bundle(&mut self, generation: u64, result: Result<ChartBundle, AssemblyError>) {
        if generation != self.generation {
            log::debug!(
                "discarding stale plot result (generation {generation}, now {})",
                self.generation
            );
            return;
        }
        self.in_flight = false;
        match result {
            Ok(bundle) => {
                log::info!(
                    "assembled {} rows across {} series",
                    bundle.len(),
                    bundle.datasets.len()
                );
                self.transition(|s| s.with_bundle(bundle));
            }
            Err(e) => self.report(&e),
        }
    }

    fn report(&mut self, error: &dyn std::error::Error) {
        log::error!("{error}");
        self.status_message = Some(format!("Error: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ChartDataset;
    use eframe::egui::Color32;

    fn bundle(rows: usize) -> ChartBundle {
        ChartBundle {
            timestamps: (0..rows).map(|i| i as f64).collect(),
            datasets: vec![ChartDataset {
                label: "altitude of flight_001.csv".into(),
                color: Color32::WHITE,
                values: vec![0.0; rows],
            }],
        }
    }

    fn columns_chosen() -> AppState {
        let mut state = AppState::new(false);
        state.choose_dataset("Telemetry".into());
        state.choose_file("flight_001.csv".into());
        state.toggle_column("altitude".into());
        state.toggle_column("speed".into());
        state
    }

    #[test]
    fn selection_walks_the_chain() {
        let mut state = columns_chosen();
        assert_eq!(state.selection.dataset(), Some("Telemetry"));
        assert_eq!(state.selection.file(), Some("flight_001.csv"));
        assert_eq!(state.selection.columns(), ["altitude", "speed"]);
        assert!(state.selection.can_plot());

        let generation = state.begin_plot().expect("plottable");
        state.apply_bundle(generation, Ok(bundle(3)));
        assert!(state.selection.bundle().is_some());
    }

    #[test]
    fn toggle_preserves_insertion_order() {
        let mut state = columns_chosen();
        state.toggle_column("battery".into());
        assert_eq!(state.selection.columns(), ["altitude", "speed", "battery"]);

        state.toggle_column("speed".into());
        assert_eq!(state.selection.columns(), ["altitude", "battery"]);
    }

    #[test]
    fn removing_last_column_returns_to_file_stage() {
        let mut state = AppState::new(false);
        state.choose_dataset("Telemetry".into());
        state.choose_file("flight_001.csv".into());
        state.toggle_column("altitude".into());
        state.toggle_column("altitude".into());

        assert!(matches!(state.selection, Selection::File { .. }));
        assert!(!state.selection.can_plot());
    }

    #[test]
    fn choosing_file_clears_columns_and_bundle() {
        let mut state = columns_chosen();
        let generation = state.begin_plot().expect("plottable");
        state.apply_bundle(generation, Ok(bundle(3)));

        state.choose_file("flight_002.csv".into());
        assert!(state.selection.columns().is_empty());
        assert!(state.selection.bundle().is_none());
        assert_eq!(state.selection.dataset(), Some("Telemetry"));
    }

    #[test]
    fn choosing_dataset_clears_everything_downstream() {
        let mut state = columns_chosen();
        state.choose_dataset("FPGA".into());
        assert_eq!(state.selection.file(), None);
        assert!(state.selection.columns().is_empty());
        assert!(state.files.is_empty());
        assert!(state.columns.is_empty());
    }

    #[test]
    fn stale_bundle_is_discarded() {
        let mut state = columns_chosen();
        let generation = state.begin_plot().expect("plottable");

        // Selection moves on while the assembly is in flight.
        state.choose_file("flight_002.csv".into());
        state.apply_bundle(generation, Ok(bundle(3)));

        assert!(state.selection.bundle().is_none());
        assert!(!state.in_flight);
    }

    #[test]
    fn replot_replaces_the_previous_bundle() {
        let mut state = columns_chosen();
        let generation = state.begin_plot().expect("plottable");
        state.apply_bundle(generation, Ok(bundle(3)));

        let generation = state.begin_plot().expect("still plottable");
        state.apply_bundle(generation, Ok(bundle(5)));
        assert_eq!(state.selection.bundle().expect("plotted").len(), 5);
    }

    #[test]
    fn failed_assembly_keeps_prior_state_and_reports() {
        let mut state = columns_chosen();
        let generation = state.begin_plot().expect("plottable");
        state.apply_bundle(generation, Err(AssemblyError::NoColumns));

        assert!(state.selection.bundle().is_none());
        assert_eq!(state.selection.columns(), ["altitude", "speed"]);
        assert!(state.status_message.is_some());
        assert!(!state.in_flight);
    }

    #[test]
    fn flat_mode_skips_the_dataset_stage() {
        let mut state = AppState::new(true);
        assert!(matches!(state.selection, Selection::Dataset { dataset: None }));

        state.choose_file("run_7.csv".into());
        state.toggle_column("altitude".into());
        assert!(state.selection.can_plot());
        assert_eq!(state.selection.dataset(), None);
    }

    #[test]
    fn timestamp_column_is_never_plottable() {
        let mut state = columns_chosen();
        state.apply_columns(Ok(vec![
            TIMESTAMP_COLUMN.into(),
            "altitude".into(),
            "speed".into(),
        ]));
        assert_eq!(state.columns, ["altitude", "speed"]);
    }
}
