use futures::future::try_join_all;
use thiserror::Error;

use super::client::{ApiClient, ApiError};
use super::model::{ChartBundle, ChartDataset};
use crate::color::series_color;

// ---------------------------------------------------------------------------
// Series assembler
// ---------------------------------------------------------------------------

/// Failure of one plot assembly.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("no columns selected")]
    NoColumns,

    #[error(transparent)]
    Api(#[from] ApiError),

    /// Series from the same file must all have the file's row count.
    #[error("column '{column}' has {got} rows, timestamps have {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
}

/// Fetch the timestamp sequence plus every selected column and assemble the
/// render-ready bundle.
///
/// All N+1 retrievals are issued concurrently. The first failure fails the
/// whole assembly and the remaining results are discarded by the join; there
/// is no partial bundle and no retry. Datasets come back in the order the
/// columns were given, which also fixes their colours.
pub async fn assemble(
    client: &ApiClient,
    dataset: Option<&str>,
    file: &str,
    columns: &[String],
) -> Result<ChartBundle, AssemblyError> {
    if columns.is_empty() {
        return Err(AssemblyError::NoColumns);
    }

    let series = try_join_all(
        columns
            .iter()
            .map(|column| client.column_values(dataset, file, column)),
    );
    let (timestamps, series) = tokio::try_join!(client.timestamps(dataset, file), series)?;

    let datasets = columns
        .iter()
        .zip(series)
        .enumerate()
        .map(|(index, (column, values))| {
            if values.len() != timestamps.len() {
                return Err(AssemblyError::LengthMismatch {
                    column: column.clone(),
                    expected: timestamps.len(),
                    got: values.len(),
                });
            }
            Ok(ChartDataset {
                label: format!("{column} of {file}"),
                color: series_color(index),
                values,
            })
        })
        .collect::<Result<Vec<_>, AssemblyError>>()?;

    Ok(ChartBundle {
        timestamps,
        datasets,
    })
}
