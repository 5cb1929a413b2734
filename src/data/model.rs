use chrono::{DateTime, NaiveDateTime};
use eframe::egui::Color32;
use serde_json::Value as JsonValue;

/// Column name reserved for the shared time axis. The backend lists it like
/// any other column, but it is never offered as plottable.
pub const TIMESTAMP_COLUMN: &str = "timestamp_";

/// Stroke width shared by every plotted series.
pub const LINE_WIDTH: f32 = 2.0;

// ---------------------------------------------------------------------------
// ChartDataset – one plottable series plus display metadata
// ---------------------------------------------------------------------------

/// One column's values across all rows of a file, ready to draw.
///
/// `values` is aligned by row index with the owning bundle's timestamps.
/// Lines are drawn solid with no area fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDataset {
    /// Legend label, `"<column> of <file>"`.
    pub label: String,
    /// Stroke colour, fixed by selection order.
    pub color: Color32,
    pub values: Vec<f64>,
}

// ---------------------------------------------------------------------------
// ChartBundle – the assembled, render-ready structure
// ---------------------------------------------------------------------------

/// The shared timestamp sequence plus the selected series, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBundle {
    /// Epoch seconds, one per row.
    pub timestamps: Vec<f64>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartBundle {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Whether the bundle holds no rows.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Value coercion – backend JSON → f64
// ---------------------------------------------------------------------------

/// Interpret one data-column cell as an `f64`.
///
/// The backend serves CSV cells verbatim, so numbers may arrive as JSON
/// numbers or numeric strings; `null` (a missing cell) becomes NaN so the row
/// alignment is preserved.
pub fn coerce_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        JsonValue::Null => Some(f64::NAN),
        _ => None,
    }
}

/// Interpret one timestamp cell as epoch seconds.
///
/// Accepts epoch numbers as-is, plus RFC 3339 and the Pandas default
/// `YYYY-MM-DD HH:MM:SS[.fff]` text forms (naive times are taken as UTC).
pub fn coerce_timestamp(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => {
            let s = s.trim();
            if let Ok(f) = s.parse::<f64>() {
                return Some(f);
            }
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(epoch_seconds(dt.timestamp(), dt.timestamp_subsec_micros()));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
                let dt = naive.and_utc();
                return Some(epoch_seconds(dt.timestamp(), dt.timestamp_subsec_micros()));
            }
            None
        }
        _ => None,
    }
}

fn epoch_seconds(secs: i64, subsec_micros: u32) -> f64 {
    secs as f64 + subsec_micros as f64 / 1e6
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerce_number_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_number(&json!(3.5)), Some(3.5));
        assert_eq!(coerce_number(&json!("42")), Some(42.0));
        assert_eq!(coerce_number(&json!(" -1.25 ")), Some(-1.25));
        assert!(coerce_number(&json!(null)).unwrap().is_nan());
        assert_eq!(coerce_number(&json!("altitude")), None);
        assert_eq!(coerce_number(&json!([1, 2])), None);
    }

    #[test]
    fn coerce_timestamp_accepts_epoch_and_date_strings() {
        assert_eq!(coerce_timestamp(&json!(1700000000)), Some(1.7e9));
        assert_eq!(
            coerce_timestamp(&json!("1700000000.5")),
            Some(1_700_000_000.5)
        );
        assert_eq!(coerce_timestamp(&json!("1970-01-01T00:01:00Z")), Some(60.0));
        assert_eq!(
            coerce_timestamp(&json!("1970-01-01 00:01:00.500")),
            Some(60.5)
        );
        assert_eq!(coerce_timestamp(&json!("not a time")), None);
    }

    #[test]
    fn bundle_len_counts_rows() {
        let bundle = ChartBundle {
            timestamps: vec![1.0, 2.0, 3.0],
            datasets: Vec::new(),
        };
        assert_eq!(bundle.len(), 3);
        assert!(!bundle.is_empty());
    }
}
