use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Series palette
// ---------------------------------------------------------------------------

/// Hue step between consecutive series, in degrees (golden angle).
const HUE_STEP: f32 = 137.508;

/// Deterministic colour for the series at `index` in the selection order.
/// Golden-angle hue stepping keeps consecutive indices far apart in hue.
pub fn series_color(index: usize) -> Color32 {
    let hue = (index as f32 * HUE_STEP) % 360.0;
    let hsl = Hsl::new(hue, 0.75, 0.55);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}
