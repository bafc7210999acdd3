use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Verdict colours
// ---------------------------------------------------------------------------

const NOT_POTABLE_HUE: f32 = 0.0;
const POTABLE_HUE: f32 = 120.0;

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

/// Colour of the verdict headline.
pub fn verdict_color(is_potable: bool) -> Color32 {
    let hue = if is_potable { POTABLE_HUE } else { NOT_POTABLE_HUE };
    hsl_to_color32(hue, 0.75, 0.45)
}

/// Blend from red at 0 % to green at 100 % through the hue circle.
pub fn confidence_color(percent: f64) -> Color32 {
    let t = (percent / 100.0).clamp(0.0, 1.0) as f32;
    let hue = NOT_POTABLE_HUE + t * (POTABLE_HUE - NOT_POTABLE_HUE);
    hsl_to_color32(hue, 0.75, 0.5)
}

/// Bar colour in the scaled-feature chart: warm above the training mean,
/// cool below.
pub fn deviation_color(scaled: f64) -> Color32 {
    if scaled >= 0.0 {
        hsl_to_color32(30.0, 0.8, 0.55)
    } else {
        hsl_to_color32(210.0, 0.7, 0.55)
    }
}
