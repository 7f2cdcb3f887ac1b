use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Diverging blue → grey → red scale for a correlation in `-1..=1`.
/// NaN maps to dark grey.
pub fn correlation_color(value: f64) -> Color32 {
    if !value.is_finite() {
        return Color32::DARK_GRAY;
    }
    let v = value.clamp(-1.0, 1.0) as f32;
    let hue: f32 = if v < 0.0 { 220.0 } else { 5.0 };
    hsl_to_color32(Hsl::new(hue, 0.8 * v.abs(), 0.5))
}

// ---------------------------------------------------------------------------
// Color mapping: location → Color32
// ---------------------------------------------------------------------------

/// Assigns each country a stable, distinct colour.
#[derive(Debug, Clone)]
pub struct CountryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CountryColors {
    pub fn new<'a>(locations: impl IntoIterator<Item = &'a String>) -> Self {
        let locations: Vec<&String> = locations.into_iter().collect();
        let palette = generate_palette(locations.len());
        let mapping = locations
            .into_iter()
            .zip(palette)
            .map(|(l, c)| (l.clone(), c))
            .collect();

        CountryColors {
            mapping,
            default_color: Color32::LIGHT_BLUE,
        }
    }

    pub fn color_for(&self, location: &str) -> Color32 {
        self.mapping
            .get(location)
            .copied()
            .unwrap_or(self.default_color)
    }
}
