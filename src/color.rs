use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Bars for a gain.
pub const PROFIT_COLOR: Color32 = Color32::from_rgb(0x2c, 0xa0, 0x2c);
/// Bars for a loss.
pub const LOSS_COLOR: Color32 = Color32::from_rgb(0xd6, 0x27, 0x28);

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.5);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

/// Green for non-negative values, red for losses.
pub fn sign_color(value: f64) -> Color32 {
    if value < 0.0 {
        LOSS_COLOR
    } else {
        PROFIT_COLOR
    }
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the values of a categorical field to distinct colours.
#[derive(Debug, Clone, Default)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
}

impl ColorMap {
    /// Build a colour map from the field's observed values.
    pub fn new<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let values: Vec<&String> = values.into_iter().collect();
        let mapping = values
            .iter()
            .zip(generate_palette(values.len()))
            .map(|(v, c)| ((*v).clone(), c))
            .collect();
        ColorMap { mapping }
    }

    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(Color32::GRAY)
    }
}
