use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

/// Maps each job to a stable colour, so a job keeps its colour across the
/// histogram and the legend while filters change.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl CategoryColors {
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a String>) -> Self {
        let categories: Vec<&String> = categories.into_iter().collect();
        let palette = generate_palette(categories.len());
        let mapping = categories
            .into_iter()
            .zip(palette)
            .map(|(c, color)| (c.clone(), color))
            .collect();
        CategoryColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Sequential colour scales
// ---------------------------------------------------------------------------

/// Perceptual sequential scales, sampled at five stops and interpolated in
/// linear RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    Viridis,
    Plasma,
    Cividis,
}

impl ColorScale {
    fn stops(self) -> [(u8, u8, u8); 5] {
        match self {
            ColorScale::Viridis => [
                (68, 1, 84),
                (59, 82, 139),
                (33, 145, 140),
                (94, 201, 98),
                (253, 231, 37),
            ],
            ColorScale::Plasma => [
                (13, 8, 135),
                (126, 3, 168),
                (204, 71, 120),
                (248, 149, 64),
                (240, 249, 33),
            ],
            ColorScale::Cividis => [
                (0, 34, 78),
                (64, 77, 107),
                (124, 123, 120),
                (188, 175, 111),
                (255, 234, 70),
            ],
        }
    }

    /// Colour at `t` in `[0, 1]`; values outside are clamped, `NaN` is grey.
    pub fn sample(self, t: f64) -> Color32 {
        if t.is_nan() {
            return Color32::GRAY;
        }
        let stops = self.stops();
        let scaled = t.clamp(0.0, 1.0) as f32 * (stops.len() - 1) as f32;
        let lower = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - lower as f32;

        let a = linear(stops[lower]);
        let b = linear(stops[lower + 1]);
        to_color32(Srgb::from_linear(a.mix(b, frac)))
    }

    /// Colour for `value` within `[min, max]`.
    pub fn sample_range(self, value: f64, min: f64, max: f64) -> Color32 {
        if max > min {
            self.sample((value - min) / (max - min))
        } else {
            self.sample(1.0)
        }
    }

    /// `n` evenly spaced colours along the scale.
    pub fn discrete(self, n: usize) -> Vec<Color32> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.0)],
            _ => (0..n)
                .map(|i| self.sample(i as f64 / (n - 1) as f64))
                .collect(),
        }
    }
}

fn linear((r, g, b): (u8, u8, u8)) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

/// Black or white, whichever reads better on `background`.
pub fn contrasting_text(background: Color32) -> Color32 {
    let luma = 0.299 * background.r() as f32
        + 0.587 * background.g() as f32
        + 0.114 * background.b() as f32;
    if luma > 140.0 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}
