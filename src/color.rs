use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::chart::{ChartSpec, ColorValue};
use crate::data::model::League;

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
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Continuous scale
// ---------------------------------------------------------------------------

/// Plasma-like stops, dark blue → yellow.
const PLASMA: [(u8, u8, u8); 6] = [
    (13, 8, 135),
    (106, 0, 168),
    (177, 42, 144),
    (225, 100, 98),
    (252, 166, 54),
    (240, 249, 33),
];

/// Colour at `t ∈ [0, 1]` along the plasma stops, mixed in linear RGB.
pub fn plasma(t: f64) -> Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t as f32 * (PLASMA.len() - 1) as f32;
    let lo = (scaled.floor() as usize).min(PLASMA.len() - 2);
    let frac = scaled - lo as f32;

    let stop = |(r, g, b): (u8, u8, u8)| -> LinSrgb {
        Srgb::new(r, g, b).into_format::<f32>().into_linear()
    };
    let mixed = stop(PLASMA[lo]).mix(stop(PLASMA[lo + 1]), frac);
    let rgb: Srgb<u8> = Srgb::<f32>::from_linear(mixed).into_format::<u8>();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: chart colour value → Color32
// ---------------------------------------------------------------------------

/// Maps the colour values of one chart to concrete colours.
#[derive(Debug, Clone)]
pub enum ColorMap {
    Continuous { min: f64, max: f64 },
    Categorical(BTreeMap<String, Color32>),
}

pub const UNKNOWN_COLOR: Color32 = Color32::GRAY;

impl ColorMap {
    /// Numeric values span their observed range; categories get one hue each,
    /// with the known leagues always in the same order.
    pub fn for_chart(spec: &ChartSpec) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut categories = BTreeSet::new();
        for p in &spec.points {
            match &p.color {
                ColorValue::Numeric(v) => {
                    min = min.min(*v);
                    max = max.max(*v);
                }
                ColorValue::Category(c) => {
                    categories.insert(c.clone());
                }
            }
        }

        if spec.color.column(spec.bet).is_some() {
            if min > max {
                min = 0.0;
                max = 0.0;
            }
            return ColorMap::Continuous { min, max };
        }

        let known = League::ALL.map(|l| l.tag().to_string());
        let palette = generate_palette(known.len());
        let mut mapping: BTreeMap<String, Color32> = known.into_iter().zip(palette).collect();
        for c in categories {
            mapping.entry(c).or_insert(UNKNOWN_COLOR);
        }
        ColorMap::Categorical(mapping)
    }

    pub fn color_for(&self, value: &ColorValue) -> Color32 {
        match (self, value) {
            (ColorMap::Continuous { min, max }, ColorValue::Numeric(v)) => {
                let range = max - min;
                if range.abs() < f64::EPSILON {
                    plasma(0.5)
                } else {
                    plasma((v - min) / range)
                }
            }
            (ColorMap::Categorical(mapping), ColorValue::Category(c)) => {
                mapping.get(c).copied().unwrap_or(UNKNOWN_COLOR)
            }
            _ => UNKNOWN_COLOR,
        }
    }

    /// Legend entries (label → colour) for the UI.
    pub fn legend_entries(&self, steps: usize) -> Vec<(String, Color32)> {
        match self {
            ColorMap::Continuous { min, max } => {
                let steps = steps.max(2);
                (0..steps)
                    .map(|i| {
                        let t = i as f64 / (steps - 1) as f64;
                        let v = min + t * (max - min);
                        (format!("{v:.2}"), plasma(t))
                    })
                    .collect()
            }
            ColorMap::Categorical(mapping) => {
                mapping.iter().map(|(k, c)| (k.clone(), *c)).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{ChartKind, ChartPoint, ColorDimension};
    use crate::data::model::{BetType, Column};

    fn spec(color: ColorDimension, values: Vec<ColorValue>) -> ChartSpec {
        ChartSpec {
            kind: ChartKind::Scatter2d,
            title: "test".to_string(),
            bet: BetType::GolNogol,
            axes: vec![Column::OddsGol, Column::OddsNogol],
            color,
            color_label: color.label(BetType::GolNogol),
            text_binding: None,
            points: values
                .into_iter()
                .map(|color| ChartPoint {
                    coords: vec![1.8, 1.9],
                    color,
                    hover: "A-B".to_string(),
                    text: None,
                })
                .collect(),
        }
    }

    #[test]
    fn plasma_endpoints_match_stops() {
        assert_eq!(plasma(0.0), Color32::from_rgb(13, 8, 135));
        assert_eq!(plasma(1.0), Color32::from_rgb(240, 249, 33));
        assert_eq!(plasma(-3.0), plasma(0.0));
        assert_eq!(plasma(f64::NAN), plasma(0.0));
    }

    #[test]
    fn continuous_map_spans_observed_range() {
        let s = spec(
            ColorDimension::VigGng,
            vec![ColorValue::Numeric(4.0), ColorValue::Numeric(8.0)],
        );
        let map = ColorMap::for_chart(&s);
        assert!(matches!(map, ColorMap::Continuous { min, max } if min == 4.0 && max == 8.0));
        assert_eq!(map.color_for(&ColorValue::Numeric(4.0)), plasma(0.0));
        assert_eq!(map.color_for(&ColorValue::Numeric(8.0)), plasma(1.0));
        assert_eq!(map.legend_entries(3)[1].0, "6.00");
    }

    #[test]
    fn categorical_map_keeps_league_colours_stable() {
        let a = ColorMap::for_chart(&spec(
            ColorDimension::League,
            vec![ColorValue::Category("LIGA".into())],
        ));
        let b = ColorMap::for_chart(&spec(
            ColorDimension::League,
            vec![
                ColorValue::Category("SERIE_A".into()),
                ColorValue::Category("LIGA".into()),
                ColorValue::Category("SERIE_B".into()),
            ],
        ));
        let liga = ColorValue::Category("LIGA".into());
        assert_eq!(a.color_for(&liga), b.color_for(&liga));
        assert_eq!(b.color_for(&ColorValue::Category("SERIE_B".into())), UNKNOWN_COLOR);
        assert_eq!(b.legend_entries(0).len(), 8);
    }

    #[test]
    fn palette_has_requested_size() {
        assert!(generate_palette(0).is_empty());
        assert_eq!(generate_palette(7).len(), 7);
    }
}
