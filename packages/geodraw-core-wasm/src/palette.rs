// Style metadata for area/line shapes.

use std::fmt;

use serde::{Serialize, Serializer};
use uuid::Uuid;

const SATURATION: u8 = 70;
const LIGHTNESS: u8 = 70;

/// A pastel display color, `hsl(H 70% 70% / 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PastelColor {
    hue: u16,
}

impl PastelColor {
    pub fn from_hue(hue: u16) -> Self {
        PastelColor { hue: hue % 360 }
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }
}

impl fmt::Display for PastelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({} {}% {}% / 1)", self.hue, SATURATION, LIGHTNESS)
    }
}

impl Serialize for PastelColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Per-shape style record kept in the metadata table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShapeStyle {
    pub color: PastelColor,
}

/// Stroke applied to a freshly created area/line layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrokeStyle {
    pub color: PastelColor,
    pub weight: u32,
    pub opacity: f64,
}

impl From<ShapeStyle> for StrokeStyle {
    fn from(style: ShapeStyle) -> Self {
        StrokeStyle { color: style.color, weight: 3, opacity: 0.9 }
    }
}

/// Source of colors for newly created shapes.
pub trait Palette {
    fn next_color(&mut self) -> PastelColor;
}

/// Draws an independent random hue for every shape.
#[derive(Debug, Default)]
pub struct RandomPastel;

impl Palette for RandomPastel {
    fn next_color(&mut self) -> PastelColor {
        // v4 uuids are backed by the platform RNG (crypto.getRandomValues in the browser)
        let bits = Uuid::new_v4().as_u128();
        PastelColor::from_hue((bits % 360) as u16)
    }
}

/// Cycles through a fixed list of hues. Handy for reproducible sessions and tests.
#[derive(Debug, Clone)]
pub struct FixedHues {
    hues: Vec<u16>,
    next: usize,
}

impl FixedHues {
    pub fn new(hues: Vec<u16>) -> Self {
        FixedHues { hues, next: 0 }
    }
}

impl Palette for FixedHues {
    fn next_color(&mut self) -> PastelColor {
        if self.hues.is_empty() {
            return PastelColor::from_hue(0);
        }
        let hue = self.hues[self.next % self.hues.len()];
        self.next += 1;
        PastelColor::from_hue(hue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_renders_as_css_hsl() {
        assert_eq!(PastelColor::from_hue(200).to_string(), "hsl(200 70% 70% / 1)");
        assert_eq!(PastelColor::from_hue(365).hue(), 5);
    }

    #[test]
    fn random_hues_stay_in_range() {
        let mut palette = RandomPastel;
        for _ in 0..256 {
            assert!(palette.next_color().hue() < 360);
        }
    }

    #[test]
    fn fixed_hues_cycle() {
        let mut palette = FixedHues::new(vec![10, 20]);
        let hues: Vec<u16> = (0..3).map(|_| palette.next_color().hue()).collect();
        assert_eq!(hues, vec![10, 20, 10]);
    }

    #[test]
    fn stroke_uses_fixed_weight_and_opacity() {
        let stroke = StrokeStyle::from(ShapeStyle { color: PastelColor::from_hue(90) });
        assert_eq!(stroke.weight, 3);
        assert_eq!(stroke.opacity, 0.9);
        assert_eq!(
            serde_json::to_value(stroke).unwrap(),
            serde_json::json!({ "color": "hsl(90 70% 70% / 1)", "weight": 3, "opacity": 0.9 })
        );
    }
}
