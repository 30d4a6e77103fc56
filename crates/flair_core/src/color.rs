//! Colors and gradients
//!
//! Colors are stored as straight (non-premultiplied) RGBA floats in `0.0..=1.0`.
//! In configuration files they are written as `#rrggbb` or `#rrggbbaa`.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::geometry::Point;

/// Error returned when a hex color string cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid hex color `{0}` (expected #rgb, #rrggbb or #rrggbbaa)")]
pub struct ParseColorError(pub String);

/// RGBA color
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn parse_hex(input: &str) -> Result<Self, ParseColorError> {
        let err = || ParseColorError(input.to_string());
        let digits = input.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map(|v| v as f32 / 255.0);
        match digits.len() {
            3 => {
                let mut out = [0.0f32; 3];
                for (i, c) in digits.chars().enumerate() {
                    let pair: String = [c, c].iter().collect();
                    out[i] = channel(&pair).map_err(|_| err())?;
                }
                Ok(Color::rgb(out[0], out[1], out[2]))
            }
            6 | 8 => {
                let r = channel(&digits[0..2]).map_err(|_| err())?;
                let g = channel(&digits[2..4]).map_err(|_| err())?;
                let b = channel(&digits[4..6]).map_err(|_| err())?;
                let a = if digits.len() == 8 {
                    channel(&digits[6..8]).map_err(|_| err())?
                } else {
                    1.0
                };
                Ok(Color::rgba(r, g, b, a))
            }
            _ => Err(err()),
        }
    }

    /// Format as `#rrggbbaa`
    pub fn to_hex_string(&self) -> String {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            q(self.r),
            q(self.g),
            q(self.b),
            q(self.a)
        )
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha;
        self
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Bit pattern of the four channels, used for stable config hashing
    pub fn to_bits(&self) -> [u32; 4] {
        [
            self.r.to_bits(),
            self.g.to_bits(),
            self.b.to_bits(),
            self.a.to_bits(),
        ]
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::parse_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex_string()
    }
}

/// Gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    /// Position along the gradient (0.0 to 1.0)
    pub offset: f32,
    /// Color at this stop
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self {
            offset: offset.clamp(0.0, 1.0),
            color,
        }
    }
}

/// Color stops, inline for the common two-to-four stop case
pub type GradientStops = SmallVec<[GradientStop; 4]>;

/// Gradient description handed to the host renderer
#[derive(Clone, Debug, PartialEq)]
pub enum Gradient {
    /// Linear gradient between two points
    Linear {
        start: Point,
        end: Point,
        stops: GradientStops,
    },
    /// Radial gradient from center outward
    Radial {
        center: Point,
        radius: f32,
        stops: GradientStops,
    },
    /// Conic gradient around a center point, angles in degrees
    Conic {
        center: Point,
        start_angle: f32,
        stops: GradientStops,
    },
}

impl Gradient {
    /// Create a simple linear gradient with two colors
    pub fn linear(start: Point, end: Point, from: Color, to: Color) -> Self {
        Gradient::Linear {
            start,
            end,
            stops: smallvec::smallvec![GradientStop::new(0.0, from), GradientStop::new(1.0, to)],
        }
    }

    /// Radial gradient fading from `color` at the center to transparent at `radius`
    pub fn radial_fade(center: Point, radius: f32, color: Color) -> Self {
        Gradient::Radial {
            center,
            radius,
            stops: smallvec::smallvec![
                GradientStop::new(0.0, color),
                GradientStop::new(1.0, color.with_alpha(0.0)),
            ],
        }
    }

    /// Linear gradient whose stops are spread evenly over `palette`
    pub fn linear_palette(start: Point, end: Point, palette: &[Color]) -> Self {
        Gradient::Linear {
            start,
            end,
            stops: evenly_spaced(palette),
        }
    }

    /// Conic gradient whose stops are spread evenly over `palette`
    pub fn conic_palette(center: Point, start_angle: f32, palette: &[Color]) -> Self {
        Gradient::Conic {
            center,
            start_angle,
            stops: evenly_spaced(palette),
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        match self {
            Gradient::Linear { stops, .. }
            | Gradient::Radial { stops, .. }
            | Gradient::Conic { stops, .. } => stops,
        }
    }
}

fn evenly_spaced(palette: &[Color]) -> GradientStops {
    match palette.len() {
        0 => GradientStops::new(),
        1 => smallvec::smallvec![GradientStop::new(0.0, palette[0])],
        n => palette
            .iter()
            .enumerate()
            .map(|(i, c)| GradientStop::new(i as f32 / (n - 1) as f32, *c))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(Color::parse_hex("#ffffff").unwrap(), Color::WHITE);
        assert_eq!(Color::parse_hex("000").unwrap(), Color::BLACK);

        let c = Color::parse_hex("#ff000080").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(Color::parse_hex("#12345").is_err());
        assert!(Color::parse_hex("#gg0000").is_err());
        assert!(Color::parse_hex("").is_err());
    }

    #[test]
    fn test_hex_string_round_trip() {
        let c = Color::parse_hex("#3b82f6").unwrap();
        assert_eq!(c.to_hex_string(), "#3b82f6ff");
    }

    #[test]
    fn test_palette_stops_are_even() {
        let g = Gradient::linear_palette(
            Point::ZERO,
            Point::new(1.0, 0.0),
            &[Color::BLACK, Color::WHITE, Color::BLACK],
        );
        let offsets: Vec<f32> = g.stops().iter().map(|s| s.offset).collect();
        assert_eq!(offsets, vec![0.0, 0.5, 1.0]);
    }
}
