//! Color utilities for tile rendering.

use serde::{Deserialize, Serialize};

/// RGB color with u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string (with or without #).
    /// Returns None if the format is invalid.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Convert to CSS hex string (#RRGGBB).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Lighten the color by blending with white.
    /// Factor of 0.0 = no change, 1.0 = pure white.
    pub fn lighten(self, factor: f64) -> Self {
        Self {
            r: Self::blend_component(self.r, 255, factor),
            g: Self::blend_component(self.g, 255, factor),
            b: Self::blend_component(self.b, 255, factor),
        }
    }

    /// Blend a single color component toward a target.
    /// The cast is safe because we clamp to [0, 255] before converting.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn blend_component(from: u8, to: u8, factor: f64) -> u8 {
        let factor = factor.clamp(0.0, 1.0);
        let blended = f64::from(from) + (f64::from(to) - f64::from(from)) * factor;
        blended.round().clamp(0.0, 255.0) as u8
    }
}

/// Default colors for tile content.
pub mod palette {
    use super::Rgb;

    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    /// Grid line color (light gray)
    pub const GRID_LINE: Rgb = Rgb::new(0xE0, 0xE0, 0xE0);

    /// Placeholder block for non-empty cells when text is not drawn
    pub const CONTENT_BLOCK: Rgb = Rgb::new(0xBD, 0xC1, 0xC6);
}
