use std::fmt;
use std::str::FromStr;

/// Opaque sRGB color with channels in `[0, 1]`.
///
/// Material colors are authored in sRGB (hex literals, debug color pickers) and
/// converted to linear only when handed to the GPU.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };

    #[inline]
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
        }
    }

    /// `0xRRGGBB`. Bits above 24 are ignored.
    #[inline]
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as u8;
        let g = ((hex >> 8) & 0xff) as u8;
        let b = (hex & 0xff) as u8;
        Self::from_srgb_u8(r, g, b)
    }

    #[inline]
    pub fn from_srgb_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn to_hex(self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }

    /// Linear-light RGB, for upload into linear shader math.
    pub fn to_linear(self) -> [f32; 3] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
        ]
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite()
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// Failure to parse a color literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color literal {0:?} (expected #rrggbb or 0xrrggbb)")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#rrggbb`, `0xrrggbb` and `#rgb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| ColorParseError(s.to_string()))?;

        let expanded: String = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            _ => return Err(ColorParseError(s.to_string())),
        };

        let hex = u32::from_str_radix(&expanded, 16).map_err(|_| ColorParseError(s.to_string()))?;
        Ok(Self::from_hex(hex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip_keeps_bytes() {
        let c = Color::from_hex(0xff0000);
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(Color::from_hex(0x12abef).to_hex(), 0x12abef);
    }

    #[test]
    fn parses_css_and_hex_literals() {
        assert_eq!("#ff0000".parse::<Color>().unwrap().to_hex(), 0xff0000);
        assert_eq!("0x00ff00".parse::<Color>().unwrap().to_hex(), 0x00ff00);
        assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
    }

    #[test]
    fn linear_conversion_is_monotonic_and_fixed_at_ends() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let w = Color::WHITE.to_linear();
        assert!((w[0] - 1.0).abs() < 1e-6);
        let mid = Color::rgb(0.5, 0.5, 0.5).to_linear()[0];
        assert!(mid > 0.2 && mid < 0.25);
    }

    #[test]
    fn display_is_css_hex() {
        assert_eq!(Color::from_hex(0x607d8b).to_string(), "#607d8b");
    }
}
