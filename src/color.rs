use palette::{FromColor, Hsl, Hsv, IntoColor, Srgb};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of swatches in a generated palette.
pub const PALETTE_SIZE: usize = 8;

/// Mix factors toward white for the light half of a palette, lightest first.
const TINTS: [f32; 4] = [0.8, 0.6, 0.4, 0.2];
/// Brightness factors for the dark half, darkest first.
const SHADES: [f32; 3] = [0.4, 0.6, 0.8];

/// Output notation of a color, used for the favorite type and the input mode.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ColorType {
    #[default]
    Rgb,
    Hex,
    Hsv,
    Hsl,
    Cmyk,
}

impl ColorType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Hex => "HEX",
            Self::Hsv => "HSV",
            Self::Hsl => "HSL",
            Self::Cmyk => "CMYK",
        }
    }

    pub fn all() -> &'static [ColorType] {
        &[Self::Rgb, Self::Hex, Self::Hsv, Self::Hsl, Self::Cmyk]
    }

    /// Position in [`ColorType::all`], which is also the combo box index in the UI.
    pub fn index(self) -> usize {
        Self::all().iter().position(|t| *t == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Self {
        Self::all().get(index).copied().unwrap_or_default()
    }
}

impl std::fmt::Display for ColorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An 8-bit sRGB color.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self::new(rng.gen(), rng.gen(), rng.gen())
    }

    pub fn triple(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    fn to_srgb(self) -> Srgb {
        Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        )
    }

    fn from_srgb(rgb: Srgb) -> Self {
        Self::new(
            (rgb.red * 255.0).round().clamp(0.0, 255.0) as u8,
            (rgb.green * 255.0).round().clamp(0.0, 255.0) as u8,
            (rgb.blue * 255.0).round().clamp(0.0, 255.0) as u8,
        )
    }

    /// Mixes the color toward white by `amount` (0 keeps it, 1 gives white).
    pub fn tint(self, amount: f32) -> Self {
        let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round().min(255.0) as u8;
        Self::new(mix(self.r), mix(self.g), mix(self.b))
    }

    /// Scales every channel by `factor`.
    pub fn shade(self, factor: f32) -> Self {
        let scale = |c: u8| (c as f32 * factor).round().clamp(0.0, 255.0) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(value: [u8; 3]) -> Self {
        Self::new(value[0], value[1], value[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(value: Rgb) -> Self {
        value.triple()
    }
}

pub fn format_rgb(color: Rgb, separator: &str) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        color.r,
        color.g,
        color.b,
        sep = separator
    )
}

/// `#`-prefixed hexadecimal notation.
pub fn format_hex(color: Rgb, uppercase: bool) -> String {
    if uppercase {
        format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
    } else {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    }
}

fn degrees(hue: f32) -> u16 {
    hue.round() as u16 % 360
}

fn percent(value: f32) -> u16 {
    (value * 100.0).round() as u16
}

pub fn format_hsv(color: Rgb) -> String {
    let hsv: Hsv = Hsv::from_color(color.to_srgb());
    format!(
        "hsv({}, {}%, {}%)",
        degrees(hsv.hue.into_positive_degrees()),
        percent(hsv.saturation),
        percent(hsv.value)
    )
}

pub fn format_hsl(color: Rgb) -> String {
    let hsl: Hsl = Hsl::from_color(color.to_srgb());
    format!(
        "hsl({}, {}%, {}%)",
        degrees(hsl.hue.into_positive_degrees()),
        percent(hsl.saturation),
        percent(hsl.lightness)
    )
}

/// Naive device-independent CMYK; `palette` has no CMYK space.
fn to_cmyk(color: Rgb) -> (f32, f32, f32, f32) {
    let r = color.r as f32 / 255.0;
    let g = color.g as f32 / 255.0;
    let b = color.b as f32 / 255.0;
    let k = 1.0 - r.max(g).max(b);
    if k >= 1.0 {
        return (0.0, 0.0, 0.0, 1.0);
    }
    let c = (1.0 - r - k) / (1.0 - k);
    let m = (1.0 - g - k) / (1.0 - k);
    let y = (1.0 - b - k) / (1.0 - k);
    (c, m, y, k)
}

pub fn format_cmyk(color: Rgb) -> String {
    let (c, m, y, k) = to_cmyk(color);
    format!(
        "cmyk({}%, {}%, {}%, {}%)",
        percent(c),
        percent(m),
        percent(y),
        percent(k)
    )
}

/// Formats `color` in the given notation. RGB uses `separator`, HEX honors `uppercase`.
pub fn format_color(color: Rgb, kind: ColorType, separator: &str, uppercase: bool) -> String {
    match kind {
        ColorType::Rgb => format_rgb(color, separator),
        ColorType::Hex => format_hex(color, uppercase),
        ColorType::Hsv => format_hsv(color),
        ColorType::Hsl => format_hsl(color),
        ColorType::Cmyk => format_cmyk(color),
    }
}

fn split_components<'a>(value: &'a str, prefix: &str, separator: &str) -> Vec<&'a str> {
    let clean = value
        .trim()
        .trim_start_matches(prefix)
        .trim_start_matches('(')
        .trim_end_matches(')');
    let parts: Vec<&str> = if !separator.is_empty() && clean.contains(separator) {
        clean.split(separator).collect()
    } else {
        clean.split(',').collect()
    };
    parts.into_iter().map(str::trim).collect()
}

fn parse_percent(part: &str) -> Option<f32> {
    Some(part.trim_end_matches('%').trim().parse::<f32>().ok()? / 100.0)
}

/// Parses a color written in `kind` notation. RGB components may be joined by
/// `separator` or by commas.
pub fn parse_color(kind: ColorType, value: &str, separator: &str) -> Result<Rgb> {
    let invalid = || Error::InvalidColor(value.to_string());
    match kind {
        ColorType::Hex => {
            let clean = value.trim().trim_start_matches('#');
            if clean.len() != 6 || !clean.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            let channel = |range: std::ops::Range<usize>| {
                u8::from_str_radix(&clean[range], 16).map_err(|_| invalid())
            };
            Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
        }
        ColorType::Rgb => {
            let parts = split_components(value, "rgb", separator);
            if parts.len() != 3 {
                return Err(invalid());
            }
            let channel = |part: &str| part.parse::<u8>().map_err(|_| invalid());
            Ok(Rgb::new(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
        }
        ColorType::Hsl | ColorType::Hsv => {
            let prefix = if kind == ColorType::Hsl { "hsl" } else { "hsv" };
            let parts = split_components(value, prefix, ",");
            if parts.len() != 3 {
                return Err(invalid());
            }
            let h = parts[0].parse::<f32>().map_err(|_| invalid())?;
            let s = parse_percent(parts[1]).ok_or_else(invalid)?;
            let third = parse_percent(parts[2]).ok_or_else(invalid)?;
            let rgb: Srgb = if kind == ColorType::Hsl {
                let hsl: Hsl = Hsl::new(h, s, third);
                hsl.into_color()
            } else {
                let hsv: Hsv = Hsv::new(h, s, third);
                hsv.into_color()
            };
            Ok(Rgb::from_srgb(rgb))
        }
        ColorType::Cmyk => {
            let parts = split_components(value, "cmyk", ",");
            if parts.len() != 4 {
                return Err(invalid());
            }
            let mut values = [0.0f32; 4];
            for (slot, part) in values.iter_mut().zip(&parts) {
                *slot = parse_percent(part).ok_or_else(invalid)?.clamp(0.0, 1.0);
            }
            let [c, m, y, k] = values;
            let channel = |x: f32| (255.0 * (1.0 - x) * (1.0 - k)).round() as u8;
            Ok(Rgb::new(channel(c), channel(m), channel(y)))
        }
    }
}

/// Builds an eight-swatch palette around `base`: four tints, three shades,
/// then the base color itself in the last slot.
pub fn generate_palette(base: Rgb) -> [Rgb; PALETTE_SIZE] {
    let mut colors = [base; PALETTE_SIZE];
    for (slot, amount) in colors.iter_mut().zip(TINTS) {
        *slot = base.tint(amount);
    }
    for (slot, factor) in colors[TINTS.len()..].iter_mut().zip(SHADES) {
        *slot = base.shade(factor);
    }
    colors
}

/// Every notation of one color, as shown on the picker page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorValues {
    pub rgb: String,
    pub hex: String,
    pub hsv: String,
    pub hsl: String,
    pub cmyk: String,
}

impl ColorValues {
    pub fn of(color: Rgb, separator: &str, uppercase: bool) -> Self {
        Self {
            rgb: format_rgb(color, separator),
            hex: format_hex(color, uppercase),
            hsv: format_hsv(color),
            hsl: format_hsl(color),
            cmyk: format_cmyk(color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_respects_case() {
        let color = Rgb::new(255, 0, 128);
        assert_eq!(format_color(color, ColorType::Hex, ";", true), "#FF0080");
        assert_eq!(format_color(color, ColorType::Hex, ";", false), "#ff0080");
    }

    #[test]
    fn rgb_uses_separator() {
        let color = Rgb::new(10, 20, 30);
        assert_eq!(format_color(color, ColorType::Rgb, ";", false), "10;20;30");
        assert_eq!(format_rgb(color, ", "), "10, 20, 30");
    }

    #[test]
    fn cylindrical_and_cmyk_notations() {
        let color = Rgb::new(255, 0, 128);
        assert_eq!(format_hsv(color), "hsv(330, 100%, 100%)");
        assert_eq!(format_hsl(color), "hsl(330, 100%, 50%)");
        assert_eq!(format_cmyk(color), "cmyk(0%, 100%, 50%, 0%)");
        assert_eq!(format_cmyk(Rgb::new(0, 0, 0)), "cmyk(0%, 0%, 0%, 100%)");
    }

    #[test]
    fn parses_inputs() {
        assert_eq!(
            parse_color(ColorType::Rgb, "10;20;30", ";").unwrap(),
            Rgb::new(10, 20, 30)
        );
        assert_eq!(
            parse_color(ColorType::Rgb, "rgb(10, 20, 30)", ";").unwrap(),
            Rgb::new(10, 20, 30)
        );
        assert_eq!(
            parse_color(ColorType::Hex, "#FF0080", ";").unwrap(),
            Rgb::new(255, 0, 128)
        );
        assert_eq!(
            parse_color(ColorType::Hsl, "hsl(0, 100%, 50%)", ";").unwrap(),
            Rgb::new(255, 0, 0)
        );
        assert_eq!(
            parse_color(ColorType::Cmyk, "cmyk(0%, 100%, 100%, 0%)", ";").unwrap(),
            Rgb::new(255, 0, 0)
        );
        assert!(parse_color(ColorType::Rgb, "10;20", ";").is_err());
        assert!(parse_color(ColorType::Rgb, "300;20;30", ";").is_err());
        assert!(parse_color(ColorType::Hex, "#12345", ";").is_err());
        assert!(parse_color(ColorType::Hex, "#+F+F+F", ";").is_err());
        assert!(parse_color(ColorType::Hex, "0a0B0c", ";").is_ok());
    }

    #[test]
    fn palette_ends_with_base() {
        let base = Rgb::new(100, 150, 200);
        let colors = generate_palette(base);
        assert_eq!(colors[PALETTE_SIZE - 1], base);
        assert_eq!(colors[0], base.tint(0.8));
        assert_eq!(colors[4], base.shade(0.4));
        assert!(colors[0].r > colors[3].r);
    }

    #[test]
    fn rgb_serializes_as_triple() {
        let json = serde_json::to_string(&Rgb::new(1, 2, 3)).unwrap();
        assert_eq!(json, "[1,2,3]");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(1, 2, 3));
    }

    #[test]
    fn color_type_index_round_trips() {
        for kind in ColorType::all() {
            assert_eq!(ColorType::from_index(kind.index()), *kind);
        }
        assert_eq!(ColorType::from_index(42), ColorType::Rgb);
    }
}
