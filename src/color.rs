//! Color model conversion and background classification.

use serde::{Deserialize, Serialize};

/// Swatch id of the paper color.
pub const PAPER_COLOR_ID: &str = "Color/Paper";

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from channel values that may be out of range or fractional.
    pub fn from_components(r: f64, g: f64, b: f64) -> Self {
        Self::new(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Whether every channel is zero.
    pub fn is_black(&self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        rgb_to_hex(*self)
    }

    /// Blend toward white; `tint` is the percentage of this color kept.
    pub fn tinted(&self, tint: f64) -> Rgb {
        let t = (tint / 100.0).clamp(0.0, 1.0);
        let mix = |c: u8| 255.0 - (255.0 - c as f64) * t;
        Rgb::from_components(mix(self.r), mix(self.g), mix(self.b))
    }
}

/// A CMYK color with components in percent (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cmyk {
    /// Cyan
    pub c: f64,
    /// Magenta
    pub m: f64,
    /// Yellow
    pub y: f64,
    /// Black
    pub k: f64,
}

impl Cmyk {
    /// Create a new CMYK color (percent components).
    pub fn new(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self { c, m, y, k }
    }

    /// Convert to RGB.
    pub fn to_rgb(&self) -> Rgb {
        cmyk_to_rgb(*self)
    }
}

fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// Convert CMYK (0-100) to RGB: `r = 255(1-c)(1-k)` and likewise for g, b.
pub fn cmyk_to_rgb(cmyk: Cmyk) -> Rgb {
    let norm = |v: f64| (v / 100.0).clamp(0.0, 1.0);
    let (c, m, y, k) = (norm(cmyk.c), norm(cmyk.m), norm(cmyk.y), norm(cmyk.k));
    Rgb::from_components(
        255.0 * (1.0 - c) * (1.0 - k),
        255.0 * (1.0 - m) * (1.0 - k),
        255.0 * (1.0 - y) * (1.0 - k),
    )
}

/// Convert RGB to CMYK (0-100), the naive inverse of [`cmyk_to_rgb`].
pub fn rgb_to_cmyk(rgb: Rgb) -> Cmyk {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;
    let k = 1.0 - r.max(g).max(b);
    if k >= 1.0 {
        return Cmyk::new(0.0, 0.0, 0.0, 100.0);
    }
    let scale = 1.0 - k;
    Cmyk::new(
        (1.0 - r - k) / scale * 100.0,
        (1.0 - g - k) / scale * 100.0,
        (1.0 - b - k) / scale * 100.0,
        k * 100.0,
    )
}

/// Convert CIE L*a*b* (D65) to sRGB.
pub fn lab_to_rgb(l: f64, a: f64, b: f64) -> Rgb {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let inv = |t: f64| {
        if t.powi(3) > 0.008856 {
            t.powi(3)
        } else {
            (t - 16.0 / 116.0) / 7.787
        }
    };
    let (x, y, z) = (0.95047 * inv(fx), inv(fy), 1.08883 * inv(fz));

    let linear = [
        3.2406 * x - 1.5372 * y - 0.4986 * z,
        -0.9689 * x + 1.8758 * y + 0.0415 * z,
        0.0557 * x - 0.2040 * y + 1.0570 * z,
    ];
    let gamma = |c: f64| {
        let c = c.clamp(0.0, 1.0);
        if c > 0.0031308 {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        } else {
            12.92 * c
        }
    };
    Rgb::from_components(
        gamma(linear[0]) * 255.0,
        gamma(linear[1]) * 255.0,
        gamma(linear[2]) * 255.0,
    )
}

/// Format RGB as an upper-case `#RRGGBB` string.
pub fn rgb_to_hex(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}

/// Parse `#RRGGBB`, `RRGGBB`, or `#RGB`.
pub fn hex_to_rgb(hex: &str) -> Option<Rgb> {
    let digits = hex.trim().trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 => digits.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// How suitable a color is as a page background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundSuitability {
    /// Near-white
    VeryLight,
    /// Pale tint of a hue
    LightTinted,
    /// Neutral light gray
    LightGray,
    /// Too dark or saturated to be a background
    Unsuitable,
}

impl BackgroundSuitability {
    /// Whether the color may be used as a background.
    pub fn is_suitable(self) -> bool {
        !matches!(self, BackgroundSuitability::Unsuitable)
    }
}

/// Classify a CMYK color (components 0-100) for background use.
pub fn classify_background(cmyk: Cmyk) -> BackgroundSuitability {
    let Cmyk { c, m, y, k } = cmyk;
    let max_cmy = c.max(m).max(y);
    let avg_cmy = (c + m + y) / 3.0;

    if k <= 20.0 && max_cmy <= 30.0 && avg_cmy <= 20.0 {
        BackgroundSuitability::VeryLight
    } else if k <= 10.0 && max_cmy <= 50.0 && avg_cmy <= 25.0 {
        BackgroundSuitability::LightTinted
    } else if (5.0..=60.0).contains(&k)
        && max_cmy <= 15.0
        && (c - m).abs() <= 5.0
        && (m - y).abs() <= 5.0
    {
        BackgroundSuitability::LightGray
    } else {
        BackgroundSuitability::Unsuitable
    }
}

/// Classify a swatch for background use. The paper swatch is always suitable.
pub fn classify_swatch(color_id: &str, cmyk: Cmyk) -> BackgroundSuitability {
    if is_paper(color_id) {
        return BackgroundSuitability::VeryLight;
    }
    classify_background(cmyk)
}

/// Whether a swatch id names the paper color.
pub fn is_paper(color_id: &str) -> bool {
    color_id == PAPER_COLOR_ID || color_id == "Paper"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmyk_boundaries() {
        assert_eq!(cmyk_to_rgb(Cmyk::new(0.0, 0.0, 0.0, 0.0)), Rgb::new(255, 255, 255));
        assert_eq!(cmyk_to_rgb(Cmyk::new(0.0, 0.0, 0.0, 100.0)), Rgb::new(0, 0, 0));
        assert_eq!(cmyk_to_rgb(Cmyk::new(100.0, 0.0, 0.0, 0.0)), Rgb::new(0, 255, 255));
    }

    #[test]
    fn test_cmyk_rounding() {
        // 255 * 0.5 = 127.5 rounds up
        assert_eq!(cmyk_to_rgb(Cmyk::new(50.0, 0.0, 0.0, 0.0)).r, 128);
    }

    #[test]
    fn test_hex() {
        assert_eq!(rgb_to_hex(Rgb::new(255, 0, 16)), "#FF0010");
        assert_eq!(hex_to_rgb("#FF0010"), Some(Rgb::new(255, 0, 16)));
        assert_eq!(hex_to_rgb("fff"), Some(Rgb::WHITE));
        assert_eq!(hex_to_rgb("#12"), None);
    }

    #[test]
    fn test_rgb_to_cmyk() {
        let cmyk = rgb_to_cmyk(Rgb::WHITE);
        assert_eq!((cmyk.c, cmyk.m, cmyk.y, cmyk.k), (0.0, 0.0, 0.0, 0.0));
        let cmyk = rgb_to_cmyk(Rgb::BLACK);
        assert_eq!(cmyk.k, 100.0);
        let cmyk = rgb_to_cmyk(Rgb::new(0, 255, 255));
        assert!((cmyk.c - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_lab_extremes() {
        assert_eq!(lab_to_rgb(100.0, 0.0, 0.0), Rgb::WHITE);
        assert_eq!(lab_to_rgb(0.0, 0.0, 0.0), Rgb::BLACK);
    }

    #[test]
    fn test_tint() {
        assert_eq!(Rgb::BLACK.tinted(0.0), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.tinted(100.0), Rgb::BLACK);
        assert_eq!(Rgb::BLACK.tinted(50.0), Rgb::new(128, 128, 128));
    }

    #[test]
    fn test_classify_background() {
        assert_eq!(
            classify_background(Cmyk::new(0.0, 0.0, 0.0, 0.0)),
            BackgroundSuitability::VeryLight
        );
        assert_eq!(
            classify_background(Cmyk::new(45.0, 10.0, 10.0, 5.0)),
            BackgroundSuitability::LightTinted
        );
        assert_eq!(
            classify_background(Cmyk::new(2.0, 3.0, 4.0, 40.0)),
            BackgroundSuitability::LightGray
        );
        assert_eq!(
            classify_background(Cmyk::new(0.0, 100.0, 100.0, 0.0)),
            BackgroundSuitability::Unsuitable
        );
        assert_eq!(
            classify_background(Cmyk::new(0.0, 0.0, 0.0, 100.0)),
            BackgroundSuitability::Unsuitable
        );
    }

    #[test]
    fn test_paper_always_suitable() {
        let dark = Cmyk::new(80.0, 80.0, 80.0, 90.0);
        assert!(classify_swatch(PAPER_COLOR_ID, dark).is_suitable());
        assert!(!classify_swatch("Color/Ink", dark).is_suitable());
    }
}
