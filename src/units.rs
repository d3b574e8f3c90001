//! Measurement units and pixel conversion.
//!
//! Every conversion goes through inches: `pixels = inches × dpi`. Results are
//! rounded to two decimal places.

use serde::{Deserialize, Serialize};

/// Default output resolution.
pub const DEFAULT_DPI: f64 = 96.0;

/// A measurement unit found in layout documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// PostScript points (1/72 inch)
    #[default]
    Points,
    /// Picas (12 points)
    Picas,
    /// Millimeters
    Millimeters,
    /// Centimeters
    Centimeters,
    /// Inches
    Inches,
    /// Ciceros (12 Didot points)
    Ciceros,
    /// Agates (1/14 inch)
    Agates,
    /// Already in pixels
    Pixels,
}

impl Unit {
    /// All units, in declaration order.
    pub const ALL: [Unit; 8] = [
        Unit::Points,
        Unit::Picas,
        Unit::Millimeters,
        Unit::Centimeters,
        Unit::Inches,
        Unit::Ciceros,
        Unit::Agates,
        Unit::Pixels,
    ];

    /// Inches per one unit, or `None` for pixels.
    pub fn inches_per_unit(self) -> Option<f64> {
        match self {
            Unit::Points => Some(1.0 / 72.0),
            Unit::Picas => Some(1.0 / 6.0),
            Unit::Millimeters => Some(1.0 / 25.4),
            Unit::Centimeters => Some(1.0 / 2.54),
            Unit::Inches => Some(1.0),
            Unit::Ciceros => Some(0.17762),
            Unit::Agates => Some(1.0 / 14.0),
            Unit::Pixels => None,
        }
    }

    /// Parse a unit suffix (`pt`, `p`, `mm`, `cm`, `in`, `c`, `ag`, `px`) or
    /// a view-preference name (`Points`, `Picas`, `Millimeters`, ...).
    pub fn parse(s: &str) -> Option<Unit> {
        let lower = s.trim().to_ascii_lowercase();
        let unit = match lower.as_str() {
            "pt" | "pts" | "point" | "points" => Unit::Points,
            "p" | "pc" | "pica" | "picas" => Unit::Picas,
            "mm" | "millimeter" | "millimeters" => Unit::Millimeters,
            "cm" | "centimeter" | "centimeters" => Unit::Centimeters,
            "in" | "inch" | "inches" | "\"" => Unit::Inches,
            "c" | "cicero" | "ciceros" => Unit::Ciceros,
            "ag" | "agate" | "agates" => Unit::Agates,
            "px" | "pixel" | "pixels" => Unit::Pixels,
            _ => return None,
        };
        Some(unit)
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suffix = match self {
            Unit::Points => "pt",
            Unit::Picas => "p",
            Unit::Millimeters => "mm",
            Unit::Centimeters => "cm",
            Unit::Inches => "in",
            Unit::Ciceros => "c",
            Unit::Agates => "ag",
            Unit::Pixels => "px",
        };
        f.write_str(suffix)
    }
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert a value in `unit` to pixels at `dpi`.
pub fn to_pixels(value: f64, unit: Unit, dpi: f64) -> f64 {
    match unit.inches_per_unit() {
        Some(ipu) => round2(value * ipu * dpi),
        None => round2(value),
    }
}

/// Convert pixels at `dpi` back to `unit`.
pub fn from_pixels(pixels: f64, unit: Unit, dpi: f64) -> f64 {
    match unit.inches_per_unit() {
        Some(ipu) if dpi > 0.0 => round2(pixels / dpi / ipu),
        Some(_) => 0.0,
        None => round2(pixels),
    }
}

/// Convert points to pixels, the common case for layout coordinates.
pub fn points_to_pixels(points: f64, dpi: f64) -> f64 {
    to_pixels(points, Unit::Points, dpi)
}

/// Points → pixels without rounding, for intermediate geometry.
pub(crate) fn points_scale(dpi: f64) -> f64 {
    dpi / 72.0
}

/// A value with its unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Numeric value
    pub value: f64,
    /// Unit of the value
    pub unit: Unit,
}

impl Measurement {
    /// Create a new measurement.
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// Parse strings such as `12pt`, `3.5mm`, `0.5in`, `2c`, or the pica
    /// notation `1p6` (one pica and six points). A bare number is taken in
    /// `default_unit`.
    pub fn parse(s: &str, default_unit: Unit) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Ok(value) = s.parse::<f64>() {
            return Some(Self::new(value, default_unit));
        }

        // Pica notation: <picas>p<points>
        if let Some(idx) = s.find('p') {
            let (picas, rest) = s.split_at(idx);
            let points = &rest[1..];
            if !points.is_empty()
                && points.chars().all(|c| c.is_ascii_digit() || c == '.')
                && picas.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
            {
                let picas: f64 = if picas.is_empty() || picas == "-" {
                    0.0
                } else {
                    picas.parse().ok()?
                };
                let points: f64 = points.parse().ok()?;
                let sign = if s.starts_with('-') { -1.0 } else { 1.0 };
                let total = picas.abs() * 12.0 + points;
                return Some(Self::new(sign * total, Unit::Points));
            }
        }

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);
        let value: f64 = number.parse().ok()?;
        let unit = Unit::parse(suffix)?;
        Some(Self::new(value, unit))
    }

    /// Convert to pixels.
    pub fn to_pixels(&self, dpi: f64) -> f64 {
        to_pixels(self.value, self.unit, dpi)
    }
}
