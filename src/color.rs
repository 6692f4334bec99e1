//! Colors shared by the scene, the exporters and the GUI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const GRID: Rgb = Rgb::new(0xcc, 0xcc, 0xcc);

    /// `#rrggbb`, lowercase.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color `{}`", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Accepts `#rgb`, `#rrggbb` and the few CSS names used by the charts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        let named = match t.to_ascii_lowercase().as_str() {
            "black" => Some(Rgb::BLACK),
            "white" => Some(Rgb::WHITE),
            "red" => Some(Rgb::new(255, 0, 0)),
            "steelblue" => Some(Rgb::new(70, 130, 180)),
            "gray" | "grey" => Some(Rgb::new(128, 128, 128)),
            _ => None,
        };
        if let Some(c) = named {
            return Ok(c);
        }
        let hex = t
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        let digit = |i: usize| {
            u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        let pair = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        match hex.len() {
            3 if hex.is_ascii() => Ok(Rgb::new(digit(0)? * 17, digit(1)? * 17, digit(2)? * 17)),
            6 if hex.is_ascii() => Ok(Rgb::new(pair(0)?, pair(2)?, pair(4)?)),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

/// The ten-color categorical palette used for per-country series.
pub const CATEGORY10: [Rgb; 10] = [
    Rgb::new(0x1f, 0x77, 0xb4),
    Rgb::new(0xff, 0x7f, 0x0e),
    Rgb::new(0x2c, 0xa0, 0x2c),
    Rgb::new(0xd6, 0x27, 0x28),
    Rgb::new(0x94, 0x67, 0xbd),
    Rgb::new(0x8c, 0x56, 0x4b),
    Rgb::new(0xe3, 0x77, 0xc2),
    Rgb::new(0x7f, 0x7f, 0x7f),
    Rgb::new(0xbc, 0xbd, 0x22),
    Rgb::new(0x17, 0xbe, 0xcf),
];

/// Color of the `idx`-th entity in dataset order.
#[inline]
pub fn category_color(idx: usize) -> Rgb {
    CATEGORY10[idx % CATEGORY10.len()]
}

/// Parse or fall back, logging the bad value once per call site.
pub fn parse_or(s: &str, fallback: Rgb) -> Rgb {
    match s.parse() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("{e}; using {fallback}");
            fallback
        }
    }
}
