//! Color parsing and formatting for `Actor.Color` attributes.
//!
//! Two input forms are accepted: hex `#RRGGBB` and decimal `R;G;B`.

use std::fmt;

use crate::error::{ColorChangerError, Result};

/// An RGB triple, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        RgbColor { r, g, b }
    }

    /// Format as `#RRGGBB` (upper-case hex digits).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Renders the decimal-triplet form `R;G;B`.
impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{};{}", self.r, self.g, self.b)
    }
}

/// Parse a configured color string.
///
/// Accepts:
/// - Hex: `"#FF0000"`, `"#ff8000"`, exactly seven characters, a non-digit
///   marker followed by six hex digits
/// - Decimal triplet: `"255;128;0"`, three base-10 integers in `0..=255`
///
/// `None` (no value configured) is an error. Input is never trimmed.
pub fn parse_color(input: Option<&str>) -> Result<RgbColor> {
    let Some(s) = input else {
        return Err(ColorChangerError::Color("no color configured".into()));
    };

    let mut chars = s.chars();
    if s.chars().count() == 7
        && let Some(marker) = chars.next()
        && !marker.is_ascii_digit()
    {
        return parse_hex(s, chars.as_str());
    }

    parse_triplet(s)
}

fn parse_hex(s: &str, digits: &str) -> Result<RgbColor> {
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorChangerError::Color(format!(
            "Invalid hex color: {s} (use #RRGGBB)"
        )));
    }
    // All six remaining characters are ASCII, so byte slicing is on char boundaries.
    let pair = |range: std::ops::Range<usize>| {
        digits
            .get(range)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .ok_or_else(|| ColorChangerError::Color(format!("Invalid hex color: {s}")))
    };
    Ok(RgbColor::new(pair(0..2)?, pair(2..4)?, pair(4..6)?))
}

fn parse_triplet(s: &str) -> Result<RgbColor> {
    // Trailing empty fields are dropped, so "1;2;3;" is still three fields.
    let fields: Vec<&str> = s.trim_end_matches(';').split(';').collect();
    let [r, g, b] = fields.as_slice() else {
        return Err(ColorChangerError::Color(format!(
            "Invalid color: {s:?} (use #RRGGBB or R;G;B)"
        )));
    };
    Ok(RgbColor::new(channel(s, r)?, channel(s, g)?, channel(s, b)?))
}

fn channel(s: &str, field: &str) -> Result<u8> {
    let value: i64 = field.parse().map_err(|_| {
        ColorChangerError::Color(format!("Invalid color: {s:?} ({field:?} is not a number)"))
    })?;
    u8::try_from(value).map_err(|_| {
        ColorChangerError::Color(format!(
            "Invalid color: {s:?} ({value} is out of range 0-255)"
        ))
    })
}
