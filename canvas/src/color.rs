//! Packed 24-bit RGB colors and their normalization at every boundary.
//!
//! The server stores canvas cells as `u32` and some paths deliver them as
//! signed or float JSON numbers (`0xFFFFFFFF`, `-1`, `16711680.0`). Everything
//! entering the grid goes through [`Color::from_wire`] so only the low 24 bits
//! survive; everything leaving it is either the packed integer or canonical
//! lowercase `#rrggbb`.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 24-bit RGB color packed as `0xRRGGBB`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    pub const BLACK: Self = Self(0x00_0000);
    pub const WHITE: Self = Self(0xFF_FFFF);

    /// Mask for the RGB channels of a packed value.
    pub const MASK: u32 = 0x00FF_FFFF;

    /// Build a color from a packed value, discarding anything above 24 bits.
    #[must_use]
    pub const fn new(packed: u32) -> Self {
        Self(packed & Self::MASK)
    }

    /// Build a color from individual channels.
    #[must_use]
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Normalize any integer the wire may carry.
    ///
    /// Negative values are reinterpreted as two's-complement `u32` first, so
    /// `-1` and `0xFFFFFFFF` both become white.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_wire(value: i64) -> Self {
        Self::new(value as u32)
    }

    /// Normalize a JSON float. Fractional or non-finite values are rejected.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value.fract() != 0.0 {
            return None;
        }
        Some(Self::from_wire(value as i64))
    }

    /// The packed `0xRRGGBB` value.
    #[must_use]
    pub const fn packed(self) -> u32 {
        self.0
    }

    /// Red, green and blue channels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn rgb(self) -> (u8, u8, u8) {
        ((self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8)
    }

    /// Canonical lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:06x}", self.0)
    }

    /// CSS `rgba(...)` string with the given alpha, used for preview fills.
    #[must_use]
    pub fn to_css_rgba(self, alpha: f64) -> String {
        let (r, g, b) = self.rgb();
        format!("rgba({r}, {g}, {b}, {alpha})")
    }

    /// Parse `#RGB` or `#RRGGBB`.
    #[must_use]
    pub fn parse_hex(raw: &str) -> Option<Self> {
        let hex = raw.trim().strip_prefix('#')?;
        let nibbles = hex.chars().map(|c| c.to_digit(16)).collect::<Option<Vec<u32>>>()?;
        match nibbles.as_slice() {
            [r, g, b] => Some(Self::new(((r * 0x11) << 16) | ((g * 0x11) << 8) | (b * 0x11))),
            [_, _, _, _, _, _] => Some(Self::new(nibbles.iter().fold(0_u32, |acc, n| (acc << 4) | n))),
            _ => None,
        }
    }

    /// Parse a computed-style value such as `rgb(255, 165, 0)` or
    /// `rgba(255, 165, 0, 1)`. Alpha is ignored.
    #[must_use]
    pub fn parse_css_rgb(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let inner = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut channels = inner.split(',').map(|part| match part.trim().parse::<u8>() {
            Ok(channel) => Some(channel),
            Err(_) => None,
        });
        let r = channels.next()??;
        let g = channels.next()??;
        let b = channels.next()??;
        Some(Self::from_rgb(r, g, b))
    }

    /// One of the quick-pick palette colors by name.
    #[must_use]
    pub fn named(name: &str) -> Option<Self> {
        PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, c)| *c)
    }

    /// Parse anything a user may type: a palette name, hex, or CSS `rgb()`.
    #[must_use]
    pub fn parse_any(raw: &str) -> Option<Self> {
        Self::named(raw)
            .or_else(|| Self::parse_hex(raw))
            .or_else(|| Self::parse_css_rgb(raw))
    }
}

/// Quick-pick palette shown next to the color picker.
pub const PALETTE: [(&str, Color); 11] = [
    ("red", Color::from_rgb(255, 0, 0)),
    ("green", Color::from_rgb(0, 128, 0)),
    ("blue", Color::from_rgb(0, 0, 255)),
    ("yellow", Color::from_rgb(255, 255, 0)),
    ("purple", Color::from_rgb(128, 0, 128)),
    ("pink", Color::from_rgb(255, 192, 203)),
    ("cyan", Color::from_rgb(0, 255, 255)),
    ("white", Color::WHITE),
    ("black", Color::BLACK),
    ("orange", Color::from_rgb(255, 165, 0)),
    ("brown", Color::from_rgb(165, 42, 42)),
];

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl From<u32> for Color {
    fn from(packed: u32) -> Self {
        Self::new(packed)
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ColorVisitor)
    }
}

struct ColorVisitor;

impl Visitor<'_> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a packed RGB integer or a #rrggbb string")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Color, E> {
        Ok(Color::from_wire(v))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Color, E> {
        Ok(Color::new(v as u32))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Color, E> {
        Color::from_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Color, E> {
        Color::parse_hex(v)
            .or_else(|| Color::parse_css_rgb(v))
            .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}
