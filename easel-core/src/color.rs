//! Packed RGBA colors and their text form.

use crate::error::EaselError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A color packed into a `u32` as `0xRRGGBBAA`.
///
/// This is the wire format guests pass to the draw imports and the value
/// format theme files parse into. The text form is `#` followed by exactly
/// eight zero-padded lowercase hex digits (e.g. `#ff8800ff`); parsing also
/// accepts the six-digit form with alpha defaulting to `ff`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(u32);

impl Color {
    /// Opaque black, `#000000ff`.
    pub const BLACK: Color = Color(0x0000_00ff);

    /// Opaque white, `#ffffffff`.
    pub const WHITE: Color = Color(0xffff_ffff);

    /// Create a color from a packed `0xRRGGBBAA` word.
    #[must_use]
    pub const fn new(rgba: u32) -> Self {
        Self(rgba)
    }

    /// Create a color from individual channels.
    #[must_use]
    pub const fn from_channels(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    /// Get the packed `0xRRGGBBAA` word.
    #[must_use]
    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Get the red channel.
    #[must_use]
    pub const fn r(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Get the green channel.
    #[must_use]
    pub const fn g(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Get the blue channel.
    #[must_use]
    pub const fn b(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Get the alpha channel.
    #[must_use]
    pub const fn a(&self) -> u8 {
        self.0 as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08x}", self.0)
    }
}

impl From<u32> for Color {
    fn from(rgba: u32) -> Self {
        Self(rgba)
    }
}

impl FromStr for Color {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = |cause: &str| EaselError::ColorParse {
            value: s.to_string(),
            cause: cause.to_string(),
        };

        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| parse_err("expected leading '#'"))?;

        let rgba = match digits.len() {
            8 => u32::from_str_radix(digits, 16)
                .map_err(|_| parse_err("expected hex digits"))?,
            6 => {
                let rgb = u32::from_str_radix(digits, 16)
                    .map_err(|_| parse_err("expected hex digits"))?;
                (rgb << 8) | 0xff
            }
            _ => return Err(parse_err("expected 6 or 8 hex digits")),
        };

        Ok(Self(rgba))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
