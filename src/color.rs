//! ARGB color values shared by the document model, markup and renderers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// 32-bit `0xAARRGGBB` color.
///
/// The all-zero value is reserved: per-token overrides holding it are treated
/// as "unset" and resolve to the script's default color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Reserved "no override" sentinel.
    pub const UNSET: Color = Color(0);
    /// Default text color for both scripts.
    pub const DEFAULT_TEXT: Color = Color(0xFF33_3333);
    pub const BLACK: Color = Color(0xFF00_0000);
    pub const WHITE: Color = Color(0xFFFF_FFFF);
    pub const RED: Color = Color(0xFFFF_0000);

    /// Build a color from its four channels.
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self(((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Build an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(0xFF, r, g, b)
    }

    /// Whether this is the reserved unset sentinel.
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Map the unset sentinel to `None`.
    pub const fn as_override(self) -> Option<Color> {
        if self.is_unset() {
            None
        } else {
            Some(self)
        }
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// `#RRGGBB` form used by inline markup. Alpha is dropped.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:06X}", self.0 & 0x00FF_FFFF)
    }

    /// Parse `#RGB`, `#RRGGBB` or `#AARRGGBB`. Colors without an alpha
    /// channel are opaque.
    pub fn parse_hex(value: &str) -> Option<Color> {
        let hex = value.trim().strip_prefix('#')?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        match hex.len() {
            3 => {
                let raw = u32::from_str_radix(hex, 16).ok()?;
                let r = ((raw >> 8) & 0xF) as u8;
                let g = ((raw >> 4) & 0xF) as u8;
                let b = (raw & 0xF) as u8;
                Some(Self::rgb(r * 17, g * 17, b * 17))
            }
            6 => u32::from_str_radix(hex, 16)
                .ok()
                .map(|raw| Color(0xFF00_0000 | raw)),
            8 => u32::from_str_radix(hex, 16).ok().map(Color),
            _ => None,
        }
    }
}

impl From<u32> for Color {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:08X}", self.0)
    }
}
