//! Color handling for procflow strokes
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Routing emits colors; renderers consume them as hex
//! strings.

use std::{
    fmt,
    hash::{Hash, Hasher},
};

use color::{AlphaColor, DynamicColor, Rgba8, Srgb};
use serde::{Serialize, Serializer};

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl Color {
    /// Creates a color from 8-bit RGB components.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow_core::color::Color;
    ///
    /// assert_eq!(Color::from_rgb8(0xff, 0x55, 0x55).to_string(), "#ff5555");
    /// ```
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            color: DynamicColor::from_alpha_color(AlphaColor::<Srgb>::from_rgb8(r, g, b)),
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::from_rgb8(0, 0, 0)
    }
}

/// Renders as `#rrggbb`, or `#rrggbbaa` when the color is not opaque.
impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Rgba8 { r, g, b, a } = self.color.to_alpha_color::<Srgb>().to_rgba8();
        write!(f, "#{r:02x}{g:02x}{b:02x}")?;
        if a != u8::MAX {
            write!(f, "{a:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
