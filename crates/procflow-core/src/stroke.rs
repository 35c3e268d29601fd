//! Stroke and line-style definitions handed to renderers.
//!
//! Routing decides *how much* an edge should stand out; this module turns
//! that into concrete stroke properties following SVG/CSS naming:
//!
//! | Rust Property | SVG Attribute | Example Values |
//! |--------------|---------------|----------------|
//! | `color` | `stroke` | `"#555555"` |
//! | `width` | `stroke-width` | `2.0` |
//! | `style` | `stroke-dasharray` | `"5,5"` |

use serde::Serialize;

use crate::color::Color;

/// Defines the visual style of a stroke, including dash patterns.
///
/// - `Solid`: No dasharray attribute
/// - `Dashed`: "5,5"
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dashed,
}

/// Complete stroke definition for an edge path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
}

impl StrokeDefinition {
    /// Creates a solid stroke with the given color and width.
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: StrokeStyle::Solid,
        }
    }

    /// Returns a copy of this stroke with a different style.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow_core::color::Color;
    /// use procflow_core::stroke::{StrokeDefinition, StrokeStyle};
    ///
    /// let stroke = StrokeDefinition::solid(Color::default(), 2.0).with_style(StrokeStyle::Dashed);
    /// assert_eq!(stroke.style(), StrokeStyle::Dashed);
    /// ```
    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self::solid(Color::default(), 1.0)
    }
}
