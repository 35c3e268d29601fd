//! Geometric primitives shared by layout and routing.
//!
//! - [`Point`]: a 2-D coordinate
//! - [`Size`]: width and height of a node box
//! - [`Bounds`]: an axis-aligned rectangle
//! - [`Anchor`]: the side of a node box an edge leaves from or arrives at

use serde::{Deserialize, Serialize};

/// A point in 2D space with x and y coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    x: f32,
    #[serde(default)]
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Calculates the midpoint between this point and another point
    pub fn midpoint(self, other: Point) -> Self {
        Self {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }

    /// Returns true if both coordinates are within `tolerance` of `other`.
    ///
    /// The comparison is inclusive: a delta of exactly `tolerance` still counts
    /// as close.
    pub fn is_close_to(self, other: Point, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

/// Represents the dimensions of an element with width and height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Returns the width dimension of this size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height dimension of this size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates bounds from a top-left corner and a size.
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the point in the middle of the given side.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow_core::geometry::{Anchor, Bounds, Point, Size};
    ///
    /// let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(192.0, 80.0));
    /// assert_eq!(bounds.anchor_point(Anchor::Bottom), Point::new(96.0, 80.0));
    /// assert_eq!(bounds.anchor_point(Anchor::Left), Point::new(0.0, 40.0));
    /// ```
    pub fn anchor_point(self, anchor: Anchor) -> Point {
        let center = self.center();
        match anchor {
            Anchor::Top => Point::new(center.x, self.min_y),
            Anchor::Right => Point::new(self.max_x, center.y),
            Anchor::Bottom => Point::new(center.x, self.max_y),
            Anchor::Left => Point::new(self.min_x, center.y),
        }
    }
}

/// Side of a node box used as an edge endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_point_midpoint() {
        let p1 = Point::new(10.0, 20.0);
        let p2 = Point::new(5.0, -4.0);

        assert_eq!(p1.midpoint(p2), Point::new(7.5, 8.0));
    }

    #[test]
    fn test_point_is_close_to() {
        let p = Point::new(100.0, 100.0);

        assert!(p.is_close_to(Point::new(100.5, 99.5), 1.0));
        assert!(p.is_close_to(Point::new(101.0, 100.0), 1.0));
        assert!(!p.is_close_to(Point::new(101.5, 100.0), 1.0));
        assert!(!p.is_close_to(Point::new(100.0, 98.0), 1.0));
    }

    #[test]
    fn test_bounds_from_top_left() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(240.0, 240.0));

        assert_approx_eq!(f32, bounds.min_x(), 10.0);
        assert_approx_eq!(f32, bounds.max_x(), 250.0);
        assert_approx_eq!(f32, bounds.width(), 240.0);
        assert_approx_eq!(f32, bounds.height(), 240.0);
        assert_eq!(bounds.center(), Point::new(130.0, 140.0));
    }

    #[test]
    fn test_anchor_points() {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(192.0, 80.0));

        assert_eq!(bounds.anchor_point(Anchor::Top), Point::new(96.0, 0.0));
        assert_eq!(bounds.anchor_point(Anchor::Right), Point::new(192.0, 40.0));
        assert_eq!(bounds.anchor_point(Anchor::Bottom), Point::new(96.0, 80.0));
        assert_eq!(bounds.anchor_point(Anchor::Left), Point::new(0.0, 40.0));
    }

    #[test]
    fn test_anchor_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Anchor::Right).unwrap(), "\"right\"");
        let parsed: Anchor = serde_json::from_str("\"bottom\"").unwrap();
        assert_eq!(parsed, Anchor::Bottom);
    }
}
