//! Cubic Bézier geometry for routed edges.
//!
//! Control points follow the convention of common web graph renderers: a
//! control point leaves its anchor perpendicular to the anchor side, by half
//! the distance to the other endpoint when that endpoint lies ahead, and by a
//! curvature-scaled square root of the distance when it lies behind.

use serde::Serialize;

use procflow_core::geometry::{Anchor, Point};

/// A cubic Bézier segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicBezier {
    start: Point,
    control1: Point,
    control2: Point,
    end: Point,
}

impl CubicBezier {
    pub fn new(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        Self {
            start,
            control1,
            control2,
            end,
        }
    }

    /// Curve between two anchored endpoints.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow::routing::CubicBezier;
    /// use procflow_core::geometry::{Anchor, Point};
    ///
    /// let curve = CubicBezier::between(
    ///     Point::new(0.0, 0.0),
    ///     Anchor::Bottom,
    ///     Point::new(0.0, 100.0),
    ///     Anchor::Top,
    ///     0.25,
    /// );
    /// assert_eq!(curve.control1(), Point::new(0.0, 50.0));
    /// assert_eq!(curve.control2(), Point::new(0.0, 50.0));
    /// ```
    pub fn between(
        start: Point,
        start_side: Anchor,
        end: Point,
        end_side: Anchor,
        curvature: f32,
    ) -> Self {
        Self {
            start,
            control1: control_point(start_side, start, end, curvature),
            control2: control_point(end_side, end, start, curvature),
            end,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn control1(&self) -> Point {
        self.control1
    }

    pub fn control2(&self) -> Point {
        self.control2
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Evaluates the curve at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Point {
        let u = 1.0 - t;
        let (b0, b1, b2, b3) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        Point::new(
            b0 * self.start.x() + b1 * self.control1.x() + b2 * self.control2.x() + b3 * self.end.x(),
            b0 * self.start.y() + b1 * self.control1.y() + b2 * self.control2.y() + b3 * self.end.y(),
        )
    }

    /// Point halfway along the parameter range, where edge labels sit.
    pub fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }

    /// SVG path data for this curve, e.g. `M0,0 C0,50 0,50 0,100`.
    pub fn to_svg_path(&self) -> String {
        format!(
            "M{},{} C{},{} {},{} {},{}",
            self.start.x(),
            self.start.y(),
            self.control1.x(),
            self.control1.y(),
            self.control2.x(),
            self.control2.y(),
            self.end.x(),
            self.end.y(),
        )
    }
}

/// Explicit self-loop curve from a right-side anchor into a top-side anchor.
///
/// Both control points sit `reach` to the right of the start, the second one
/// also `rise` above it.
pub fn loop_curve(start: Point, end: Point, reach: f32, rise: f32) -> CubicBezier {
    CubicBezier::new(
        start,
        Point::new(start.x() + reach, start.y()),
        Point::new(start.x() + reach, start.y() - rise),
        end,
    )
}

/// Label position of a self-loop: halfway between the start and the top of the loop.
pub fn loop_label_position(curve: &CubicBezier) -> Point {
    curve.start().midpoint(curve.control2())
}

fn control_offset(distance: f32, curvature: f32) -> f32 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        curvature * 25.0 * (-distance).sqrt()
    }
}

fn control_point(side: Anchor, from: Point, to: Point, curvature: f32) -> Point {
    match side {
        Anchor::Left => Point::new(
            from.x() - control_offset(from.x() - to.x(), curvature),
            from.y(),
        ),
        Anchor::Right => Point::new(
            from.x() + control_offset(to.x() - from.x(), curvature),
            from.y(),
        ),
        Anchor::Top => Point::new(
            from.x(),
            from.y() - control_offset(from.y() - to.y(), curvature),
        ),
        Anchor::Bottom => Point::new(
            from.x(),
            from.y() + control_offset(to.y() - from.y(), curvature),
        ),
    }
}
