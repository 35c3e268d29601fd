//! Edge routing.
//!
//! [`route`] decides how a single edge is drawn from the geometry of its two
//! endpoint nodes and the edge's semantics. Rules are applied in order:
//!
//! 1. Self-loops always get the loop shape, right to top, with an explicit path.
//! 2. Edges whose target lies behind the source along the flow get a reverse
//!    arc with both anchors on the same side and an explicit path.
//! 3. Edges leaving a decision node pick their source side from the branch
//!    they represent (see [`branch::classify`]).
//! 4. Everything else is a plain curve, straight when the anchors face each
//!    other and slightly bent otherwise.

pub mod branch;
mod path;

use serde::Serialize;

use procflow_core::{
    color::Color,
    document::{BranchKind, Edge, Node},
    geometry::{Anchor, Point},
    stroke::StrokeDefinition,
};

pub use path::{CubicBezier, loop_curve, loop_label_position};

use crate::{config::RoutingConfig, layout::Direction};

const ALIGNED_CURVATURE: f32 = 0.0;
const DIAGONAL_CURVATURE: f32 = 0.25;
const EMPHASIZED_CURVATURE: f32 = 0.5;

/// How an edge path is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeClass {
    Bezier,
    Loop,
    ReverseArc,
}

/// How much an edge stands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emphasis {
    Normal,
    Exception,
    Reverse,
    Loop,
}

impl Emphasis {
    /// Stroke used to draw an edge with this emphasis.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow::routing::Emphasis;
    ///
    /// assert_eq!(Emphasis::Loop.stroke().width(), 3.0);
    /// assert_eq!(Emphasis::Normal.stroke().width(), 2.0);
    /// ```
    pub fn stroke(self) -> StrokeDefinition {
        match self {
            Self::Normal => StrokeDefinition::solid(Color::from_rgb8(0x55, 0x55, 0x55), 2.0),
            Self::Exception => StrokeDefinition::solid(Color::from_rgb8(0xff, 0x55, 0x55), 2.0),
            Self::Reverse => StrokeDefinition::solid(Color::from_rgb8(0xff, 0x00, 0x00), 2.0),
            Self::Loop => StrokeDefinition::solid(Color::from_rgb8(0xff, 0x55, 0x55), 3.0),
        }
    }
}

/// Rendering parameters decided for one edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    shape: ShapeClass,
    source_anchor: Anchor,
    target_anchor: Anchor,
    curvature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    path_override: Option<CubicBezier>,
    emphasis: Emphasis,
}

impl Route {
    pub fn shape(&self) -> ShapeClass {
        self.shape
    }

    pub fn source_anchor(&self) -> Anchor {
        self.source_anchor
    }

    pub fn target_anchor(&self) -> Anchor {
        self.target_anchor
    }

    pub fn curvature(&self) -> f32 {
        self.curvature
    }

    /// Explicit path for loops and reverse arcs; `None` means the renderer
    /// derives the curve from anchors and curvature.
    pub fn path_override(&self) -> Option<&CubicBezier> {
        self.path_override.as_ref()
    }

    pub fn emphasis(&self) -> Emphasis {
        self.emphasis
    }

    /// Resolves the concrete path and label position between `source` and `target`.
    pub fn geometry(&self, source: &Node, target: &Node) -> EdgeGeometry {
        let path = self.path_override.unwrap_or_else(|| {
            CubicBezier::between(
                source.bounds().anchor_point(self.source_anchor),
                self.source_anchor,
                target.bounds().anchor_point(self.target_anchor),
                self.target_anchor,
                self.curvature,
            )
        });
        let label_position = match self.shape {
            ShapeClass::Loop => loop_label_position(&path),
            ShapeClass::Bezier | ShapeClass::ReverseArc => path.midpoint(),
        };

        EdgeGeometry {
            path,
            label_position,
        }
    }
}

/// Concrete path of a routed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeGeometry {
    pub path: CubicBezier,
    pub label_position: Point,
}

/// Whether the anchor pair faces along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alignment {
    Vertical,
    Horizontal,
    Diagonal,
}

impl Alignment {
    fn of(source: Anchor, target: Anchor) -> Self {
        match (source, target) {
            (Anchor::Bottom, Anchor::Top) | (Anchor::Top, Anchor::Bottom) => Self::Vertical,
            (Anchor::Right, Anchor::Left) | (Anchor::Left, Anchor::Right) => Self::Horizontal,
            _ => Self::Diagonal,
        }
    }
}

/// Decides how `edge` is drawn between `source` and `target`.
///
/// `direction` is the flow direction of the document's current layout. The
/// result depends only on the arguments.
pub fn route(
    edge: &Edge,
    source: &Node,
    target: &Node,
    direction: Direction,
    config: &RoutingConfig,
) -> Route {
    if edge.is_self_loop() {
        let bounds = source.bounds();
        let path = loop_curve(
            bounds.anchor_point(Anchor::Right),
            bounds.anchor_point(Anchor::Top),
            config.loop_reach(),
            config.loop_rise(),
        );
        return Route {
            shape: ShapeClass::Loop,
            source_anchor: Anchor::Right,
            target_anchor: Anchor::Top,
            curvature: DIAGONAL_CURVATURE,
            path_override: Some(path),
            emphasis: Emphasis::Loop,
        };
    }

    let source_pos = source.position();
    let target_pos = target.position();
    let alignment = Alignment::of(source.source_anchor(), target.target_anchor());

    let reverse = match alignment {
        Alignment::Vertical => match source.source_anchor() {
            Anchor::Bottom => source_pos.y() > target_pos.y(),
            Anchor::Top => source_pos.y() < target_pos.y(),
            Anchor::Left | Anchor::Right => false,
        },
        Alignment::Horizontal => match source.source_anchor() {
            Anchor::Right => source_pos.x() > target_pos.x(),
            Anchor::Left => source_pos.x() < target_pos.x(),
            Anchor::Top | Anchor::Bottom => false,
        },
        Alignment::Diagonal => false,
    };
    if reverse {
        return reverse_route(alignment, source, target, config);
    }

    let exception = edge.semantics().is_exception();
    let mut curvature = if exception {
        EMPHASIZED_CURVATURE
    } else if alignment == Alignment::Diagonal {
        DIAGONAL_CURVATURE
    } else {
        ALIGNED_CURVATURE
    };
    let mut source_anchor = source.source_anchor();

    if source.kind().is_decision() {
        let clean_top_down = direction.is_top_down()
            && source.source_anchor() == Anchor::Bottom
            && source_pos.y() <= target_pos.y();

        if clean_top_down {
            source_anchor = Anchor::Bottom;
            curvature = DIAGONAL_CURVATURE;
        } else {
            match branch::classify(edge) {
                BranchKind::Exception => {
                    source_anchor = Anchor::Bottom;
                    curvature = DIAGONAL_CURVATURE;
                }
                BranchKind::Affirmative | BranchKind::Other => source_anchor = Anchor::Right,
                BranchKind::Negative => source_anchor = Anchor::Top,
            }
        }
    }

    Route {
        shape: ShapeClass::Bezier,
        source_anchor,
        target_anchor: target.target_anchor(),
        curvature,
        path_override: None,
        emphasis: if exception {
            Emphasis::Exception
        } else {
            Emphasis::Normal
        },
    }
}

/// Reverse arc: both ends pulled onto the same side and offset into the nodes.
fn reverse_route(alignment: Alignment, source: &Node, target: &Node, config: &RoutingConfig) -> Route {
    let offset = config.reverse_offset();

    let (source_side, target_side, start, end) = if alignment == Alignment::Horizontal {
        let endpoint = |node: &Node| {
            let bounds = node.bounds();
            Point::new(bounds.max_x() - offset, bounds.center().y() - offset)
        };
        let target_side = if target.position().y() > source.position().y() {
            Anchor::Bottom
        } else {
            Anchor::Right
        };
        (Anchor::Bottom, target_side, endpoint(source), endpoint(target))
    } else {
        let endpoint = |node: &Node| {
            let bounds = node.bounds();
            Point::new(bounds.center().x() - offset, bounds.max_y() - offset)
        };
        (Anchor::Left, Anchor::Left, endpoint(source), endpoint(target))
    };

    Route {
        shape: ShapeClass::ReverseArc,
        source_anchor: source_side,
        target_anchor: target_side,
        curvature: EMPHASIZED_CURVATURE,
        path_override: Some(CubicBezier::between(
            start,
            source_side,
            end,
            target_side,
            EMPHASIZED_CURVATURE,
        )),
        emphasis: Emphasis::Reverse,
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use procflow_core::document::{EdgeSemantics, NodeKind};

    use super::*;

    fn anchor_strategy() -> impl Strategy<Value = Anchor> {
        prop_oneof![
            Just(Anchor::Top),
            Just(Anchor::Right),
            Just(Anchor::Bottom),
            Just(Anchor::Left),
        ]
    }

    fn kind_strategy() -> impl Strategy<Value = NodeKind> {
        prop_oneof![
            Just(NodeKind::Start),
            Just(NodeKind::End),
            Just(NodeKind::Decision),
            Just(NodeKind::Task),
        ]
    }

    fn node_strategy(id: &'static str) -> impl Strategy<Value = Node> {
        (
            kind_strategy(),
            -2000.0f32..2000.0,
            -2000.0f32..2000.0,
            anchor_strategy(),
            anchor_strategy(),
        )
            .prop_map(move |(kind, x, y, source, target)| {
                Node::new(id, kind, id)
                    .with_position(Point::new(x, y))
                    .with_anchors(source, target)
            })
    }

    fn direction_strategy() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::TopDown), Just(Direction::LeftRight)]
    }

    proptest! {
        #[test]
        fn routing_is_deterministic(
            source in node_strategy("S"),
            target in node_strategy("T"),
            label in "[a-zA-Z ]{0,30}",
            exception in any::<bool>(),
            direction in direction_strategy(),
        ) {
            let edge = Edge::new("e", "S", "T", label)
                .with_semantics(EdgeSemantics::new(false, exception));
            let config = RoutingConfig::default();

            let first = route(&edge, &source, &target, direction, &config);
            let second = route(&edge, &source, &target, direction, &config);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn self_loops_ignore_labels_and_flags(
            node in node_strategy("N"),
            label in "[a-zA-Z ]{0,30}",
            conditional in any::<bool>(),
            exception in any::<bool>(),
            direction in direction_strategy(),
        ) {
            let edge = Edge::new("e", "N", "N", label)
                .with_semantics(EdgeSemantics::new(conditional, exception));
            let route = route(&edge, &node, &node, direction, &RoutingConfig::default());

            prop_assert_eq!(route.shape(), ShapeClass::Loop);
            prop_assert_eq!(route.source_anchor(), Anchor::Right);
            prop_assert_eq!(route.target_anchor(), Anchor::Top);
            prop_assert_eq!(route.emphasis(), Emphasis::Loop);
        }
    }
}
