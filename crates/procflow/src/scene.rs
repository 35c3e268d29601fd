//! Renderer-facing output.
//!
//! A [`Scene`] is everything a renderer needs to draw one document: node
//! boxes with wrapped labels, routed edge paths with label positions and
//! strokes, and, while a comparison is active, which entries are equivalent
//! in the other document.

use log::debug;
use serde::Serialize;

use procflow_core::{
    color::Color,
    document::{GraphDocument, NodeKind},
    geometry::{Anchor, Point, Size},
    identifier::Id,
    stroke::{StrokeDefinition, StrokeStyle},
};

use crate::{
    config::RoutingConfig,
    diff::DiffResult,
    label::wrap_label,
    layout::Direction,
    routing::{self, CubicBezier, ShapeClass},
};

/// Drawable form of one node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    id: Id,
    kind: NodeKind,
    label_lines: Vec<String>,
    attributes: Vec<String>,
    position: Point,
    size: Size,
    source_anchor: Anchor,
    target_anchor: Anchor,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_equivalent_in_comparison: Option<bool>,
}

impl SceneNode {
    pub fn id(&self) -> Id {
        self.id
    }

    pub fn label_lines(&self) -> &[String] {
        &self.label_lines
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// `None` when no comparison is active.
    pub fn is_equivalent_in_comparison(&self) -> Option<bool> {
        self.is_equivalent_in_comparison
    }
}

/// Drawable form of one routed edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneEdge {
    id: Id,
    source_id: Id,
    target_id: Id,
    shape: ShapeClass,
    source_anchor: Anchor,
    target_anchor: Anchor,
    curvature: f32,
    path: CubicBezier,
    svg_path: String,
    label_lines: Vec<String>,
    label_position: Point,
    stroke: StrokeDefinition,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_equivalent_in_comparison: Option<bool>,
}

impl SceneEdge {
    pub fn id(&self) -> Id {
        self.id
    }

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

    pub fn path(&self) -> &CubicBezier {
        &self.path
    }

    pub fn label_lines(&self) -> &[String] {
        &self.label_lines
    }

    pub fn label_position(&self) -> Point {
        self.label_position
    }

    pub fn stroke(&self) -> &StrokeDefinition {
        &self.stroke
    }

    /// `None` when no comparison is active.
    pub fn is_equivalent_in_comparison(&self) -> Option<bool> {
        self.is_equivalent_in_comparison
    }
}

/// Drawable form of a whole document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    document_id: Id,
    name: String,
    direction: Direction,
    nodes: Vec<SceneNode>,
    edges: Vec<SceneEdge>,
}

impl Scene {
    /// Builds the scene of `document`.
    ///
    /// `comparison` holds the equivalent ids of `document` against the active
    /// comparison target, if any. Nodes without an id and edges whose
    /// endpoints are missing are left out.
    pub fn build(
        document: &GraphDocument,
        direction: Direction,
        comparison: Option<&DiffResult>,
        config: &RoutingConfig,
    ) -> Self {
        let wrap_width = config.label_wrap_width();

        let nodes: Vec<SceneNode> = document
            .nodes()
            .iter()
            .filter(|node| !node.id().is_empty())
            .map(|node| SceneNode {
                id: node.id(),
                kind: node.kind(),
                label_lines: wrap_label(node.label(), wrap_width),
                attributes: node.attributes().to_vec(),
                position: node.position(),
                size: node.size(),
                source_anchor: node.source_anchor(),
                target_anchor: node.target_anchor(),
                is_equivalent_in_comparison: comparison.map(|diff| diff.is_node_equivalent(node.id())),
            })
            .collect();

        let mut edges = Vec::with_capacity(document.edges().len());
        for edge in document.edges() {
            let endpoints = (
                document.node(edge.source_id()),
                document.node(edge.target_id()),
            );
            let (Some(source), Some(target)) = endpoints else {
                debug!(edge_id = edge.id().to_string(); "Edge with unknown endpoint left out of scene");
                continue;
            };
            if edge.id().is_empty() || source.id().is_empty() || target.id().is_empty() {
                debug!("Edge without id left out of scene");
                continue;
            }

            let route = routing::route(edge, source, target, direction, config);
            let geometry = route.geometry(source, target);
            let equivalent = comparison.map(|diff| diff.is_edge_equivalent(edge.id()));
            let stroke = match equivalent {
                None => route.emphasis().stroke(),
                Some(true) => StrokeDefinition::solid(Color::from_rgb8(0x10, 0xb9, 0x81), 4.0),
                Some(false) => StrokeDefinition::solid(Color::from_rgb8(0xef, 0x44, 0x44), 3.0)
                    .with_style(StrokeStyle::Dashed),
            };

            edges.push(SceneEdge {
                id: edge.id(),
                source_id: edge.source_id(),
                target_id: edge.target_id(),
                shape: route.shape(),
                source_anchor: route.source_anchor(),
                target_anchor: route.target_anchor(),
                curvature: route.curvature(),
                path: geometry.path,
                svg_path: geometry.path.to_svg_path(),
                label_lines: wrap_label(edge.label(), wrap_width),
                label_position: geometry.label_position,
                stroke,
                is_equivalent_in_comparison: equivalent,
            });
        }

        Self {
            document_id: document.id(),
            name: document.name().to_string(),
            direction,
            nodes,
            edges,
        }
    }

    pub fn document_id(&self) -> Id {
        self.document_id
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[SceneEdge] {
        &self.edges
    }

    pub fn node(&self, id: Id) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: Id) -> Option<&SceneEdge> {
        self.edges.iter().find(|edge| edge.id == id)
    }
}
