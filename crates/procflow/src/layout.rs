//! Automatic layout of process documents.
//!
//! [`layout`] runs the rank layout adapter over a document's nodes and edges
//! and returns a [`LayoutResult`]: a position and a pair of default anchor
//! sides per node. [`apply_layout`] writes such a result back into a document,
//! but only when [`change::has_material_change`] says the geometry actually
//! moved. That check is what makes a layout triggered by its own mutation
//! terminate.

pub mod change;
mod rank;

use std::fmt;

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use procflow_core::{
    document::{Edge, GraphDocument, Node},
    geometry::{Anchor, Point},
    identifier::Id,
};

use crate::config::LayoutConfig;

/// Flow direction of a layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    TopDown,
    LeftRight,
}

impl Direction {
    /// Direction selected by a layout trigger counter value.
    ///
    /// Even values lay out top-down, odd values left-right.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow::layout::Direction;
    ///
    /// assert_eq!(Direction::from_trigger(0), Direction::TopDown);
    /// assert_eq!(Direction::from_trigger(7), Direction::LeftRight);
    /// ```
    pub fn from_trigger(trigger: u64) -> Self {
        if trigger % 2 == 0 {
            Self::TopDown
        } else {
            Self::LeftRight
        }
    }

    pub fn is_top_down(self) -> bool {
        self == Self::TopDown
    }

    /// Default `(source, target)` anchor sides for nodes laid out in this direction.
    pub fn anchors(self) -> (Anchor, Anchor) {
        match self {
            Self::TopDown => (Anchor::Bottom, Anchor::Top),
            Self::LeftRight => (Anchor::Right, Anchor::Left),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TopDown => f.write_str("top-down"),
            Self::LeftRight => f.write_str("left-right"),
        }
    }
}

/// Geometry assigned to one node by a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePlacement {
    position: Point,
    source_anchor: Anchor,
    target_anchor: Anchor,
}

impl NodePlacement {
    pub fn new(position: Point, source_anchor: Anchor, target_anchor: Anchor) -> Self {
        Self {
            position,
            source_anchor,
            target_anchor,
        }
    }

    /// Top-left corner of the node box.
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn source_anchor(&self) -> Anchor {
        self.source_anchor
    }

    pub fn target_anchor(&self) -> Anchor {
        self.target_anchor
    }
}

/// Result of one layout pass, keyed by node id in document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutResult {
    direction: Direction,
    placements: IndexMap<Id, NodePlacement>,
}

impl LayoutResult {
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn get(&self, id: Id) -> Option<&NodePlacement> {
        self.placements.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, &NodePlacement)> {
        self.placements.iter().map(|(id, placement)| (*id, placement))
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// Lays out `nodes` and `edges` in the given direction.
///
/// Nodes or edges without an id, and edges whose endpoints are not among
/// `nodes`, are ignored. Every remaining node receives a placement whose
/// anchors are the direction's defaults. An empty node list yields an empty
/// result.
pub fn layout(
    nodes: &[Node],
    edges: &[Edge],
    direction: Direction,
    config: &LayoutConfig,
) -> LayoutResult {
    let positions = rank::RankGraph::new(nodes, edges).positions(direction, config);

    let (source_anchor, target_anchor) = direction.anchors();
    let placements = positions
        .into_iter()
        .map(|(id, position)| (id, NodePlacement::new(position, source_anchor, target_anchor)))
        .collect();

    LayoutResult {
        direction,
        placements,
    }
}

/// Writes a layout result into a copy of `document`.
///
/// Returns `None` when the layout does not differ materially from the
/// document's current geometry; the document is then left as it is.
pub fn apply_layout(document: &GraphDocument, layout: &LayoutResult) -> Option<GraphDocument> {
    if !change::has_material_change(document.nodes(), layout) {
        debug!(
            document_id = document.id().to_string();
            "Layout produced no material change, discarding"
        );
        return None;
    }

    let mut updated = document.clone();
    for (id, placement) in layout.iter() {
        if let Some(node) = updated.node_mut(id) {
            node.set_position(placement.position());
            node.set_anchors(placement.source_anchor(), placement.target_anchor());
        }
    }

    info!(
        document_id = document.id().to_string(),
        direction = layout.direction().to_string(),
        nodes_count = layout.len();
        "Layout applied"
    );
    Some(updated)
}
