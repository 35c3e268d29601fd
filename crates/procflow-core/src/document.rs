//! The process graph document model.
//!
//! A [`GraphDocument`] is a plain snapshot of one process: its [`Node`]s
//! (steps, decisions, start/end events) and [`Edge`]s (transitions). The JSON
//! shape accepted here is the one the editing collaborator exchanges, including
//! a few legacy spellings (`type`, `startEvent`, `entity`, `source`, `meta`,
//! `sourcePosition`, and a nested `data` object for node labels).
//!
//! Positions and anchor sides are owned by the layout engine; everything else
//! is owned by whoever edits the document.

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{
    geometry::{Anchor, Bounds, Point, Size},
    identifier::Id,
};

/// Structural problems found by [`GraphDocument::validate`] or rejected by
/// the editing operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("node at index {index} has no id")]
    MissingNodeId { index: usize },

    #[error("duplicate node id `{0}`")]
    DuplicateNode(Id),

    #[error("edge at index {index} has no id")]
    MissingEdgeId { index: usize },

    #[error("edge `{edge}` references unknown node `{endpoint}`")]
    DanglingEdge { edge: Id, endpoint: Id },

    #[error("unknown node `{0}`")]
    UnknownNode(Id),
}

/// The kind of process step a node represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[serde(alias = "startEvent")]
    Start,
    #[serde(alias = "endEvent")]
    End,
    Decision,
    #[default]
    #[serde(alias = "entity")]
    Task,
}

impl NodeKind {
    /// Rendered footprint of a node of this kind.
    ///
    /// This is the single kind-to-size lookup; layout and routing both go
    /// through it (via [`Node::size`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow_core::document::NodeKind;
    /// use procflow_core::geometry::Size;
    ///
    /// assert_eq!(NodeKind::Decision.footprint(false), Size::new(240.0, 240.0));
    /// assert_eq!(NodeKind::Decision.footprint(true), Size::new(160.0, 160.0));
    /// assert_eq!(NodeKind::Task.footprint(true), Size::new(192.0, 80.0));
    /// ```
    pub fn footprint(self, collapsed: bool) -> Size {
        match (self, collapsed) {
            (Self::Decision, false) => Size::new(240.0, 240.0),
            (Self::Decision, true) => Size::new(160.0, 160.0),
            (Self::Start | Self::End | Self::Task, _) => Size::new(192.0, 80.0),
        }
    }

    pub fn is_decision(self) -> bool {
        self == Self::Decision
    }
}

/// A single process step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "NodeRepr")]
pub struct Node {
    id: Id,
    kind: NodeKind,
    label: String,
    attributes: Vec<String>,

    /// Top-left corner of the node box.
    position: Point,

    /// Explicit size; the kind's footprint is used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<Size>,

    #[serde(skip_serializing_if = "is_false")]
    collapsed: bool,

    source_anchor: Anchor,
    target_anchor: Anchor,
}

/// Accepted JSON shape of a node.
///
/// Older exports nest the label and attributes under `data`; top-level values
/// win when both are present.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRepr {
    #[serde(default)]
    id: Id,

    #[serde(default, alias = "type")]
    kind: NodeKind,

    #[serde(default, deserialize_with = "string_or_null")]
    label: String,

    #[serde(default)]
    attributes: Vec<String>,

    #[serde(default)]
    data: Option<NodeData>,

    #[serde(default)]
    position: Point,

    #[serde(default)]
    size: Option<Size>,

    #[serde(default)]
    collapsed: bool,

    #[serde(default = "default_source_anchor", alias = "sourcePosition")]
    source_anchor: Anchor,

    #[serde(default = "default_target_anchor", alias = "targetPosition")]
    target_anchor: Anchor,
}

#[derive(Deserialize)]
struct NodeData {
    #[serde(default, deserialize_with = "string_or_null")]
    label: String,

    #[serde(default)]
    attributes: Vec<String>,
}

impl From<NodeRepr> for Node {
    fn from(repr: NodeRepr) -> Self {
        let mut label = repr.label;
        let mut attributes = repr.attributes;
        if let Some(data) = repr.data {
            if label.is_empty() {
                label = data.label;
            }
            if attributes.is_empty() {
                attributes = data.attributes;
            }
        }

        Self {
            id: repr.id,
            kind: repr.kind,
            label,
            attributes,
            position: repr.position,
            size: repr.size,
            collapsed: repr.collapsed,
            source_anchor: repr.source_anchor,
            target_anchor: repr.target_anchor,
        }
    }
}

impl Node {
    /// Creates a node at the origin with default anchors (bottom/top).
    pub fn new(id: impl Into<Id>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            label: label.into(),
            attributes: Vec::new(),
            position: Point::default(),
            size: None,
            collapsed: false,
            source_anchor: default_source_anchor(),
            target_anchor: default_target_anchor(),
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn with_anchors(mut self, source: Anchor, target: Anchor) -> Self {
        self.source_anchor = source;
        self.target_anchor = target;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// Rendered size: the explicit size if set, else the kind's footprint.
    pub fn size(&self) -> Size {
        self.size
            .unwrap_or_else(|| self.kind.footprint(self.collapsed))
    }

    /// The node box in document coordinates.
    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(self.position, self.size())
    }

    pub fn source_anchor(&self) -> Anchor {
        self.source_anchor
    }

    pub fn target_anchor(&self) -> Anchor {
        self.target_anchor
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn set_anchors(&mut self, source: Anchor, target: Anchor) {
        self.source_anchor = source;
        self.target_anchor = target;
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_attributes(&mut self, attributes: Vec<String>) {
        self.attributes = attributes;
    }

    /// Changes the kind; a node without an explicit size takes the new kind's footprint.
    pub fn set_kind(&mut self, kind: NodeKind) {
        self.kind = kind;
    }
}

/// Explicit branch tag of an edge leaving a decision node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchKind {
    Affirmative,
    Negative,
    Exception,
    Other,
}

/// Semantic flags of a transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSemantics {
    #[serde(default)]
    conditional: bool,

    #[serde(default)]
    exception: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    branch: Option<BranchKind>,
}

impl EdgeSemantics {
    pub fn new(conditional: bool, exception: bool) -> Self {
        Self {
            conditional,
            exception,
            branch: None,
        }
    }

    /// Semantics for an edge drawn interactively from a node of `source_kind`.
    ///
    /// Edges leaving a decision are conditional; labels mentioning
    /// "exception" or "incomplete" mark the exception path.
    ///
    /// # Examples
    ///
    /// ```
    /// use procflow_core::document::{EdgeSemantics, NodeKind};
    ///
    /// let semantics = EdgeSemantics::infer(NodeKind::Decision, "Incomplete info");
    /// assert!(semantics.is_conditional());
    /// assert!(semantics.is_exception());
    /// ```
    pub fn infer(source_kind: NodeKind, label: &str) -> Self {
        let label = label.to_lowercase();
        Self::new(
            source_kind.is_decision(),
            label.contains("exception") || label.contains("incomplete"),
        )
    }

    pub fn with_branch(mut self, branch: BranchKind) -> Self {
        self.branch = Some(branch);
        self
    }

    pub fn is_conditional(&self) -> bool {
        self.conditional
    }

    pub fn is_exception(&self) -> bool {
        self.exception
    }

    pub fn branch(&self) -> Option<BranchKind> {
        self.branch
    }
}

/// A transition between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    #[serde(default)]
    id: Id,

    #[serde(default, alias = "source")]
    source_id: Id,

    #[serde(default, alias = "target")]
    target_id: Id,

    #[serde(default, deserialize_with = "string_or_null")]
    label: String,

    #[serde(default, alias = "meta")]
    semantics: EdgeSemantics,
}

impl Edge {
    pub fn new(
        id: impl Into<Id>,
        source_id: impl Into<Id>,
        target_id: impl Into<Id>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            label: label.into(),
            semantics: EdgeSemantics::default(),
        }
    }

    pub fn with_semantics(mut self, semantics: EdgeSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn source_id(&self) -> Id {
        self.source_id
    }

    pub fn target_id(&self) -> Id {
        self.target_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn semantics(&self) -> EdgeSemantics {
        self.semantics
    }

    pub fn is_self_loop(&self) -> bool {
        self.source_id == self.target_id
    }

    /// Returns true if either endpoint is `node_id`.
    pub fn touches(&self, node_id: Id) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }
}

/// One process graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    id: Id,

    #[serde(default)]
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,

    #[serde(default)]
    nodes: Vec<Node>,

    #[serde(default)]
    edges: Vec<Edge>,
}

impl GraphDocument {
    /// Creates an empty document.
    pub fn new(id: impl Into<Id>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: Id) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn edge(&self, id: Id) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Adds a node.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::DuplicateNode`] if a node with the same id
    /// already exists.
    pub fn add_node(&mut self, node: Node) -> Result<(), DocumentError> {
        if self.node(node.id).is_some() {
            return Err(DocumentError::DuplicateNode(node.id));
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Adds an edge between two existing nodes.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::DanglingEdge`] if either endpoint is unknown.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), DocumentError> {
        for endpoint in [edge.source_id, edge.target_id] {
            if self.node(endpoint).is_none() {
                return Err(DocumentError::DanglingEdge {
                    edge: edge.id,
                    endpoint,
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Adds an edge the way an interactive connect gesture does: semantics are
    /// inferred from the source node kind and the label.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnknownNode`] if the source is unknown, or
    /// [`DocumentError::DanglingEdge`] if the target is.
    pub fn connect(
        &mut self,
        id: impl Into<Id>,
        source: Id,
        target: Id,
        label: impl Into<String>,
    ) -> Result<(), DocumentError> {
        let source_kind = self
            .node(source)
            .map(Node::kind)
            .ok_or(DocumentError::UnknownNode(source))?;
        let label = label.into();
        let semantics = EdgeSemantics::infer(source_kind, &label);
        self.add_edge(Edge::new(id, source, target, label).with_semantics(semantics))
    }

    /// Removes a node and every edge touching it.
    pub fn remove_node(&mut self, id: Id) -> Option<Node> {
        let index = self.nodes.iter().position(|node| node.id == id)?;
        let node = self.nodes.remove(index);

        let before = self.edges.len();
        self.edges.retain(|edge| !edge.touches(id));
        debug!(
            node_id = id.to_string(),
            removed_edges = before - self.edges.len();
            "Removed node"
        );

        Some(node)
    }

    /// Removes a single edge.
    pub fn remove_edge(&mut self, id: Id) -> Option<Edge> {
        let index = self.edges.iter().position(|edge| edge.id == id)?;
        Some(self.edges.remove(index))
    }

    /// Removes the most recently added edge.
    pub fn remove_last_edge(&mut self) -> Option<Edge> {
        self.edges.pop()
    }

    /// Moves a node (drag). Returns false if the node is unknown.
    pub fn move_node(&mut self, id: Id, position: Point) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Changes a node label. Returns false if the node is unknown.
    pub fn relabel_node(&mut self, id: Id, label: impl Into<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.set_label(label);
                true
            }
            None => false,
        }
    }

    /// Replaces the attribute lines of a node. Returns false if the node is unknown.
    pub fn set_node_attributes(&mut self, id: Id, attributes: Vec<String>) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.set_attributes(attributes);
                true
            }
            None => false,
        }
    }

    /// Changes the kind of a node. Returns false if the node is unknown.
    pub fn set_node_kind(&mut self, id: Id, kind: NodeKind) -> bool {
        match self.node_mut(id) {
            Some(node) => {
                node.set_kind(kind);
                true
            }
            None => false,
        }
    }

    /// Checks the structural preconditions layout and routing assume.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: a missing or duplicate node id, a
    /// missing edge id, or an edge pointing at an unknown node.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let mut seen = std::collections::HashSet::new();
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.is_empty() {
                return Err(DocumentError::MissingNodeId { index });
            }
            if !seen.insert(node.id) {
                return Err(DocumentError::DuplicateNode(node.id));
            }
        }

        for (index, edge) in self.edges.iter().enumerate() {
            if edge.id.is_empty() {
                return Err(DocumentError::MissingEdgeId { index });
            }
            for endpoint in [edge.source_id, edge.target_id] {
                if !seen.contains(&endpoint) {
                    return Err(DocumentError::DanglingEdge {
                        edge: edge.id,
                        endpoint,
                    });
                }
            }
        }

        Ok(())
    }
}

fn default_source_anchor() -> Anchor {
    Anchor::Bottom
}

fn default_target_anchor() -> Anchor {
    Anchor::Top
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Absent, `null` and cancelled labels all read as the empty string.
fn string_or_null<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
