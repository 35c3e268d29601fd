//! Structural comparison of two process documents.
//!
//! Two nodes are equivalent when they share an id and their labels match
//! after trimming and case folding. Two edges are equivalent when they connect
//! the same source and target ids with matching labels; edge ids play no part.
//!
//! The equivalence relation is computed once by [`Comparison::new`] as a set
//! of `(left, right)` id pairs. Each comparison pane projects its own side out
//! of it, so both panes always agree on what matches.

use std::collections::HashMap;

use indexmap::IndexSet;
use log::debug;
use serde::Serialize;

use procflow_core::{
    document::{Edge, GraphDocument},
    identifier::Id,
};

/// Ids of the nodes and edges of one document that have an equivalent in the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    equivalent_node_ids: IndexSet<Id>,
    equivalent_edge_ids: IndexSet<Id>,
}

impl DiffResult {
    pub fn equivalent_node_ids(&self) -> &IndexSet<Id> {
        &self.equivalent_node_ids
    }

    pub fn equivalent_edge_ids(&self) -> &IndexSet<Id> {
        &self.equivalent_edge_ids
    }

    pub fn is_node_equivalent(&self, id: Id) -> bool {
        self.equivalent_node_ids.contains(&id)
    }

    pub fn is_edge_equivalent(&self, id: Id) -> bool {
        self.equivalent_edge_ids.contains(&id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct EdgeKey {
    source: Id,
    target: Id,
    label: String,
}

impl EdgeKey {
    fn of(edge: &Edge) -> Self {
        Self {
            source: edge.source_id(),
            target: edge.target_id(),
            label: normalize(edge.label()),
        }
    }
}

/// Equivalence relation between the nodes and edges of two documents.
#[derive(Debug, Clone, Default)]
pub struct Comparison {
    node_pairs: Vec<(Id, Id)>,
    edge_pairs: Vec<(Id, Id)>,
}

impl Comparison {
    /// Computes the equivalence relation between `left` and `right`.
    ///
    /// Entries without an id never match.
    pub fn new(left: &GraphDocument, right: &GraphDocument) -> Self {
        let mut right_labels: HashMap<Id, String> = HashMap::new();
        for node in right.nodes().iter().filter(|node| !node.id().is_empty()) {
            right_labels
                .entry(node.id())
                .or_insert_with(|| normalize(node.label()));
        }

        let node_pairs: Vec<(Id, Id)> = left
            .nodes()
            .iter()
            .filter(|node| !node.id().is_empty())
            .filter(|node| right_labels.get(&node.id()) == Some(&normalize(node.label())))
            .map(|node| (node.id(), node.id()))
            .collect();

        let mut right_edges: HashMap<EdgeKey, Vec<Id>> = HashMap::new();
        for edge in right.edges().iter().filter(|edge| !edge.id().is_empty()) {
            right_edges.entry(EdgeKey::of(edge)).or_default().push(edge.id());
        }

        let edge_pairs: Vec<(Id, Id)> = left
            .edges()
            .iter()
            .filter(|edge| !edge.id().is_empty())
            .flat_map(|edge| {
                right_edges
                    .get(&EdgeKey::of(edge))
                    .into_iter()
                    .flatten()
                    .map(move |right_id| (edge.id(), *right_id))
            })
            .collect();

        debug!(
            left_document = left.id().to_string(),
            right_document = right.id().to_string(),
            node_pairs = node_pairs.len(),
            edge_pairs = edge_pairs.len();
            "Documents compared"
        );

        Self {
            node_pairs,
            edge_pairs,
        }
    }

    /// Equivalent ids in the left document's id space.
    pub fn left(&self) -> DiffResult {
        DiffResult {
            equivalent_node_ids: self.node_pairs.iter().map(|(left, _)| *left).collect(),
            equivalent_edge_ids: self.edge_pairs.iter().map(|(left, _)| *left).collect(),
        }
    }

    /// Equivalent ids in the right document's id space.
    pub fn right(&self) -> DiffResult {
        DiffResult {
            equivalent_node_ids: self.node_pairs.iter().map(|(_, right)| *right).collect(),
            equivalent_edge_ids: self.edge_pairs.iter().map(|(_, right)| *right).collect(),
        }
    }
}

/// Compares `a` against `b`, returning equivalent ids from `a`.
pub fn diff(a: &GraphDocument, b: &GraphDocument) -> DiffResult {
    Comparison::new(a, b).left()
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use procflow_core::document::{Node, NodeKind};

    use super::*;

    fn transfer() -> GraphDocument {
        let mut doc = GraphDocument::new("P1", "Transfer");
        doc.add_node(Node::new("A", NodeKind::Start, "Start")).unwrap();
        doc.add_node(Node::new("B", NodeKind::Decision, "Validate")).unwrap();
        doc.add_node(Node::new("C", NodeKind::End, "Done")).unwrap();
        doc.add_edge(Edge::new("e1", "A", "B", "Submit")).unwrap();
        doc.add_edge(Edge::new("e2", "B", "C", "Yes")).unwrap();
        doc
    }

    #[test]
    fn test_identical_documents_are_fully_equivalent() {
        let doc = transfer();
        let result = diff(&doc, &doc);

        assert_eq!(result.equivalent_node_ids().len(), 3);
        assert_eq!(result.equivalent_edge_ids().len(), 2);
    }

    #[test]
    fn test_labels_are_normalized() {
        let a = transfer();
        let mut b = transfer();
        b.relabel_node(Id::new("B"), "  VALIDATE ");

        assert!(diff(&a, &b).is_node_equivalent(Id::new("B")));
    }

    #[test]
    fn test_relabelled_node_diverges() {
        let a = transfer();
        let mut b = transfer();
        b.relabel_node(Id::new("B"), "Verify");

        let result = diff(&a, &b);
        assert!(!result.is_node_equivalent(Id::new("B")));
        assert!(result.is_node_equivalent(Id::new("A")));
        assert!(result.is_node_equivalent(Id::new("C")));
    }

    #[test]
    fn test_edges_match_by_triple_not_id() {
        let a = transfer();
        let mut b = GraphDocument::new("P2", "Transfer v2");
        b.add_node(Node::new("A", NodeKind::Start, "Start")).unwrap();
        b.add_node(Node::new("B", NodeKind::Decision, "Validate")).unwrap();
        b.add_node(Node::new("C", NodeKind::End, "Done")).unwrap();
        b.add_edge(Edge::new("x1", "A", "B", "submit ")).unwrap();
        b.add_edge(Edge::new("x2", "B", "A", "No")).unwrap();

        let comparison = Comparison::new(&a, &b);
        let left = comparison.left();
        let right = comparison.right();

        assert!(left.is_edge_equivalent(Id::new("e1")));
        assert!(!left.is_edge_equivalent(Id::new("e2")));
        assert!(right.is_edge_equivalent(Id::new("x1")));
        assert!(!right.is_edge_equivalent(Id::new("x2")));
    }

    #[test]
    fn test_projections_agree_across_directions() {
        let a = transfer();
        let mut b = transfer();
        b.relabel_node(Id::new("C"), "Closed");
        b.remove_edge(Id::new("e2"));

        let forward = Comparison::new(&a, &b);
        let backward = Comparison::new(&b, &a);

        assert_eq!(forward.left(), backward.right());
        assert_eq!(forward.right(), backward.left());
    }

    #[test]
    fn test_missing_ids_never_match() {
        let json = r#"{"id": "p", "nodes": [{"label": "x"}], "edges": []}"#;
        let doc: GraphDocument = serde_json::from_str(json).unwrap();

        assert!(diff(&doc, &doc).equivalent_node_ids().is_empty());
    }

    #[test]
    fn test_empty_documents() {
        let empty = GraphDocument::new("p", "Empty");
        assert_eq!(diff(&empty, &transfer()), DiffResult::default());
    }
}
