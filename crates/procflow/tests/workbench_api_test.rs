//! Integration tests for the Workbench API
//!
//! These tests drive the public API the way an editor front end would: load a
//! collection, request layouts, compare documents and read scenes back.

use procflow::{
    FlowError, Workbench,
    config::AppConfig,
    document::{GraphDocument, Node, NodeKind},
    geometry::{Anchor, Point},
    identifier::Id,
    layout::Direction,
    routing::ShapeClass,
};

const ASSET_TRANSFER: &str = include_str!("../../../samples/asset_transfer.json");
const SETTLEMENT_REVISIONS: &str = include_str!("../../../samples/settlement_revisions.json");

fn chain() -> GraphDocument {
    let mut doc = GraphDocument::new("chain", "Chain");
    doc.add_node(Node::new("a", NodeKind::Start, "Start")).unwrap();
    doc.add_node(Node::new("b", NodeKind::Task, "Review")).unwrap();
    doc.add_node(Node::new("c", NodeKind::End, "Done")).unwrap();
    doc.connect("e1", Id::new("a"), Id::new("b"), "Submitted").unwrap();
    doc.connect("e2", Id::new("b"), Id::new("c"), "Approved").unwrap();
    doc
}

fn settlement_workbench() -> Workbench {
    let mut workbench = Workbench::default();
    workbench.load(procflow::parse_collection(SETTLEMENT_REVISIONS).expect("valid sample"));
    workbench
}

#[test]
fn test_parse_single_document_and_collection() {
    let single = procflow::parse_collection(r#"{"id": "p1", "name": "One"}"#).unwrap();
    assert_eq!(single.len(), 1);

    let collection = procflow::parse_collection(SETTLEMENT_REVISIONS).unwrap();
    assert_eq!(collection.len(), 2);
    assert_eq!(collection[1].id(), "settlement_r2");
}

#[test]
fn test_parse_invalid_json_returns_error() {
    let result = procflow::parse_collection(r#"[{"id": "p1", "nodes": [}]"#);
    assert!(matches!(result, Err(FlowError::Parse { .. })));
}

#[test]
fn test_load_nested_label_shape() {
    let mut workbench = Workbench::new(AppConfig::default());
    workbench.load(procflow::parse_collection(ASSET_TRANSFER).unwrap());

    assert_eq!(workbench.documents().count(), 2);
    let selected = workbench.selected().expect("first document is selected");
    assert_eq!(selected.id(), "process_client_asset_transfer");

    let decision = selected.node(Id::new("TASK_002")).unwrap();
    assert_eq!(decision.kind(), NodeKind::Decision);
    assert_eq!(decision.label(), "Validate Instruction Eligibility");
    assert_eq!(decision.attributes().len(), 3);
    assert!(selected.validate().is_ok());
}

#[test]
fn test_select_unknown_document_fails() {
    let mut workbench = settlement_workbench();

    let err = workbench.select(Id::new("missing")).unwrap_err();
    assert!(matches!(err, FlowError::UnknownDocument(id) if id == "missing"));
    assert_eq!(workbench.selected_id(), Some(Id::new("settlement_r1")));
}

#[test]
fn test_layout_requests_alternate_direction() {
    let mut workbench = Workbench::default();
    workbench.load(vec![chain()]);

    assert_eq!(workbench.direction(), Direction::TopDown);
    assert_eq!(workbench.relayout(), 1);
    let doc = workbench.selected().unwrap();
    assert!(doc.nodes().iter().all(|node| node.source_anchor() == Anchor::Bottom));
    assert!(doc.nodes().iter().all(|node| node.target_anchor() == Anchor::Top));

    assert_eq!(workbench.request_layout(), Direction::LeftRight);
    assert_eq!(workbench.layout_trigger(), 1);
    let doc = workbench.selected().unwrap();
    assert!(doc.nodes().iter().all(|node| node.source_anchor() == Anchor::Right));
    assert!(doc.nodes().iter().all(|node| node.target_anchor() == Anchor::Left));

    let a = doc.node(Id::new("a")).unwrap().position();
    let b = doc.node(Id::new("b")).unwrap().position();
    assert!(a.x() < b.x());

    assert_eq!(workbench.request_layout(), Direction::TopDown);
}

#[test]
fn test_repeated_layout_reports_no_change() {
    let mut workbench = Workbench::default();
    workbench.load(vec![chain()]);

    assert_eq!(workbench.relayout(), 1);
    let first = workbench.selected().unwrap().clone();

    assert_eq!(workbench.relayout(), 0);
    assert_eq!(workbench.selected().unwrap(), &first);
}

#[test]
fn test_layout_leaves_unrelated_documents_alone() {
    let mut workbench = settlement_workbench();
    let untouched = workbench.document(Id::new("settlement_r2")).unwrap().clone();

    workbench.relayout();

    assert_eq!(workbench.document(Id::new("settlement_r2")).unwrap(), &untouched);
}

#[test]
fn test_comparison_marks_divergence() {
    let mut workbench = settlement_workbench();
    workbench
        .set_comparison_target(Some(Id::new("settlement_r2")))
        .unwrap();

    let left = workbench.diff_result().expect("comparison is active");
    for id in ["START", "MATCH", "SETTLE", "END"] {
        assert!(left.is_node_equivalent(Id::new(id)), "node {id}");
    }
    assert!(!left.is_node_equivalent(Id::new("CHECK")));
    for id in ["e1", "e2", "e3", "e6"] {
        assert!(left.is_edge_equivalent(Id::new(id)), "edge {id}");
    }
    assert!(!left.is_edge_equivalent(Id::new("e4")));
    assert!(!left.is_edge_equivalent(Id::new("e5")));

    let right = workbench.target_diff_result().unwrap();
    assert!(right.is_edge_equivalent(Id::new("x3")));
    assert!(!right.is_edge_equivalent(Id::new("x4")));
    assert!(!right.is_node_equivalent(Id::new("REVIEW")));

    let scene = workbench.comparison_scene().expect("target scene");
    let review = scene.node(Id::new("REVIEW")).unwrap();
    assert_eq!(review.is_equivalent_in_comparison(), Some(false));
}

#[test]
fn test_clearing_comparison_drops_flags() {
    let mut workbench = settlement_workbench();
    workbench
        .set_comparison_target(Some(Id::new("settlement_r2")))
        .unwrap();
    workbench.set_comparison_target(None).unwrap();

    assert!(workbench.diff_result().is_none());
    assert!(workbench.comparison_scene().is_none());

    let scene = workbench.selected_scene().unwrap();
    assert!(
        scene
            .nodes()
            .iter()
            .all(|node| node.is_equivalent_in_comparison().is_none())
    );
}

#[test]
fn test_edit_recomputes_comparison() {
    let mut workbench = settlement_workbench();
    workbench
        .set_comparison_target(Some(Id::new("settlement_r2")))
        .unwrap();

    let relabeled = workbench
        .edit(Id::new("settlement_r2"), |doc| {
            doc.relabel_node(Id::new("CHECK"), "Instructions Complete?")
        })
        .unwrap();

    assert!(relabeled);
    assert!(workbench.diff_result().unwrap().is_node_equivalent(Id::new("CHECK")));
}

#[test]
fn test_edit_unknown_document_fails() {
    let mut workbench = settlement_workbench();
    let result = workbench.edit(Id::new("missing"), |doc| doc.remove_last_edge());
    assert!(matches!(result, Err(FlowError::UnknownDocument(_))));
}

#[test]
fn test_replace_document() {
    let mut workbench = settlement_workbench();
    let mut doc = workbench.selected().unwrap().clone();
    doc.move_node(Id::new("END"), Point::new(900.0, 900.0));

    workbench.replace_document(doc).unwrap();

    let end = workbench.selected().unwrap().node(Id::new("END")).unwrap();
    assert_eq!(end.position(), Point::new(900.0, 900.0));
    assert!(matches!(
        workbench.replace_document(GraphDocument::new("other", "Other")),
        Err(FlowError::UnknownDocument(_))
    ));
}

#[test]
fn test_reprocess_self_loop_scene() {
    let mut workbench = settlement_workbench();
    workbench.relayout();

    let scene = workbench.selected_scene().unwrap();
    let reprocess = scene.edge(Id::new("e5")).unwrap();

    assert_eq!(reprocess.shape(), ShapeClass::Loop);
    assert_eq!(reprocess.source_anchor(), Anchor::Right);
    assert_eq!(reprocess.target_anchor(), Anchor::Top);
    assert_eq!(
        reprocess.label_lines(),
        ["Failed or", "Partial", "Settlement -", "Reprocess"]
    );
}

#[test]
fn test_rework_loop_returns_upstream() {
    let mut workbench = Workbench::default();
    workbench.load(procflow::parse_collection(ASSET_TRANSFER).unwrap());
    workbench.relayout();

    let scene = workbench.selected_scene().unwrap();
    let y = |id: &str| scene.node(Id::new(id)).unwrap().position().y();
    assert!(y("START_EVENT_001") < y("TASK_001"));
    assert!(y("TASK_001") < y("TASK_002"));
    assert!(y("TASK_002") < y("TASK_003"));

    let logged = scene.edge(Id::new("e2")).unwrap();
    assert_eq!(logged.shape(), ShapeClass::Bezier);
    let rework = scene.edge(Id::new("e4")).unwrap();
    assert_eq!(rework.shape(), ShapeClass::ReverseArc);
    assert_eq!(rework.stroke().color().to_string(), "#ff0000");
}

#[test]
fn test_export_round_trip() {
    let mut workbench = settlement_workbench();
    workbench.relayout();

    let json = workbench.export_json().unwrap();
    assert!(json.contains("\n  {"), "export is pretty-printed");

    let reloaded = procflow::parse_collection(&json).unwrap();
    assert_eq!(reloaded.len(), 2);
    assert_eq!(&reloaded[0], workbench.document(Id::new("settlement_r1")).unwrap());
}
