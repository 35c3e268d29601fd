//! Example: Laying out and comparing documents built in code
//!
//! This example builds two revisions of a small approval process with the
//! document API, lays them out, compares them and prints the scene JSON.

use procflow::{
    Workbench,
    config::AppConfig,
    document::{GraphDocument, Node, NodeKind},
    identifier::Id,
};

fn approval(id: &str, review_label: &str) -> Result<GraphDocument, Box<dyn std::error::Error>> {
    let mut doc = GraphDocument::new(id, "Expense Approval")
        .with_description("Expense claims above the delegated limit");

    doc.add_node(Node::new("submit", NodeKind::Start, "Claim Submitted"))?;
    doc.add_node(
        Node::new("review", NodeKind::Decision, review_label)
            .with_attributes(vec!["Lane: Line Manager".to_string()]),
    )?;
    doc.add_node(Node::new("pay", NodeKind::Task, "Reimburse Employee"))?;
    doc.add_node(Node::new("done", NodeKind::End, "Claim Closed"))?;

    // Semantics are inferred from the source kind, as an editor would on connect
    doc.connect("e1", Id::new("submit"), Id::new("review"), "Submitted")?;
    doc.connect("e2", Id::new("review"), Id::new("pay"), "Yes")?;
    doc.connect("e3", Id::new("review"), Id::new("submit"), "No - Missing Receipts")?;
    doc.connect("e4", Id::new("pay"), Id::new("done"), "Paid")?;

    Ok(doc)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Building two revisions of an approval process...\n");

    let current = approval("approval_v1", "Within Policy?")?;
    let proposed = approval("approval_v2", "Within Policy and Budget?")?;

    let mut workbench = Workbench::new(AppConfig::default());
    workbench.load(vec![current, proposed]);
    workbench.set_comparison_target(Some(Id::new("approval_v2")))?;

    // Initial pass runs top-down; the next request switches to left-right
    let changed = workbench.relayout();
    println!("Top-down layout changed {changed} document(s)");
    let direction = workbench.request_layout();
    println!("Switched to {direction} layout\n");

    if let Some(diff) = workbench.diff_result() {
        println!(
            "Equivalent nodes: {:?}",
            diff.equivalent_node_ids()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );
        println!(
            "Equivalent edges: {:?}\n",
            diff.equivalent_edge_ids()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );
    }

    if let Some(scene) = workbench.selected_scene() {
        println!("{}", serde_json::to_string_pretty(&scene)?);
    }

    Ok(())
}
