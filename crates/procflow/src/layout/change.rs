//! Material change detection for layout results.

use procflow_core::document::Node;

use super::LayoutResult;

/// Position deltas up to this many units, on either axis, are not material.
pub const POSITION_TOLERANCE: f32 = 1.0;

/// Returns true if applying `layout` would visibly change any of `old_nodes`.
///
/// A node changes materially when its position moves by more than
/// [`POSITION_TOLERANCE`] on either axis, or when either anchor side differs.
/// Nodes missing from `layout` never count as changed.
pub fn has_material_change(old_nodes: &[Node], layout: &LayoutResult) -> bool {
    old_nodes.iter().any(|node| {
        layout.get(node.id()).is_some_and(|placement| {
            !node
                .position()
                .is_close_to(placement.position(), POSITION_TOLERANCE)
                || node.source_anchor() != placement.source_anchor()
                || node.target_anchor() != placement.target_anchor()
        })
    })
}
