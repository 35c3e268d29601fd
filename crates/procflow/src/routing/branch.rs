//! Branch classification of edges leaving decision nodes.

use procflow_core::document::{BranchKind, Edge};

const AFFIRMATIVE_WORDS: &[&str] = &["yes", "ok", "confirmed"];
const NEGATIVE_WORDS: &[&str] = &["no", "retry"];

/// Classifies a decision branch.
///
/// An explicit branch tag on the edge wins. Otherwise the exception flag, then
/// case-insensitive substrings of the label decide. Affirmative words are
/// checked before negative ones, so "not ok" is affirmative.
pub fn classify(edge: &Edge) -> BranchKind {
    let semantics = edge.semantics();
    if let Some(branch) = semantics.branch() {
        return branch;
    }
    if semantics.is_exception() {
        return BranchKind::Exception;
    }

    let label = edge.label().to_lowercase();
    if AFFIRMATIVE_WORDS.iter().any(|word| label.contains(word)) {
        BranchKind::Affirmative
    } else if NEGATIVE_WORDS.iter().any(|word| label.contains(word)) {
        BranchKind::Negative
    } else {
        BranchKind::Other
    }
}

#[cfg(test)]
mod tests {
    use procflow_core::document::EdgeSemantics;

    use super::*;

    fn labeled(label: &str) -> Edge {
        Edge::new("e", "d", "t", label)
    }

    #[test]
    fn test_label_heuristic() {
        assert_eq!(classify(&labeled("Yes")), BranchKind::Affirmative);
        assert_eq!(classify(&labeled("Documents OK")), BranchKind::Affirmative);
        assert_eq!(classify(&labeled("Confirmed")), BranchKind::Affirmative);
        assert_eq!(classify(&labeled("No")), BranchKind::Negative);
        assert_eq!(classify(&labeled("Retry later")), BranchKind::Negative);
        assert_eq!(classify(&labeled("Escalate")), BranchKind::Other);
        assert_eq!(classify(&labeled("")), BranchKind::Other);
    }

    #[test]
    fn test_exception_flag_beats_label() {
        let edge = labeled("Yes").with_semantics(EdgeSemantics::new(true, true));
        assert_eq!(classify(&edge), BranchKind::Exception);
    }

    #[test]
    fn test_explicit_tag_beats_everything() {
        let edge = labeled("Yes")
            .with_semantics(EdgeSemantics::new(true, true).with_branch(BranchKind::Negative));
        assert_eq!(classify(&edge), BranchKind::Negative);
    }
}
