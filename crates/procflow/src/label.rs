//! Label line wrapping.

/// Wraps `label` into lines of at most `width` characters.
///
/// Labels that already fit are returned as a single line. Longer labels are
/// wrapped greedily on whitespace; words are never split, so a word longer
/// than `width` sits alone on its own line. An empty label has no lines.
///
/// # Examples
///
/// ```
/// use procflow::label::wrap_label;
///
/// assert_eq!(
///     wrap_label("Failed or Partial Settlement - Reprocess", 15),
///     ["Failed or", "Partial", "Settlement -", "Reprocess"]
/// );
/// assert_eq!(wrap_label("Approve", 15), ["Approve"]);
/// assert!(wrap_label("", 15).is_empty());
/// ```
pub fn wrap_label(label: &str, width: usize) -> Vec<String> {
    if label.is_empty() {
        return Vec::new();
    }
    if label.chars().count() <= width {
        return vec![label.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in label.split_whitespace() {
        let word_len = word.chars().count();
        if current.is_empty() {
            current.push_str(word);
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_len = word_len;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    lines
}
