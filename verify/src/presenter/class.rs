use formdom::{Document, NodeId};

/// Add `class` to `el` when failing, remove it when passing.
///
/// `class` may hold several whitespace-separated tokens. Adding a token that
/// is already present, or removing one that is absent, changes nothing.
/// Removal collapses leftover whitespace.
pub fn toggle_error_class(doc: &mut Document, el: NodeId, class: Option<&str>, failed: bool) {
    let Some(class) = class else {
        return;
    };
    let tokens: Vec<&str> = class.split_whitespace().collect();
    let Some(current) = doc.class_name(el) else {
        return;
    };
    if tokens.is_empty() {
        return;
    }

    let present: Vec<&str> = current.split_whitespace().collect();
    let next = if failed {
        let missing: Vec<&str> = tokens
            .iter()
            .copied()
            .filter(|t| !present.contains(t))
            .collect();
        if missing.is_empty() {
            return;
        }
        present
            .iter()
            .chain(missing.iter())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        if !tokens.iter().any(|t| present.contains(t)) {
            return;
        }
        present
            .iter()
            .copied()
            .filter(|c| !tokens.contains(c))
            .collect::<Vec<_>>()
            .join(" ")
    };
    doc.set_class_name(el, next);
}
