//! Document queries used by the binder and the presenter.

use formdom::{Document, NodeId, Selector};

/// Attribute carrying a value for hosts that are not native form controls.
pub const VERIFY_VAL: &str = "data-verify-val";

const FORM_TAGS: [&str; 2] = ["input", "textarea"];

/// Whether `el` is an `input`/`textarea` or contains one.
pub fn is_form_control(doc: &Document, el: NodeId) -> bool {
    doc.tag(el).is_some_and(|tag| FORM_TAGS.contains(&tag))
        || doc
            .descendants(el)
            .into_iter()
            .any(|n| doc.tag(n).is_some_and(|tag| FORM_TAGS.contains(&tag)))
}

/// The element whose value is validated: the first descendant `input`, else
/// the first descendant `textarea`, else `el` itself.
pub fn input_element(doc: &Document, el: NodeId) -> NodeId {
    let descendants = doc.descendants(el);
    FORM_TAGS
        .iter()
        .find_map(|&tag| descendants.iter().copied().find(|&n| doc.tag(n) == Some(tag)))
        .unwrap_or(el)
}

/// The value to validate for `input`.
///
/// `data-verify-val` wins when it is set to something other than `"null"`,
/// `"undefined"` or the empty string.
pub fn effective_value(doc: &Document, input: NodeId) -> String {
    match doc.attribute(input, VERIFY_VAL) {
        Some(v) if !matches!(v, "" | "null" | "undefined") => v.to_string(),
        _ => doc.value(input).unwrap_or_default().to_string(),
    }
}

/// Find the element matching `selector` closest to `start`.
///
/// Walks up from `start`; at each ancestor, searches that ancestor's
/// descendants and returns the first match. Stops at the document root, so
/// an unmatched selector yields `None`.
pub fn resolve_ancestor_match(doc: &Document, start: NodeId, selector: &str) -> Option<NodeId> {
    let selector = match Selector::parse(selector) {
        Ok(selector) => selector,
        Err(e) => {
            log::warn!("error target: {e}");
            return None;
        }
    };
    doc.ancestors(start)
        .find_map(|ancestor| doc.select(ancestor, &selector))
}

#[cfg(test)]
mod tests {
    use formdom::Element;

    use super::*;

    #[test]
    fn test_form_control_detection() {
        let mut doc = Document::new();
        let wrapper = doc.append(
            doc.root(),
            Element::div().child(Element::textarea("")).child(Element::input("")),
        );
        let custom = doc.append(doc.root(), Element::div().child(Element::span()));

        assert!(is_form_control(&doc, wrapper));
        assert!(!is_form_control(&doc, custom));

        let input = input_element(&doc, wrapper);
        assert_eq!(doc.tag(input), Some("input"));
        assert_eq!(input_element(&doc, custom), custom);
    }

    #[test]
    fn test_effective_value_prefers_attribute() {
        let mut doc = Document::new();
        let el = doc.append(doc.root(), Element::input("native"));
        assert_eq!(effective_value(&doc, el), "native");

        for ignored in ["", "null", "undefined"] {
            doc.set_attribute(el, VERIFY_VAL, ignored);
            assert_eq!(effective_value(&doc, el), "native");
        }

        doc.set_attribute(el, VERIFY_VAL, "5");
        assert_eq!(effective_value(&doc, el), "5");
    }

    #[test]
    fn test_resolve_ancestor_match_walks_up() {
        let mut doc = Document::new();
        let form = doc.append(
            doc.root(),
            Element::form().children([
                Element::div().child(Element::div().class("field").child(Element::input(""))),
                Element::span().class("error"),
            ]),
        );
        let error = doc.children(form)[1];
        let field = doc.query_selector(form, ".field").unwrap();

        assert_eq!(resolve_ancestor_match(&doc, field, ".error"), Some(error));
        assert_eq!(resolve_ancestor_match(&doc, field, ".missing"), None);
        assert_eq!(resolve_ancestor_match(&doc, doc.root(), ".error"), None);
    }
}
