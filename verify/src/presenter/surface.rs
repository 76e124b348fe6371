//! Nodes that show a message.

use formdom::{Display, Document, Dom, Element, NodeId};

/// One render call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRequest<'a> {
    /// Node the message is shown for.
    pub anchor: NodeId,
    /// The node returned by the previous render, if still shown.
    pub existing: Option<NodeId>,
    /// Message to show. Empty means show nothing.
    pub message: &'a str,
    /// Whether the field now passes.
    pub remove: bool,
}

/// Something that can show (and hide) a validation message.
///
/// Implement this to swap the default message nodes for a host component.
pub trait Surface: Send + Sync {
    /// Show `request.message`. Returns the node now holding the message, or
    /// `None` when nothing is shown.
    fn render(&self, dom: &Dom, request: &RenderRequest<'_>) -> Option<NodeId>;
}

/// Replace the first text child of `el`, or add one.
fn write_text(doc: &mut Document, el: NodeId, message: &str) {
    let text = doc.children(el).iter().copied().find(|&c| doc.is_text(c));
    match text {
        Some(node) if doc.text(node) != Some(message) => {
            doc.set_text(node, message);
        }
        Some(_) => {}
        None => {
            doc.append_text(el, message);
        }
    }
}

/// Inline message placed right after the bound container.
#[derive(Debug, Clone)]
pub struct InlineMessage {
    pub class: String,
}

impl Default for InlineMessage {
    fn default() -> Self {
        Self {
            class: "verify-message".to_string(),
        }
    }
}

impl Surface for InlineMessage {
    fn render(&self, dom: &Dom, request: &RenderRequest<'_>) -> Option<NodeId> {
        dom.write(|doc| {
            let existing = request.existing.filter(|&n| doc.contains(n));
            if request.message.is_empty() {
                if let Some(node) = existing {
                    doc.remove(node);
                }
                return None;
            }
            match existing {
                Some(node) => {
                    write_text(doc, node, request.message);
                    Some(node)
                }
                None => Some(doc.insert_after(
                    request.anchor,
                    Element::text(request.message)
                        .class(&self.class)
                        .attr("role", "alert"),
                )),
            }
        })
    }
}

/// Floating tip placed right after the input element.
///
/// Carries `data-verify-remove`. When the field passes, an existing tip keeps
/// its text and is only flagged `"true"` so a host stylesheet can animate it
/// out; the node goes away on the next failure with an empty message or when
/// the field is unbound.
#[derive(Debug, Clone)]
pub struct Tooltip {
    pub class: String,
}

impl Default for Tooltip {
    fn default() -> Self {
        Self {
            class: "verify-tip".to_string(),
        }
    }
}

impl Surface for Tooltip {
    fn render(&self, dom: &Dom, request: &RenderRequest<'_>) -> Option<NodeId> {
        dom.write(|doc| {
            let existing = request.existing.filter(|&n| doc.contains(n));
            if request.remove {
                let node = existing?;
                doc.set_attribute(node, "data-verify-remove", "true");
                return Some(node);
            }
            if request.message.is_empty() {
                if let Some(node) = existing {
                    doc.remove(node);
                }
                return None;
            }
            let node = match existing {
                Some(node) => {
                    write_text(doc, node, request.message);
                    node
                }
                None => doc.insert_after(
                    request.anchor,
                    Element::text(request.message).class(&self.class),
                ),
            };
            doc.set_attribute(node, "data-verify-remove", "false");
            Some(node)
        })
    }
}

/// An existing element named by selector. The anchor is the element itself;
/// the returned node is the text node the message is written to.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorTarget;

impl Surface for ErrorTarget {
    fn render(&self, dom: &Dom, request: &RenderRequest<'_>) -> Option<NodeId> {
        dom.write(|doc| {
            if !doc.contains(request.anchor) {
                return None;
            }
            let display = if request.remove {
                Display::None
            } else {
                Display::Block
            };
            if doc.display(request.anchor) != display {
                doc.set_display(request.anchor, display);
            }

            let existing = request
                .existing
                .filter(|&n| doc.is_text(n) && doc.parent(n) == Some(request.anchor));
            match existing {
                Some(node) => {
                    if doc.text(node) != Some(request.message) {
                        doc.set_text(node, request.message);
                    }
                    Some(node)
                }
                None => Some(doc.append_text(request.anchor, request.message)),
            }
        })
    }
}
