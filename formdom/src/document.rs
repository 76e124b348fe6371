//! Arena-backed document tree.
//!
//! Nodes are addressed by [`NodeId`]. Removing a node frees its whole
//! subtree; ids of removed nodes are never reused, so a stale id simply
//! resolves to nothing.

use std::collections::BTreeMap;

use crate::element::{Content, Element};
use crate::selector::Selector;

/// Handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Inline `display` style of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Display {
    /// No inline style set.
    #[default]
    Initial,
    Block,
    None,
}

/// Attributes and state of a mounted element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub id: Option<String>,
    pub class_name: String,
    pub attributes: BTreeMap<String, String>,
    pub value: Option<String>,
    pub display: Display,
}

impl ElementData {
    /// Look up an attribute, treating `id`, `class` and `value` like any other.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            "class" => Some(self.class_name.as_str()),
            "value" => self.value.as_deref(),
            _ => self.attributes.get(name).map(String::as_str),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.class_name.split_whitespace().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    mutations: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document whose root is an empty `<body>`.
    pub fn new() -> Self {
        let body = Node {
            kind: NodeKind::Element(ElementData {
                tag: "body".to_string(),
                id: None,
                class_name: String::new(),
                attributes: BTreeMap::new(),
                value: None,
                display: Display::Initial,
            }),
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(body)],
            root: NodeId(0),
            mutations: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of mutating calls applied so far.
    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node {
            kind,
            parent,
            children: Vec::new(),
        }));
        id
    }

    // =========================================================================
    // Tree construction
    // =========================================================================

    /// Mount `element` (and its content) as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.mount(element, Some(parent));
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        self.mutations += 1;
        id
    }

    /// Mount `element` right after `reference` in its parent.
    ///
    /// A reference without a parent receives the element as its last child.
    pub fn insert_after(&mut self, reference: NodeId, element: Element) -> NodeId {
        let Some(parent) = self.parent(reference) else {
            return self.append(reference, element);
        };
        let id = self.mount(element, Some(parent));
        if let Some(node) = self.node_mut(parent) {
            let pos = node
                .children
                .iter()
                .position(|&c| c == reference)
                .map_or(node.children.len(), |p| p + 1);
            node.children.insert(pos, id);
        }
        self.mutations += 1;
        id
    }

    /// Append a text node to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        let id = self.alloc(NodeKind::Text(text.into()), Some(parent));
        if let Some(node) = self.node_mut(parent) {
            node.children.push(id);
        }
        self.mutations += 1;
        id
    }

    fn mount(&mut self, element: Element, parent: Option<NodeId>) -> NodeId {
        let Element {
            tag,
            id,
            class_name,
            attributes,
            value,
            display,
            content,
        } = element;
        let data = ElementData {
            tag,
            id,
            class_name,
            attributes,
            value,
            display,
        };
        let node_id = self.alloc(NodeKind::Element(data), parent);

        let children = match content {
            Content::None => Vec::new(),
            Content::Text(text) => vec![self.alloc(NodeKind::Text(text), Some(node_id))],
            Content::Children(children) => children
                .into_iter()
                .map(|child| self.mount(child, Some(node_id)))
                .collect(),
        };
        if let Some(node) = self.node_mut(node_id) {
            node.children = children;
        }
        node_id
    }

    /// Detach `id` from its parent and free its subtree.
    ///
    /// Returns `false` for the root or an unknown node.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root || !self.contains(id) {
            return false;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.node_mut(parent) {
                node.children.retain(|&c| c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(node.children);
            }
        }
        self.mutations += 1;
        true
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Descendants of `scope` in document order, excluding `scope` itself.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    // =========================================================================
    // Element access
    // =========================================================================

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attribute(name)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        let value = value.into();
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        match name {
            "id" => el.id = Some(value),
            "class" => el.class_name = value,
            "value" => el.value = Some(value),
            _ => {
                el.attributes.insert(name.to_string(), value);
            }
        }
        self.mutations += 1;
        true
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        let removed = match name {
            "id" => el.id.take().is_some(),
            "class" => !std::mem::take(&mut el.class_name).is_empty(),
            "value" => el.value.take().is_some(),
            _ => el.attributes.remove(name).is_some(),
        };
        if removed {
            self.mutations += 1;
        }
        removed
    }

    pub fn value(&self, id: NodeId) -> Option<&str> {
        self.element(id)?.value.as_deref()
    }

    pub fn set_value(&mut self, id: NodeId, value: impl Into<String>) -> bool {
        self.set_attribute(id, "value", value)
    }

    pub fn class_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.class_name.as_str())
    }

    pub fn set_class_name(&mut self, id: NodeId, class_name: impl Into<String>) -> bool {
        self.set_attribute(id, "class", class_name)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).is_some_and(|e| e.has_class(class))
    }

    pub fn display(&self, id: NodeId) -> Display {
        self.element(id).map_or(Display::Initial, |e| e.display)
    }

    pub fn set_display(&mut self, id: NodeId, display: Display) -> bool {
        let Some(el) = self.element_mut(id) else {
            return false;
        };
        el.display = display;
        self.mutations += 1;
        true
    }

    // =========================================================================
    // Text nodes
    // =========================================================================

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.node(id).map(|n| &n.kind), Some(NodeKind::Text(_)))
    }

    /// Data of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text(data) => Some(data),
            NodeKind::Element(_) => None,
        }
    }

    /// Replace the data of a text node in place.
    pub fn set_text(&mut self, id: NodeId, data: impl Into<String>) -> bool {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Text(text)) => {
                *text = data.into();
                self.mutations += 1;
                true
            }
            _ => false,
        }
    }

    /// Concatenated data of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|n| self.text(n))
            .collect()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        std::iter::once(self.root)
            .chain(self.descendants(self.root))
            .find(|&n| self.element(n).and_then(|e| e.id.as_deref()) == Some(id))
    }

    /// First descendant of `scope` matching `selector`.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    pub fn select_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// Like [`select`](Self::select) but parses `selector` first.
    ///
    /// Unparsable selectors match nothing.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select(scope, &parsed),
            Err(e) => {
                log::warn!("query_selector: {e}");
                None
            }
        }
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        match Selector::parse(selector) {
            Ok(parsed) => self.select_all(scope, &parsed),
            Err(e) => {
                log::warn!("query_selector_all: {e}");
                Vec::new()
            }
        }
    }
}
