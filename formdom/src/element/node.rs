use std::collections::BTreeMap;

use super::Content;
use crate::document::Display;

/// An unmounted element, built with chained setters and then handed to
/// [`Document::append`](crate::Document::append).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    // Identity
    pub tag: String,
    pub id: Option<String>,

    // Attributes
    pub class_name: String,
    pub attributes: BTreeMap<String, String>,

    // Form state
    pub value: Option<String>,

    // Visual
    pub display: Display,

    // Content
    pub content: Content,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn div() -> Self {
        Self::new("div")
    }

    pub fn span() -> Self {
        Self::new("span")
    }

    pub fn form() -> Self {
        Self::new("form")
    }

    pub fn button() -> Self {
        Self::new("button")
    }

    /// Create an `<input>` with an initial value.
    pub fn input(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new("input")
        }
    }

    /// Create a `<textarea>` with an initial value.
    pub fn textarea(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::new("textarea")
        }
    }

    /// Create a `<span>` holding a single text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Content::Text(content.into()),
            ..Self::span()
        }
    }

    // Identity
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    // Attributes

    /// Append a class token.
    pub fn class(mut self, class: impl AsRef<str>) -> Self {
        let class = class.as_ref().trim();
        if class.is_empty() {
            return self;
        }
        if !self.class_name.is_empty() {
            self.class_name.push(' ');
        }
        self.class_name.push_str(class);
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set a `data-*` attribute. `data("verify-val", "5")` sets `data-verify-val`.
    pub fn data(self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        let name = format!("data-{}", key.as_ref());
        self.attr(name, value)
    }

    // Form state
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    // Visual
    pub fn display(mut self, display: Display) -> Self {
        self.display = display;
        self
    }

    // Children
    pub fn child(mut self, child: Element) -> Self {
        match &mut self.content {
            Content::Children(children) => children.push(child),
            _ => self.content = Content::Children(vec![child]),
        }
        self
    }

    pub fn children(mut self, new_children: impl IntoIterator<Item = Element>) -> Self {
        match &mut self.content {
            Content::Children(children) => children.extend(new_children),
            _ => self.content = Content::Children(new_children.into_iter().collect()),
        }
        self
    }
}
