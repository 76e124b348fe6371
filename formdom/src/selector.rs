//! A small CSS selector subset.
//!
//! Supported: type (`input`, `*`), id (`#name`), class (`.error`), attribute
//! presence and equality (`[data-verify]`, `[type=email]`, `[type="email"]`),
//! compounds of those, and the descendant combinator (whitespace).
//! Quoted attribute values cannot contain whitespace.

use thiserror::Error;

use crate::document::{Document, ElementData, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected '{ch}' in selector '{selector}'")]
    Unexpected { selector: String, ch: char },

    #[error("missing name after '{ch}' in selector '{selector}'")]
    MissingName { selector: String, ch: char },

    #[error("unterminated attribute in selector '{0}'")]
    Unterminated(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

impl Compound {
    fn matches(&self, el: &ElementData) -> bool {
        if self.tag.as_ref().is_some_and(|t| *t != el.tag) {
            return false;
        }
        if self.id.is_some() && self.id != el.id {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attributes
            .iter()
            .all(|attr| match (el.get_attribute(&attr.name), &attr.value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == expected,
                (None, _) => false,
            })
    }
}

/// A parsed selector: compounds separated by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '#' | '.' | '[')
}

impl Selector {
    pub fn parse(selector: &str) -> Result<Self, SelectorError> {
        let compounds = selector
            .split_whitespace()
            .map(|token| parse_compound(selector, token))
            .collect::<Result<Vec<_>, _>>()?;
        if compounds.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { compounds })
    }

    /// Whether the element `id` matches, checking ancestors for the
    /// leading compounds.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some((last, leading)) = self.compounds.split_last() else {
            return false;
        };
        if !doc.element(id).is_some_and(|el| last.matches(el)) {
            return false;
        }

        let mut ancestors = doc.ancestors(id);
        leading.iter().rev().all(|compound| {
            ancestors.any(|a| doc.element(a).is_some_and(|el| compound.matches(el)))
        })
    }
}

fn parse_compound(selector: &str, token: &str) -> Result<Compound, SelectorError> {
    let unexpected = |ch| SelectorError::Unexpected {
        selector: selector.to_string(),
        ch,
    };
    let missing = |ch| SelectorError::MissingName {
        selector: selector.to_string(),
        ch,
    };

    let mut compound = Compound::default();

    let tag_end = token.find(is_delimiter).unwrap_or(token.len());
    let tag = &token[..tag_end];
    if !tag.is_empty() && tag != "*" {
        if let Some(bad) = tag.chars().find(|&c| !is_name_char(c)) {
            return Err(unexpected(bad));
        }
        compound.tag = Some(tag.to_ascii_lowercase());
    }

    let mut rest = &token[tag_end..];
    while let Some(ch) = rest.chars().next() {
        match ch {
            '#' | '.' => {
                let body = &rest[1..];
                let end = body.find(is_delimiter).unwrap_or(body.len());
                let name = &body[..end];
                if name.is_empty() {
                    return Err(missing(ch));
                }
                if let Some(bad) = name.chars().find(|&c| !is_name_char(c)) {
                    return Err(unexpected(bad));
                }
                if ch == '#' {
                    compound.id = Some(name.to_string());
                } else {
                    compound.classes.push(name.to_string());
                }
                rest = &body[end..];
            }
            '[' => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| SelectorError::Unterminated(selector.to_string()))?;
                let inner = &rest[1..close];
                let (name, value) = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim_matches(|c| c == '"' || c == '\'');
                        (name, Some(value.to_string()))
                    }
                    None => (inner, None),
                };
                if name.is_empty() {
                    return Err(missing(ch));
                }
                if let Some(bad) = name.chars().find(|&c| !is_name_char(c)) {
                    return Err(unexpected(bad));
                }
                compound.attributes.push(AttributeMatch {
                    name: name.to_string(),
                    value,
                });
                rest = &rest[close + 1..];
            }
            other => return Err(unexpected(other)),
        }
    }

    Ok(compound)
}
