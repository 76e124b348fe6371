//! Per-field configuration and its resolution into [`FieldOptions`].

use std::sync::Arc;

use formdom::{Document, NodeId};
use serde::Deserialize;

use crate::config::GlobalConfig;
use crate::error::Result;
use crate::lookup;
use crate::parser::{RuleCache, RuleDescriptor};

/// Trigger name that validates once at bind time instead of subscribing.
pub const INITIAL_TRIGGER: &str = "initial";

/// Trigger used when a field names none.
pub const DEFAULT_TRIGGER: &str = "change";

/// How a failing field shows its message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DisplayMode {
    /// Inline message node after the bound container.
    #[default]
    Insert,
    /// Floating tip after the input element.
    Tip,
    /// Text inside an existing element found by selector.
    Target(String),
}

impl DisplayMode {
    /// `"insert"` and `"tip"` name the built-in modes; anything else is a
    /// target selector. Empty input yields `None`.
    pub fn parse(mode: &str) -> Option<Self> {
        match mode.trim() {
            "" => None,
            "insert" => Some(Self::Insert),
            "tip" => Some(Self::Tip),
            selector => Some(Self::Target(selector.to_string())),
        }
    }
}

/// When a field is validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Once, immediately at bind time.
    Initial,
    /// On every document event with this name on the input element.
    Event(String),
}

impl Trigger {
    pub fn parse(name: &str) -> Self {
        match name {
            INITIAL_TRIGGER => Self::Initial,
            other => Self::Event(other.to_string()),
        }
    }
}

/// Full per-field configuration.
///
/// Every field except `regs` is optional. Deserializes from the object form
/// hosts pass through their templates:
///
/// ```
/// use verify::FieldConfig;
///
/// let config: FieldConfig = serde_json::from_str(
///     r#"{ "regs": "required|email", "name": "Email", "mode": "tip" }"#,
/// ).unwrap();
/// assert_eq!(config.regs, "required|email");
/// assert_eq!(config.submit, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Pipe-delimited rule string.
    pub regs: String,
    /// Selector of the element that receives the message in target mode.
    pub error: Option<String>,
    /// Display name handed to message templates.
    pub name: Option<String>,
    /// CSS class toggled on the bound container while failing.
    pub style: Option<String>,
    /// `insert`, `tip`, or a target selector.
    pub mode: Option<String>,
    /// Id of the element whose activation validates this field.
    pub submit: Option<String>,
    /// Trigger event names. `initial` validates at bind time.
    pub events: Option<Vec<String>>,
}

impl FieldConfig {
    pub fn new(regs: impl Into<String>) -> Self {
        Self {
            regs: regs.into(),
            ..Default::default()
        }
    }

    pub fn error(mut self, selector: impl Into<String>) -> Self {
        self.error = Some(selector.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn style(mut self, class: impl Into<String>) -> Self {
        self.style = Some(class.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }

    pub fn submit(mut self, id: impl Into<String>) -> Self {
        self.submit = Some(id.into());
        self
    }

    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = Some(events.into_iter().map(Into::into).collect());
        self
    }
}

/// What a host binds to an element: a bare rule string or a full config.
///
/// With the shorthand form the remaining options come from `data-verify-*`
/// attributes on the bound element (`data-verify-error`, `-name`, `-style`,
/// `-mode`, `-submit`, and a whitespace-separated `-events`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleConfig {
    Shorthand(String),
    Full(FieldConfig),
}

impl From<&str> for RuleConfig {
    fn from(rules: &str) -> Self {
        Self::Shorthand(rules.to_string())
    }
}

impl From<String> for RuleConfig {
    fn from(rules: String) -> Self {
        Self::Shorthand(rules)
    }
}

impl From<FieldConfig> for RuleConfig {
    fn from(config: FieldConfig) -> Self {
        Self::Full(config)
    }
}

impl RuleConfig {
    pub fn rules(&self) -> &str {
        match self {
            Self::Shorthand(rules) => rules,
            Self::Full(config) => &config.regs,
        }
    }

    /// Look up an option, reading `data-verify-{key}` for the shorthand
    /// form. Empty values count as absent.
    fn param(&self, doc: &Document, el: NodeId, key: &str) -> Option<String> {
        let value = match self {
            Self::Shorthand(_) => doc
                .attribute(el, &format!("data-verify-{key}"))
                .map(str::to_string),
            Self::Full(config) => match key {
                "error" => config.error.clone(),
                "name" => config.name.clone(),
                "style" => config.style.clone(),
                "mode" => config.mode.clone(),
                "submit" => config.submit.clone(),
                _ => None,
            },
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn events(&self, doc: &Document, el: NodeId) -> Vec<String> {
        match self {
            Self::Shorthand(_) => doc
                .attribute(el, "data-verify-events")
                .map(|events| events.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
            Self::Full(config) => config.events.clone().unwrap_or_default(),
        }
    }

    /// The submit trigger id this config names for `el`, if any.
    pub fn submit(&self, doc: &Document, el: NodeId) -> Option<String> {
        self.param(doc, el, "submit")
    }
}

/// Everything needed to validate and present one bound element.
///
/// Rebuilt from scratch on bind and on update; never patched in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOptions {
    /// The bound container.
    pub target: NodeId,
    /// The form control inside `target`, or `target` itself.
    pub input: NodeId,
    /// Whether `target` is or contains an `input`/`textarea`.
    pub is_form_control: bool,
    pub rule_string: String,
    pub rules: Arc<[RuleDescriptor]>,
    /// Resolved error element for target mode.
    pub error: Option<NodeId>,
    pub name: String,
    pub css_class: Option<String>,
    pub mode: DisplayMode,
    pub submit: Option<String>,
    pub triggers: Vec<Trigger>,
}

impl FieldOptions {
    /// Resolve `config` for the element `target`.
    ///
    /// Fails with a config error when the rule string does not parse.
    pub fn build(
        doc: &Document,
        target: NodeId,
        config: &RuleConfig,
        global: &GlobalConfig,
        cache: &RuleCache,
    ) -> Result<Self> {
        let rule_string = config.rules().to_string();
        let rules = cache.get(&rule_string)?;

        let error_selector = config.param(doc, target, "error");
        let mode = config
            .param(doc, target, "mode")
            .and_then(|m| DisplayMode::parse(&m))
            .or_else(|| global.mode.clone())
            .or_else(|| error_selector.clone().map(DisplayMode::Target))
            .unwrap_or_default();

        let error_selector = match (&error_selector, &mode) {
            (Some(selector), _) => Some(selector.clone()),
            (None, DisplayMode::Target(selector)) => Some(selector.clone()),
            (None, _) => None,
        };
        let error = error_selector
            .as_deref()
            .and_then(|selector| lookup::resolve_ancestor_match(doc, target, selector));

        let events = config.events(doc, target);
        let triggers = if events.is_empty() {
            vec![Trigger::Event(DEFAULT_TRIGGER.to_string())]
        } else {
            events.iter().map(|e| Trigger::parse(e)).collect()
        };

        Ok(Self {
            target,
            input: lookup::input_element(doc, target),
            is_form_control: lookup::is_form_control(doc, target),
            rule_string,
            rules,
            error,
            name: config.param(doc, target, "name").unwrap_or_default(),
            css_class: config
                .param(doc, target, "style")
                .or_else(|| global.error_class.clone()),
            mode,
            submit: config.submit(doc, target),
            triggers,
        })
    }
}
