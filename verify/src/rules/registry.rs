use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, VerifyError};
use crate::parser::RuleDescriptor;

/// A rule predicate, called with `(value, param)`.
pub type CheckFn = Arc<dyn Fn(&str, Option<&str>) -> bool + Send + Sync>;

/// A message template for a failed rule. May return an empty string to show
/// nothing (the CSS error class is still applied).
pub type MessageFn = Arc<dyn Fn(&MessageContext<'_>) -> String + Send + Sync>;

/// Arguments handed to a [`MessageFn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageContext<'a> {
    /// The value that failed.
    pub value: &'a str,
    /// The failing rule's parameter.
    pub param: Option<&'a str>,
    /// Display name of the field (may be empty).
    pub name: &'a str,
}

impl MessageContext<'_> {
    /// The display name, or "This field" when none was configured.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            "This field"
        } else {
            self.name
        }
    }
}

/// Rule name → predicate and message template.
///
/// # Example
///
/// ```
/// use verify::rules::RuleRegistry;
///
/// let registry = RuleRegistry::with_builtins()
///     .rule("even", |v, _| v.parse::<i64>().is_ok_and(|n| n % 2 == 0))
///     .message("even", |cx| format!("{} must be even", cx.label()));
///
/// assert!(registry.contains("even"));
/// assert!(registry.contains("required"));
/// ```
#[derive(Clone, Default)]
pub struct RuleRegistry {
    checks: HashMap<String, CheckFn>,
    messages: HashMap<String, MessageFn>,
}

impl RuleRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with the built-in rules and their English messages.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        super::builtin::install(&mut registry);
        registry
    }

    /// Register (or replace) a rule predicate.
    pub fn register<F>(&mut self, name: impl Into<String>, check: F) -> &mut Self
    where
        F: Fn(&str, Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.checks.insert(name.into(), Arc::new(check));
        self
    }

    /// Register (or replace) the message template of a rule.
    ///
    /// The rule itself does not have to be registered yet.
    pub fn set_message<F>(&mut self, name: impl Into<String>, template: F) -> &mut Self
    where
        F: Fn(&MessageContext<'_>) -> String + Send + Sync + 'static,
    {
        self.messages.insert(name.into(), Arc::new(template));
        self
    }

    pub(crate) fn set_message_fn(&mut self, name: impl Into<String>, template: MessageFn) {
        self.messages.insert(name.into(), template);
    }

    /// Builder form of [`register`](Self::register).
    pub fn rule<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, Option<&str>) -> bool + Send + Sync + 'static,
    {
        self.register(name, check);
        self
    }

    /// Builder form of [`set_message`](Self::set_message).
    pub fn message<F>(mut self, name: impl Into<String>, template: F) -> Self
    where
        F: Fn(&MessageContext<'_>) -> String + Send + Sync + 'static,
    {
        self.set_message(name, template);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered rule names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the predicate for `rule` against `value`.
    pub fn check(&self, rule: &RuleDescriptor, value: &str) -> Result<bool> {
        let check = self
            .checks
            .get(&rule.name)
            .ok_or_else(|| VerifyError::UnknownRule(rule.name.clone()))?;
        Ok(check(value, rule.param()))
    }

    /// Render the message for a failed `rule`. Rules without a template
    /// render an empty message.
    pub fn render_message(&self, rule: &RuleDescriptor, value: &str, name: &str) -> String {
        let Some(template) = self.messages.get(&rule.name) else {
            return String::new();
        };
        template(&MessageContext {
            value,
            param: rule.param(),
            name,
        })
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("rules", &self.names())
            .field("message_count", &self.messages.len())
            .finish()
    }
}
