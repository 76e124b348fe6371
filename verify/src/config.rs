//! Library-wide configuration, supplied once when the binder is created.

use std::collections::HashMap;
use std::sync::Arc;

use crate::options::DisplayMode;
use crate::rules::{MessageContext, MessageFn};

/// Defaults shared by every bound field.
///
/// # Example
///
/// ```
/// use verify::{DisplayMode, GlobalConfig};
///
/// let config = GlobalConfig::new()
///     .mode(DisplayMode::Tip)
///     .error_class("is-invalid")
///     .message("required", |cx| format!("Please fill in {}", cx.label()));
///
/// assert_eq!(config.mode, Some(DisplayMode::Tip));
/// ```
#[derive(Clone, Default)]
pub struct GlobalConfig {
    /// Display mode for fields that do not pick one.
    ///
    /// Default: none, which resolves to a custom target when the field has
    /// an error selector and to `insert` otherwise.
    pub mode: Option<DisplayMode>,

    /// CSS class toggled on failing fields that do not set their own.
    pub error_class: Option<String>,

    /// Message templates by rule name. These override the registry's.
    pub messages: HashMap<String, MessageFn>,
}

impl GlobalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default display mode.
    pub fn mode(mut self, mode: DisplayMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Set the default error class.
    pub fn error_class(mut self, class: impl Into<String>) -> Self {
        self.error_class = Some(class.into());
        self
    }

    /// Override the message template of a rule.
    pub fn message<F>(mut self, rule: impl Into<String>, template: F) -> Self
    where
        F: Fn(&MessageContext<'_>) -> String + Send + Sync + 'static,
    {
        self.messages.insert(rule.into(), Arc::new(template));
        self
    }
}

impl std::fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut messages: Vec<_> = self.messages.keys().collect();
        messages.sort_unstable();
        f.debug_struct("GlobalConfig")
            .field("mode", &self.mode)
            .field("error_class", &self.error_class)
            .field("messages", &messages)
            .finish()
    }
}
