//! Error display.
//!
//! The presenter turns a validation outcome into document changes: a message
//! shown through the field's [`Surface`] and the error class toggled on the
//! bound container. Each input element keeps a [`PresenterState`]; a call
//! that would show the same message with the same pass/fail flag again is
//! skipped.
//!
//! When a field's options change between passes (another mode, another error
//! element), whatever the old surface showed is retired before the new one
//! renders.

mod class;
mod surface;

use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, RwLock};

use formdom::{Display, Dom, NodeId};

pub use class::toggle_error_class;
pub use surface::{ErrorTarget, InlineMessage, RenderRequest, Surface, Tooltip};

use crate::engine::Outcome;
use crate::options::{DisplayMode, FieldOptions};

/// What is currently shown for one input element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterState {
    pub message: String,
    pub failed: bool,
    /// Node returned by the last render; `None` once the message is cleared.
    pub instance: Option<NodeId>,
    /// Mode the last render used.
    pub mode: DisplayMode,
    /// Anchor the last render used: the bound container, the input, or the
    /// error element.
    pub anchor: NodeId,
}

impl PresenterState {
    fn same_surface(&self, mode: &DisplayMode, anchor: NodeId) -> bool {
        mem::discriminant(&self.mode) == mem::discriminant(mode) && self.anchor == anchor
    }
}

#[derive(Clone)]
pub struct Presenter {
    dom: Dom,
    inline: Arc<dyn Surface>,
    tip: Arc<dyn Surface>,
    target: Arc<dyn Surface>,
    states: Arc<RwLock<HashMap<NodeId, PresenterState>>>,
}

impl Presenter {
    /// A presenter using the default message nodes.
    pub fn new(dom: Dom) -> Self {
        Self::with_surfaces(dom, InlineMessage::default(), Tooltip::default())
    }

    /// A presenter rendering `insert` mode through `inline` and `tip` mode
    /// through `tip`.
    pub fn with_surfaces(
        dom: Dom,
        inline: impl Surface + 'static,
        tip: impl Surface + 'static,
    ) -> Self {
        Self {
            dom,
            inline: Arc::new(inline),
            tip: Arc::new(tip),
            target: Arc::new(ErrorTarget),
            states: Arc::default(),
        }
    }

    /// Show the result of a pass.
    pub fn apply(&self, options: &FieldOptions, outcome: &Outcome) {
        self.present(options, outcome.failed(), &outcome.message);
    }

    /// Show `message` for a field that `failed` (or passed), then toggle the
    /// error class.
    pub fn present(&self, options: &FieldOptions, failed: bool, message: &str) {
        let key = options.input;
        let surface = match &options.mode {
            DisplayMode::Insert => Some((&self.inline, options.target)),
            DisplayMode::Tip => Some((&self.tip, key)),
            DisplayMode::Target(_) => options.error.map(|error| (&self.target, error)),
        };
        match surface {
            Some((surface, anchor)) => {
                self.render(&**surface, &options.mode, anchor, key, failed, message);
            }
            None => {
                log::trace!("no error target for {key:?}, message not shown");
                self.forget(key);
            }
        }

        self.dom.write(|doc| {
            toggle_error_class(doc, options.target, options.css_class.as_deref(), failed)
        });
    }

    fn render(
        &self,
        surface: &dyn Surface,
        mode: &DisplayMode,
        anchor: NodeId,
        key: NodeId,
        failed: bool,
        message: &str,
    ) {
        let previous = match self.state(key) {
            Some(state) if state.same_surface(mode, anchor) => Some(state),
            Some(state) => {
                log::debug!("display of {key:?} moved, retiring {:?}", state.instance);
                self.retire(key, &state);
                None
            }
            None => None,
        };
        if previous
            .as_ref()
            .is_some_and(|s| s.failed == failed && s.message == message)
        {
            log::trace!("unchanged message for {key:?}, render skipped");
            return;
        }

        let existing = match previous {
            Some(state) => state.instance,
            None if matches!(mode, DisplayMode::Target(_)) => self.shared_text(key, anchor),
            None => None,
        };
        let instance = surface.render(
            &self.dom,
            &RenderRequest {
                anchor,
                existing,
                message,
                remove: !failed,
            },
        );

        if let Ok(mut states) = self.states.write() {
            states.insert(
                key,
                PresenterState {
                    message: message.to_string(),
                    failed,
                    instance,
                    mode: mode.clone(),
                    anchor,
                },
            );
        }
    }

    /// Text node another field already writes to inside the error element
    /// `anchor`.
    fn shared_text(&self, key: NodeId, anchor: NodeId) -> Option<NodeId> {
        let states = self.states.read().ok()?;
        states
            .iter()
            .filter(|&(&other, _)| other != key)
            .find(|(_, s)| matches!(s.mode, DisplayMode::Target(_)) && s.anchor == anchor)
            .and_then(|(_, s)| s.instance)
    }

    /// Undo what `state` shows. A target text node still used by another
    /// field is left alone.
    fn retire(&self, key: NodeId, state: &PresenterState) {
        let Some(node) = state.instance else {
            return;
        };
        match state.mode {
            DisplayMode::Insert | DisplayMode::Tip => {
                self.dom.write(|doc| doc.remove(node));
            }
            DisplayMode::Target(_) => {
                if self.shared_text(key, state.anchor) == Some(node) {
                    return;
                }
                self.dom.write(|doc| {
                    doc.set_text(node, "");
                    doc.set_display(state.anchor, Display::None);
                });
            }
        }
    }

    /// Retire and drop the state of `key`, if any.
    fn forget(&self, key: NodeId) {
        let state = self
            .states
            .write()
            .ok()
            .and_then(|mut states| states.remove(&key));
        if let Some(state) = state {
            self.retire(key, &state);
        }
    }

    /// Current state of the input element `input`.
    pub fn state(&self, input: NodeId) -> Option<PresenterState> {
        self.states.read().ok()?.get(&input).cloned()
    }

    /// Drop the state of a field and remove the message node it created.
    ///
    /// Target-mode fields keep their text node; the element belongs to the
    /// host.
    pub fn clear(&self, options: &FieldOptions) {
        let state = self
            .states
            .write()
            .ok()
            .and_then(|mut states| states.remove(&options.input));
        let Some(state) = state else {
            return;
        };
        if let (Some(node), DisplayMode::Insert | DisplayMode::Tip) = (state.instance, &state.mode)
        {
            self.dom.write(|doc| doc.remove(node));
        }
    }
}

impl std::fmt::Debug for Presenter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.states.read().map(|s| s.len()).unwrap_or(0);
        f.debug_struct("Presenter")
            .field("dom", &self.dom)
            .field("state_count", &count)
            .finish()
    }
}
