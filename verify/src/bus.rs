//! Submit trigger registry.
//!
//! Maps a trigger id (the id of a submit button, say) to a single handler.
//! Subscribing an id that already has a handler is a no-op, and removing an
//! id that has none is a silent no-op. Hosts forward the activation of the
//! trigger element to [`SubmitBus::emit`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::Result;

/// A submit handler. Returns whether the validation pass it ran succeeded.
pub type SubmitHandler = Arc<dyn Fn() -> Result<bool> + Send + Sync>;

#[derive(Clone, Default)]
pub struct SubmitBus {
    handlers: Arc<RwLock<HashMap<String, SubmitHandler>>>,
}

impl SubmitBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `handler` to `id` unless the id already has one.
    ///
    /// Returns whether the handler was registered.
    pub fn subscribe_once<F>(&self, id: &str, handler: F) -> bool
    where
        F: Fn() -> Result<bool> + Send + Sync + 'static,
    {
        let Ok(mut handlers) = self.handlers.write() else {
            return false;
        };
        if handlers.contains_key(id) {
            log::trace!("submit '{id}' already subscribed");
            return false;
        }
        handlers.insert(id.to_string(), Arc::new(handler));
        log::debug!("submit '{id}' subscribed");
        true
    }

    /// Remove the handler of `id`. Returns whether one was removed.
    pub fn unsubscribe(&self, id: &str) -> bool {
        let removed = self
            .handlers
            .write()
            .map(|mut h| h.remove(id).is_some())
            .unwrap_or(false);
        if removed {
            log::debug!("submit '{id}' unsubscribed");
        }
        removed
    }

    pub fn has_listener(&self, id: &str) -> bool {
        self.handlers
            .read()
            .map(|h| h.contains_key(id))
            .unwrap_or(false)
    }

    /// Run the handler of `id`, if any.
    ///
    /// The handler runs without the registry locked, so it may subscribe or
    /// unsubscribe ids itself.
    pub fn emit(&self, id: &str) -> Option<Result<bool>> {
        let handler = self.handlers.read().ok()?.get(id).cloned()?;
        Some(handler())
    }

    pub fn len(&self) -> usize {
        self.handlers.read().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for SubmitBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitBus")
            .field("handler_count", &self.len())
            .finish()
    }
}
