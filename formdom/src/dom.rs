use std::sync::{Arc, RwLock};

use crate::document::{Document, NodeId};
use crate::event::{Event, Handler, ListenerId, Listeners};

/// Shared handle to a [`Document`] and its event listeners.
///
/// Cheap to clone. Listeners are cloned out of the table before they run,
/// so a handler may freely read or mutate the document, or add and remove
/// listeners.
#[derive(Clone, Default)]
pub struct Dom {
    document: Arc<RwLock<Document>>,
    listeners: Arc<RwLock<Listeners>>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with shared access to the document.
    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        let guard = self
            .document
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    /// Run `f` with exclusive access to the document.
    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut guard = self
            .document
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_listener(&self, target: NodeId, event: &str, handler: Handler) -> ListenerId {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.add(target, event, handler)
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        listeners.remove(id)
    }

    /// Total number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().map(|l| l.len()).unwrap_or(0)
    }

    /// Deliver `event` to the listeners on `target`.
    ///
    /// Returns how many handlers ran.
    pub fn dispatch(&self, target: NodeId, event: &str) -> usize {
        let handlers = match self.listeners.read() {
            Ok(listeners) => listeners.handlers(target, event),
            Err(poisoned) => poisoned.into_inner().handlers(target, event),
        };
        if handlers.is_empty() {
            return 0;
        }

        let value = self.read(|doc| doc.value(target).unwrap_or_default().to_string());
        let event = Event {
            name: event.to_string(),
            target,
            value,
        };
        log::trace!("dispatch '{}' to {:?} ({} handlers)", event.name, target, handlers.len());
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Set the value of a form control, then dispatch `event` on it.
    pub fn input_value(&self, target: NodeId, value: &str, event: &str) -> usize {
        self.write(|doc| doc.set_value(target, value));
        self.dispatch(target, event)
    }
}

impl std::fmt::Debug for Dom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let nodes = self.read(|doc| doc.descendants(doc.root()).len());
        f.debug_struct("Dom")
            .field("nodes", &nodes)
            .field("listener_count", &self.listener_count())
            .finish()
    }
}
