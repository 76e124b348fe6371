use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::document::NodeId;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

/// An event delivered to listeners on its target element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event name, e.g. `change`, `input`, `blur`, `click`.
    pub name: String,
    pub target: NodeId,
    /// The target's value at dispatch time (empty when it has none).
    pub value: String,
}

pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`Dom::add_listener`](crate::Dom::add_listener).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

struct Listener {
    id: ListenerId,
    target: NodeId,
    event: String,
    handler: Handler,
}

/// Listener table keyed by (target, event name), in registration order.
#[derive(Default)]
pub(crate) struct Listeners {
    entries: Vec<Listener>,
}

impl Listeners {
    pub(crate) fn add(&mut self, target: NodeId, event: &str, handler: Handler) -> ListenerId {
        let id = ListenerId::next();
        self.entries.push(Listener {
            id,
            target,
            event: event.to_string(),
            handler,
        });
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|l| l.id != id);
        self.entries.len() != before
    }

    /// Clone out the handlers so they can run without holding the table.
    pub(crate) fn handlers(&self, target: NodeId, event: &str) -> Vec<Handler> {
        self.entries
            .iter()
            .filter(|l| l.target == target && l.event == event)
            .map(|l| Arc::clone(&l.handler))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
