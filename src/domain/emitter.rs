//! Minimal synchronous named-event primitive owned by every tree node.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::trace;

/// Callback invoked with the arguments passed to `emit`.
pub type Handler = Rc<dyn Fn(&[Value])>;

/// Token returned by `subscribe`, used to remove the handler again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Event name to ordered handler list.
///
/// Delivery is synchronous and in subscription order. There is no queue and no
/// wildcard matching: `emit("a")` reaches exactly the handlers subscribed to `"a"`.
#[derive(Default)]
pub struct EventEmitter {
    handlers: HashMap<String, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, event: &str, handler: Handler) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    /// Removes a handler. Returns false if `id` was not subscribed to `event`.
    pub fn unsubscribe(&mut self, event: &str, id: SubscriptionId) -> bool {
        let Some(list) = self.handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sid, _)| *sid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(event);
        }
        removed
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }

    /// Snapshot of the handlers for `event`.
    ///
    /// Callers invoke the snapshot after releasing any borrow of the owner, so
    /// handlers are free to subscribe, unsubscribe or touch the tree.
    pub fn handlers(&self, event: &str) -> Vec<Handler> {
        self.handlers
            .get(event)
            .map(|list| list.iter().map(|(_, h)| Rc::clone(h)).collect())
            .unwrap_or_default()
    }

    /// Calls every handler for `event` and returns how many ran.
    pub fn emit(&self, event: &str, args: &[Value]) -> usize {
        dispatch(event, &self.handlers(event), args)
    }
}

/// Invokes a handler snapshot in order.
pub(crate) fn dispatch(event: &str, handlers: &[Handler], args: &[Value]) -> usize {
    trace!(event = event, listeners = handlers.len(), "dispatch");
    for handler in handlers {
        handler(args);
    }
    handlers.len()
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut counts: Vec<_> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        counts.sort_unstable();
        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish()
    }
}
