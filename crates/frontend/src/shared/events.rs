//! Named-event pub/sub used by pages, the page container and the router

use std::collections::HashMap;

pub type HandlerId = u64;

struct Handler<E> {
    id: HandlerId,
    once: bool,
    callback: Box<dyn FnMut(&E)>,
}

pub struct EventBus<E> {
    handlers: HashMap<String, Vec<Handler<E>>>,
    next_id: HandlerId,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribe(&mut self, event: &str, once: bool, callback: Box<dyn FnMut(&E)>) -> HandlerId {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers
            .entry(event.to_string())
            .or_default()
            .push(Handler { id, once, callback });
        id
    }

    pub fn on(&mut self, event: &str, callback: impl FnMut(&E) + 'static) -> HandlerId {
        self.subscribe(event, false, Box::new(callback))
    }

    /// Handler removed after its first invocation.
    pub fn once(&mut self, event: &str, callback: impl FnMut(&E) + 'static) -> HandlerId {
        self.subscribe(event, true, Box::new(callback))
    }

    /// Remove one handler, or every handler of `event` when `id` is `None`.
    pub fn off(&mut self, event: &str, id: Option<HandlerId>) {
        match id {
            None => {
                self.handlers.remove(event);
            }
            Some(id) => {
                if let Some(list) = self.handlers.get_mut(event) {
                    list.retain(|h| h.id != id);
                }
            }
        }
    }

    /// Invoke handlers in subscription order; returns how many ran.
    pub fn trigger(&mut self, event: &str, payload: &E) -> usize {
        let Some(list) = self.handlers.get_mut(event) else {
            return 0;
        };
        for handler in list.iter_mut() {
            (handler.callback)(payload);
        }
        let count = list.len();
        list.retain(|h| !h.once);
        count
    }

    pub fn has_handlers(&self, event: &str) -> bool {
        self.handlers.get(event).is_some_and(|l| !l.is_empty())
    }
}
