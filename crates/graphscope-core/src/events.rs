//! Typed event dispatch.
//!
//! Components expose an [`EventEmitter`] member instead of inheriting emitter
//! behaviour. Event kinds are closed enums, so subscribing to a kind that does
//! not exist is a compile error rather than a silently dead string key.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// An event that can be dispatched through an [`EventEmitter`].
pub trait Event {
    /// The discriminant listeners subscribe to.
    type Kind: Copy + Eq + Hash;

    /// Returns the kind of this event.
    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`EventEmitter::on`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

/// A set of listeners keyed by event kind.
///
/// Listeners for a kind run in the order they subscribed. A panicking
/// listener stops dispatch for the remaining listeners of that event.
pub struct EventEmitter<E: Event> {
    listeners: HashMap<E::Kind, Vec<(ListenerId, Listener<E>)>>,
    next_id: u64,
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<E: Event> std::fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listeners.values().map(Vec::len).sum::<usize>())
            .finish()
    }
}

impl<E: Event> EventEmitter<E> {
    /// Creates an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes `callback` to events of `kind`.
    pub fn on(&mut self, kind: E::Kind, callback: impl FnMut(&E) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes a listener. Returns false if it was not subscribed to `kind`.
    pub fn off(&mut self, kind: E::Kind, id: ListenerId) -> bool {
        let Some(list) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|(listener, _)| *listener != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.listeners.remove(&kind);
        }
        removed
    }

    /// Dispatches `event` to every listener of its kind.
    pub fn emit(&mut self, event: &E) {
        if let Some(list) = self.listeners.get_mut(&event.kind()) {
            for (_, callback) in list.iter_mut() {
                callback(event);
            }
        }
    }

    /// Returns the number of listeners subscribed to `kind`.
    #[must_use]
    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

/// Kinds of semantic pick events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PickEventKind {
    /// The pointer entered an element.
    HoverOn,
    /// The pointer left an element.
    HoverOff,
    /// An element was clicked.
    Click,
}

/// A semantic pick event carrying the decoded element id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickEvent {
    /// The pointer entered the element with this id.
    HoverOn(u32),
    /// The pointer left the element with this id.
    HoverOff(u32),
    /// The element with this id was clicked.
    Click(u32),
}

impl PickEvent {
    /// Returns the decoded element id.
    #[must_use]
    pub fn id(&self) -> u32 {
        match *self {
            Self::HoverOn(id) | Self::HoverOff(id) | Self::Click(id) => id,
        }
    }
}

impl Event for PickEvent {
    type Kind = PickEventKind;

    fn kind(&self) -> PickEventKind {
        match self {
            Self::HoverOn(_) => PickEventKind::HoverOn,
            Self::HoverOff(_) => PickEventKind::HoverOff,
            Self::Click(_) => PickEventKind::Click,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_reaches_matching_kind_only() {
        let mut emitter = EventEmitter::<PickEvent>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        emitter.on(PickEventKind::Click, move |e| sink.borrow_mut().push(*e));

        emitter.emit(&PickEvent::HoverOn(1));
        emitter.emit(&PickEvent::Click(2));
        assert_eq!(*seen.borrow(), vec![PickEvent::Click(2)]);
    }

    #[test]
    fn test_listeners_run_in_subscription_order() {
        let mut emitter = EventEmitter::<PickEvent>::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            emitter.on(PickEventKind::HoverOn, move |_| order.borrow_mut().push(tag));
        }
        emitter.emit(&PickEvent::HoverOn(0));
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_off_removes_listener() {
        let mut emitter = EventEmitter::<PickEvent>::new();
        let count = Rc::new(RefCell::new(0));

        let sink = Rc::clone(&count);
        let id = emitter.on(PickEventKind::Click, move |_| *sink.borrow_mut() += 1);
        assert_eq!(emitter.listener_count(PickEventKind::Click), 1);

        assert!(!emitter.off(PickEventKind::HoverOn, id));
        assert!(emitter.off(PickEventKind::Click, id));
        assert!(!emitter.off(PickEventKind::Click, id));

        emitter.emit(&PickEvent::Click(3));
        assert_eq!(*count.borrow(), 0);
        assert_eq!(emitter.listener_count(PickEventKind::Click), 0);
    }

    #[test]
    fn test_pick_event_id() {
        assert_eq!(PickEvent::HoverOff(9).id(), 9);
        assert_eq!(PickEvent::Click(4).kind(), PickEventKind::Click);
    }
}
