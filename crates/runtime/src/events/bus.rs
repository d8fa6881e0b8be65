//! Priority-ordered interceptor bus.
//!
//! Unlike a broadcast channel, every listener sees the event in turn and hands
//! back a (possibly rewritten) event for the next one. Any listener can abort
//! the dispatch by returning an error; the operation that dispatched the
//! event then does not happen.

use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tracing::{error, trace};

use super::handler::EventHandler;
use crate::api::{Result, RuntimeError};
use crate::lock;

/// An event that can travel through an [`EventBus`].
pub trait BusEvent: Send + 'static {
    /// Listeners are registered per kind.
    type Kind: Copy + Eq + Hash + Debug + Display + Send + Sync + 'static;

    fn kind(&self) -> Self::Kind;

    /// Instantaneous events are resolved without presentation delays.
    fn instantaneous(&self) -> bool;
}

struct Listener<E> {
    handler: Arc<dyn EventHandler<E>>,
    priority: i32,
    once: bool,
}

impl<E> Listener<E> {
    fn matches(&self, handler: &Arc<dyn EventHandler<E>>, priority: i32, once: bool) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.handler), Arc::as_ptr(handler))
            && self.priority == priority
            && self.once == once
    }
}

impl<E> Clone for Listener<E> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            priority: self.priority,
            once: self.once,
        }
    }
}

/// Per-owner interceptor bus.
///
/// Listeners run in descending priority; equal priorities run in
/// registration order.
pub struct EventBus<E: BusEvent> {
    listeners: Mutex<HashMap<E::Kind, Vec<Listener<E>>>>,
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            listeners: Mutex::new(HashMap::new()),
        }
    }

    /// Registers `handler` for `kind`.
    ///
    /// `once` listeners are removed the first time a dispatch reaches them,
    /// whether or not the dispatch later succeeds.
    pub fn subscribe(
        &self,
        kind: E::Kind,
        handler: Arc<dyn EventHandler<E>>,
        priority: i32,
        once: bool,
    ) {
        let mut listeners = lock(&self.listeners);
        let list = listeners.entry(kind).or_default();
        let position = list
            .iter()
            .position(|existing| existing.priority < priority)
            .unwrap_or(list.len());
        list.insert(
            position,
            Listener {
                handler,
                priority,
                once,
            },
        );
        trace!(target: "battle::bus", event = %kind, priority, once, "Listener added");
    }

    /// Removes every registration of `handler` for `kind` with the same
    /// priority and `once` flag. Anything else is left alone.
    pub fn unsubscribe(
        &self,
        kind: E::Kind,
        handler: &Arc<dyn EventHandler<E>>,
        priority: i32,
        once: bool,
    ) {
        let mut listeners = lock(&self.listeners);
        if let Some(list) = listeners.get_mut(&kind) {
            list.retain(|listener| !listener.matches(handler, priority, once));
        }
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        lock(&self.listeners).get(&kind).map_or(0, Vec::len)
    }

    /// Runs `event` through every listener of its kind.
    ///
    /// Returns the event as rewritten by the last listener, or the first
    /// listener error. With no listeners the event comes back untouched
    /// without yielding.
    pub async fn dispatch(&self, event: E) -> Result<E> {
        let kind = event.kind();
        let chain = {
            let mut listeners = lock(&self.listeners);
            match listeners.get_mut(&kind) {
                Some(list) if !list.is_empty() => {
                    let chain = list.clone();
                    list.retain(|listener| !listener.once);
                    chain
                }
                _ => return Ok(event),
            }
        };

        let mut event = event;
        for (position, listener) in chain.iter().enumerate() {
            event = listener.handler.handle(event).await.inspect_err(|err| {
                error!(
                    target: "battle::bus",
                    event = %kind,
                    position,
                    error = %err,
                    "Listener rejected event"
                );
            })?;

            let found = event.kind();
            if found != kind {
                return Err(RuntimeError::EventKindChanged {
                    expected: kind.to_string(),
                    found: found.to_string(),
                });
            }
        }
        Ok(event)
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::handler_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
    enum Kind {
        Ping,
        Pong,
    }

    #[derive(Debug)]
    struct Note {
        kind: Kind,
        trail: Vec<&'static str>,
    }

    impl Note {
        fn ping() -> Self {
            Self {
                kind: Kind::Ping,
                trail: Vec::new(),
            }
        }
    }

    impl BusEvent for Note {
        type Kind = Kind;

        fn kind(&self) -> Kind {
            self.kind
        }

        fn instantaneous(&self) -> bool {
            true
        }
    }

    fn stamp(label: &'static str) -> Arc<dyn EventHandler<Note>> {
        handler_fn(move |mut note: Note| async move {
            note.trail.push(label);
            Ok(note)
        })
    }

    #[tokio::test]
    async fn higher_priority_runs_first() {
        let bus = EventBus::new();
        bus.subscribe(Kind::Ping, stamp("low"), 1, false);
        bus.subscribe(Kind::Ping, stamp("high"), 2, false);
        bus.subscribe(Kind::Ping, stamp("low-second"), 1, false);

        let note = bus.dispatch(Note::ping()).await.unwrap();
        assert_eq!(note.trail, ["high", "low", "low-second"]);
    }

    #[tokio::test]
    async fn once_listeners_fire_a_single_time() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        let handler = handler_fn(move |note: Note| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(note)
            }
        });
        bus.subscribe(Kind::Ping, handler, 0, true);

        bus.dispatch(Note::ping()).await.unwrap();
        bus.dispatch(Note::ping()).await.unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(Kind::Ping), 0);
    }

    #[tokio::test]
    async fn no_listeners_returns_event_untouched() {
        let bus = EventBus::<Note>::new();
        let note = bus.dispatch(Note::ping()).await.unwrap();
        assert!(note.trail.is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_needs_an_exact_match() {
        let bus = EventBus::new();
        let handler = stamp("x");
        bus.subscribe(Kind::Ping, Arc::clone(&handler), 1, false);

        bus.unsubscribe(Kind::Ping, &handler, 2, false);
        bus.unsubscribe(Kind::Ping, &handler, 1, true);
        bus.unsubscribe(Kind::Pong, &handler, 1, false);
        assert_eq!(bus.listener_count(Kind::Ping), 1);

        bus.unsubscribe(Kind::Ping, &handler, 1, false);
        assert_eq!(bus.listener_count(Kind::Ping), 0);
    }

    #[tokio::test]
    async fn rejection_stops_the_chain() {
        let bus = EventBus::new();
        bus.subscribe(
            Kind::Ping,
            handler_fn(|_: Note| async { Err(RuntimeError::rejected("blocked")) }),
            5,
            false,
        );
        bus.subscribe(Kind::Ping, stamp("never"), 1, false);

        let err = bus.dispatch(Note::ping()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Rejected(reason) if reason == "blocked"));
    }

    #[tokio::test]
    async fn changing_the_event_kind_is_an_error() {
        let bus = EventBus::new();
        bus.subscribe(
            Kind::Ping,
            handler_fn(|mut note: Note| async move {
                note.kind = Kind::Pong;
                Ok(note)
            }),
            0,
            false,
        );

        let err = bus.dispatch(Note::ping()).await.unwrap_err();
        assert!(matches!(err, RuntimeError::EventKindChanged { .. }));
    }
}
