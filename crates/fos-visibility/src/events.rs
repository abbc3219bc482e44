//! Subscriptions, event scopes and the monitor event emitter
//!
//! Everything here is single-threaded: handlers are `Rc` closures and state
//! sits behind `RefCell`. Emitters and scopes never hold a borrow while a
//! handler runs, so handlers may subscribe, unsubscribe or dispose freely.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use fos_dom::{DomEvent, DomEventType, EventHandler};

/// A live registration. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + 'static) -> Self {
        Self { unsubscribe: Some(Box::new(unsubscribe)) }
    }

    /// Subscription with nothing to release
    pub fn noop() -> Self {
        Self { unsubscribe: None }
    }

    pub fn is_active(&self) -> bool {
        self.unsubscribe.is_some()
    }

    /// Release the registration. Later calls do nothing.
    pub fn cancel(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("active", &self.is_active()).finish()
    }
}

/// Page-level event subscription
pub trait EventSource {
    fn subscribe(&self, event_type: DomEventType, handler: EventHandler) -> Subscription;
}

/// Owns a set of subscriptions and releases them together.
///
/// Disposal is idempotent; subscriptions added after disposal are released
/// on the spot.
#[derive(Debug, Default)]
pub struct EventScope {
    subscriptions: RefCell<Vec<Subscription>>,
    disposed: Cell<bool>,
}

impl EventScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, mut subscription: Subscription) {
        if self.disposed.get() {
            tracing::debug!("EventScope already disposed; releasing new subscription");
            subscription.cancel();
            return;
        }
        self.subscriptions.borrow_mut().push(subscription);
    }

    /// Release every subscription, returning how many were released
    pub fn dispose_all(&self) -> usize {
        self.disposed.set(true);
        let drained = std::mem::take(&mut *self.subscriptions.borrow_mut());
        let count = drained.len();
        drop(drained);
        if count > 0 {
            tracing::debug!("EventScope released {} subscriptions", count);
        }
        count
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispose this scope when `source` fires `unload`
    pub fn bind_unload(self: &Rc<Self>, source: &dyn EventSource) {
        let scope: Weak<Self> = Rc::downgrade(self);
        let subscription = source.subscribe(
            DomEventType::Unload,
            Rc::new(move |_: &DomEvent| {
                if let Some(scope) = scope.upgrade() {
                    scope.dispose_all();
                }
            }),
        );
        self.add(subscription);
    }
}

/// Emitter listener handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmitterListenerId(u64);

/// Typed event emitter with `on`/`off`/`emit`
pub struct EventEmitter<E> {
    listeners: RefCell<Vec<(EmitterListenerId, Rc<dyn Fn(&E)>)>>,
    next_id: Cell<u64>,
}

impl<E> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn on(&self, listener: impl Fn(&E) + 'static) -> EmitterListenerId {
        let id = EmitterListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    /// Remove a listener; unknown ids are ignored
    pub fn off(&self, id: EmitterListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(l, _)| *l != id);
        listeners.len() != before
    }

    /// Call every listener registered at the time of the call
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Rc<dyn Fn(&E)>> = self.listeners.borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }
}

impl<E> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_subscription(counter: &Rc<Cell<u32>>) -> Subscription {
        let counter = Rc::clone(counter);
        Subscription::new(move || counter.set(counter.get() + 1))
    }

    #[test]
    fn test_subscription_cancels_once() {
        let released = Rc::new(Cell::new(0));
        let mut sub = counting_subscription(&released);
        sub.cancel();
        sub.cancel();
        drop(sub);
        assert_eq!(released.get(), 1);
    }

    #[test]
    fn test_scope_dispose_is_idempotent() {
        let released = Rc::new(Cell::new(0));
        let scope = EventScope::new();
        scope.add(counting_subscription(&released));
        scope.add(counting_subscription(&released));

        assert_eq!(scope.dispose_all(), 2);
        assert_eq!(scope.dispose_all(), 0);
        assert_eq!(released.get(), 2);
        assert!(scope.is_disposed());

        scope.add(counting_subscription(&released));
        assert_eq!(released.get(), 3);
        assert!(scope.is_empty());
    }

    #[test]
    fn test_emitter_on_off() {
        let emitter: EventEmitter<u32> = EventEmitter::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        let id = emitter.on(move |v| s.borrow_mut().push(*v));
        emitter.emit(&1);
        assert!(emitter.off(id));
        assert!(!emitter.off(id));
        emitter.emit(&2);

        assert_eq!(*seen.borrow(), vec![1]);
    }

    #[test]
    fn test_listener_may_unsubscribe_during_emit() {
        let emitter: Rc<EventEmitter<()>> = Rc::new(EventEmitter::new());
        let hits = Rc::new(Cell::new(0));

        let own_id: Rc<Cell<Option<EmitterListenerId>>> = Rc::new(Cell::new(None));
        let (e, h, own) = (Rc::clone(&emitter), Rc::clone(&hits), Rc::clone(&own_id));
        let id = emitter.on(move |_| {
            h.set(h.get() + 1);
            if let Some(id) = own.get() {
                e.off(id);
            }
        });
        own_id.set(Some(id));

        emitter.emit(&());
        emitter.emit(&());
        assert_eq!(hits.get(), 1);
        assert_eq!(emitter.listener_count(), 0);
    }
}
