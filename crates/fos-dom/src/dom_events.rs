//! DOM Events
//!
//! Page lifecycle and viewport events, plus the listener registry used to
//! dispatch them.

use std::fmt;
use std::rc::Rc;

use crate::{NodeId, WindowId};

/// DOM event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomEventType {
    // Viewport
    Scroll,
    Resize,

    // Page visibility
    VisibilityChange,

    // Load events
    Load,
    Unload,
    BeforeUnload,
    PageHide,
}

impl DomEventType {
    /// Event name as used by `addEventListener`
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::VisibilityChange => "visibilitychange",
            Self::Load => "load",
            Self::Unload => "unload",
            Self::BeforeUnload => "beforeunload",
            Self::PageHide => "pagehide",
        }
    }

    /// Parse an event name
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name.to_ascii_lowercase().as_str() {
            "scroll" => Self::Scroll,
            "resize" => Self::Resize,
            "visibilitychange" => Self::VisibilityChange,
            "load" => Self::Load,
            "unload" => Self::Unload,
            "beforeunload" => Self::BeforeUnload,
            "pagehide" => Self::PageHide,
            _ => return None,
        })
    }
}

/// Where a listener is attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window(WindowId),
    Document(WindowId),
    Node(NodeId),
}

/// DOM event
#[derive(Debug, Clone, PartialEq)]
pub struct DomEvent {
    pub event_type: DomEventType,
    pub target: EventTarget,
    pub timestamp: f64,
}

impl DomEvent {
    pub fn new(event_type: DomEventType, target: EventTarget) -> Self {
        Self { event_type, target, timestamp: 0.0 }
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Listener callback
pub type EventHandler = Rc<dyn Fn(&DomEvent)>;

/// Listener registration handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    target: EventTarget,
    event_type: DomEventType,
    handler: EventHandler,
}

/// Registered listeners, in registration order
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<Listener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener
    pub fn add(&mut self, target: EventTarget, event_type: DomEventType, handler: EventHandler) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push(Listener { id, target, event_type, handler });
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    /// Snapshot of the handlers for an event.
    ///
    /// Dispatchers call the returned handlers after releasing the registry,
    /// so handlers may add or remove listeners.
    pub fn handlers_for(&self, event: &DomEvent) -> Vec<EventHandler> {
        self.listeners.iter()
            .filter(|l| l.target == event.target && l.event_type == event.event_type)
            .map(|l| Rc::clone(&l.handler))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Event dispatcher trait
pub trait EventDispatcher {
    /// Dispatch to matching listeners, returning how many ran
    fn dispatch_event(&self, event: DomEvent) -> usize;
}
