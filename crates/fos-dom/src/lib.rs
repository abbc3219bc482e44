//! fOS DOM - Document Object Model
//!
//! Arena-backed DOM tree. Every node belongs to a window (the top-level
//! window or a frame), and elements may carry layout geometry in document
//! coordinates.

mod node;
mod tree;
mod window;
pub mod geometry;
pub mod dom_events;

pub use node::{Node, NodeData, ElementData, TextData, Attribute};
pub use tree::{DomTree, Ancestors, Children};
pub use window::{Window, WindowId};
pub use geometry::{DOMRect, ClientRect, ElementGeometry};
pub use dom_events::{DomEvent, DomEventType, EventDispatcher, EventTarget, EventHandler, ListenerId, ListenerRegistry};

/// Node identifier (index into arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node"
    pub const NONE: NodeId = NodeId(u32::MAX);

    /// Build an id from a raw arena index
    pub const fn from_raw(index: u32) -> Self {
        NodeId(index)
    }

    /// Raw arena index
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Whether this id refers to a node (not the sentinel)
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::NONE
    }
}

/// DOM operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    #[error("unknown window {0:?}")]
    UnknownWindow(WindowId),

    #[error("node {0:?} cannot have children")]
    NotAContainer(NodeId),

    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },
}
