//! Page host
//!
//! [`ElementHost`] over a `fos-dom` tree styled by `fos-css`. Owns the page
//! visibility state and the page-level listener registry, and dispatches
//! `scroll`, `resize`, `visibilitychange` and `unload` to subscribers.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use fos_css::{ComputedStyle, PropertyId, StyleResolver};
use fos_dom::{
    ClientRect, DomError, DomEvent, DomEventType, DomTree, EventDispatcher, EventTarget,
    EventHandler, ElementGeometry, ListenerRegistry, NodeId, WindowId,
};

use crate::events::{EventSource, Subscription};
use crate::host::{ElementHost, Size, StyleApi};
use crate::page_visibility::{DocumentVisibility, PageVisibility, PageVisibilityApi, VisibilityChangeHandler};

/// A loaded page: DOM, styles, windows and page-level events
pub struct Page {
    tree: RefCell<DomTree>,
    styles: StyleResolver,
    style_api: Cell<StyleApi>,
    /// `None` when the host has no page visibility API
    visibility: Rc<Cell<Option<DocumentVisibility>>>,
    listeners: Rc<RefCell<ListenerRegistry>>,
}

impl Page {
    /// Visible page whose top-level window is `width` x `height`
    pub fn new(width: f64, height: f64) -> Self {
        Self::from_tree(DomTree::with_viewport(width, height))
    }

    pub fn from_tree(tree: DomTree) -> Self {
        Self {
            tree: RefCell::new(tree),
            styles: StyleResolver::new(),
            style_api: Cell::new(StyleApi::Computed),
            visibility: Rc::new(Cell::new(Some(DocumentVisibility::Visible))),
            listeners: Rc::new(RefCell::new(ListenerRegistry::new())),
        }
    }

    pub fn tree(&self) -> Ref<'_, DomTree> {
        self.tree.borrow()
    }

    pub fn tree_mut(&self) -> RefMut<'_, DomTree> {
        self.tree.borrow_mut()
    }

    /// Document node of the top-level window
    pub fn document(&self) -> Option<NodeId> {
        self.tree().document(WindowId::TOP)
    }

    /// Create an element in `parent`'s window and append it to `parent`
    pub fn append_element(&self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let mut tree = self.tree_mut();
        let window = tree.owner_window(parent).ok_or(DomError::UnknownNode(parent))?;
        let child = tree.create_element(window, tag);
        tree.append_child(parent, child)?;
        Ok(child)
    }

    /// Set an element's layout box (document coordinates)
    pub fn set_layout(&self, node: NodeId, geometry: ElementGeometry) -> Result<(), DomError> {
        self.tree_mut().set_layout(node, geometry)
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.tree_mut().set_attribute(node, name, value)
    }

    /// Replace an element's inline style
    pub fn set_style(&self, node: NodeId, css: &str) -> Result<(), DomError> {
        self.set_attribute(node, "style", css)
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree().get_element_by_id(WindowId::TOP, id)
    }

    /// Select which style query API the page exposes
    pub fn set_style_api(&self, api: StyleApi) {
        self.style_api.set(api);
    }

    /// Current page visibility, `None` without the API
    pub fn document_visibility(&self) -> Option<DocumentVisibility> {
        self.visibility.get()
    }

    /// Change page visibility, firing `visibilitychange` if it changed
    pub fn set_visibility_state(&self, state: DocumentVisibility) {
        if self.visibility.replace(Some(state)) == Some(state) {
            return;
        }
        tracing::debug!("Page visibility -> {:?}", state);
        self.dispatch_event(DomEvent::new(DomEventType::VisibilityChange, EventTarget::Document(WindowId::TOP)));
    }

    /// Remove the page visibility API
    pub fn disable_page_visibility(&self) {
        self.visibility.set(None);
    }

    /// Scroll a window and fire `scroll` on it
    pub fn scroll_to(&self, window: WindowId, x: f64, y: f64) -> Result<(), DomError> {
        self.tree_mut().window_mut(window).ok_or(DomError::UnknownWindow(window))?.scroll_to(x, y);
        self.dispatch_event(DomEvent::new(DomEventType::Scroll, EventTarget::Window(window)));
        Ok(())
    }

    /// Resize a window and fire `resize` on it
    pub fn resize(&self, window: WindowId, width: f64, height: f64) -> Result<(), DomError> {
        self.tree_mut().window_mut(window).ok_or(DomError::UnknownWindow(window))?.resize(width, height);
        self.dispatch_event(DomEvent::new(DomEventType::Resize, EventTarget::Window(window)));
        Ok(())
    }

    /// Fire `unload` on the top-level window
    pub fn unload(&self) {
        tracing::debug!("Unloading page");
        self.dispatch_event(DomEvent::new(DomEventType::Unload, EventTarget::Window(WindowId::TOP)));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Page visibility adapter for this page
    pub fn page_visibility(self: &Rc<Self>) -> PageVisibility {
        if self.visibility.get().is_none() {
            return PageVisibility::unavailable();
        }
        let api: Rc<dyn PageVisibilityApi> = Rc::clone(self) as Rc<dyn PageVisibilityApi>;
        PageVisibility::new(api)
    }

    fn add_listener(&self, target: EventTarget, event_type: DomEventType, handler: EventHandler) -> Subscription {
        let id = self.listeners.borrow_mut().add(target, event_type, handler);
        let registry: Weak<RefCell<ListenerRegistry>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.borrow_mut().remove(id);
            }
        })
    }

    fn window_of(&self, node: NodeId) -> Option<fos_dom::Window> {
        let tree = self.tree();
        let window = tree.owner_window(node)?;
        tree.window(window).cloned()
    }
}

impl EventDispatcher for Page {
    fn dispatch_event(&self, event: DomEvent) -> usize {
        let handlers = self.listeners.borrow().handlers_for(&event);
        tracing::trace!("Dispatching {} to {} listeners", event.event_type.name(), handlers.len());
        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }
}

impl EventSource for Page {
    /// `visibilitychange` fires on the top-level document, everything else
    /// on the top-level window
    fn subscribe(&self, event_type: DomEventType, handler: EventHandler) -> Subscription {
        let target = match event_type {
            DomEventType::VisibilityChange => EventTarget::Document(WindowId::TOP),
            _ => EventTarget::Window(WindowId::TOP),
        };
        self.add_listener(target, event_type, handler)
    }
}

impl PageVisibilityApi for Page {
    fn visibility_state(&self) -> DocumentVisibility {
        self.visibility.get().unwrap_or(DocumentVisibility::Visible)
    }

    fn on_visibility_change(&self, handler: VisibilityChangeHandler) -> Subscription {
        let state = Rc::clone(&self.visibility);
        self.subscribe(
            DomEventType::VisibilityChange,
            Rc::new(move |_: &DomEvent| handler(state.get().unwrap_or(DocumentVisibility::Visible))),
        )
    }
}

impl ElementHost for Page {
    type Node = NodeId;

    fn parent_node(&self, node: NodeId) -> Option<NodeId> {
        self.tree().parent(node)
    }

    fn is_document(&self, node: NodeId) -> bool {
        self.tree().get(node).is_some_and(|n| n.is_document())
    }

    fn local_name(&self, node: NodeId) -> Option<String> {
        self.tree().local_name(node).map(str::to_string)
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree().attribute(node, name).map(str::to_string)
    }

    fn client_rect(&self, node: NodeId) -> Option<ClientRect> {
        let layout = *self.tree().layout(node)?;
        let window = self.window_of(node)?;
        Some(layout.bounding_client_rect(window.scroll_x, window.scroll_y))
    }

    fn content_size(&self, node: NodeId) -> Option<Size> {
        self.tree().layout(node).map(|l| Size::new(l.client_width, l.client_height))
    }

    fn window_inner_size(&self, node: NodeId) -> Option<Size> {
        let (width, height) = self.window_of(node)?.inner_size()?;
        Some(Size::new(width, height))
    }

    fn root_client_size(&self, node: NodeId) -> Option<Size> {
        let tree = self.tree();
        let root = tree.document_element(tree.owner_window(node)?)?;
        tree.layout(root).map(|l| Size::new(l.client_width, l.client_height))
    }

    fn style_api(&self) -> StyleApi {
        self.style_api.get()
    }

    fn computed_style(&self, node: NodeId) -> Option<ComputedStyle> {
        self.styles.compute_style(&self.tree(), node)
    }

    fn computed_style_chain(&self, node: NodeId) -> Vec<ComputedStyle> {
        self.styles.compute_style_chain(&self.tree(), node)
    }

    /// Specified values; unset inherited properties read `inherit`, the rest
    /// their initial value
    fn current_style(&self, node: NodeId) -> Option<ComputedStyle> {
        let mut style = self.styles.specified_style(&self.tree(), node)?;
        for id in PropertyId::ALL {
            if style.value(id).is_none() {
                let value = if id.is_inherited() { "inherit" } else { id.initial_value() };
                style.set(id.name(), value);
            }
        }
        Some(style)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("nodes", &self.tree().len())
            .field("style_api", &self.style_api.get())
            .field("visibility", &self.visibility.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
