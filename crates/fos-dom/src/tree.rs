//! DOM Tree (arena-based allocation)

use crate::{DomError, ElementData, ElementGeometry, Node, NodeId, Window, WindowId};

/// Arena-based DOM tree for memory efficiency
///
/// Holds every node of every window (the top-level window and its frames).
#[derive(Debug)]
pub struct DomTree {
    nodes: Vec<Node>,
    windows: Vec<Window>,
}

impl DomTree {
    /// Create a tree whose top-level window does not report an inner size
    pub fn new() -> Self {
        let mut tree = Self { nodes: Vec::new(), windows: Vec::new() };
        tree.push_window(None, None);
        tree
    }

    /// Create a tree with a top-level viewport of the given size
    pub fn with_viewport(width: f64, height: f64) -> Self {
        let mut tree = Self { nodes: Vec::new(), windows: Vec::new() };
        tree.push_window(Some(width), Some(height));
        tree
    }

    fn push_window(&mut self, width: Option<f64>, height: Option<f64>) -> WindowId {
        let id = WindowId(self.windows.len() as u32);
        let document = self.push_node(Node::document(id));
        self.windows.push(Window::new(id, document, width, height));
        id
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Attach a new frame window to an `<iframe>` element
    pub fn create_frame(&mut self, iframe: NodeId, width: Option<f64>, height: Option<f64>) -> Result<WindowId, DomError> {
        self.element(iframe).ok_or(DomError::UnknownNode(iframe))?;
        let id = self.push_window(width, height);
        self.windows[id.index()].frame_element = Some(iframe);
        Ok(id)
    }

    /// Create a detached element owned by `window`
    pub fn create_element(&mut self, window: WindowId, tag: &str) -> NodeId {
        self.push_node(Node::element(window, tag))
    }

    /// Create a detached text node owned by `window`
    pub fn create_text(&mut self, window: WindowId, content: &str) -> NodeId {
        self.push_node(Node::text(window, content.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    ///
    /// The child's subtree is adopted into the parent's window.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_node = self.get(parent).ok_or(DomError::UnknownNode(parent))?;
        if !parent_node.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        let owner = parent_node.owner_window;
        let child_node = self.get(child).ok_or(DomError::UnknownNode(child))?;
        if child_node.is_document() || child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(DomError::HierarchyRequest { parent, child });
        }

        self.detach(child);

        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = parent;
            node.prev_sibling = last;
            node.next_sibling = NodeId::NONE;
        }
        if last.is_valid() {
            self.nodes[last.index()].next_sibling = child;
        } else {
            self.nodes[parent.index()].first_child = child;
        }
        self.nodes[parent.index()].last_child = child;

        for id in self.descendants_inclusive(child) {
            self.nodes[id.index()].owner_window = owner;
        }
        Ok(())
    }

    /// Unlink a node from its parent. Detached nodes are left untouched.
    pub fn detach(&mut self, node: NodeId) {
        let Some(n) = self.get(node) else { return };
        let (parent, prev, next) = (n.parent, n.prev_sibling, n.next_sibling);
        if !parent.is_valid() {
            return;
        }

        if prev.is_valid() {
            self.nodes[prev.index()].next_sibling = next;
        } else {
            self.nodes[parent.index()].first_child = next;
        }
        if next.is_valid() {
            self.nodes[next.index()].prev_sibling = prev;
        } else {
            self.nodes[parent.index()].last_child = prev;
        }

        let n = &mut self.nodes[node.index()];
        n.parent = NodeId::NONE;
        n.prev_sibling = NodeId::NONE;
        n.next_sibling = NodeId::NONE;
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Parent of a node, `None` for documents and detached roots
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|n| n.parent).filter(NodeId::is_valid)
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> Children<'_> {
        let next = self.get(id).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        Children { tree: self, next }
    }

    /// Iterate over the ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors { tree: self, next: self.parent(id) }
    }

    fn descendants_inclusive(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).map(|(child, _)| child));
        }
        out
    }

    /// Element data of a node, if it is an element
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id)?.as_element()
    }

    /// Lowercase tag name of an element
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    /// Attribute value of an element
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get_attr(name)
    }

    /// Set an attribute on an element
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        self.get_mut(id)
            .and_then(Node::as_element_mut)
            .ok_or(DomError::UnknownNode(id))?
            .set_attr(name, value);
        Ok(())
    }

    /// Assign a layout box to an element
    pub fn set_layout(&mut self, id: NodeId, geometry: ElementGeometry) -> Result<(), DomError> {
        self.get_mut(id)
            .and_then(Node::as_element_mut)
            .ok_or(DomError::UnknownNode(id))?
            .layout = Some(geometry);
        Ok(())
    }

    /// Remove an element's layout box
    pub fn clear_layout(&mut self, id: NodeId) {
        if let Some(elem) = self.get_mut(id).and_then(Node::as_element_mut) {
            elem.layout = None;
        }
    }

    /// Layout box of an element
    pub fn layout(&self, id: NodeId) -> Option<&ElementGeometry> {
        self.element(id)?.layout.as_ref()
    }

    /// Window whose document owns a node
    pub fn owner_window(&self, id: NodeId) -> Option<WindowId> {
        self.get(id).map(|n| n.owner_window)
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(id.index())
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(id.index())
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.iter()
    }

    /// Document node of a window
    pub fn document(&self, window: WindowId) -> Option<NodeId> {
        self.window(window).map(|w| w.document)
    }

    /// Root element (`<html>`) of a window's document
    pub fn document_element(&self, window: WindowId) -> Option<NodeId> {
        let document = self.document(window)?;
        self.children(document)
            .find(|(_, node)| node.is_element())
            .map(|(id, _)| id)
    }

    /// Get element by ID within one window's document
    pub fn get_element_by_id(&self, window: WindowId, id: &str) -> Option<NodeId> {
        let document = self.document(window)?;
        let mut stack = vec![document];
        while let Some(current) = stack.pop() {
            if self.element(current).and_then(|e| e.id.as_deref()) == Some(id) {
                return Some(current);
            }
            let mut children: Vec<NodeId> = self.children(current).map(|(c, _)| c).collect();
            children.reverse();
            stack.extend(children);
        }
        None
    }

    /// Number of nodes in the tree
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node
pub struct Children<'a> {
    tree: &'a DomTree,
    next: NodeId,
}

impl<'a> Iterator for Children<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next;
        let node = self.tree.get(id)?;
        self.next = node.next_sibling;
        Some((id, node))
    }
}

/// Iterator over the ancestors of a node
pub struct Ancestors<'a> {
    tree: &'a DomTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.parent(id);
        Some(id)
    }
}
