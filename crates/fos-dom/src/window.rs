//! Windows and frames
//!
//! Each window owns one document node. Frames are windows whose document is
//! hosted by an `<iframe>` element in another window.

use crate::NodeId;

/// Window identifier (index into the tree's window table)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub(crate) u32);

impl WindowId {
    /// The top-level window of a tree
    pub const TOP: WindowId = WindowId(0);

    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Browsing context state
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    /// Document node of this window
    pub document: NodeId,
    /// `<iframe>` hosting this window (None for the top-level window)
    pub frame_element: Option<NodeId>,
    /// `innerWidth`, if the host reports it
    pub inner_width: Option<f64>,
    /// `innerHeight`, if the host reports it
    pub inner_height: Option<f64>,
    /// Horizontal scroll offset
    pub scroll_x: f64,
    /// Vertical scroll offset
    pub scroll_y: f64,
}

impl Window {
    pub(crate) fn new(id: WindowId, document: NodeId, width: Option<f64>, height: Option<f64>) -> Self {
        Self {
            id,
            document,
            frame_element: None,
            inner_width: width,
            inner_height: height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// Inner size when both dimensions are known
    pub fn inner_size(&self) -> Option<(f64, f64)> {
        Some((self.inner_width?, self.inner_height?))
    }

    /// Resize the viewport
    pub fn resize(&mut self, width: f64, height: f64) {
        self.inner_width = Some(width);
        self.inner_height = Some(height);
    }

    /// Scroll to an absolute offset (negative offsets clamp to 0)
    pub fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x.max(0.0);
        self.scroll_y = y.max(0.0);
    }

    /// Scroll by a relative amount
    pub fn scroll_by(&mut self, dx: f64, dy: f64) {
        self.scroll_to(self.scroll_x + dx, self.scroll_y + dy);
    }

    pub fn is_frame(&self) -> bool {
        self.frame_element.is_some()
    }
}
