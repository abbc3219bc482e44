//! Geometry APIs
//!
//! DOMRect, getBoundingClientRect and the client/offset box sizes.

/// DOMRect - rectangle geometry
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DOMRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DOMRect {
    /// Create with dimensions
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Top edge (same as y)
    pub fn top(&self) -> f64 {
        self.y
    }

    /// Right edge
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Left edge (same as x)
    pub fn left(&self) -> f64 {
        self.x
    }

    /// Translate by an offset
    pub fn translate(&self, dx: f64, dy: f64) -> DOMRect {
        DOMRect::from_xywh(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// Result of a native bounding-rect query.
///
/// Older engines report only the four edges; `width`/`height` are `None` there.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClientRect {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl ClientRect {
    /// Edges-only rect, as a legacy engine reports it
    pub fn from_edges(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self { top, left, bottom, right, width: None, height: None }
    }
}

impl From<DOMRect> for ClientRect {
    fn from(rect: DOMRect) -> Self {
        Self {
            top: rect.top(),
            left: rect.left(),
            bottom: rect.bottom(),
            right: rect.right(),
            width: Some(rect.width),
            height: Some(rect.height),
        }
    }
}

/// Element layout state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementGeometry {
    /// Border box in document coordinates
    pub border_box: DOMRect,

    /// Client size (content + padding, no scrollbar)
    pub client_width: f64,
    pub client_height: f64,

    /// Whether rect queries include width/height (false mimics legacy engines)
    pub reports_size: bool,
}

impl ElementGeometry {
    /// Layout box whose client size equals its border box
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            border_box: DOMRect::from_xywh(x, y, width, height),
            client_width: width.max(0.0),
            client_height: height.max(0.0),
            reports_size: true,
        }
    }

    /// Same box, but rect queries omit width/height
    pub fn edges_only(mut self) -> Self {
        self.reports_size = false;
        self
    }

    /// Override the client (content box) size
    pub fn with_client_size(mut self, width: f64, height: f64) -> Self {
        self.client_width = width;
        self.client_height = height;
        self
    }

    /// Get bounding client rect relative to a window scrolled to (scroll_x, scroll_y)
    pub fn bounding_client_rect(&self, scroll_x: f64, scroll_y: f64) -> ClientRect {
        let rect = self.border_box.translate(-scroll_x, -scroll_y);
        if self.reports_size {
            rect.into()
        } else {
            ClientRect::from_edges(rect.top(), rect.left(), rect.bottom(), rect.right())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_rect() {
        let rect = DOMRect::from_xywh(10.0, 20.0, 100.0, 50.0);

        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
        assert_eq!(rect.left(), 10.0);

        let moved = rect.translate(-10.0, -20.0);
        assert_eq!((moved.x, moved.y, moved.width), (0.0, 0.0, 100.0));
    }

    #[test]
    fn test_bounding_client_rect_scrolls() {
        let geom = ElementGeometry::from_xywh(0.0, 500.0, 100.0, 40.0);
        let rect = geom.bounding_client_rect(0.0, 450.0);
        assert_eq!(rect.top, 50.0);
        assert_eq!(rect.bottom, 90.0);
        assert_eq!(rect.height, Some(40.0));
    }

    #[test]
    fn test_edges_only() {
        let geom = ElementGeometry::from_xywh(5.0, 5.0, 10.0, 10.0).edges_only();
        let rect = geom.bounding_client_rect(0.0, 0.0);
        assert_eq!(rect.width, None);
        assert_eq!(rect.right, 15.0);
    }
}
