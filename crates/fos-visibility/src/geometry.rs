//! Geometry Engine
//!
//! Element rectangles, viewport extents and the intersection queries built on
//! them. Nothing here is cached; layout may change between calls.

use fos_dom::ClientRect;
use serde::Serialize;

use crate::host::{ElementHost, Size};

/// Element rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rectangle {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    /// Build from a native rect query, taking width/height from `fallback`
    /// when the query omits them. Non-finite input yields a zero rectangle.
    pub fn from_client_rect(rect: &ClientRect, fallback: Option<Size>) -> Self {
        let width = rect.width.or(fallback.map(|s| s.width)).unwrap_or(0.0);
        let height = rect.height.or(fallback.map(|s| s.height)).unwrap_or(0.0);

        let values = [rect.top, rect.left, rect.bottom, rect.right, width, height];
        if values.iter().any(|v| !v.is_finite()) {
            return Self::default();
        }

        Self {
            top: rect.top,
            left: rect.left,
            bottom: rect.bottom,
            right: rect.right,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            top: y,
            left: x,
            bottom: y + height,
            right: x + width,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Positive width and height
    #[inline]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Overlaps the viewport on both axes.
    ///
    /// Half-open: an edge exactly at 0 or at the viewport extent does not count
    /// as overlap.
    pub fn intersects(&self, viewport: &Viewport) -> bool {
        self.has_area()
            && self.bottom > 0.0
            && self.right > 0.0
            && self.top < viewport.height
            && self.left < viewport.width
    }

    /// All four edges inside the viewport: lower bounds inclusive, upper bounds strict
    pub fn is_within(&self, viewport: &Viewport) -> bool {
        self.intersects(viewport)
            && self.top >= 0.0
            && self.left >= 0.0
            && self.bottom < viewport.height
            && self.right < viewport.width
    }

    /// Fraction of the area inside the viewport, in [0, 1]
    pub fn visible_fraction(&self, viewport: &Viewport) -> f64 {
        if !self.intersects(viewport) {
            return 0.0;
        }

        let visible_height = visible_extent(self.top, self.bottom, self.height, viewport.height);
        let visible_width = visible_extent(self.left, self.right, self.width, viewport.width);

        let fraction = (visible_height * visible_width) / (self.height * self.width);
        fraction.clamp(0.0, 1.0)
    }
}

/// Visible length of one axis, clamping against each viewport edge separately
fn visible_extent(start: f64, end: f64, length: f64, extent: f64) -> f64 {
    let visible = if start >= 0.0 {
        // starts inside: cut at the far edge
        length.min(extent - start)
    } else if end > 0.0 {
        // starts before the viewport: cut at the near edge
        extent.min(end)
    } else {
        0.0
    };
    visible.max(0.0)
}

/// Visible scrolling area of a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<Size> for Viewport {
    fn from(size: Size) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Bounding rectangle of an element. Never fails; elements without layout get
/// a zero rectangle.
pub fn bounding_rect<H: ElementHost>(host: &H, node: H::Node) -> Rectangle {
    match host.client_rect(node) {
        Some(rect) => {
            let fallback = if rect.width.is_none() || rect.height.is_none() {
                host.content_size(node)
            } else {
                None
            };
            Rectangle::from_client_rect(&rect, fallback)
        }
        None => Rectangle::default(),
    }
}

/// Viewport of the window owning `node`, falling back to the document root's
/// client size when the window does not report inner dimensions.
pub fn viewport<H: ElementHost>(host: &H, node: H::Node) -> Viewport {
    if let Some(size) = host.window_inner_size(node) {
        return size.into();
    }
    match host.root_client_size(node) {
        Some(size) => size.into(),
        None => {
            tracing::debug!("No viewport size for {:?}; treating as empty", node);
            Viewport::default()
        }
    }
}

/// Element overlaps its viewport
pub fn is_in_viewport<H: ElementHost>(host: &H, node: H::Node) -> bool {
    bounding_rect(host, node).intersects(&viewport(host, node))
}

/// Element lies entirely inside its viewport
pub fn is_fully_in_viewport<H: ElementHost>(host: &H, node: H::Node) -> bool {
    bounding_rect(host, node).is_within(&viewport(host, node))
}

/// Fraction of the element's area inside its viewport
pub fn visible_percentage<H: ElementHost>(host: &H, node: H::Node) -> f64 {
    bounding_rect(host, node).visible_fraction(&viewport(host, node))
}
