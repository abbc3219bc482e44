//! Host platform interface
//!
//! The evaluator never touches a DOM directly. Everything it needs from the
//! hosting page goes through [`ElementHost`].

use std::fmt;

use fos_css::ComputedStyle;
use fos_dom::ClientRect;
use serde::{Deserialize, Serialize};

/// Width/height pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Which style query API a host offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleApi {
    /// Standard computed style through the owning window
    Computed,
    /// Legacy per-element current style; values may be the literal `inherit`
    Legacy,
    /// No style query at all
    Unavailable,
}

/// Element and layout queries against the hosting page.
///
/// Implementations must not cache layout: every call reflects the page as it
/// is now.
pub trait ElementHost {
    type Node: Copy + Eq + fmt::Debug;

    /// Parent node; `None` for document nodes and detached roots
    fn parent_node(&self, node: Self::Node) -> Option<Self::Node>;

    fn is_document(&self, node: Self::Node) -> bool;

    /// Lowercase tag name, for element nodes
    fn local_name(&self, node: Self::Node) -> Option<String>;

    fn attribute(&self, node: Self::Node, name: &str) -> Option<String>;

    /// Native bounding rect in viewport coordinates; `None` without a layout box
    fn client_rect(&self, node: Self::Node) -> Option<ClientRect>;

    /// Content box size, used when the native rect omits width/height
    fn content_size(&self, node: Self::Node) -> Option<Size>;

    /// Inner size of the window owning `node`, if the window reports it
    fn window_inner_size(&self, node: Self::Node) -> Option<Size>;

    /// Client size of the root element of the document owning `node`
    fn root_client_size(&self, node: Self::Node) -> Option<Size>;

    fn style_api(&self) -> StyleApi;

    /// Standard computed style; `None` for nodes without style
    fn computed_style(&self, node: Self::Node) -> Option<ComputedStyle>;

    /// Legacy current style; `None` for nodes without style
    fn current_style(&self, node: Self::Node) -> Option<ComputedStyle>;

    /// Computed styles of `node` and its ancestors, innermost first, ending
    /// at the first node without style.
    ///
    /// The default asks for each ancestor separately; hosts that resolve
    /// inheritance top-down should return the whole chain from one pass.
    fn computed_style_chain(&self, node: Self::Node) -> Vec<ComputedStyle> {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(n) = current {
            let Some(style) = self.computed_style(n) else { break };
            chain.push(style);
            current = self.parent_node(n);
        }
        chain
    }
}
