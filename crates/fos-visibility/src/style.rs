//! Style Resolver
//!
//! Effective `display`/`visibility` of an element. Callers detect the style
//! API once and pass it in. Ancestor chains are walked iteratively and
//! resolved in a single pass, so deep trees cost linear time and no stack.

use fos_css::ComputedStyle;

use crate::error::{Result, VisibilityError};
use crate::host::{ElementHost, StyleApi};

/// Check that the host can answer style queries at all
pub fn detect_style_api<H: ElementHost>(host: &H) -> Result<StyleApi> {
    match host.style_api() {
        StyleApi::Unavailable => Err(unsupported()),
        api => Ok(api),
    }
}

fn unsupported() -> VisibilityError {
    VisibilityError::UnsupportedEnvironment { capability: "style query API" }
}

/// Style view of a node through `api`.
///
/// `Ok(None)` means the node itself has no style (documents, text).
pub fn effective_style<H: ElementHost>(host: &H, api: StyleApi, node: H::Node) -> Result<Option<ComputedStyle>> {
    match api {
        StyleApi::Computed => Ok(host.computed_style(node)),
        StyleApi::Legacy => Ok(host.current_style(node)),
        StyleApi::Unavailable => Err(unsupported()),
    }
}

/// Style views of `node` and its ancestors through `api`, innermost first.
/// Ends at the first node without style.
pub fn style_chain<H: ElementHost>(host: &H, api: StyleApi, node: H::Node) -> Result<Vec<ComputedStyle>> {
    match api {
        StyleApi::Computed => Ok(host.computed_style_chain(node)),
        StyleApi::Legacy => {
            let mut chain = Vec::new();
            let mut current = Some(node);
            while let Some(n) = current {
                let Some(style) = host.current_style(n) else { break };
                chain.push(style);
                current = host.parent_node(n);
            }
            Ok(chain)
        }
        StyleApi::Unavailable => Err(unsupported()),
    }
}

/// Resolve a property, following literal `inherit` values up the tree.
///
/// Yields `None` when the walk reaches the root still inheriting, or meets a
/// node without style.
pub fn effective_style_property<H: ElementHost>(
    host: &H,
    api: StyleApi,
    node: H::Node,
    property: &str,
) -> Result<Option<String>> {
    let mut current = Some(node);
    while let Some(n) = current {
        let Some(style) = effective_style(host, api, n)? else {
            return Ok(None);
        };
        match style.get(property) {
            Some(value) if value.eq_ignore_ascii_case("inherit") => current = host.parent_node(n),
            Some(value) => return Ok(Some(value.to_string())),
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// No element on the path to the root has `display: none`
pub fn is_displayed<H: ElementHost>(host: &H, api: StyleApi, node: H::Node) -> Result<bool> {
    let chain = style_chain(host, api, node)?;
    Ok(!resolved_values(&chain, "display").contains(&Some("none")))
}

/// Visibility as far as styling is concerned.
///
/// The document itself is visible; detached nodes are not; hidden inputs
/// never are, whatever their CSS says.
pub fn is_visible_by_styling<H: ElementHost>(host: &H, api: StyleApi, node: H::Node) -> Result<bool> {
    if host.is_document(node) {
        return Ok(true);
    }
    if host.parent_node(node).is_none() {
        return Ok(false);
    }
    if is_hidden_input(host, node) {
        return Ok(false);
    }

    let chain = style_chain(host, api, node)?;
    let visibility = resolved_values(&chain, "visibility").first().copied().flatten();
    if matches!(visibility, Some("hidden" | "collapse")) {
        return Ok(false);
    }
    Ok(!resolved_values(&chain, "display").contains(&Some("none")))
}

/// Value of `property` for every entry of an innermost-first chain, with
/// literal `inherit` replaced by the value above it
fn resolved_values<'a>(chain: &'a [ComputedStyle], property: &str) -> Vec<Option<&'a str>> {
    let mut values = vec![None; chain.len()];
    let mut above = None;
    for (i, style) in chain.iter().enumerate().rev() {
        above = match style.get(property) {
            Some(value) if value.eq_ignore_ascii_case("inherit") => above,
            value => value,
        };
        values[i] = above;
    }
    values
}

fn is_hidden_input<H: ElementHost>(host: &H, node: H::Node) -> bool {
    host.local_name(node).as_deref() == Some("input")
        && host.attribute(node, "type").is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use crate::host::Size;
    use crate::page::Page;
    use fos_dom::{ClientRect, NodeId};

    /// `<html><body><div id=outer><span/></div></body></html>`
    fn page() -> (Page, NodeId, NodeId, NodeId) {
        let page = Page::new(800.0, 600.0);
        let document = page.document().unwrap();
        let html = page.append_element(document, "html").unwrap();
        let body = page.append_element(html, "body").unwrap();
        let outer = page.append_element(body, "div").unwrap();
        let span = page.append_element(outer, "span").unwrap();
        (page, body, outer, span)
    }

    #[test]
    fn test_detect_style_api() {
        let (page, ..) = page();
        assert_eq!(detect_style_api(&page).unwrap(), StyleApi::Computed);
        page.set_style_api(StyleApi::Unavailable);
        assert!(matches!(
            detect_style_api(&page),
            Err(VisibilityError::UnsupportedEnvironment { .. })
        ));
    }

    #[test]
    fn test_display_none_ancestor() {
        let (page, body, outer, span) = page();
        assert!(is_visible_by_styling(&page, StyleApi::Computed, span).unwrap());

        page.set_style(outer, "display: none").unwrap();
        assert!(!is_displayed(&page, StyleApi::Computed, span).unwrap());
        assert!(!is_visible_by_styling(&page, StyleApi::Computed, span).unwrap());
        assert!(is_visible_by_styling(&page, StyleApi::Computed, body).unwrap());
    }

    #[test]
    fn test_visibility_hidden_inherits() {
        let (page, _body, outer, span) = page();
        page.set_style(outer, "visibility: hidden").unwrap();
        assert!(!is_visible_by_styling(&page, StyleApi::Computed, span).unwrap());

        page.set_style(span, "visibility: visible").unwrap();
        assert!(is_visible_by_styling(&page, StyleApi::Computed, span).unwrap());

        page.set_style(span, "visibility: collapse").unwrap();
        assert!(!is_visible_by_styling(&page, StyleApi::Computed, span).unwrap());
    }

    #[test]
    fn test_legacy_inherit_walk() {
        let (page, _body, outer, span) = page();
        page.set_style(outer, "visibility: hidden").unwrap();

        assert_eq!(page.current_style(span).unwrap().get("visibility"), Some("inherit"));
        assert_eq!(effective_style_property(&page, StyleApi::Legacy, span, "visibility").unwrap().as_deref(), Some("hidden"));
        assert!(!is_visible_by_styling(&page, StyleApi::Legacy, span).unwrap());

        page.set_style(outer, "display: none").unwrap();
        page.set_style(span, "visibility: visible").unwrap();
        assert!(!is_displayed(&page, StyleApi::Legacy, span).unwrap());
    }

    #[test]
    fn test_inherit_to_root_yields_none() {
        let (page, body, ..) = page();
        assert_eq!(effective_style_property(&page, StyleApi::Legacy, body, "visibility").unwrap(), None);
        assert!(is_visible_by_styling(&page, StyleApi::Legacy, body).unwrap());
    }

    #[test]
    fn test_hidden_input() {
        let (page, body, ..) = page();
        let input = page.append_element(body, "input").unwrap();
        page.set_attribute(input, "type", "HIDDEN").unwrap();
        page.set_style(input, "display: block; visibility: visible").unwrap();
        assert!(!is_visible_by_styling(&page, StyleApi::Computed, input).unwrap());
    }

    #[test]
    fn test_document_and_detached() {
        let (page, ..) = page();
        let document = page.document().unwrap();
        assert!(is_visible_by_styling(&page, StyleApi::Computed, document).unwrap());

        let detached = page.tree_mut().create_element(fos_dom::WindowId::TOP, "div");
        assert!(!is_visible_by_styling(&page, StyleApi::Computed, detached).unwrap());
    }

    #[test]
    fn test_unavailable_api_is_an_error() {
        let (page, _body, _outer, span) = page();
        assert!(matches!(
            is_visible_by_styling(&page, StyleApi::Unavailable, span),
            Err(VisibilityError::UnsupportedEnvironment { .. })
        ));
        assert!(effective_style(&page, StyleApi::Unavailable, span).is_err());
    }

    #[test]
    fn test_explicit_api_ignores_host_report() {
        let (page, _body, outer, span) = page();
        page.set_style(outer, "visibility: hidden").unwrap();
        page.set_style_api(StyleApi::Unavailable);
        assert!(!is_visible_by_styling(&page, StyleApi::Computed, span).unwrap());
        assert!(!is_visible_by_styling(&page, StyleApi::Legacy, span).unwrap());
    }

    #[test]
    fn test_deep_tree_is_iterative() {
        let (page, body, ..) = page();
        let mut parent = body;
        for _ in 0..5000 {
            parent = page.append_element(parent, "div").unwrap();
        }
        assert!(is_displayed(&page, StyleApi::Legacy, parent).unwrap());
        assert!(is_visible_by_styling(&page, StyleApi::Computed, parent).unwrap());
    }

    /// Page wrapper counting style queries
    struct Counting {
        page: Page,
        computed: Cell<usize>,
        chains: Cell<usize>,
        current: Cell<usize>,
    }

    impl ElementHost for Counting {
        type Node = NodeId;

        fn parent_node(&self, node: NodeId) -> Option<NodeId> {
            self.page.parent_node(node)
        }

        fn is_document(&self, node: NodeId) -> bool {
            self.page.is_document(node)
        }

        fn local_name(&self, node: NodeId) -> Option<String> {
            self.page.local_name(node)
        }

        fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
            self.page.attribute(node, name)
        }

        fn client_rect(&self, node: NodeId) -> Option<ClientRect> {
            self.page.client_rect(node)
        }

        fn content_size(&self, node: NodeId) -> Option<Size> {
            self.page.content_size(node)
        }

        fn window_inner_size(&self, node: NodeId) -> Option<Size> {
            self.page.window_inner_size(node)
        }

        fn root_client_size(&self, node: NodeId) -> Option<Size> {
            self.page.root_client_size(node)
        }

        fn style_api(&self) -> StyleApi {
            self.page.style_api()
        }

        fn computed_style(&self, node: NodeId) -> Option<ComputedStyle> {
            self.computed.set(self.computed.get() + 1);
            self.page.computed_style(node)
        }

        fn current_style(&self, node: NodeId) -> Option<ComputedStyle> {
            self.current.set(self.current.get() + 1);
            self.page.current_style(node)
        }

        fn computed_style_chain(&self, node: NodeId) -> Vec<ComputedStyle> {
            self.chains.set(self.chains.get() + 1);
            self.page.computed_style_chain(node)
        }
    }

    #[test]
    fn test_styling_check_resolves_chain_once() {
        let (page, body, ..) = page();
        let mut parent = body;
        for _ in 0..200 {
            parent = page.append_element(parent, "div").unwrap();
        }
        let host = Counting { page, computed: Cell::new(0), chains: Cell::new(0), current: Cell::new(0) };

        assert!(is_visible_by_styling(&host, StyleApi::Computed, parent).unwrap());
        assert_eq!(host.chains.get(), 1);
        assert_eq!(host.computed.get(), 0);

        // html, body, 200 divs, then the document ends the chain
        assert!(is_visible_by_styling(&host, StyleApi::Legacy, parent).unwrap());
        assert_eq!(host.current.get(), 203);
    }
}
