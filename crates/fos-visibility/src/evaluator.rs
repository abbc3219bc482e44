//! Visibility Evaluator
//!
//! Combines geometry, styling and page visibility into percentages and
//! booleans. Holds no per-element state; every query re-reads the host.

use std::rc::Rc;

use serde::Serialize;

use crate::config::VisibilityConfig;
use crate::error::Result;
use crate::geometry;
use crate::host::{ElementHost, StyleApi};
use crate::page_visibility::PageVisibility;
use crate::reading::{VisibilityReading, VisibilityState};
use crate::style;

/// What the host supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub style_api: StyleApi,
    pub page_visibility: bool,
    /// Every capability the evaluator relies on is present
    pub compatible: bool,
}

/// Whether a host offers everything an evaluator needs
pub fn compatible<H: ElementHost>(host: &H) -> bool {
    style::detect_style_api(host).is_ok()
}

/// Visibility queries against one host
pub struct Visibility<H: ElementHost> {
    host: Rc<H>,
    page: PageVisibility,
    config: VisibilityConfig,
    style_api: StyleApi,
}

impl<H: ElementHost> Visibility<H> {
    /// Evaluator with the default configuration
    pub fn new(host: Rc<H>, page: PageVisibility) -> Result<Self> {
        Self::with_config(host, page, VisibilityConfig::default())
    }

    /// Evaluator with an explicit configuration.
    ///
    /// Style capability is detected here, once. In strict mode a host
    /// without any style API is rejected with `UnsupportedEnvironment`.
    pub fn with_config(host: Rc<H>, page: PageVisibility, config: VisibilityConfig) -> Result<Self> {
        config.validate()?;

        let style_api = match style::detect_style_api(&*host) {
            Ok(api) => api,
            Err(e) if config.strict_environment => return Err(e),
            Err(e) => {
                tracing::warn!("{}; style checks disabled", e);
                StyleApi::Unavailable
            }
        };
        tracing::debug!("Visibility evaluator ready (style: {:?}, page visibility: {})",
            style_api, page.is_available());

        Ok(Self { host, page, config, style_api })
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    pub fn page_visibility(&self) -> &PageVisibility {
        &self.page
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            style_api: self.style_api,
            page_visibility: self.page.is_available(),
            compatible: self.style_api != StyleApi::Unavailable,
        }
    }

    /// Styling check through the API detected at construction; always
    /// passes when style checks are disabled
    pub fn is_visible_by_styling(&self, node: H::Node) -> bool {
        if self.style_api == StyleApi::Unavailable {
            return true;
        }
        style::is_visible_by_styling(&*self.host, self.style_api, node).unwrap_or_else(|e| {
            tracing::warn!("Style query failed for {:?}: {}", node, e);
            false
        })
    }

    /// Visible fraction of the element, in [0, 1]
    pub fn percentage(&self, node: H::Node) -> f64 {
        if !geometry::is_in_viewport(&*self.host, node)
            || !self.is_visible_by_styling(node)
            || !self.page.is_page_visible()
        {
            return 0.0;
        }
        geometry::visible_percentage(&*self.host, node)
    }

    pub fn is_fully_visible(&self, node: H::Node) -> bool {
        self.page.is_page_visible()
            && geometry::is_fully_in_viewport(&*self.host, node)
            && self.is_visible_by_styling(node)
    }

    pub fn is_visible(&self, node: H::Node) -> bool {
        self.page.is_page_visible()
            && geometry::is_in_viewport(&*self.host, node)
            && self.is_visible_by_styling(node)
    }

    pub fn is_hidden(&self, node: H::Node) -> bool {
        !self.is_visible(node)
    }

    /// Snapshot of all three measures, reading the page and styles once
    pub fn reading(&self, node: H::Node) -> VisibilityReading {
        let rect = geometry::bounding_rect(&*self.host, node);
        let viewport = geometry::viewport(&*self.host, node);
        if !rect.intersects(&viewport) || !self.page.is_page_visible() || !self.is_visible_by_styling(node) {
            return VisibilityReading::default();
        }
        VisibilityReading {
            percentage: rect.visible_fraction(&viewport),
            is_visible: true,
            is_fully_visible: rect.is_within(&viewport),
        }
    }

    pub fn state(&self, node: H::Node) -> VisibilityState {
        self.reading(node).state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VisibilityError;
    use crate::page::Page;
    use crate::page_visibility::DocumentVisibility;
    use fos_dom::{ElementGeometry, NodeId, WindowId};

    fn setup() -> (Rc<Page>, Visibility<Page>, NodeId) {
        let page = Rc::new(Page::new(800.0, 600.0));
        let document = page.document().unwrap();
        let html = page.append_element(document, "html").unwrap();
        let body = page.append_element(html, "body").unwrap();
        let div = page.append_element(body, "div").unwrap();
        page.set_layout(div, ElementGeometry::from_xywh(100.0, 100.0, 200.0, 100.0)).unwrap();

        let visibility = Visibility::new(Rc::clone(&page), page.page_visibility()).unwrap();
        (page, visibility, div)
    }

    #[test]
    fn test_fully_visible_element() {
        let (_page, visibility, div) = setup();
        assert_eq!(visibility.percentage(div), 1.0);
        assert!(visibility.is_visible(div));
        assert!(visibility.is_fully_visible(div));
        assert!(!visibility.is_hidden(div));
        assert_eq!(visibility.state(div), VisibilityState::FullyVisible);
    }

    #[test]
    fn test_scrolled_partially_out() {
        let (page, visibility, div) = setup();
        page.scroll_to(WindowId::TOP, 0.0, 150.0).unwrap();

        let reading = visibility.reading(div);
        assert!((reading.percentage - 0.5).abs() < 1e-9);
        assert!(reading.is_visible);
        assert!(!reading.is_fully_visible);
    }

    #[test]
    fn test_hidden_page_reads_zero() {
        let (page, visibility, div) = setup();
        page.set_visibility_state(DocumentVisibility::Hidden);

        assert_eq!(visibility.percentage(div), 0.0);
        assert!(visibility.is_hidden(div));
        assert!(!visibility.is_fully_visible(div));
    }

    #[test]
    fn test_styled_away_reads_zero() {
        let (page, visibility, div) = setup();
        page.set_style(div, "visibility: hidden").unwrap();
        assert_eq!(visibility.percentage(div), 0.0);
        assert!(!visibility.is_visible(div));
    }

    #[test]
    fn test_strict_environment_rejects_missing_style_api() {
        let (page, _visibility, _div) = setup();
        page.set_style_api(StyleApi::Unavailable);
        assert!(!compatible(&*page));

        let err = Visibility::new(Rc::clone(&page), page.page_visibility()).err();
        assert!(matches!(err, Some(VisibilityError::UnsupportedEnvironment { .. })));
    }

    #[test]
    fn test_lenient_environment_skips_style() {
        let (page, _visibility, div) = setup();
        page.set_style(div, "display: none").unwrap();
        page.set_style_api(StyleApi::Unavailable);

        let config = VisibilityConfig { strict_environment: false, ..VisibilityConfig::default() };
        let visibility = Visibility::with_config(Rc::clone(&page), page.page_visibility(), config).unwrap();
        assert!(!visibility.capabilities().compatible);
        assert_eq!(visibility.percentage(div), 1.0);
    }

    #[test]
    fn test_style_api_detected_once() {
        let (page, visibility, div) = setup();
        page.set_style_api(StyleApi::Unavailable);

        assert_eq!(visibility.capabilities().style_api, StyleApi::Computed);
        assert_eq!(visibility.percentage(div), 1.0);
        assert!(visibility.is_visible(div));

        page.set_style(div, "display: none").unwrap();
        assert!(visibility.is_hidden(div));
    }

    #[test]
    fn test_reading_matches_individual_queries() {
        let (page, visibility, div) = setup();
        for y in [0.0, 150.0, 250.0] {
            page.scroll_to(WindowId::TOP, 0.0, y).unwrap();
            let reading = visibility.reading(div);
            assert_eq!(reading.percentage, visibility.percentage(div));
            assert_eq!(reading.is_visible, visibility.is_visible(div));
            assert_eq!(reading.is_fully_visible, visibility.is_fully_visible(div));
        }
        assert_eq!(visibility.reading(div), VisibilityReading::default());
    }

    #[test]
    fn test_capabilities() {
        let (page, visibility, _div) = setup();
        assert_eq!(visibility.capabilities(), Capabilities {
            style_api: StyleApi::Computed,
            page_visibility: true,
            compatible: true,
        });

        page.disable_page_visibility();
        let visibility = Visibility::new(Rc::clone(&page), page.page_visibility()).unwrap();
        assert!(!visibility.capabilities().page_visibility);
    }
}
