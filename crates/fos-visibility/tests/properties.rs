//! Visibility property tests against a real page

use std::rc::Rc;

use fos_dom::{ElementGeometry, NodeId, WindowId};
use fos_visibility::{geometry, style, DocumentVisibility, Page, StyleApi, Visibility};

struct Fixture {
    page: Rc<Page>,
    body: NodeId,
    visibility: Visibility<Page>,
}

fn fixture() -> Fixture {
    let page = Rc::new(Page::new(800.0, 600.0));
    let document = page.document().unwrap();
    let html = page.append_element(document, "html").unwrap();
    page.set_layout(html, ElementGeometry::from_xywh(0.0, 0.0, 800.0, 3000.0).with_client_size(800.0, 600.0)).unwrap();
    let body = page.append_element(html, "body").unwrap();
    let visibility = Visibility::new(Rc::clone(&page), page.page_visibility()).unwrap();
    Fixture { page, body, visibility }
}

impl Fixture {
    fn boxed(&self, x: f64, y: f64, width: f64, height: f64) -> NodeId {
        let div = self.page.append_element(self.body, "div").unwrap();
        self.page.set_layout(div, ElementGeometry::from_xywh(x, y, width, height)).unwrap();
        div
    }
}

#[test]
fn test_zero_size_is_not_visible() {
    let f = fixture();
    for (w, h) in [(0.0, 100.0), (100.0, 0.0), (0.0, 0.0)] {
        let div = f.boxed(10.0, 10.0, w, h);
        assert_eq!(f.visibility.percentage(div), 0.0);
        assert!(!f.visibility.is_visible(div));
        assert!(f.visibility.is_hidden(div));
    }
}

#[test]
fn test_no_layout_is_not_visible() {
    let f = fixture();
    let div = f.page.append_element(f.body, "div").unwrap();
    assert_eq!(f.visibility.percentage(div), 0.0);
    assert!(!f.visibility.is_visible(div));
}

#[test]
fn test_fully_visible_implies_visible() {
    let f = fixture();
    let boxes = [
        f.boxed(0.0, 0.0, 100.0, 100.0),
        f.boxed(0.0, 0.0, 800.0, 600.0),
        f.boxed(-10.0, 50.0, 100.0, 100.0),
        f.boxed(700.0, 500.0, 100.0, 100.0),
        f.boxed(799.0, 599.0, 1.0, 1.0),
        f.boxed(100.0, 900.0, 100.0, 100.0),
    ];
    for div in boxes {
        if f.visibility.is_fully_visible(div) {
            assert!(f.visibility.is_visible(div), "{:?}", div);
        }
    }
}

#[test]
fn test_outside_each_side() {
    let f = fixture();
    let outside = [
        f.boxed(100.0, -150.0, 100.0, 100.0),
        f.boxed(100.0, 650.0, 100.0, 100.0),
        f.boxed(-150.0, 100.0, 100.0, 100.0),
        f.boxed(850.0, 100.0, 100.0, 100.0),
    ];
    for div in outside {
        assert!(!geometry::is_in_viewport(&*f.page, div));
        assert_eq!(f.visibility.percentage(div), 0.0);
    }
}

#[test]
fn test_viewport_edges_are_strict() {
    let f = fixture();
    // touching the bottom edge from below
    let below = f.boxed(0.0, 600.0, 100.0, 100.0);
    assert!(!geometry::is_in_viewport(&*f.page, below));

    // ending exactly at the right edge: visible, not fully visible
    let flush = f.boxed(700.0, 0.0, 100.0, 100.0);
    assert!(geometry::is_in_viewport(&*f.page, flush));
    assert!(!geometry::is_fully_in_viewport(&*f.page, flush));
    assert_eq!(f.visibility.percentage(flush), 1.0);
}

#[test]
fn test_strictly_interior_is_fully_visible() {
    let f = fixture();
    let div = f.boxed(50.0, 50.0, 300.0, 200.0);
    assert_eq!(f.visibility.percentage(div), 1.0);
    assert!(f.visibility.is_fully_visible(div));
}

#[test]
fn test_queries_are_idempotent() {
    let f = fixture();
    let div = f.boxed(0.0, 550.0, 100.0, 100.0);
    let first = f.visibility.reading(div);
    for _ in 0..5 {
        assert_eq!(f.visibility.reading(div), first);
        assert_eq!(f.visibility.is_hidden(div), !first.is_visible);
    }
    assert!((first.percentage - 0.5).abs() < 1e-9);
}

#[test]
fn test_display_none_ancestor_wins_over_geometry() {
    let f = fixture();
    let wrapper = f.page.append_element(f.body, "section").unwrap();
    let inner = f.page.append_element(wrapper, "div").unwrap();
    f.page.set_layout(inner, ElementGeometry::from_xywh(10.0, 10.0, 100.0, 100.0)).unwrap();
    f.page.set_style(wrapper, "display: none").unwrap();

    assert!(geometry::is_fully_in_viewport(&*f.page, inner));
    assert!(!f.visibility.is_visible_by_styling(inner));
    assert_eq!(f.visibility.percentage(inner), 0.0);
}

#[test]
fn test_hidden_attribute() {
    let f = fixture();
    let div = f.boxed(10.0, 10.0, 100.0, 100.0);
    f.page.set_attribute(div, "hidden", "").unwrap();
    assert!(!f.visibility.is_visible(div));
}

#[test]
fn test_hidden_input_ignores_css() {
    let f = fixture();
    let input = f.page.append_element(f.body, "input").unwrap();
    f.page.set_layout(input, ElementGeometry::from_xywh(10.0, 10.0, 100.0, 20.0)).unwrap();
    f.page.set_attribute(input, "type", "hidden").unwrap();
    f.page.set_style(input, "display: inline-block !important; visibility: visible").unwrap();

    assert!(!style::is_visible_by_styling(&*f.page, StyleApi::Computed, input).unwrap());
    assert!(!f.visibility.is_visible(input));
}

#[test]
fn test_legacy_style_api() {
    let f = fixture();
    f.page.set_style_api(StyleApi::Legacy);
    let visibility = Visibility::new(Rc::clone(&f.page), f.page.page_visibility()).unwrap();

    let wrapper = f.page.append_element(f.body, "div").unwrap();
    let inner = f.page.append_element(wrapper, "p").unwrap();
    f.page.set_layout(inner, ElementGeometry::from_xywh(10.0, 10.0, 100.0, 100.0)).unwrap();
    assert!(visibility.is_visible(inner));

    f.page.set_style(wrapper, "visibility: hidden").unwrap();
    assert!(!visibility.is_visible(inner));
}

#[test]
fn test_edges_only_rect_uses_client_size() {
    let f = fixture();
    let div = f.page.append_element(f.body, "div").unwrap();
    f.page.set_layout(div, ElementGeometry::from_xywh(0.0, -50.0, 200.0, 100.0).edges_only()).unwrap();

    let rect = geometry::bounding_rect(&*f.page, div);
    assert_eq!((rect.width, rect.height), (200.0, 100.0));
    assert!((f.visibility.percentage(div) - 0.5).abs() < 1e-9);
}

#[test]
fn test_viewport_falls_back_to_root_client_size() {
    let page = Rc::new(Page::from_tree(fos_dom::DomTree::new()));
    let document = page.document().unwrap();
    let html = page.append_element(document, "html").unwrap();
    page.set_layout(html, ElementGeometry::from_xywh(0.0, 0.0, 400.0, 2000.0).with_client_size(400.0, 300.0)).unwrap();
    let div = page.append_element(html, "div").unwrap();
    page.set_layout(div, ElementGeometry::from_xywh(0.0, 250.0, 100.0, 100.0)).unwrap();

    let vp = geometry::viewport(&*page, div);
    assert_eq!((vp.width, vp.height), (400.0, 300.0));

    let visibility = Visibility::new(Rc::clone(&page), page.page_visibility()).unwrap();
    assert!((visibility.percentage(div) - 0.5).abs() < 1e-9);
}

#[test]
fn test_iframe_uses_own_viewport() {
    let f = fixture();
    let iframe = f.boxed(0.0, 0.0, 300.0, 200.0);
    let frame = f.page.tree_mut().create_frame(iframe, Some(300.0), Some(200.0)).unwrap();

    let frame_doc = f.page.tree().document(frame).unwrap();
    let inner = f.page.append_element(frame_doc, "div").unwrap();
    // inside the top-level viewport's extent, outside the frame's
    f.page.set_layout(inner, ElementGeometry::from_xywh(0.0, 250.0, 100.0, 100.0)).unwrap();

    assert!(!geometry::is_in_viewport(&*f.page, inner));
    f.page.scroll_to(frame, 0.0, 200.0).unwrap();
    assert!(f.visibility.is_fully_visible(inner));
}

#[test]
fn test_page_hidden_hides_everything() {
    let f = fixture();
    let div = f.boxed(10.0, 10.0, 100.0, 100.0);
    f.page.set_visibility_state(DocumentVisibility::Prerender);
    assert!(f.visibility.is_hidden(div));

    f.page.set_visibility_state(DocumentVisibility::Visible);
    assert!(f.visibility.is_visible(div));
}

#[test]
fn test_scroll_moves_element_out() {
    let f = fixture();
    let div = f.boxed(0.0, 100.0, 100.0, 100.0);
    f.page.scroll_to(WindowId::TOP, 0.0, 250.0).unwrap();
    assert!(f.visibility.is_hidden(div));
}

#[test]
fn test_deeply_nested_element() {
    let f = fixture();
    let outermost = f.page.append_element(f.body, "div").unwrap();
    let mut parent = outermost;
    for _ in 0..1000 {
        parent = f.page.append_element(parent, "div").unwrap();
    }
    f.page.set_layout(parent, ElementGeometry::from_xywh(10.0, 10.0, 100.0, 100.0)).unwrap();
    assert_eq!(f.visibility.reading(parent).percentage, 1.0);

    f.page.set_style(outermost, "display: none").unwrap();
    assert_eq!(f.visibility.percentage(parent), 0.0);
    assert!(f.visibility.is_hidden(parent));
}
