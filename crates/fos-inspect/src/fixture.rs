//! Page fixtures
//!
//! JSON description of a laid-out page: windows, element boxes, inline
//! styles and a timeline of page events to replay.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use fos_dom::{DomTree, ElementGeometry, NodeId, WindowId};
use fos_visibility::{DocumentVisibility, Page, Size, StyleApi};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PageFixture {
    /// Top-level inner size; omit for a window that does not report one
    #[serde(default)]
    pub viewport: Option<Size>,
    /// `null` removes the page visibility API
    #[serde(default = "default_visibility")]
    pub visibility: Option<DocumentVisibility>,
    #[serde(default = "default_style_api")]
    pub style_api: StyleApi,
    /// The `<html>` element
    pub root: NodeFixture,
    #[serde(default)]
    pub timeline: Vec<TimelineStep>,
}

fn default_visibility() -> Option<DocumentVisibility> {
    Some(DocumentVisibility::Visible)
}

fn default_style_api() -> StyleApi {
    StyleApi::Computed
}

#[derive(Debug, Deserialize)]
pub struct NodeFixture {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub rect: Option<RectFixture>,
    #[serde(default)]
    pub children: Vec<NodeFixture>,
    /// Content document, for `<iframe>`
    #[serde(default)]
    pub frame: Option<FrameFixture>,
}

/// Border box in document coordinates
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RectFixture {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub client_width: Option<f64>,
    #[serde(default)]
    pub client_height: Option<f64>,
    /// Whether rect queries report width/height
    #[serde(default = "default_true")]
    pub reports_size: bool,
}

fn default_true() -> bool {
    true
}

impl RectFixture {
    fn geometry(&self) -> ElementGeometry {
        let mut geometry = ElementGeometry::from_xywh(self.x, self.y, self.width, self.height);
        if self.client_width.is_some() || self.client_height.is_some() {
            geometry = geometry.with_client_size(
                self.client_width.unwrap_or(geometry.client_width),
                self.client_height.unwrap_or(geometry.client_height),
            );
        }
        if !self.reports_size {
            geometry = geometry.edges_only();
        }
        geometry
    }
}

#[derive(Debug, Deserialize)]
pub struct FrameFixture {
    #[serde(default)]
    pub viewport: Option<Size>,
    /// Children of the frame's document
    #[serde(default)]
    pub children: Vec<NodeFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimelineStep {
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: TimelineAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TimelineAction {
    Scroll { x: f64, y: f64 },
    Resize { width: f64, height: f64 },
    Visibility { state: DocumentVisibility },
    Style { id: String, css: String },
    Unload,
}

/// A page built from a fixture
pub struct LoadedPage {
    pub page: Rc<Page>,
    /// Elements with an `id`, in document order
    pub ids: Vec<(String, NodeId)>,
}

impl LoadedPage {
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.ids.iter().find(|(i, _)| i == id).map(|&(_, node)| node)
    }
}

impl PageFixture {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing fixture {}", path.display()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Timeline sorted by time; steps at the same time keep their order
    pub fn sorted_timeline(&self) -> Vec<TimelineStep> {
        let mut steps = self.timeline.clone();
        steps.sort_by_key(|s| s.at_ms);
        steps
    }

    pub fn build(&self) -> Result<LoadedPage> {
        let tree = match self.viewport {
            Some(size) => DomTree::with_viewport(size.width, size.height),
            None => DomTree::new(),
        };
        let page = Rc::new(Page::from_tree(tree));
        page.set_style_api(self.style_api);
        match self.visibility {
            Some(state) => page.set_visibility_state(state),
            None => page.disable_page_visibility(),
        }

        let mut ids = Vec::new();
        let document = page.document().context("page has no document")?;
        let mut stack: Vec<(NodeId, &NodeFixture)> = vec![(document, &self.root)];

        while let Some((parent, fixture)) = stack.pop() {
            let node = page.append_element(parent, &fixture.tag)?;
            apply_node(&page, node, fixture)?;
            if let Some(id) = &fixture.id {
                ids.push((id.clone(), node));
            }

            if let Some(frame) = &fixture.frame {
                let viewport = frame.viewport;
                let window = page.tree_mut().create_frame(
                    node,
                    viewport.map(|s| s.width),
                    viewport.map(|s| s.height),
                )?;
                let frame_document = page.tree().document(window).context("frame has no document")?;
                stack.extend(frame.children.iter().rev().map(|c| (frame_document, c)));
            }
            stack.extend(fixture.children.iter().rev().map(|c| (node, c)));
        }

        tracing::debug!("Built fixture page with {} nodes", page.tree().len());
        Ok(LoadedPage { page, ids })
    }
}

fn apply_node(page: &Page, node: NodeId, fixture: &NodeFixture) -> Result<()> {
    for (name, value) in &fixture.attrs {
        page.set_attribute(node, name, value)?;
    }
    if let Some(id) = &fixture.id {
        page.set_attribute(node, "id", id)?;
    }
    if let Some(css) = &fixture.style {
        page.set_style(node, css)?;
    }
    if let Some(rect) = &fixture.rect {
        page.set_layout(node, rect.geometry())?;
    }
    Ok(())
}

/// Apply one timeline action to the page
pub fn apply_action(loaded: &LoadedPage, action: &TimelineAction) -> Result<()> {
    let page = &loaded.page;
    match action {
        TimelineAction::Scroll { x, y } => page.scroll_to(WindowId::TOP, *x, *y)?,
        TimelineAction::Resize { width, height } => page.resize(WindowId::TOP, *width, *height)?,
        TimelineAction::Visibility { state } => page.set_visibility_state(*state),
        TimelineAction::Style { id, css } => {
            let node = loaded.lookup(id).with_context(|| format!("no element with id {:?}", id))?;
            page.set_style(node, css)?;
        }
        TimelineAction::Unload => page.unload(),
    }
    Ok(())
}
