//! Page-Visibility Adapter
//!
//! Wraps an optional page visibility capability (backgrounded tab, minimised
//! window). Without one, the page is assumed visible.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::events::Subscription;

/// Document visibility state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentVisibility {
    Visible,
    Hidden,
    Prerender,
}

/// Callback for visibility changes
pub type VisibilityChangeHandler = Rc<dyn Fn(DocumentVisibility)>;

/// Host capability reporting page visibility
pub trait PageVisibilityApi {
    fn visibility_state(&self) -> DocumentVisibility;

    fn on_visibility_change(&self, handler: VisibilityChangeHandler) -> Subscription;
}

/// Adapter over an optional [`PageVisibilityApi`]
#[derive(Clone, Default)]
pub struct PageVisibility {
    api: Option<Rc<dyn PageVisibilityApi>>,
}

impl PageVisibility {
    pub fn new(api: Rc<dyn PageVisibilityApi>) -> Self {
        Self { api: Some(api) }
    }

    /// Adapter for hosts without the capability
    pub fn unavailable() -> Self {
        Self { api: None }
    }

    pub fn is_available(&self) -> bool {
        self.api.is_some()
    }

    /// True unless the host reports the page as not visible
    pub fn is_page_visible(&self) -> bool {
        self.api.as_ref()
            .map(|api| api.visibility_state() == DocumentVisibility::Visible)
            .unwrap_or(true)
    }

    /// Subscribe to changes; a no-op subscription when unavailable
    pub fn on_change(&self, handler: VisibilityChangeHandler) -> Subscription {
        match &self.api {
            Some(api) => api.on_visibility_change(handler),
            None => Subscription::noop(),
        }
    }
}

impl fmt::Debug for PageVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageVisibility")
            .field("available", &self.is_available())
            .field("visible", &self.is_page_visible())
            .finish()
    }
}
